//! Small CSS-selector helpers over `scraper`.
//!
//! A selector that fails to parse selects nothing, so a typo shows up as a
//! missing field instead of a panic.

use scraper::{ElementRef, Selector};

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            tracing::debug!(css, error = %err, "invalid selector");
            None
        }
    }
}

pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    scope.select(&selector).next()
}

pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => scope.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// Concatenated text of the element and its descendants.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// Drop the last `n` characters.
pub(crate) fn drop_last_chars(s: &str, n: usize) -> &str {
    let keep = s.chars().count().saturating_sub(n);
    match s.char_indices().nth(keep) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
