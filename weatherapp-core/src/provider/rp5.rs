use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::model::{Location, WeatherSnapshot};

use super::{
    DEFAULT_LOCATION, ProviderFactory, WeatherProvider,
    markup::{attr, drop_last_chars, select_all, select_first, text},
};

pub const ID: &str = "rp5";
pub const TITLE: &str = "RP5";
pub const BASE_URL: &str = "http://rp5.ua";
pub const DEFAULT_URL: &str = "http://rp5.ua/Weather_in_Kiev,_Kyiv";
pub const BROWSE_URL: &str = "http://rp5.ua/Weather_in_the_world";

/// rp5.ua.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rp5;

impl ProviderFactory for Rp5 {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> &str {
        TITLE
    }

    fn default_location(&self) -> &str {
        DEFAULT_LOCATION
    }

    fn default_url(&self) -> &str {
        DEFAULT_URL
    }

    fn create(&self, location: Location) -> Box<dyn WeatherProvider> {
        Box::new(Rp5Provider::new(location))
    }
}

#[derive(Debug, Clone)]
pub struct Rp5Provider {
    location: Location,
}

impl Rp5Provider {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl WeatherProvider for Rp5Provider {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> &str {
        TITLE
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn browse_url(&self) -> &str {
        BROWSE_URL
    }

    /// Country pages, region pages and city pages each use their own markup;
    /// the first layout that matches wins.
    fn parse_locations(&self, page: &str) -> Vec<Location> {
        let html = Html::parse_document(page);
        let root = html.root_element();

        let countries = select_all(root, "div.country_map_links");
        if !countries.is_empty() {
            return countries.into_iter().filter_map(country_link).collect();
        }

        let regions = select_all(root, "a.href20");
        if !regions.is_empty() {
            return regions
                .into_iter()
                .filter_map(|link| {
                    let href = attr(link, "href")?;
                    Some(Location::new(text(link).trim(), absolute(&href)))
                })
                .collect();
        }

        select_all(root, "div.city_link")
            .into_iter()
            .filter_map(|city| {
                let href = attr(select_first(city, "a")?, "href")?;
                Some(Location::new(text(city).trim(), absolute(&href)))
            })
            .collect()
    }

    fn extract_weather(&self, page: &str) -> WeatherSnapshot {
        let html = Html::parse_document(page);
        let root = html.root_element();
        let mut info = WeatherSnapshot::new();

        if let Some(temp) = select_first(root, "div.ArchiveTemp span.t_0") {
            info.insert("Temperature", text(temp).trim());
        }

        let Some(details) = select_first(root, "#forecastShort-content") else {
            return info;
        };
        let summary = select_first(details, "b").map(text);

        if let Some(phrase) = summary.as_deref().and_then(condition) {
            info.insert("Condition", phrase);
        }
        if let Some(expect) = select_first(details, "span.t_0") {
            info.insert("Expect", drop_last_chars(text(expect).trim(), 3).trim());
        }
        if let Some(wind_info) = summary.as_deref().and_then(wind) {
            info.insert("Wind", wind_info);
        }

        info
    }
}

/// `<div class="country_map_links"><b><a href="/Weather_in_Ukraine">Ukraine</a>,</b>...`
fn country_link(block: ElementRef<'_>) -> Option<Location> {
    let bold = select_first(block, "b")?;
    let href = attr(select_first(bold, "a")?, "href")?;
    let name = text(bold);
    let name = drop_last_chars(name.trim(), 1).trim();
    Some(Location::new(name, absolute(&href)))
}

fn absolute(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{BASE_URL}/{}", href.trim_start_matches('/'))
    }
}

/// The forecast summary reads like
/// "Today, 12 March, cloudy, light rain, wind 3 m/s. Tomorrow ...";
/// the condition is the clause after the date.
fn condition(summary: &str) -> Option<&str> {
    let mut clauses = summary.split(',');
    clauses.next()?;
    clauses.next()?;
    let clause = clauses.next()?.trim();
    (!clause.is_empty()).then_some(clause)
}

/// Last clause of the first sentence.
fn wind(summary: &str) -> Option<&str> {
    let first_sentence = summary.split(". ").next()?;
    let (_, last) = first_sentence.rsplit_once(',')?;
    let last = last.trim();
    (!last.is_empty()).then_some(last)
}
