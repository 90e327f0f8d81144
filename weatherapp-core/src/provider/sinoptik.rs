use async_trait::async_trait;
use scraper::Html;

use crate::model::{Location, WeatherSnapshot};

use super::{
    DEFAULT_LOCATION, ProviderFactory, WeatherProvider,
    markup::{attr, select_all, select_first, text},
};

pub const ID: &str = "sinoptik";
pub const TITLE: &str = "SINOPTIK";
pub const DEFAULT_URL: &str = "https://ua.sinoptik.ua/погода-київ";
pub const BROWSE_URL: &str = "https://ua.sinoptik.ua/погода-європа";

/// ua.sinoptik.ua.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sinoptik;

impl ProviderFactory for Sinoptik {
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
        Box::new(SinoptikProvider::new(location))
    }
}

#[derive(Debug, Clone)]
pub struct SinoptikProvider {
    location: Location,
}

impl SinoptikProvider {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl WeatherProvider for SinoptikProvider {
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

    fn parse_locations(&self, page: &str) -> Vec<Location> {
        let html = Html::parse_document(page);
        let Some(column) = select_first(html.root_element(), "div.mapRightCol") else {
            return Vec::new();
        };

        select_all(column, "a")
            .into_iter()
            .filter_map(|link| {
                let href = attr(link, "href")?;
                Some(Location::new(text(link).trim(), absolute(&href)))
            })
            .collect()
    }

    fn extract_weather(&self, page: &str) -> WeatherSnapshot {
        let html = Html::parse_document(page);
        let root = html.root_element();
        let mut info = WeatherSnapshot::new();

        if let Some(block) = select_first(root, "div.imgBlock") {
            if let Some(temp) = select_first(block, "p.today-temp") {
                info.insert("Temperature", text(temp).trim());
            }
            if let Some(alt) = select_first(block, "img[alt]").and_then(|img| attr(img, "alt")) {
                info.insert("Condition", alt.trim());
            }
        }

        if let Some(day) = select_first(root, "div.main.loaded") {
            let min = select_first(day, "div.min").map(text);
            let max = select_first(day, "div.max").map(text);
            if let (Some(min), Some(max)) = (min, max) {
                info.insert("Expect", format!("{}... {}", min.trim(), max.trim()));
            }
        }

        info
    }
}

/// Links on the map are scheme-relative (`//ua.sinoptik.ua/...`).
fn absolute(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SinoptikProvider {
        SinoptikProvider::new(Location::new(DEFAULT_LOCATION, DEFAULT_URL))
    }

    #[test]
    fn parses_map_column_links() {
        let page = r#"
            <div class="mapLeftCol"><a href="//ua.sinoptik.ua/left">Left</a></div>
            <div class="mapRightCol">
              <a href="//ua.sinoptik.ua/погода-львів">Львів</a>
              <a href="https://ua.sinoptik.ua/погода-одеса">Одеса</a>
            </div>"#;

        assert_eq!(
            provider().parse_locations(page),
            [
                Location::new("Львів", "https://ua.sinoptik.ua/погода-львів"),
                Location::new("Одеса", "https://ua.sinoptik.ua/погода-одеса"),
            ]
        );
    }

    #[test]
    fn page_without_map_is_a_leaf() {
        assert!(provider().parse_locations("<div class='weather'></div>").is_empty());
    }

    #[test]
    fn extracts_today() {
        let page = r#"
            <div class="main loaded">
              <div class="temperature"><div class="min">мін. <span>+1°</span></div><div class="max">макс. <span>+8°</span></div></div>
            </div>
            <div class="imgBlock">
              <div class="img"><img src="x.png" alt="Хмарно, дрібний дощ"></div>
              <p class="today-temp">+5°C</p>
            </div>"#;

        let info = provider().extract_weather(page);

        let fields: Vec<_> = info.iter().collect();
        assert_eq!(
            fields,
            [
                ("Temperature", "+5°C"),
                ("Condition", "Хмарно, дрібний дощ"),
                ("Expect", "мін. +1°... макс. +8°"),
            ]
        );
    }

    #[test]
    fn expect_needs_both_bounds() {
        let page = r#"<div class="main loaded"><div class="min">+1°</div></div>"#;

        assert!(provider().extract_weather(page).get("Expect").is_none());
    }
}
