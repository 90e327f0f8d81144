use async_trait::async_trait;
use scraper::Html;

use crate::model::{Location, WeatherSnapshot};

use super::{
    DEFAULT_LOCATION, ProviderFactory, WeatherProvider,
    markup::{attr, select_all, select_first, text},
};

pub const ID: &str = "accu";
pub const TITLE: &str = "AccuWeather";
pub const BASE_URL: &str = "https://www.accuweather.com";
pub const DEFAULT_URL: &str =
    "https://www.accuweather.com/en/ua/kyiv/324505/weather-forecast/324505";
pub const BROWSE_URL: &str = "https://www.accuweather.com/en/browse-locations";

/// accuweather.com.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuWeather;

impl ProviderFactory for AccuWeather {
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
        Box::new(AccuWeatherProvider::new(location))
    }
}

#[derive(Debug, Clone)]
pub struct AccuWeatherProvider {
    location: Location,
}

impl AccuWeatherProvider {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl WeatherProvider for AccuWeatherProvider {
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

        select_all(html.root_element(), "li.drilldown.cl")
            .into_iter()
            .filter_map(|item| {
                let url = attr(select_first(item, "a")?, "href")?;
                let name = text(select_first(item, "em")?);
                Some(Location::new(name.trim(), absolute(&url)))
            })
            .collect()
    }

    /// The forecast page links to today's conditions through `a.current`.
    fn current_page_link(&self, page: &str) -> Option<String> {
        let html = Html::parse_document(page);
        let href = attr(select_first(html.root_element(), "a.current")?, "href")?;
        Some(absolute(&href))
    }

    fn extract_weather(&self, page: &str) -> WeatherSnapshot {
        let html = Html::parse_document(page);
        let root = html.root_element();
        let mut info = WeatherSnapshot::new();

        let temperatures = select_first(root, "div.temperatures");
        if let Some(temp) = temperatures.and_then(|t| select_first(t, "p.value")) {
            info.insert("Temperature", text(temp).trim());
        }
        if let Some(phrase) = select_first(root, "div.phrase") {
            info.insert("Condition", text(phrase).trim());
        }
        if let Some(feel) = temperatures
            .and_then(|t| select_first(t, "p.realFeel.top"))
            .and_then(|feel| real_feel(&text(feel)))
        {
            info.insert("RealFeel", feel);
        }

        info
    }
}

/// Make a site-relative href absolute.
fn absolute(href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{BASE_URL}/{}", href.trim_start_matches('/'))
    }
}

/// "RealFeel® -3°" -> "-3°".
fn real_feel(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let first_digit = raw.find(|c: char| c.is_ascii_digit()).unwrap_or(0);
    let negative = raw[..first_digit].ends_with(['-', '\u{2212}']);
    let sign = if negative { "-" } else { "" };
    Some(format!("{sign}{digits}°"))
}
