use crate::{
    config::ConfigStore,
    error::{Result, WeatherError},
    fetch::Fetcher,
    model::{Location, WeatherSnapshot},
    provider::{accu::AccuWeather, rp5::Rp5, sinoptik::Sinoptik},
    registry::Registry,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod accu;
mod markup;
pub mod rp5;
pub mod sinoptik;

/// Location name every built-in provider starts with.
pub const DEFAULT_LOCATION: &str = "Kyiv";

/// How many levels the interactive location walk may descend before it is
/// considered to be looping.
pub const MAX_CONFIGURE_DEPTH: usize = 32;

/// One weather site, bound to the location it was resolved with.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// The resolved location this instance reports on.
    fn location(&self) -> &Location;

    /// Where the location walk starts.
    fn browse_url(&self) -> &str;

    /// Sub-locations listed on a locations page; empty on a leaf page.
    fn parse_locations(&self, page: &str) -> Vec<Location>;

    /// Some sites keep the current conditions one link away from the
    /// location page.
    fn current_page_link(&self, _page: &str) -> Option<String> {
        None
    }

    /// Weather fields found on the page. Missing fields are left out.
    fn extract_weather(&self, page: &str) -> WeatherSnapshot;

    async fn locations(&self, fetcher: &Fetcher, url: &str, refresh: bool) -> Result<Vec<Location>> {
        let page = fetcher.fetch(url, refresh).await?;
        Ok(self.parse_locations(&page))
    }

    async fn run(&self, fetcher: &Fetcher, refresh: bool) -> Result<WeatherSnapshot> {
        let mut page = fetcher.fetch(&self.location().url, refresh).await?;

        if let Some(link) = self.current_page_link(&page) {
            tracing::debug!(provider = self.id(), %link, "following current conditions link");
            page = fetcher.fetch(&link, refresh).await?;
        }

        Ok(self.extract_weather(&page))
    }

    /// Walk the site's location pages from `seed_url`, asking the user to
    /// pick one entry per level, and save the final pick.
    async fn configure(
        &self,
        seed_url: &str,
        fetcher: &Fetcher,
        store: &ConfigStore,
        prompt: &mut dyn LocationPrompt,
        refresh: bool,
    ) -> Result<Location> {
        let mut candidates = self.locations(fetcher, seed_url, refresh).await?;
        if candidates.is_empty() {
            return Err(WeatherError::config(format!(
                "No locations found on {seed_url} for provider '{}'",
                self.id()
            )));
        }

        let mut chosen = None;
        let mut depth = 0;
        while !candidates.is_empty() {
            if depth == MAX_CONFIGURE_DEPTH {
                return Err(WeatherError::config(format!(
                    "Location pages for '{}' nest deeper than {MAX_CONFIGURE_DEPTH} levels",
                    self.id()
                )));
            }

            prompt.show(&candidates);
            let input = prompt.read_selection()?;
            let index = match parse_selection(&input, candidates.len()) {
                Ok(index) => index,
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(provider = self.id(), error = %err, "rejected selection");
                    prompt.report(&err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let selected = candidates.swap_remove(index);
            candidates = self.locations(fetcher, &selected.url, refresh).await?;
            chosen = Some(selected);
            depth += 1;
        }

        let location = chosen
            .ok_or_else(|| WeatherError::config("Location walk ended without a selection"))?;
        store.save(self.id(), &location)?;
        Ok(location)
    }
}

/// Interactive side of the location walk.
pub trait LocationPrompt: Send {
    fn show(&mut self, candidates: &[Location]);

    /// Raw text typed by the user. Errors end the walk.
    fn read_selection(&mut self) -> Result<String>;

    fn report(&mut self, error: &WeatherError);
}

/// Turn a 1-based selection typed by the user into an index into
/// `count` candidates.
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    let trimmed = input.trim();
    let number: usize = trimmed
        .parse()
        .map_err(|_| WeatherError::user_input(format!("'{trimmed}' is not a number")))?;

    if number == 0 || number > count {
        return Err(WeatherError::user_input(format!(
            "{number} is out of range, pick 1..={count}"
        )));
    }
    Ok(number - 1)
}

/// Static description of a provider and a way to build bound instances.
pub trait ProviderFactory: Send + Sync {
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    fn default_location(&self) -> &str;

    fn default_url(&self) -> &str;

    fn create(&self, location: Location) -> Box<dyn WeatherProvider>;

    /// Saved location, or the compiled-in default.
    fn resolve(&self, store: &ConfigStore) -> Location {
        store.resolve(self.id(), self.default_location(), self.default_url())
    }

    /// Fresh instance bound to the location currently in effect.
    fn build(&self, store: &ConfigStore) -> Box<dyn WeatherProvider> {
        self.create(self.resolve(store))
    }
}

pub type ProviderRegistry = Registry<Arc<dyn ProviderFactory>>;

impl ProviderRegistry {
    pub fn add_provider(&mut self, factory: impl ProviderFactory + 'static) {
        let id = factory.id().to_string();
        self.register(id, Arc::new(factory));
    }

    /// accu, rp5 and sinoptik, in that order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.add_provider(AccuWeather);
        registry.add_provider(Rp5);
        registry.add_provider(Sinoptik);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Pages are lines of `name|url`; the weather page is `field=value` lines.
    #[derive(Debug)]
    struct LineSite {
        location: Location,
        link: Option<String>,
    }

    #[async_trait]
    impl WeatherProvider for LineSite {
        fn id(&self) -> &str {
            "lines"
        }

        fn title(&self) -> &str {
            "Line Site"
        }

        fn location(&self) -> &Location {
            &self.location
        }

        fn browse_url(&self) -> &str {
            "unused"
        }

        fn parse_locations(&self, page: &str) -> Vec<Location> {
            page.lines()
                .filter_map(|line| line.split_once('|'))
                .map(|(name, url)| Location::new(name, url))
                .collect()
        }

        fn current_page_link(&self, _page: &str) -> Option<String> {
            self.link.clone()
        }

        fn extract_weather(&self, page: &str) -> WeatherSnapshot {
            page.lines().filter_map(|line| line.split_once('=')).collect()
        }
    }

    struct ScriptedPrompt {
        answers: VecDeque<&'static str>,
        shown: Vec<usize>,
        reported: usize,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&'static str]) -> Self {
            Self { answers: answers.iter().copied().collect(), shown: Vec::new(), reported: 0 }
        }
    }

    impl LocationPrompt for ScriptedPrompt {
        fn show(&mut self, candidates: &[Location]) {
            self.shown.push(candidates.len());
        }

        fn read_selection(&mut self) -> Result<String> {
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| WeatherError::Prompt("input closed".into()))
        }

        fn report(&mut self, _error: &WeatherError) {
            self.reported += 1;
        }
    }

    async fn page(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn fetcher(dir: &TempDir) -> Fetcher {
        Fetcher::new(CacheStore::new(dir.path().join("pages"), Duration::from_secs(900))).unwrap()
    }

    fn site(url: &str) -> LineSite {
        LineSite { location: Location::new("Home", url), link: None }
    }

    #[test]
    fn selection_is_one_based_and_trimmed() {
        assert_eq!(parse_selection(" 1\n", 3).unwrap(), 0);
        assert_eq!(parse_selection("3", 3).unwrap(), 2);
    }

    #[test]
    fn selection_rejects_out_of_range_and_garbage() {
        for input in ["0", "4", "-1", "two", ""] {
            let err = parse_selection(input, 3).unwrap_err();
            assert!(err.is_recoverable(), "{input:?} should be a user input error");
        }
    }

    #[test]
    fn builtin_registry_lists_three_providers_in_order() {
        let registry = ProviderRegistry::builtin();

        assert_eq!(registry.ids().collect::<Vec<_>>(), ["accu", "rp5", "sinoptik"]);
        assert!(registry.contains("sinoptik"));
        assert!(!registry.contains("foo"));
    }

    #[test]
    fn build_binds_saved_location_or_default() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("weatherapp.toml"));
        store.save("accu", &Location::new("Paris", "http://example/paris")).unwrap();
        let registry = ProviderRegistry::builtin();

        let accu = registry.get("accu").unwrap().build(&store);
        let rp5 = registry.get("rp5").unwrap().build(&store);

        assert_eq!(accu.location(), &Location::new("Paris", "http://example/paris"));
        assert_eq!(rp5.location().name, DEFAULT_LOCATION);
        assert_eq!(rp5.location().url, registry.get("rp5").unwrap().default_url());
    }

    #[tokio::test]
    async fn run_follows_current_page_link() {
        let server = MockServer::start().await;
        page(&server, "/home", "ignored".into()).await;
        page(&server, "/now", "Temperature=+3°\nCondition=Rain".into()).await;

        let dir = TempDir::new().unwrap();
        let provider = LineSite {
            location: Location::new("Home", format!("{}/home", server.uri())),
            link: Some(format!("{}/now", server.uri())),
        };

        let snapshot = provider.run(&fetcher(&dir), false).await.unwrap();

        assert_eq!(snapshot.get("Temperature"), Some("+3°"));
        assert_eq!(snapshot.get("Condition"), Some("Rain"));
    }

    #[tokio::test]
    async fn configure_recovers_from_bad_input_and_saves_leaf() {
        let server = MockServer::start().await;
        let base = server.uri();
        page(&server, "/world", format!("Europe|{base}/europe\nAsia|{base}/asia")).await;
        page(&server, "/asia", format!("Tokyo|{base}/tokyo")).await;
        page(&server, "/tokyo", String::new()).await;

        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("weatherapp.toml"));
        let mut prompt = ScriptedPrompt::new(&["abc", "9", "2", "1"]);

        let saved = site("unused")
            .configure(&format!("{base}/world"), &fetcher(&dir), &store, &mut prompt, false)
            .await
            .unwrap();

        assert_eq!(saved, Location::new("Tokyo", format!("{base}/tokyo")));
        assert_eq!(store.load("lines"), Some(saved));
        assert_eq!(prompt.reported, 2);
        assert_eq!(prompt.shown, [2, 2, 2, 1]);
    }

    #[tokio::test]
    async fn configure_with_empty_seed_is_a_config_error() {
        let server = MockServer::start().await;
        page(&server, "/world", String::new()).await;

        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("weatherapp.toml"));
        let mut prompt = ScriptedPrompt::new(&[]);

        let err = site("unused")
            .configure(&format!("{}/world", server.uri()), &fetcher(&dir), &store, &mut prompt, false)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Config(_)));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn configure_stops_on_self_referencing_page() {
        let server = MockServer::start().await;
        let base = server.uri();
        page(&server, "/loop", format!("Again|{base}/loop")).await;

        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("weatherapp.toml"));
        let mut prompt = ScriptedPrompt::new(&["1"; MAX_CONFIGURE_DEPTH + 1]);

        let err = site("unused")
            .configure(&format!("{base}/loop"), &fetcher(&dir), &store, &mut prompt, false)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Config(_)));
        assert_eq!(prompt.shown.len(), MAX_CONFIGURE_DEPTH);
        assert_eq!(store.load("lines"), None);
    }

    #[tokio::test]
    async fn closed_prompt_aborts_configuration() {
        let server = MockServer::start().await;
        let base = server.uri();
        page(&server, "/world", format!("Europe|{base}/europe")).await;

        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("weatherapp.toml"));
        let mut prompt = ScriptedPrompt::new(&[]);

        let err = site("unused")
            .configure(&format!("{base}/world"), &fetcher(&dir), &store, &mut prompt, false)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Prompt(_)));
    }
}
