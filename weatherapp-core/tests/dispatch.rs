use std::io::Write;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use weatherapp_core::{
    App, CacheSettings, ConfigStore, Location, LocationPrompt, Options, OutputFormat, Paths,
    Result, WeatherError,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SINOPTIK_PAGE: &str = r#"
<html><body>
  <div class="main loaded">
    <div class="min">мін. <span>+1°</span></div>
    <div class="max">макс. <span>+8°</span></div>
  </div>
  <div class="imgBlock">
    <div class="img"><img src="x.png" alt="Хмарно"></div>
    <p class="today-temp">+5°C</p>
  </div>
</body></html>"#;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct NoPrompt;

impl LocationPrompt for NoPrompt {
    fn show(&mut self, _candidates: &[Location]) {}

    fn read_selection(&mut self) -> Result<String> {
        Err(WeatherError::Prompt("no terminal".into()))
    }

    fn report(&mut self, _error: &WeatherError) {}
}

struct Setup {
    dir: TempDir,
    out: SharedBuffer,
    app: App,
}

/// Point every built-in provider at the mock server.
fn setup(server: &MockServer, options: Options) -> Setup {
    let dir = TempDir::new().unwrap();
    let paths = Paths::under(dir.path());

    let store = ConfigStore::new(&paths.config_file);
    store.save("sinoptik", &Location::new("Київ", format!("{}/sinoptik/kyiv", server.uri()))).unwrap();
    store.save("accu", &Location::new("Kyiv", format!("{}/accu/kyiv", server.uri()))).unwrap();
    store.save("rp5", &Location::new("Kyiv", format!("{}/rp5/kyiv", server.uri()))).unwrap();

    let out = SharedBuffer::default();
    let app = App::new(
        &paths,
        CacheSettings::default(),
        options,
        Box::new(out.clone()),
        Box::new(NoPrompt),
    )
    .unwrap();

    Setup { dir, out, app }
}

#[tokio::test]
async fn single_provider_prints_table_and_reuses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sinoptik/kyiv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SINOPTIK_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut setup = setup(&server, Options::default());
    setup.app.run(Some("sinoptik"), &[]).await.unwrap();
    setup.app.run(Some("sinoptik"), &[]).await.unwrap();

    let output = setup.out.contents();
    assert_eq!(output.matches("| SINOPTIK").count(), 2);
    assert!(output.contains("| Київ"));
    assert!(output.contains("| Temperature | +5°C"));
    assert!(output.contains("| Expect      | мін. +1°... макс. +8°"));
}

#[tokio::test]
async fn refresh_downloads_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sinoptik/kyiv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SINOPTIK_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let options = Options { refresh: true, ..Options::default() };
    let mut setup = setup(&server, options);
    setup.app.run(Some("sinoptik"), &[]).await.unwrap();
    setup.app.run(Some("sinoptik"), &[]).await.unwrap();
}

#[tokio::test]
async fn batch_reports_failures_after_running_everyone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sinoptik/kyiv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SINOPTIK_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = Options { format: OutputFormat::Json, ..Options::default() };
    let mut setup = setup(&server, options);
    let err = setup.app.run(None, &[]).await.unwrap_err();

    assert!(matches!(err, WeatherError::Batch { failed: 2, total: 3 }));
    let output = setup.out.contents();
    assert_eq!(output.lines().count(), 1);
    assert!(output.contains(r#""provider":"SINOPTIK""#));
}

#[tokio::test]
async fn export_command_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sinoptik/kyiv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SINOPTIK_PAGE))
        .mount(&server)
        .await;

    let mut setup = setup(&server, Options::default());
    let target = setup.dir.path().join("today.csv");
    let args = vec!["sinoptik".to_string(), target.display().to_string()];
    setup.app.run(Some("save-to-csv"), &args).await.unwrap();

    let csv = std::fs::read_to_string(&target).unwrap();
    assert_eq!(
        csv,
        "Parameter,Description\nTemperature,+5°C\nCondition,Хмарно\nExpect,мін. +1°... макс. +8°\n"
    );
}

#[tokio::test]
async fn unknown_token_is_an_error() {
    let server = MockServer::start().await;
    let mut setup = setup(&server, Options::default());

    let err = setup.app.run(Some("weather-please"), &[]).await.unwrap_err();
    assert!(matches!(err, WeatherError::UnknownCommand(token) if token == "weather-please"));
}
