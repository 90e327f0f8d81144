use async_trait::async_trait;

use crate::{
    app::App,
    error::{Result, WeatherError},
};

use super::Command;

/// `config <provider>`: pick a location interactively and save it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Configure;

#[async_trait]
impl Command for Configure {
    fn name(&self) -> &str {
        "config"
    }

    fn about(&self) -> &str {
        "Choose the location a provider reports on"
    }

    async fn run(&self, app: &mut App, args: &[String]) -> Result<()> {
        let provider_id = args
            .first()
            .ok_or_else(|| WeatherError::usage("config <provider>"))?;

        let (title, location) = app.configure_provider(provider_id).await?;
        app.write_line(&format!("{title} location set to {} ({})", location.name, location.url))
    }
}
