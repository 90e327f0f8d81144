use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    app::App,
    error::{Result, WeatherError},
    format::{DEFAULT_EXPORT_FILE, export_csv},
};

use super::Command;

/// `save-to-csv <provider> [path]`: run a provider and export its fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveToCsv;

#[async_trait]
impl Command for SaveToCsv {
    fn name(&self) -> &str {
        "save-to-csv"
    }

    fn about(&self) -> &str {
        "Export a provider's current weather to a CSV file"
    }

    async fn run(&self, app: &mut App, args: &[String]) -> Result<()> {
        let (provider_id, path) = match args {
            [provider] => (provider, PathBuf::from(DEFAULT_EXPORT_FILE)),
            [provider, path] => (provider, PathBuf::from(path)),
            _ => return Err(WeatherError::usage("save-to-csv <provider> [path]")),
        };

        let (_, snapshot) = app.weather_for(provider_id).await?;
        export_csv(&path, &snapshot)?;
        app.write_line(&format!("Saved {} fields to {}", snapshot.len(), path.display()))
    }
}
