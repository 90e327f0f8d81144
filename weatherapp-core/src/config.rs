use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    cache::write_atomic,
    error::{Result, WeatherError},
    model::Location,
};

/// One provider's saved location.
///
/// Example TOML:
/// [accu]
/// name = "Paris"
/// url = "https://www.accuweather.com/en/fr/paris/623/weather-forecast/623"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    pub name: String,
    pub url: String,
}

impl From<LocationConfig> for Location {
    fn from(cfg: LocationConfig) -> Self {
        Location::new(cfg.name, cfg.url)
    }
}

/// File-backed store of per-provider location overrides.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved location for `provider_id`.
    ///
    /// A missing file, a file that does not parse, or a section without
    /// both keys all mean "no override"; the latter two are logged.
    pub fn load(&self, provider_id: &str) -> Option<Location> {
        let table = match self.read_table() {
            Ok(table) => table?,
            Err(err) => {
                tracing::warn!(
                    provider = provider_id,
                    error = %err,
                    "Bad configuration file, using the default location"
                );
                return None;
            }
        };

        let section = table.get(provider_id)?.clone();
        match section.try_into::<LocationConfig>() {
            Ok(cfg) => Some(cfg.into()),
            Err(err) => {
                tracing::warn!(
                    provider = provider_id,
                    path = %self.path.display(),
                    error = %err,
                    "Invalid location section, using the default location"
                );
                None
            }
        }
    }

    /// Saved location or the compiled-in default. Evaluated fresh on every call.
    pub fn resolve(&self, provider_id: &str, default_name: &str, default_url: &str) -> Location {
        self.load(provider_id).unwrap_or_else(|| Location::new(default_name, default_url))
    }

    /// Write `location` as `provider_id`'s section, keeping every other section.
    pub fn save(&self, provider_id: &str, location: &Location) -> Result<()> {
        let mut table = match self.read_table() {
            Ok(table) => table.unwrap_or_default(),
            Err(err @ WeatherError::Config(_)) => {
                let backup = self.backup_path();
                tracing::warn!(
                    error = %err,
                    backup = %backup.display(),
                    "Configuration file is corrupt, moving it aside"
                );
                fs::rename(&self.path, &backup).map_err(|e| WeatherError::io(&self.path, e))?;
                toml::Table::new()
            }
            Err(err) => return Err(err),
        };

        let section = LocationConfig { name: location.name.clone(), url: location.url.clone() };
        let value = toml::Value::try_from(section)
            .map_err(|e| WeatherError::config(format!("Failed to serialize location: {e}")))?;
        table.insert(provider_id.to_string(), value);

        let contents = toml::to_string_pretty(&table)
            .map_err(|e| WeatherError::config(format!("Failed to serialize configuration: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WeatherError::io(parent, e))?;
        }
        write_atomic(&self.path, contents.as_bytes())
            .map_err(|e| WeatherError::io(&self.path, e))?;

        tracing::info!(
            provider = provider_id,
            name = %location.name,
            path = %self.path.display(),
            "Saved location"
        );
        Ok(())
    }

    /// `Ok(None)` when the file does not exist yet.
    fn read_table(&self) -> Result<Option<toml::Table>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(WeatherError::io(&self.path, err)),
        };

        let table = contents.parse::<toml::Table>().map_err(|e| {
            WeatherError::config(format!("Failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(table))
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        self.path.with_file_name(name)
    }
}
