use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;

use crate::error::{Result, WeatherError};

/// How long a cached page counts as fresh.
pub const DEFAULT_CACHE_VALIDITY: Duration = Duration::from_secs(900);

/// How long a cached page survives before the sweep deletes it.
pub const DEFAULT_CACHE_RETENTION: Duration = Duration::from_secs(86_400);

pub const CONFIG_FILE_NAME: &str = "weatherapp.toml";

/// Filesystem locations used by one process.
///
/// Resolved once at startup and handed to the stores, so tests can point
/// everything at a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub cache_dir: PathBuf,
    pub config_file: PathBuf,
}

impl Paths {
    pub fn new(cache_dir: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into(), config_file: config_file.into() }
    }

    /// Platform defaults, e.g. `~/.cache/weatherapp/pages` and
    /// `~/.config/weatherapp/weatherapp.toml` on Linux.
    pub fn discover() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weatherapp", "weatherapp").ok_or_else(|| {
            WeatherError::config("Could not determine platform cache/config directories")
        })?;

        Ok(Self {
            cache_dir: dirs.cache_dir().join("pages"),
            config_file: dirs.config_dir().join(CONFIG_FILE_NAME),
        })
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = config_file.into();
        self
    }

    /// Temporary paths under `root`; handy for tests and sandboxes.
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("cache"), root.join(CONFIG_FILE_NAME))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub validity: Duration,
    pub retention: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { validity: DEFAULT_CACHE_VALIDITY, retention: DEFAULT_CACHE_RETENTION }
    }
}
