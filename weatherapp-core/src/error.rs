//! Error types shared by every part of the aggregator.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Malformed location file, missing location data or a runaway
    /// configuration walk.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cache I/O error at {}: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache directory {} does not exist", path.display())]
    CacheMissing { path: PathBuf },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Bad selection typed during interactive configuration.
    #[error("invalid selection: {0}")]
    UserInput(String),

    /// The prompt itself could not be used (closed stdin, interrupted).
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("failed to export to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} providers failed")]
    Batch { failed: usize, total: usize },
}

impl WeatherError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn user_input(msg: impl Into<String>) -> Self {
        Self::UserInput(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheIo { path: path.into(), source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Errors a user can fix by retyping, as opposed to failures of the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UserInput(_))
    }

    /// Render the error for the log: one line normally, the full
    /// `source()` chain in debug mode.
    pub fn report(&self, debug: bool) -> String {
        if !debug {
            return self.to_string();
        }

        let mut out = format!("{self:?}");
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        out
    }
}
