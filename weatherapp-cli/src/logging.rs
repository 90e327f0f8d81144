//! Log setup for the binary: tracing to stderr, or to a file.

use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

const LOG_LEVEL_ENV: &str = "WEATHERAPP_LOG";
const LOG_FILE_ENV: &str = "WEATHERAPP_LOG_FILE";

/// Filter level for `-v` repetitions; `--debug` forces debug output.
pub fn level_for(verbosity: u8, debug: bool) -> &'static str {
    match (verbosity, debug) {
        (_, true) | (2.., _) => "debug",
        (1, false) => "info",
        (0, false) => "warn",
    }
}

fn log_file_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    })
}

pub fn init(verbosity: u8, debug: bool) -> anyhow::Result<()> {
    let level = level_for(verbosity, debug);
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("weatherapp_core={level},weatherapp={level}")));

    let file = match log_file_from_env() {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?,
        ),
        None => None,
    };
    let (writer, ansi) = match file {
        Some(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(debug)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("failed to install log subscriber")
}
