//! Rendering of weather snapshots for the terminal and for export.

use std::{fmt, path::Path, str::FromStr};

use comfy_table::Table;
use serde::Serialize;

use crate::{
    error::{Result, WeatherError},
    model::WeatherSnapshot,
};

pub const DEFAULT_EXPORT_FILE: &str = "weather_data.csv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }

    pub const fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Table, OutputFormat::Json]
    }

    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(WeatherError::usage(format!(
                "Unknown output format '{value}'. Supported formats: table, json."
            ))),
        }
    }
}

/// Turns one provider's result into printable text (without trailing newline).
pub trait Formatter: Send + Sync {
    fn emit(&self, title: &str, location: &str, snapshot: &WeatherSnapshot) -> Result<String>;
}

/// ASCII borders with a dashed rule under the header and none between rows.
const TABLE_STYLE: &str = "||--+-++|    ++++++";

/// Bordered two-column table headed by the provider title and location.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn emit(&self, title: &str, location: &str, snapshot: &WeatherSnapshot) -> Result<String> {
        let mut table = Table::new();
        table.load_preset(TABLE_STYLE).set_header([title, location]);
        for (field, value) in snapshot.iter() {
            table.add_row([field, value]);
        }
        Ok(table.to_string())
    }
}

/// One JSON object per provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct Report<'a> {
    provider: &'a str,
    location: &'a str,
    weather: &'a WeatherSnapshot,
}

impl Formatter for JsonFormatter {
    fn emit(&self, title: &str, location: &str, snapshot: &WeatherSnapshot) -> Result<String> {
        let report = Report { provider: title, location, weather: snapshot };
        Ok(serde_json::to_string(&report)?)
    }
}

/// Write `snapshot` as a `Parameter,Description` CSV file.
pub fn export_csv(path: &Path, snapshot: &WeatherSnapshot) -> Result<()> {
    let export_err = |source: csv::Error| WeatherError::Export { path: path.to_path_buf(), source };

    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
    writer.write_record(["Parameter", "Description"]).map_err(export_err)?;
    for (field, value) in snapshot.iter() {
        writer.write_record([field, value]).map_err(export_err)?;
    }
    writer.flush().map_err(|e| WeatherError::io(path, e))?;

    tracing::info!(path = %path.display(), rows = snapshot.len(), "exported weather");
    Ok(())
}
