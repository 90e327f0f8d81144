//! Core library for the `weatherapp` CLI.
//!
//! This crate defines:
//! - The page cache and the per-provider location store
//! - Abstraction over weather sites (providers) and their registry
//! - Commands and the dispatcher that picks between commands and providers
//! - Shared domain models (locations, weather snapshots) and output formats
//!
//! It is used by `weatherapp-cli`, but can also be reused by other binaries or services.

pub mod app;
pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod model;
pub mod paths;
pub mod provider;
pub mod registry;

pub use app::{App, Options};
pub use cache::CacheStore;
pub use command::{Command, CommandRegistry};
pub use config::{ConfigStore, LocationConfig};
pub use error::{Result, WeatherError};
pub use fetch::Fetcher;
pub use format::OutputFormat;
pub use model::{Location, WeatherSnapshot};
pub use paths::{CacheSettings, Paths};
pub use provider::{LocationPrompt, ProviderFactory, ProviderRegistry, WeatherProvider};
pub use registry::Registry;
