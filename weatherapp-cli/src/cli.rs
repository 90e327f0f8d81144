use std::{io, path::PathBuf, process::ExitCode, time::Duration};

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use weatherapp_core::{
    App, CacheSettings, CommandRegistry, Options, OutputFormat, Paths, Result,
};

use crate::prompt::InquirePrompt;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherapp", version, about = "Current weather from several weather sites")]
pub struct Cli {
    /// Provider id (accu, rp5, sinoptik) or command (config, providers,
    /// clear-cache, save-to-csv). Runs every provider when absent.
    pub command: Option<String>,

    /// Arguments passed on to the command.
    pub args: Vec<String>,

    /// Ignore cached pages and download again.
    #[arg(long)]
    pub refresh: bool,

    /// Report errors with their full cause chain.
    #[arg(long)]
    pub debug: bool,

    /// Output format: table or json.
    #[arg(short, long, default_value_t = OutputFormat::Table)]
    pub formatter: OutputFormat,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding cached pages.
    #[arg(long, env = "WEATHERAPP_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Location file.
    #[arg(long, env = "WEATHERAPP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds a cached page stays fresh.
    #[arg(long, env = "WEATHERAPP_CACHE_TTL")]
    pub cache_ttl: Option<u64>,
}

impl Cli {
    /// Parse `std::env::args`, with the registered commands listed in `--help`.
    pub fn parse_args() -> Self {
        let matches = Self::command().after_help(commands_help()).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }

    pub fn options(&self) -> Options {
        Options { refresh: self.refresh, debug: self.debug, format: self.formatter }
    }

    /// Platform directories are only looked up for paths not given explicitly.
    fn paths(&self) -> Result<Paths> {
        if let (Some(dir), Some(file)) = (&self.cache_dir, &self.config) {
            return Ok(Paths::new(dir, file));
        }

        let mut paths = Paths::discover()?;
        if let Some(dir) = &self.cache_dir {
            paths = paths.with_cache_dir(dir);
        }
        if let Some(file) = &self.config {
            paths = paths.with_config_file(file);
        }
        Ok(paths)
    }

    fn cache_settings(&self) -> CacheSettings {
        let mut settings = CacheSettings::default();
        if let Some(secs) = self.cache_ttl {
            settings.validity = Duration::from_secs(secs);
        }
        settings
    }

    pub async fn run(self) -> Result<()> {
        let paths = self.paths()?;
        tracing::debug!(
            cache_dir = %paths.cache_dir.display(),
            config = %paths.config_file.display(),
            "resolved paths"
        );

        let mut app = App::new(
            &paths,
            self.cache_settings(),
            self.options(),
            Box::new(io::stdout()),
            Box::new(InquirePrompt),
        )?;
        app.run(self.command.as_deref(), &self.args).await
    }
}

/// Log a failed run and turn the outcome into the process exit status.
pub fn finish(outcome: Result<()>, debug_mode: bool) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let report = err.report(debug_mode);
            tracing::error!("{report}");
            ExitCode::FAILURE
        }
    }
}

fn commands_help() -> String {
    let mut help = String::from("Commands:\n");
    for (name, constructor) in CommandRegistry::builtin().list() {
        help.push_str(&format!("  {name:<12} {}\n", constructor().about()));
    }
    help
}
