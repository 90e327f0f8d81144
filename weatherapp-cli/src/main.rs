//! Binary crate for the `weatherapp` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Interactive location selection

use std::process::ExitCode;

mod cli;
mod logging;
mod prompt;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse_args();
    if let Err(err) = logging::init(cmd.verbose, cmd.debug) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    let debug_mode = cmd.debug;
    cli::finish(cmd.run().await, debug_mode)
}
