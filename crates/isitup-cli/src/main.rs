//! IsItUp binary

use clap::Parser;
use isitup_cli::{Cli, Config, Outcome, log_level, run};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // Can't use tracing yet - not initialized
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = log_level(cli.verbose, &config.logging);
    if config.logging.is_json() {
        common::logging::init_json(level);
    } else {
        common::logging::init(level);
    }

    match run(mode, &config).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failure) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
