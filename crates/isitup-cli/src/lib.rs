//! IsItUp command-line front end
//!
//! Invoked once per scheduler tick (typically cron, every minute). Every
//! invocation opens the database, creates the tables and default settings if
//! needed, then does exactly one of:
//! - `--check`: probe the records that are due and persist the outcome
//! - `--list`: print every record with its UP/DOWN status
//! - `--add-check`: insert a record
//! - `--remove-check`: delete a record
//!
//! Configuration (database path, probe timeouts, logging) comes from an
//! optional YAML file; the scheduling intervals live in the database.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Mode, UsageError};
pub use commands::Outcome;
pub use config::{Config, ConfigError, LoggingSettings};

use anyhow::Context;
use isitup::{CheckStore, NetProber, SqliteStore};
use tracing::info;

/// Pick the default log level. RUST_LOG still overrides it.
pub fn log_level(verbose: bool, logging: &LoggingSettings) -> &str {
    match (verbose, logging.level.as_deref()) {
        (true, Some(level @ ("debug" | "trace"))) => level,
        (true, _) => "info",
        (false, Some(level)) => level,
        (false, None) => "error",
    }
}

/// Open the store, bootstrap it, and dispatch `mode`.
pub async fn run(mode: Mode, config: &Config) -> anyhow::Result<Outcome> {
    let store = SqliteStore::open(&config.storage.database, config.storage.busy_timeout)
        .with_context(|| format!("Failed to open {}", config.storage.database.display()))?;
    store.initialize().context("Failed to initialize database")?;
    let settings = store.load_settings().context("Failed to load settings")?;

    // One clock value for the whole invocation
    let now = chrono::Utc::now().timestamp();

    match mode {
        Mode::Check => {
            let prober = NetProber::new(config.probe.connect_timeout, config.probe.fetch_timeout)?;
            let summary = commands::check(&store, &prober, &settings, now).await?;
            info!(probed = summary.probed, skipped = summary.skipped, "Done");
            Ok(Outcome::Success)
        }
        Mode::List => commands::list(&store, &settings, now, &mut std::io::stdout().lock()),
        Mode::Add {
            host,
            port,
            resource,
        } => commands::add(&store, &host, port, &resource, &mut std::io::stdout().lock()),
        Mode::Remove { id } => commands::remove(&store, id, &mut std::io::stdout().lock()),
    }
}
