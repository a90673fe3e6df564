//! Logging utilities for IsItUp components.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Build the filter: RUST_LOG wins, otherwise `default_level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing with a human readable formatter.
///
/// Uses the RUST_LOG environment variable to control log levels and falls
/// back to `default_level` when it is unset. Output goes to stderr so that
/// command output on stdout stays clean.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter(default_level))
        .init();
}

/// Initialize tracing with JSON formatting (useful for structured logging).
pub fn init_json(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(filter(default_level))
        .init();
}
