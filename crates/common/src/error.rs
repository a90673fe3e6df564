//! Common error types for IsItUp components.

use std::fmt;

/// A specialized Result type for IsItUp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for IsItUp operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No check with ID {0}")]
    NotFound(i64),

    #[error("Probe error: {0}")]
    Probe(String),
}

impl Error {
    /// Create a new storage error.
    pub fn storage(msg: impl fmt::Display) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new probe error.
    pub fn probe(msg: impl fmt::Display) -> Self {
        Error::Probe(msg.to_string())
    }

    /// True when the error reports a missing check record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
