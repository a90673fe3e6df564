//! Common utilities and types shared across IsItUp components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
