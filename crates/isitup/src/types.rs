//! Check record, settings and probe result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default seconds between re-confirmations of an UP endpoint.
pub const DEFAULT_CHECK_INTERVAL: i64 = 300;
/// Default seconds between attempts while an endpoint is DOWN.
pub const DEFAULT_RECHECK_INTERVAL: i64 = 60;
/// Default scheduler drift tolerance in seconds.
pub const DEFAULT_OFFSET: i64 = 10;

/// Scheduling intervals, persisted once per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between routine checks
    pub check_interval: i64,

    /// Seconds between rechecks while down
    pub recheck_interval: i64,

    /// Tolerance subtracted from due thresholds and added to the UP window
    pub offset: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// A monitored endpoint and its two most recent timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub id: i64,
    pub host: String,
    pub port: u16,
    /// URL fetched after a successful connect
    pub resource: String,
    /// Seconds since epoch of the last successful probe, 0 if never
    pub last_up: i64,
    /// Seconds since epoch of the last probe attempt, 0 if never
    pub last_check: i64,
}

impl fmt::Display for EndpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{}, ({})",
            self.id, self.host, self.port, self.resource
        )
    }
}

/// Derived endpoint status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Up,
    Down,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => write!(f, "UP"),
            Status::Down => write!(f, "DOWN"),
        }
    }
}

/// Probe status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Connection opened (or fetch succeeded)
    Reachable,
    /// Connection refused or no address accepted it
    Unreachable,
    /// Probe did not finish within its bound
    Timeout,
    /// Resolution or client failure
    Error,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Reachable => write!(f, "REACHABLE"),
            ProbeStatus::Unreachable => write!(f, "UNREACHABLE"),
            ProbeStatus::Timeout => write!(f, "TIMEOUT"),
            ProbeStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Probe result
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Status of the probe
    pub status: ProbeStatus,

    /// Duration of the probe
    pub duration: Duration,

    /// Optional error message
    pub message: Option<String>,

    /// Response code (for HTTP fetches)
    pub response_code: Option<u16>,
}

impl ProbeResult {
    /// Create a reachable result
    pub fn reachable(duration: Duration) -> Self {
        Self {
            status: ProbeStatus::Reachable,
            duration,
            message: None,
            response_code: None,
        }
    }

    /// Create an unreachable result
    pub fn unreachable(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Unreachable,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Create a timeout result
    pub fn timeout(duration: Duration) -> Self {
        Self {
            status: ProbeStatus::Timeout,
            duration,
            message: Some("Probe timed out".to_string()),
            response_code: None,
        }
    }

    /// Create an error result
    pub fn error(duration: Duration, message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            duration,
            message: Some(message.into()),
            response_code: None,
        }
    }

    /// Attach an HTTP response code
    pub fn with_response_code(mut self, code: u16) -> Self {
        self.response_code = Some(code);
        self
    }

    /// Check if the probe succeeded
    pub fn is_success(&self) -> bool {
        self.status == ProbeStatus::Reachable
    }
}

/// Counters for one invocation of the driver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records loaded from the store
    pub total: u64,

    /// Records that were due and probed
    pub probed: u64,

    /// Records that were not due
    pub skipped: u64,

    /// Probes that connected
    pub succeeded: u64,

    /// Probes that failed to connect
    pub failed: u64,

    /// Probe outcomes that could not be persisted
    pub store_errors: u64,
}

impl RunSummary {
    /// Count a skipped record
    pub fn record_skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    /// Count a probed record and its outcome
    pub fn record_probe(&mut self, result: &ProbeResult) {
        self.total += 1;
        self.probed += 1;
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}
