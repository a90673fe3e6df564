//! Periodic TCP availability polling.
//!
//! Each invocation loads the persisted check records, decides which are due
//! for a probe, connects to those, and records the outcome. The crate is
//! built to be run from a scheduler (e.g. cron, once per minute):
//! - `schedule`: pure due-check and UP/DOWN policy
//! - `checkers`: TCP connect probe and best-effort HTTP fetch
//! - `store`: SQLite record store
//! - `driver`: one pass over all records
//!
//! # Example
//!
//! ```no_run
//! use isitup::{CheckStore, NetProber, SqliteStore, run_checks};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("isitup.db", Duration::from_secs(5))?;
//! store.initialize()?;
//! let settings = store.load_settings()?;
//!
//! let prober = NetProber::new(Duration::from_secs(3), Duration::from_secs(5))?;
//! let summary = run_checks(&store, &prober, &settings, 1_700_000_000).await?;
//! println!("probed {} of {}", summary.probed, summary.total);
//! # Ok(())
//! # }
//! ```

pub mod checkers;
pub mod driver;
pub mod schedule;
pub mod store;
pub mod types;

pub use checkers::{NetProber, Prober};
pub use driver::run_checks;
pub use schedule::DueReason;
pub use store::{CheckStore, SqliteStore};
pub use types::{EndpointRecord, ProbeResult, ProbeStatus, RunSummary, Settings, Status};
