//! Due-check scheduling policy.
//!
//! Nothing here is stored: an endpoint's status and whether it needs a probe
//! are derived on every invocation from `(now, last_up, last_check)` and the
//! persisted [`Settings`]. Callers capture `now` once per invocation so every
//! record in a run is judged against the same clock value.
//!
//! Both due conditions subtract `offset` so they fire slightly early, and the
//! UP window adds it so a late scheduler does not flap an endpoint to DOWN.
//!
//! A recheck (fast cadence) only applies once the last success is older than
//! a full check interval. An endpoint that failed shortly after succeeding
//! keeps the routine cadence until that happens.

use crate::types::{EndpointRecord, Settings, Status};
use std::fmt;

/// Why a record is due this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueReason {
    /// Routine re-confirmation at the check interval
    Check,
    /// Fast retry at the recheck interval while down
    Recheck,
}

impl fmt::Display for DueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueReason::Check => write!(f, "check"),
            DueReason::Recheck => write!(f, "recheck"),
        }
    }
}

/// Seconds elapsed since `then`.
fn since(now: i64, then: i64) -> i64 {
    now.saturating_sub(then)
}

/// UP while the last success is younger than `check_interval + offset`.
pub fn is_up(settings: &Settings, now: i64, record: &EndpointRecord) -> bool {
    since(now, record.last_up) < settings.check_interval.saturating_add(settings.offset)
}

pub fn is_down(settings: &Settings, now: i64, record: &EndpointRecord) -> bool {
    !is_up(settings, now, record)
}

pub fn status(settings: &Settings, now: i64, record: &EndpointRecord) -> Status {
    if is_up(settings, now, record) {
        Status::Up
    } else {
        Status::Down
    }
}

/// Routine cadence: more than `check_interval - offset` since the last attempt.
pub fn check_due(settings: &Settings, now: i64, record: &EndpointRecord) -> bool {
    since(now, record.last_check) > settings.check_interval.saturating_sub(settings.offset)
}

/// Fast cadence: recheck interval elapsed and the last success fell out of the
/// check window.
pub fn recheck_due(settings: &Settings, now: i64, record: &EndpointRecord) -> bool {
    let cadence_elapsed =
        since(now, record.last_check) > settings.recheck_interval.saturating_sub(settings.offset);
    let outside_window = record.last_up.saturating_add(settings.check_interval)
        < now.saturating_sub(settings.offset);
    cadence_elapsed && outside_window
}

/// Reason the record must be probed now, if any. `Check` wins when both apply.
pub fn due_reason(settings: &Settings, now: i64, record: &EndpointRecord) -> Option<DueReason> {
    if check_due(settings, now, record) {
        Some(DueReason::Check)
    } else if recheck_due(settings, now, record) {
        Some(DueReason::Recheck)
    } else {
        None
    }
}

pub fn is_due(settings: &Settings, now: i64, record: &EndpointRecord) -> bool {
    due_reason(settings, now, record).is_some()
}

/// Seconds until the next due time. Informational only.
pub fn countdown_due(settings: &Settings, now: i64, record: &EndpointRecord) -> i64 {
    let interval = if is_down(settings, now, record) {
        settings.recheck_interval
    } else {
        settings.check_interval
    };
    interval.saturating_sub(since(now, record.last_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last_up: i64, last_check: i64) -> EndpointRecord {
        EndpointRecord {
            id: 1,
            host: "example.com".to_string(),
            port: 80,
            resource: "http://example.com/".to_string(),
            last_up,
            last_check,
        }
    }

    #[test]
    fn test_up_window_boundary_is_strict() {
        let settings = Settings::default();
        let rec = record(1000, 1000);

        // 309 seconds after success is still inside 300 + 10
        assert!(is_up(&settings, 1309, &rec));
        // exactly at the threshold is DOWN
        assert!(!is_up(&settings, 1310, &rec));
        assert_eq!(status(&settings, 1310, &rec), Status::Down);
    }

    #[test]
    fn test_is_down_negates_is_up() {
        let settings = Settings::default();
        for last_up in [0, 500, 990, 1000] {
            for now in [0, 1000, 1300, 1310, 5000] {
                let rec = record(last_up, 0);
                assert_eq!(is_down(&settings, now, &rec), !is_up(&settings, now, &rec));
            }
        }
    }

    #[test]
    fn test_never_checked_record_is_due() {
        let settings = Settings::default();
        let rec = record(0, 0);

        assert!(!check_due(&settings, 290, &rec));
        assert!(check_due(&settings, 291, &rec));
        assert!(check_due(&settings, 1_700_000_000, &rec));
    }

    #[test]
    fn test_recheck_silent_inside_up_window() {
        let settings = Settings::default();
        for last_up in (0..2000).step_by(37) {
            for now in (last_up..last_up + 600).step_by(7) {
                let rec = record(last_up, last_up);
                if last_up + settings.check_interval >= now - settings.offset {
                    assert!(
                        !recheck_due(&settings, now, &rec),
                        "recheck fired for last_up={last_up} now={now}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_freshly_failed_endpoint_keeps_routine_cadence() {
        let settings = Settings::default();
        // Succeeded at 1000, failed at 1100
        let rec = record(1000, 1100);

        // Recheck cadence elapsed but still inside the check window
        assert!(!recheck_due(&settings, 1200, &rec));
        // Last success now older than check_interval + offset
        assert!(recheck_due(&settings, 1311, &rec));
    }

    #[test]
    fn test_scenario_never_probed() {
        let settings = Settings::default();
        let rec = record(0, 0);

        assert!(!is_up(&settings, 1000, &rec));
        assert!(check_due(&settings, 1000, &rec));
        assert_eq!(due_reason(&settings, 1000, &rec), Some(DueReason::Check));
    }

    #[test]
    fn test_scenario_recently_up() {
        let settings = Settings::default();
        let rec = record(1000, 1000);

        assert!(is_up(&settings, 1050, &rec));
        assert!(!check_due(&settings, 1050, &rec));
        assert!(!recheck_due(&settings, 1050, &rec));
        assert!(!is_due(&settings, 1050, &rec));
        assert_eq!(countdown_due(&settings, 1050, &rec), 250);
    }

    #[test]
    fn test_scenario_down_for_a_while() {
        let settings = Settings::default();
        let rec = record(0, 1000);

        assert!(!is_up(&settings, 1400, &rec));
        assert!(recheck_due(&settings, 1400, &rec));
        assert!(is_due(&settings, 1400, &rec));
    }

    #[test]
    fn test_recheck_reason_between_routine_checks() {
        let settings = Settings::default();
        let rec = record(0, 1300);

        assert!(!check_due(&settings, 1400, &rec));
        assert_eq!(due_reason(&settings, 1400, &rec), Some(DueReason::Recheck));
        // Recheck cadence not yet elapsed
        assert_eq!(due_reason(&settings, 1340, &rec), None);
    }

    #[test]
    fn test_countdown_uses_recheck_interval_when_down() {
        let settings = Settings::default();
        let rec = record(0, 1000);

        assert_eq!(countdown_due(&settings, 1020, &rec), 40);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let settings = Settings::default();
        let rec = record(700, 1000);

        let first = (due_reason(&settings, 1100, &rec), status(&settings, 1100, &rec));
        let second = (due_reason(&settings, 1100, &rec), status(&settings, 1100, &rec));
        assert_eq!(first, second);
    }

    #[test]
    fn test_extreme_inputs_do_not_panic() {
        let settings = Settings::default();
        let rec = record(i64::MIN, i64::MAX);

        let _ = due_reason(&settings, i64::MAX, &rec);
        let _ = countdown_due(&settings, i64::MIN, &rec);
        let _ = status(&settings, 0, &rec);
    }
}
