//! Invocation driver: decide, probe, persist.

use crate::checkers::Prober;
use crate::schedule;
use crate::store::CheckStore;
use crate::types::{EndpointRecord, ProbeStatus, RunSummary, Settings};
use common::Result;
use tracing::{error, info, warn};

/// Run one pass over every stored record.
///
/// Records are evaluated against the single `now` captured by the caller.
/// A failure while handling one record is logged and counted; the remaining
/// records are still processed. Only a failure to list the records aborts.
pub async fn run_checks<S, P>(store: &S, prober: &P, settings: &Settings, now: i64) -> Result<RunSummary>
where
    S: CheckStore + ?Sized,
    P: Prober + ?Sized,
{
    let records = store.list_all()?;
    let mut summary = RunSummary::default();

    for record in &records {
        match schedule::due_reason(settings, now, record) {
            Some(reason) => {
                info!(id = record.id, %reason, "Probing [{}] {}:{}", record.id, record.host, record.port);
                check_record(store, prober, record, now, &mut summary).await;
            }
            None => {
                summary.record_skip();
                info!(
                    "- Skipping [{}] {}:{}, due in {} seconds ({})",
                    record.id,
                    record.host,
                    record.port,
                    schedule::countdown_due(settings, now, record),
                    schedule::status(settings, now, record)
                );
            }
        }
    }

    info!(
        total = summary.total,
        probed = summary.probed,
        skipped = summary.skipped,
        succeeded = summary.succeeded,
        failed = summary.failed,
        store_errors = summary.store_errors,
        "Check run complete"
    );
    Ok(summary)
}

/// Probe one due record and persist the attempt.
async fn check_record<S, P>(store: &S, prober: &P, record: &EndpointRecord, now: i64, summary: &mut RunSummary)
where
    S: CheckStore + ?Sized,
    P: Prober + ?Sized,
{
    info!("Service:   {}:{}", record.host, record.port);
    info!("Address:   {}", record.resource);

    let result = prober.connect(&record.host, record.port).await;
    let succeeded = result.is_success();
    summary.record_probe(&result);
    info!(
        id = record.id,
        status = %result.status,
        duration_ms = result.duration.as_millis(),
        "Probe finished"
    );

    if succeeded {
        info!("Status:    UP");
        info!("LASTUP:    {}", now);
    } else {
        info!("Status:    DOWN");
        info!("LASTUP:    {}", record.last_up);
    }

    if let Err(e) = store.record_attempt(record.id, now, succeeded) {
        summary.store_errors += 1;
        error!(id = record.id, error = %e, "Failed to record probe attempt");
    }

    if succeeded {
        let fetch = prober.fetch(&record.resource).await;
        if fetch.status != ProbeStatus::Reachable {
            warn!(
                id = record.id,
                url = %record.resource,
                status = %fetch.status,
                message = fetch.message.as_deref().unwrap_or("unknown"),
                "WARNING:   failed to retrieve page from URL"
            );
        }
    }

    info!("LASTCHECK: {}", now);
}
