//! Mode handlers. Each writes its user-facing output to `out`.

use anyhow::Context;
use isitup::{CheckStore, Prober, RunSummary, Settings, run_checks, schedule};
use std::io::Write;

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Reported to the user, exit non-zero
    Failure,
}

/// Run one pass of due checks.
pub async fn check<S, P>(store: &S, prober: &P, settings: &Settings, now: i64) -> anyhow::Result<RunSummary>
where
    S: CheckStore + ?Sized,
    P: Prober + ?Sized,
{
    run_checks(store, prober, settings, now)
        .await
        .context("Failed to load checks")
}

/// Print one line per record with its current status.
pub fn list<S>(store: &S, settings: &Settings, now: i64, out: &mut impl Write) -> anyhow::Result<Outcome>
where
    S: CheckStore + ?Sized,
{
    let records = store.list_all().context("Failed to load checks")?;
    if records.is_empty() {
        writeln!(out, "There are no records in the database.")?;
        return Ok(Outcome::Success);
    }

    for record in &records {
        writeln!(out, "{} is {}", record, schedule::status(settings, now, record))?;
    }
    Ok(Outcome::Success)
}

/// Add a record and confirm it.
pub fn add<S>(store: &S, host: &str, port: u16, resource: &str, out: &mut impl Write) -> anyhow::Result<Outcome>
where
    S: CheckStore + ?Sized,
{
    let record = store
        .add(host, port, resource)
        .context("Failed to add check")?;
    writeln!(out, "Check {} has been added.", record)?;
    Ok(Outcome::Success)
}

/// Remove a record and confirm it. An unknown id is a user-facing failure.
pub fn remove<S>(store: &S, id: i64, out: &mut impl Write) -> anyhow::Result<Outcome>
where
    S: CheckStore + ?Sized,
{
    match store.remove(id) {
        Ok(record) => {
            writeln!(out, "Check {} has been removed.", record)?;
            Ok(Outcome::Success)
        }
        Err(e) if e.is_not_found() => {
            writeln!(out, "There is no check by that ID.")?;
            Ok(Outcome::Failure)
        }
        Err(e) => Err(e).context("Failed to remove check"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isitup::SqliteStore;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_list_empty() {
        let mut out = Vec::new();
        let outcome = list(&store(), &Settings::default(), 1000, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(output(out), "There are no records in the database.\n");
    }

    #[test]
    fn test_add_then_list_shows_down() {
        let store = store();
        let mut out = Vec::new();
        add(&store, "example.com", 80, "http://example.com/", &mut out).unwrap();
        assert_eq!(
            output(out),
            "Check [1] example.com:80, (http://example.com/) has been added.\n"
        );

        let mut out = Vec::new();
        list(&store, &Settings::default(), 1_700_000_000, &mut out).unwrap();
        assert_eq!(output(out), "[1] example.com:80, (http://example.com/) is DOWN\n");
    }

    #[test]
    fn test_list_shows_up_after_success() {
        let store = store();
        let record = store.add("example.com", 80, "http://example.com/").unwrap();
        store.record_attempt(record.id, 1000, true).unwrap();

        let mut out = Vec::new();
        list(&store, &Settings::default(), 1100, &mut out).unwrap();
        assert_eq!(output(out), "[1] example.com:80, (http://example.com/) is UP\n");
    }

    #[test]
    fn test_remove_existing() {
        let store = store();
        let record = store.add("example.com", 22, "http://example.com/").unwrap();

        let mut out = Vec::new();
        let outcome = remove(&store, record.id, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(
            output(out),
            "Check [1] example.com:22, (http://example.com/) has been removed.\n"
        );
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_is_failure() {
        let store = store();
        store.add("example.com", 22, "http://example.com/").unwrap();

        let mut out = Vec::new();
        let outcome = remove(&store, 99, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(output(out), "There is no check by that ID.\n");
        assert_eq!(store.list_all().unwrap().len(), 1);
    }
}
