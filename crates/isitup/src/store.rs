//! Durable storage for check records and the settings singleton.

use crate::types::{EndpointRecord, Settings};
use common::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Operations on persisted check records.
///
/// Every mutation is atomic per record so overlapping invocations never see
/// a half-written pair of timestamps.
pub trait CheckStore {
    /// Create the tables if they do not exist yet. Idempotent.
    fn initialize(&self) -> Result<()>;

    /// Load the settings, inserting the defaults on first use.
    fn load_settings(&self) -> Result<Settings>;

    fn list_all(&self) -> Result<Vec<EndpointRecord>>;

    fn get(&self, id: i64) -> Result<EndpointRecord>;

    /// Insert a new record with zeroed timestamps.
    fn add(&self, host: &str, port: u16, resource: &str) -> Result<EndpointRecord>;

    /// Delete a record, returning what was removed.
    fn remove(&self, id: i64) -> Result<EndpointRecord>;

    /// Set `last_check = now`, and `last_up = now` when `succeeded`.
    fn record_attempt(&self, id: i64, now: i64, succeeded: bool) -> Result<()>;
}

/// SQLite-backed store.
///
/// Table and column names match the historical `isitup.db` layout.
pub struct SqliteStore {
    conn: Connection,
}

const CREATE_SETTINGS: &str = "CREATE TABLE IF NOT EXISTS settings (
    checkinterval INTEGER,
    recheckinterval INTEGER,
    \"offset\" INTEGER
)";

const CREATE_CHECKS: &str = "CREATE TABLE IF NOT EXISTS checks (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT UNIQUE,
    host TEXT,
    port INTEGER,
    url TEXT,
    lastup INTEGER,
    lastcheck INTEGER
)";

const SELECT_CHECK: &str = "SELECT id, host, port, url, lastup, lastcheck FROM checks";

fn storage(context: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |e| Error::storage(format!("{}: {}", context, e))
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<EndpointRecord> {
    // Older databases stored whatever --port was given.
    let raw_port = row.get::<_, Option<i64>>(2)?.unwrap_or_default();
    let port = u16::try_from(raw_port)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(2, raw_port))?;

    Ok(EndpointRecord {
        id: row.get(0)?,
        host: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        port,
        resource: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        last_up: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        last_check: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
    })
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    ///
    /// `busy_timeout` bounds how long a statement waits for a lock held by
    /// another invocation.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(storage("Failed to open database"))?;
        conn.busy_timeout(busy_timeout)
            .map_err(storage("Failed to set busy timeout"))?;
        debug!(path = %path.display(), "Opened check database");
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage("Failed to open database"))?;
        Ok(Self { conn })
    }

    fn query_one(&self, id: i64) -> Result<Option<EndpointRecord>> {
        self.conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_CHECK), params![id], row_to_record)
            .optional()
            .map_err(storage("Failed to query check"))
    }
}

impl CheckStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn
            .execute(CREATE_SETTINGS, [])
            .map_err(storage("Failed to create settings table"))?;
        self.conn
            .execute(CREATE_CHECKS, [])
            .map_err(storage("Failed to create checks table"))?;
        Ok(())
    }

    fn load_settings(&self) -> Result<Settings> {
        let select = "SELECT checkinterval, recheckinterval, \"offset\" FROM settings LIMIT 1";
        let read = |conn: &Connection| {
            conn.query_row(select, [], |row| {
                Ok(Settings {
                    check_interval: row.get(0)?,
                    recheck_interval: row.get(1)?,
                    offset: row.get(2)?,
                })
            })
            .optional()
        };

        if let Some(settings) = read(&self.conn).map_err(storage("Failed to load settings"))? {
            return Ok(settings);
        }

        // Another invocation may be bootstrapping at the same time.
        let tx = rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(storage("Failed to begin transaction"))?;
        let settings = match read(&*tx).map_err(storage("Failed to load settings"))? {
            Some(settings) => settings,
            None => {
                let defaults = Settings::default();
                tx.execute(
                    "INSERT INTO settings (checkinterval, recheckinterval, \"offset\") VALUES (?1, ?2, ?3)",
                    params![defaults.check_interval, defaults.recheck_interval, defaults.offset],
                )
                .map_err(storage("Failed to insert default settings"))?;
                info!(
                    check_interval = defaults.check_interval,
                    recheck_interval = defaults.recheck_interval,
                    offset = defaults.offset,
                    "Created default settings"
                );
                defaults
            }
        };
        tx.commit().map_err(storage("Failed to commit settings"))?;
        Ok(settings)
    }

    fn list_all(&self) -> Result<Vec<EndpointRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY id", SELECT_CHECK))
            .map_err(storage("Failed to prepare statement"))?;

        let rows = stmt
            .query_map([], row_to_record)
            .map_err(storage("Failed to query checks"))?;

        let mut records = Vec::new();
        for row in rows {
            match row {
                Ok(record) => records.push(record),
                // A malformed row only costs that row
                Err(
                    e @ (rusqlite::Error::IntegralValueOutOfRange(..)
                    | rusqlite::Error::InvalidColumnType(..)
                    | rusqlite::Error::FromSqlConversionFailure(..)),
                ) => {
                    warn!(error = %e, "Skipping unreadable check record");
                }
                Err(e) => return Err(storage("Failed to read checks")(e)),
            }
        }

        Ok(records)
    }

    fn get(&self, id: i64) -> Result<EndpointRecord> {
        self.query_one(id)?.ok_or(Error::NotFound(id))
    }

    fn add(&self, host: &str, port: u16, resource: &str) -> Result<EndpointRecord> {
        self.conn
            .execute(
                "INSERT INTO checks (host, port, url, lastup, lastcheck) VALUES (?1, ?2, ?3, 0, 0)",
                params![host, port, resource],
            )
            .map_err(storage("Failed to add check"))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, host, port, "Added check");
        self.get(id)
    }

    fn remove(&self, id: i64) -> Result<EndpointRecord> {
        let tx = rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)
            .map_err(storage("Failed to begin transaction"))?;

        let record = tx
            .query_row(&format!("{} WHERE id = ?1", SELECT_CHECK), params![id], row_to_record)
            .optional()
            .map_err(storage("Failed to query check"))?
            .ok_or(Error::NotFound(id))?;

        tx.execute("DELETE FROM checks WHERE id = ?1", params![id])
            .map_err(storage("Failed to remove check"))?;
        tx.commit().map_err(storage("Failed to commit removal"))?;

        debug!(id, "Removed check");
        Ok(record)
    }

    fn record_attempt(&self, id: i64, now: i64, succeeded: bool) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE checks
                 SET lastcheck = ?1,
                     lastup = CASE WHEN ?2 THEN ?1 ELSE lastup END
                 WHERE id = ?3",
                params![now, succeeded, id],
            )
            .map_err(storage("Failed to record attempt"))?;

        if changed == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }
}
