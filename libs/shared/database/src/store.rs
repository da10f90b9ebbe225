//! Store handle over the embedded SQLite database.
//!
//! One `Store` is opened at process start and cloned into every service.
//! Cloning is cheap (a shared connection behind a mutex); all statements
//! issued through one handle serialize on that connection.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Params, Row};
use tracing::info;

use crate::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        specialty TEXT NOT NULL,
        avatar TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS doctor_availability (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        doctor_id TEXT NOT NULL,
        weekday INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        FOREIGN KEY (doctor_id) REFERENCES doctors (id)
    );

    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL,
        patient_name TEXT NOT NULL,
        doctor_id TEXT NOT NULL,
        start_time DATETIME NOT NULL,
        end_time DATETIME NOT NULL,
        status TEXT CHECK(status IN ('confirmed', 'pending', 'cancelled', 'blocked')) NOT NULL,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        last_modified_by TEXT NOT NULL,
        recurring_pattern_id TEXT,
        FOREIGN KEY (doctor_id) REFERENCES doctors (id)
    );

    CREATE TABLE IF NOT EXISTS recurring_patterns (
        id TEXT PRIMARY KEY,
        frequency TEXT CHECK(frequency IN ('daily', 'weekly', 'monthly')) NOT NULL,
        interval_value INTEGER NOT NULL,
        end_date DATETIME,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS recurring_exceptions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pattern_id TEXT NOT NULL,
        exception_date DATETIME NOT NULL,
        FOREIGN KEY (pattern_id) REFERENCES recurring_patterns (id)
    );
";

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the scheduling database at `path` and run the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Opened scheduling database at {}", path.as_ref().display());
        Self::init(conn)
    }

    /// Open an in-memory database (for tests and seeding dry-runs).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the raw connection. Services use this for
    /// multi-statement sequences that must share one transaction.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut guard)
    }

    /// Execute a single statement, returning the number of affected rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize, StoreError> {
        self.with_conn(|conn| Ok(conn.execute(sql, params)?))
    }

    /// Fetch every row of a query, mapped through `map_row`.
    pub fn fetch_all<T, P, F>(&self, sql: &str, params: P, map_row: F) -> Result<Vec<T>, StoreError>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params, map_row)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    /// Fetch a single row, or `None` when the query matches nothing.
    pub fn fetch_one<T, P, F>(
        &self,
        sql: &str,
        params: P,
        map_row: F,
    ) -> Result<Option<T>, StoreError>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            match stmt.query_row(params, map_row) {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_initializes_all_tables() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .fetch_one(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap()
            .unwrap();
        assert_eq!(count, 5, "Expected 5 tables, got {count}");
    }

    #[test]
    fn foreign_keys_enabled() {
        let store = Store::open_in_memory().unwrap();
        let fk: i64 = store
            .fetch_one("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap()
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn schema_is_idempotent_on_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler.db");

        let store = Store::open(&path).unwrap();
        store
            .execute(
                "INSERT INTO doctors (id, name, specialty) VALUES ('d1', 'Dr. A', 'Cardiology')",
                [],
            )
            .unwrap();
        drop(store);

        let store2 = Store::open(&path).unwrap();
        let count: i64 = store2
            .fetch_one("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))
            .unwrap()
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn fetch_one_returns_none_for_missing_row() {
        let store = Store::open_in_memory().unwrap();
        let row: Option<String> = store
            .fetch_one(
                "SELECT name FROM doctors WHERE id = ?1",
                ["nope"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn status_check_constraint_rejects_unknown_value() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute(
                "INSERT INTO doctors (id, name, specialty) VALUES ('d1', 'Dr. A', 'Cardiology')",
                [],
            )
            .unwrap();
        let result = store.execute(
            "INSERT INTO appointments (id, patient_id, patient_name, doctor_id, start_time,
             end_time, status, last_modified_by)
             VALUES ('a1', 'p1', 'Pat', 'd1', '2024-11-15T09:00:00+00:00',
             '2024-11-15T09:30:00+00:00', 'bogus', 'test')",
            [],
        );
        assert!(result.is_err());
    }
}
