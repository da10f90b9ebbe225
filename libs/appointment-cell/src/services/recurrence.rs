//! Recurring pattern lifecycle, scoped to exactly one appointment.
//!
//! These run inside the ledger's transactions, so they take a raw
//! connection rather than the store handle. Dependency order on delete:
//! exceptions, then the pattern row; the owning appointment row is the
//! ledger's job.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use shared_database::StoreError;

use crate::models::RecurrenceSpec;

/// Persist a fresh pattern plus its initial exception list, returning the
/// generated pattern id.
pub fn insert_pattern(conn: &Connection, spec: &RecurrenceSpec) -> Result<Uuid, StoreError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO recurring_patterns (id, frequency, interval_value, end_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            id.to_string(),
            spec.frequency.as_str(),
            spec.interval as i64,
            spec.end_date.map(|d| d.to_rfc3339()),
        ],
    )?;
    insert_exceptions(conn, &id, &spec.exceptions)?;
    Ok(id)
}

/// Bulk-insert exception dates in one statement. An empty list issues no
/// statement at all.
fn insert_exceptions(
    conn: &Connection,
    pattern_id: &Uuid,
    exceptions: &[DateTime<Utc>],
) -> Result<(), StoreError> {
    if exceptions.is_empty() {
        return Ok(());
    }
    let rows = vec!["(?, ?)"; exceptions.len()].join(",");
    let sql = format!(
        "INSERT INTO recurring_exceptions (pattern_id, exception_date) VALUES {}",
        rows
    );
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    for exception in exceptions {
        values.push(Box::new(pattern_id.to_string()));
        values.push(Box::new(exception.to_rfc3339()));
    }
    conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(())
}

/// Overwrite frequency/interval/end-date of an existing pattern. The
/// exception list is write-once and is not touched here.
pub fn update_pattern(
    conn: &Connection,
    pattern_id: &str,
    spec: &RecurrenceSpec,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE recurring_patterns
         SET frequency = ?1, interval_value = ?2, end_date = ?3
         WHERE id = ?4",
        params![
            spec.frequency.as_str(),
            spec.interval as i64,
            spec.end_date.map(|d| d.to_rfc3339()),
            pattern_id,
        ],
    )?;
    Ok(())
}

/// Remove a pattern and everything under it: exceptions first, then the
/// pattern row.
pub fn delete_pattern(conn: &Connection, pattern_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM recurring_exceptions WHERE pattern_id = ?1",
        [pattern_id],
    )?;
    conn.execute("DELETE FROM recurring_patterns WHERE id = ?1", [pattern_id])?;
    Ok(())
}
