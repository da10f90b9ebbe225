use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, ToSql};
use tracing::debug;
use uuid::Uuid;

use shared_database::{QueryBuilder, Store};
use shared_models::AppError;

use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, CreateAppointmentRequest,
    RecurrenceFrequency, RecurrenceInfo, UpdateAppointmentRequest,
};
use crate::services::recurrence;

const BASE_SELECT: &str = "SELECT a.id, a.patient_id, a.patient_name, a.doctor_id, a.start_time, a.end_time, \
     a.status, a.notes, a.created_at, a.updated_at, a.last_modified_by, \
     a.recurring_pattern_id, rp.frequency, rp.interval_value, rp.end_date \
     FROM appointments a \
     LEFT JOIN recurring_patterns rp ON a.recurring_pattern_id = rp.id \
     WHERE 1=1";

pub struct AppointmentService {
    store: Store,
}

struct AppointmentRow {
    id: String,
    patient_id: String,
    patient_name: String,
    doctor_id: String,
    start_time: String,
    end_time: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
    last_modified_by: String,
    recurring_pattern_id: Option<String>,
    frequency: Option<String>,
    interval_value: Option<i64>,
    end_date: Option<String>,
}

impl AppointmentService {
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// List appointments matching every supplied filter, ascending by start
    /// time (id as the tie-break between equal starts). Empty doctor/status
    /// sets behave exactly like omitted filters.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        debug!("Listing appointments with filter: {:?}", filter);

        let mut qb = QueryBuilder::new(BASE_SELECT);

        if let Some(week_start) = filter.week_start {
            let from = week_start.and_time(NaiveTime::MIN).and_utc();
            let to = from + Duration::days(7);
            qb.push_clause(
                "datetime(a.start_time) >= datetime(?) AND datetime(a.start_time) < datetime(?)",
                vec![Box::new(from.to_rfc3339()), Box::new(to.to_rfc3339())],
            );
        }

        let doctor_ids: Vec<String> = filter.doctors.iter().map(|d| d.to_string()).collect();
        qb.push_in("a.doctor_id", &doctor_ids);

        let statuses: Vec<String> = filter.status.iter().map(|s| s.to_string()).collect();
        qb.push_in("a.status", &statuses);

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let term = format!("%{}%", search);
            qb.push_clause(
                "(a.patient_name LIKE ? OR EXISTS (SELECT 1 FROM doctors d WHERE d.id = a.doctor_id AND d.name LIKE ?))",
                vec![Box::new(term.clone()), Box::new(term)],
            );
        }

        qb.append("ORDER BY datetime(a.start_time) ASC, a.id ASC");
        let (sql, sql_params) = qb.build();

        let rows = self
            .store
            .fetch_all(&sql, params_from_iter(sql_params.iter()), map_appointment_row)?;

        rows.into_iter().map(appointment_from_row).collect()
    }

    /// Create an appointment, persisting the optional recurrence descriptor
    /// first (pattern, then exceptions, then the appointment row) inside one
    /// transaction. Input is assumed to be boundary-validated.
    pub fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        debug!("Creating appointment {} for patient {}", id, request.patient_id);

        self.store.with_conn(|conn| {
            let tx = conn.transaction()?;

            let pattern_id = match &request.recurring {
                Some(spec) => Some(recurrence::insert_pattern(&tx, spec)?),
                None => None,
            };

            tx.execute(
                "INSERT INTO appointments (
                    id, patient_id, patient_name, doctor_id, start_time, end_time,
                    status, notes, created_at, updated_at, last_modified_by, recurring_pattern_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    id.to_string(),
                    request.patient_id.to_string(),
                    request.patient_name,
                    request.doctor_id.to_string(),
                    request.start_time.to_rfc3339(),
                    request.end_time.to_rfc3339(),
                    request.status.as_str(),
                    request.notes,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    request.last_modified_by,
                    pattern_id.map(|p| p.to_string()),
                ],
            )?;

            tx.commit()?;
            Ok(())
        })?;

        self.get_appointment_by_id(id)
    }

    pub fn get_appointment_by_id(&self, id: Uuid) -> Result<Appointment, AppError> {
        let sql = format!("{} AND a.id = ?1", BASE_SELECT);
        let row = self
            .store
            .fetch_one(&sql, [id.to_string()], map_appointment_row)?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;
        appointment_from_row(row)
    }

    /// Apply a partial update. Only the enumerated updatable columns are
    /// assembled into the statement; `updated_at` is always refreshed. A
    /// recurrence sub-update overwrites the owned pattern in place and is
    /// rejected when the appointment has none.
    pub fn update_appointment(
        &self,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let pattern_id = self.pattern_id_of(id)?;
        if request.recurring.is_some() && pattern_id.is_none() {
            return Err(AppError::BadRequest(
                "Appointment has no recurring pattern to update".to_string(),
            ));
        }

        let now = Utc::now();
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(patient_id) = request.patient_id {
            assignments.push("patient_id = ?");
            values.push(Box::new(patient_id.to_string()));
        }
        if let Some(patient_name) = request.patient_name {
            assignments.push("patient_name = ?");
            values.push(Box::new(patient_name));
        }
        if let Some(doctor_id) = request.doctor_id {
            assignments.push("doctor_id = ?");
            values.push(Box::new(doctor_id.to_string()));
        }
        if let Some(start_time) = request.start_time {
            assignments.push("start_time = ?");
            values.push(Box::new(start_time.to_rfc3339()));
        }
        if let Some(end_time) = request.end_time {
            assignments.push("end_time = ?");
            values.push(Box::new(end_time.to_rfc3339()));
        }
        if let Some(status) = request.status {
            assignments.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(notes) = request.notes {
            assignments.push("notes = ?");
            values.push(Box::new(notes));
        }
        if let Some(last_modified_by) = request.last_modified_by {
            assignments.push("last_modified_by = ?");
            values.push(Box::new(last_modified_by));
        }

        assignments.push("updated_at = ?");
        values.push(Box::new(now.to_rfc3339()));
        values.push(Box::new(id.to_string()));

        let sql = format!(
            "UPDATE appointments SET {} WHERE id = ?",
            assignments.join(", ")
        );

        self.store.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(&sql, params_from_iter(values.iter()))?;
            if let (Some(spec), Some(pattern_id)) = (&request.recurring, &pattern_id) {
                recurrence::update_pattern(&tx, pattern_id, spec)?;
            }
            tx.commit()?;
            Ok(())
        })?;

        self.get_appointment_by_id(id)
    }

    /// Delete an appointment and, when it owns a pattern, the pattern's
    /// exceptions and the pattern itself first.
    pub fn delete_appointment(&self, id: Uuid) -> Result<(), AppError> {
        let pattern_id = self.pattern_id_of(id)?;
        debug!("Deleting appointment {} (pattern: {:?})", id, pattern_id);

        self.store.with_conn(|conn| {
            let tx = conn.transaction()?;
            if let Some(pattern_id) = &pattern_id {
                recurrence::delete_pattern(&tx, pattern_id)?;
            }
            tx.execute("DELETE FROM appointments WHERE id = ?1", [id.to_string()])?;
            tx.commit()?;
            Ok(())
        })?;

        Ok(())
    }

    /// Existence probe doubling as the pattern-ownership read; NotFound when
    /// the appointment is absent.
    fn pattern_id_of(&self, id: Uuid) -> Result<Option<String>, AppError> {
        self.store
            .fetch_one(
                "SELECT recurring_pattern_id FROM appointments WHERE id = ?1",
                [id.to_string()],
                |row| row.get::<_, Option<String>>(0),
            )?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }
}

fn map_appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        doctor_id: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        last_modified_by: row.get(10)?,
        recurring_pattern_id: row.get(11)?,
        frequency: row.get(12)?,
        interval_value: row.get(13)?,
        end_date: row.get(14)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, AppError> {
    let recurring = match (row.recurring_pattern_id.as_ref(), row.frequency) {
        (Some(_), Some(frequency)) => Some(RecurrenceInfo {
            frequency: RecurrenceFrequency::from_str(&frequency)
                .map_err(AppError::Internal)?,
            interval: row.interval_value.unwrap_or(1) as u32,
            end_date: row.end_date.as_deref().map(parse_timestamp).transpose()?,
        }),
        _ => None,
    };

    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        patient_name: row.patient_name,
        doctor_id: parse_uuid(&row.doctor_id)?,
        start_time: parse_timestamp(&row.start_time)?,
        end_time: parse_timestamp(&row.end_time)?,
        status: AppointmentStatus::from_str(&row.status).map_err(AppError::Internal)?,
        notes: row.notes,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
        last_modified_by: row.last_modified_by,
        recurring,
    })
}

fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|e| AppError::Internal(e.to_string()))
}

/// Stored timestamps are RFC 3339 from our own writes, but rows written by
/// the schema's CURRENT_TIMESTAMP default use SQLite's space-separated form.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|d| d.and_utc())
        })
        .map_err(|e| AppError::Internal(format!("Bad timestamp {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_sqlite_timestamps() {
        let a = parse_timestamp("2024-11-15T09:00:00+00:00").unwrap();
        let b = parse_timestamp("2024-11-15 09:00:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("next tuesday").is_err());
    }
}
