use std::collections::HashMap;

use rusqlite::params_from_iter;
use tracing::debug;
use uuid::Uuid;

use shared_database::{QueryBuilder, Store};
use shared_models::AppError;

use crate::models::{AvailabilitySlot, CreateDoctorRequest, Doctor, DoctorFilter};

pub struct DoctorService {
    store: Store,
}

struct DoctorRow {
    id: String,
    name: String,
    specialty: String,
    avatar: Option<String>,
}

impl DoctorService {
    pub fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// List doctors, optionally filtered by exact specialty and by whether
    /// any availability window exists. Doctors and their slots are read in
    /// two queries and grouped in memory, so a doctor without slots comes
    /// back with an empty sequence rather than a placeholder row.
    pub fn list_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, AppError> {
        debug!("Listing doctors with filter: {:?}", filter);

        let mut qb = QueryBuilder::new("SELECT id, name, specialty, avatar FROM doctors WHERE 1=1");
        if let Some(specialty) = &filter.specialty {
            qb.push("specialty = ?", specialty.clone());
        }
        let (sql, params) = qb.build();

        let rows = self
            .store
            .fetch_all(&sql, params_from_iter(params.iter()), map_doctor_row)?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut slots = self.slots_for(&ids)?;

        let mut doctors = Vec::with_capacity(rows.len());
        for row in rows {
            let availability = slots.remove(&row.id).unwrap_or_default();
            doctors.push(doctor_from_row(row, availability)?);
        }

        if filter.available == Some(true) {
            doctors.retain(|d| !d.availability.is_empty());
        }

        Ok(doctors)
    }

    pub fn get_doctor_by_id(&self, id: Uuid) -> Result<Doctor, AppError> {
        let row = self
            .store
            .fetch_one(
                "SELECT id, name, specialty, avatar FROM doctors WHERE id = ?1",
                [id.to_string()],
                map_doctor_row,
            )?
            .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", id)))?;

        let mut slots = self.slots_for(&[row.id.clone()])?;
        let availability = slots.remove(&row.id).unwrap_or_default();
        doctor_from_row(row, availability)
    }

    /// Create a doctor and bulk-insert its availability windows. The slot
    /// insert is one multi-row statement, skipped entirely when the list is
    /// empty; both writes share a transaction.
    pub fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, AppError> {
        let id = Uuid::new_v4();
        debug!("Creating doctor {} ({})", request.name, id);

        self.store.with_conn(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO doctors (id, name, specialty, avatar) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    id.to_string(),
                    request.name,
                    request.specialty,
                    request.avatar
                ],
            )?;

            if !request.availability.is_empty() {
                let rows = vec!["(?, ?, ?, ?)"; request.availability.len()].join(",");
                let sql = format!(
                    "INSERT INTO doctor_availability (doctor_id, weekday, start_time, end_time) VALUES {}",
                    rows
                );
                let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
                for slot in &request.availability {
                    values.push(Box::new(id.to_string()));
                    values.push(Box::new(slot.weekday as i64));
                    values.push(Box::new(slot.start_time.clone()));
                    values.push(Box::new(slot.end_time.clone()));
                }
                tx.execute(&sql, params_from_iter(values.iter()))?;
            }

            tx.commit()?;
            Ok(())
        })?;

        self.get_doctor_by_id(id)
    }

    /// Availability windows for a set of doctors, keyed by doctor id and
    /// ordered by insertion within each doctor.
    fn slots_for(&self, ids: &[String]) -> Result<HashMap<String, Vec<AvailabilitySlot>>, AppError> {
        let mut grouped: HashMap<String, Vec<AvailabilitySlot>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb = QueryBuilder::new(
            "SELECT doctor_id, weekday, start_time, end_time FROM doctor_availability WHERE 1=1",
        );
        qb.push_in("doctor_id", ids);
        qb.append("ORDER BY id ASC");
        let (sql, params) = qb.build();

        let rows = self
            .store
            .fetch_all(&sql, params_from_iter(params.iter()), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    AvailabilitySlot {
                        weekday: row.get::<_, i64>(1)? as u8,
                        start_time: row.get(2)?,
                        end_time: row.get(3)?,
                    },
                ))
            })?;

        for (doctor_id, slot) in rows {
            grouped.entry(doctor_id).or_default().push(slot);
        }
        Ok(grouped)
    }
}

fn map_doctor_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        avatar: row.get(3)?,
    })
}

fn doctor_from_row(row: DoctorRow, availability: Vec<AvailabilitySlot>) -> Result<Doctor, AppError> {
    Ok(Doctor {
        id: Uuid::parse_str(&row.id).map_err(|e| AppError::Internal(e.to_string()))?,
        name: row.name,
        specialty: row.specialty,
        avatar: row.avatar,
        availability,
    })
}
