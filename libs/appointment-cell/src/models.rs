use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_modified_by: String,
    /// Recurrence descriptor, inlined from the owned pattern when present.
    /// Exception dates are not inlined into reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurrenceInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Cancelled,
    Blocked,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "pending" => Ok(AppointmentStatus::Pending),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "blocked" => Ok(AppointmentStatus::Blocked),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Daily => "daily",
            RecurrenceFrequency::Weekly => "weekly",
            RecurrenceFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurrenceFrequency::Daily),
            "weekly" => Ok(RecurrenceFrequency::Weekly),
            "monthly" => Ok(RecurrenceFrequency::Monthly),
            other => Err(format!("Invalid frequency: {}", other)),
        }
    }
}

/// Recurrence fields as read back with an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceInfo {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// Recurrence fields as supplied on create/update, including the initial
/// exception-date list (written once, at pattern creation).
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceSpec {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exceptions: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub last_modified_by: String,
    #[serde(default)]
    pub recurring: Option<RecurrenceSpec>,
}

impl CreateAppointmentRequest {
    /// Boundary validation, run by the handler before the ledger is invoked.
    /// The service assumes validated input and does not re-check.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.patient_name.trim().is_empty() || self.last_modified_by.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ));
        }
        if self.start_time >= self.end_time {
            return Err(AppError::ValidationError(
                "Start time must be before end time".to_string(),
            ));
        }
        if let Some(recurring) = &self.recurring {
            recurring.validate()?;
        }
        Ok(())
    }
}

impl RecurrenceSpec {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.interval < 1 {
            return Err(AppError::ValidationError(
                "Recurrence interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update. Identity and creation timestamp are never updatable;
/// unknown fields are rejected at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<Uuid>,
    pub patient_name: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub last_modified_by: Option<String>,
    pub recurring: Option<RecurrenceSpec>,
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                return Err(AppError::ValidationError(
                    "Start time must be before end time".to_string(),
                ));
            }
        }
        if let Some(recurring) = &self.recurring {
            recurring.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Selects the half-open week `[week_start, week_start + 7 days)` on the
    /// appointment's start time.
    pub week_start: Option<NaiveDate>,
    pub doctors: Vec<Uuid>,
    pub status: Vec<AppointmentStatus>,
    pub search: Option<String>,
}
