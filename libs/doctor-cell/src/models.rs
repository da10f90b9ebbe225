use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub availability: Vec<AvailabilitySlot>,
}

/// One weekly availability window. Weekday is ISO: 1 = Monday .. 7 = Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

impl CreateDoctorRequest {
    /// Boundary validation, run by the handler before the service is invoked.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.specialty.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ));
        }
        for slot in &self.availability {
            if !(1..=7).contains(&slot.weekday) {
                return Err(AppError::ValidationError(format!(
                    "Weekday must be between 1 (Monday) and 7 (Sunday), got {}",
                    slot.weekday
                )));
            }
            if slot.start_time >= slot.end_time {
                return Err(AppError::ValidationError(
                    "Availability start time must be before end time".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorFilter {
    pub specialty: Option<String>,
    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_slot(slot: AvailabilitySlot) -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: "Dr. John Smith".to_string(),
            specialty: "Cardiology".to_string(),
            avatar: None,
            availability: vec![slot],
        }
    }

    #[test]
    fn accepts_iso_weekday_range() {
        for weekday in 1..=7 {
            let request = request_with_slot(AvailabilitySlot {
                weekday,
                start_time: "09:00".to_string(),
                end_time: "17:00".to_string(),
            });
            assert!(request.validate().is_ok(), "weekday {weekday} rejected");
        }
    }

    #[test]
    fn rejects_weekday_zero() {
        let request = request_with_slot(AvailabilitySlot {
            weekday: 0,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
        });
        assert!(matches!(
            request.validate(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_inverted_slot_times() {
        let request = request_with_slot(AvailabilitySlot {
            weekday: 1,
            start_time: "17:00".to_string(),
            end_time: "09:00".to_string(),
        });
        assert!(matches!(
            request.validate(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_blank_name() {
        let request = CreateDoctorRequest {
            name: "  ".to_string(),
            specialty: "Cardiology".to_string(),
            avatar: None,
            availability: vec![],
        };
        assert!(matches!(
            request.validate(),
            Err(AppError::ValidationError(_))
        ));
    }
}
