//! Populate a fresh scheduling database with sample doctors and
//! appointments. Run with `cargo run --bin seed`.

use chrono::{TimeZone, Utc};
use dotenv::dotenv;
use tracing::info;
use uuid::Uuid;

use appointment_cell::models::{AppointmentStatus, CreateAppointmentRequest};
use appointment_cell::services::AppointmentService;
use doctor_cell::models::{AvailabilitySlot, CreateDoctorRequest};
use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_database::Store;

fn weekday_slot(weekday: u8) -> AvailabilitySlot {
    AvailabilitySlot {
        weekday,
        start_time: "09:00".to_string(),
        end_time: "17:00".to_string(),
    }
}

fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let store = Store::open(&config.database_path).unwrap();

    let doctor_service = DoctorService::new(&store);
    let appointment_service = AppointmentService::new(&store);

    let smith = doctor_service
        .create_doctor(CreateDoctorRequest {
            name: "Dr. John Smith".to_string(),
            specialty: "Cardiology".to_string(),
            avatar: None,
            availability: vec![weekday_slot(1), weekday_slot(2), weekday_slot(3)],
        })
        .unwrap();

    let johnson = doctor_service
        .create_doctor(CreateDoctorRequest {
            name: "Dr. Sarah Johnson".to_string(),
            specialty: "Pediatrics".to_string(),
            avatar: None,
            availability: vec![weekday_slot(2), weekday_slot(4), weekday_slot(5)],
        })
        .unwrap();

    appointment_service
        .create_appointment(CreateAppointmentRequest {
            patient_id: Uuid::new_v4(),
            patient_name: "Alice Brown".to_string(),
            doctor_id: smith.id,
            start_time: Utc.with_ymd_and_hms(2024, 11, 15, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 11, 15, 9, 30, 0).unwrap(),
            status: AppointmentStatus::Confirmed,
            notes: None,
            last_modified_by: "system".to_string(),
            recurring: None,
        })
        .unwrap();

    appointment_service
        .create_appointment(CreateAppointmentRequest {
            patient_id: Uuid::new_v4(),
            patient_name: "Bob Wilson".to_string(),
            doctor_id: johnson.id,
            start_time: Utc.with_ymd_and_hms(2024, 11, 15, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 11, 15, 10, 30, 0).unwrap(),
            status: AppointmentStatus::Pending,
            notes: None,
            last_modified_by: "system".to_string(),
            recurring: None,
        })
        .unwrap();

    info!("Seeded 2 doctors and 2 appointments into {}", config.database_path);
}
