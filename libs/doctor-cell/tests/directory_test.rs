use uuid::Uuid;

use doctor_cell::models::{AvailabilitySlot, CreateDoctorRequest, DoctorFilter};
use doctor_cell::services::DoctorService;
use shared_database::Store;
use shared_models::AppError;

fn test_store() -> Store {
    Store::open_in_memory().unwrap()
}

fn doctor_request(name: &str, specialty: &str, availability: Vec<AvailabilitySlot>) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: name.to_string(),
        specialty: specialty.to_string(),
        avatar: None,
        availability,
    }
}

fn slot(weekday: u8, start: &str, end: &str) -> AvailabilitySlot {
    AvailabilitySlot {
        weekday,
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

#[test]
fn availability_round_trips_in_order() {
    let store = test_store();
    let service = DoctorService::new(&store);

    let created = service
        .create_doctor(doctor_request(
            "Dr. John Smith",
            "Cardiology",
            vec![
                slot(1, "09:00", "17:00"),
                slot(3, "10:00", "14:00"),
                slot(2, "09:00", "12:00"),
            ],
        ))
        .unwrap();

    let fetched = service.get_doctor_by_id(created.id).unwrap();
    assert_eq!(fetched.availability.len(), 3);
    assert_eq!(fetched.availability, created.availability);
    // Insertion order, not weekday order
    assert_eq!(fetched.availability[0], slot(1, "09:00", "17:00"));
    assert_eq!(fetched.availability[1], slot(3, "10:00", "14:00"));
    assert_eq!(fetched.availability[2], slot(2, "09:00", "12:00"));
}

#[test]
fn doctor_without_slots_gets_empty_sequence_not_placeholder() {
    let store = test_store();
    let service = DoctorService::new(&store);

    let created = service
        .create_doctor(doctor_request("Dr. Sarah Johnson", "Pediatrics", vec![]))
        .unwrap();
    assert!(created.availability.is_empty());

    let listed = service.list_doctors(&DoctorFilter::default()).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].availability.is_empty());
}

#[test]
fn available_filter_excludes_doctors_without_slots() {
    let store = test_store();
    let service = DoctorService::new(&store);

    let d1 = service
        .create_doctor(doctor_request(
            "Dr. John Smith",
            "Cardiology",
            vec![slot(1, "09:00", "17:00")],
        ))
        .unwrap();
    let d2 = service
        .create_doctor(doctor_request("Dr. Sarah Johnson", "Pediatrics", vec![]))
        .unwrap();

    let available = service
        .list_doctors(&DoctorFilter {
            specialty: None,
            available: Some(true),
        })
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, d1.id);

    // Unset and false both include the empty-availability doctor
    for available_flag in [None, Some(false)] {
        let all = service
            .list_doctors(&DoctorFilter {
                specialty: None,
                available: available_flag,
            })
            .unwrap();
        assert_eq!(all.len(), 2);
        let d2_row = all.iter().find(|d| d.id == d2.id).unwrap();
        assert!(d2_row.availability.is_empty());
    }
}

#[test]
fn specialty_filter_is_exact_match() {
    let store = test_store();
    let service = DoctorService::new(&store);

    let d1 = service
        .create_doctor(doctor_request(
            "Dr. John Smith",
            "Cardiology",
            vec![slot(1, "09:00", "17:00")],
        ))
        .unwrap();
    service
        .create_doctor(doctor_request("Dr. Sarah Johnson", "Pediatrics", vec![]))
        .unwrap();

    let cardiologists = service
        .list_doctors(&DoctorFilter {
            specialty: Some("Cardiology".to_string()),
            available: None,
        })
        .unwrap();
    assert_eq!(cardiologists.len(), 1);
    assert_eq!(cardiologists[0].id, d1.id);

    let nobody = service
        .list_doctors(&DoctorFilter {
            specialty: Some("cardiology".to_string()),
            available: None,
        })
        .unwrap();
    assert!(nobody.is_empty(), "specialty match is case-sensitive exact");
}

#[test]
fn get_unknown_doctor_is_not_found() {
    let store = test_store();
    let service = DoctorService::new(&store);

    let result = service.get_doctor_by_id(Uuid::new_v4());
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
