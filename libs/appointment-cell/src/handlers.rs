use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared_database::Store;
use shared_models::AppError;

use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::AppointmentService;

/// List filters as they arrive on the query string. The set-valued filters
/// come in comma-separated (`?doctors=id1,id2&status=pending,confirmed`).
#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub week_start: Option<NaiveDate>,
    pub doctors: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl AppointmentListQuery {
    fn into_filter(self) -> Result<AppointmentFilter, AppError> {
        let doctors = split_csv(self.doctors.as_deref())
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|_| AppError::BadRequest(format!("Invalid doctor id: {}", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let status = split_csv(self.status.as_deref())
            .map(|s| {
                AppointmentStatus::from_str(s).map_err(AppError::BadRequest)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AppointmentFilter {
            week_start: self.week_start,
            doctors,
            status,
            search: self.search,
        })
    }
}

fn split_csv(input: Option<&str>) -> impl Iterator<Item = &str> {
    input
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(store): State<Store>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let filter = query.into_filter()?;
    let service = AppointmentService::new(&store);
    let appointments = service.list_appointments(&filter)?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(store): State<Store>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    request.validate()?;
    let service = AppointmentService::new(&store);
    let appointment = service.create_appointment(request)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(store): State<Store>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let service = AppointmentService::new(&store);
    let appointment = service.get_appointment_by_id(appointment_id)?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(store): State<Store>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    request.validate()?;
    let service = AppointmentService::new(&store);
    let appointment = service.update_appointment(appointment_id, request)?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(store): State<Store>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = AppointmentService::new(&store);
    service.delete_appointment(appointment_id)?;
    Ok(StatusCode::NO_CONTENT)
}
