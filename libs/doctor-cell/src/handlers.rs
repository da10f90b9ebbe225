use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared_database::Store;
use shared_models::AppError;

use crate::models::{CreateDoctorRequest, Doctor, DoctorFilter};
use crate::services::DoctorService;

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub specialty: Option<String>,
    pub available: Option<bool>,
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(store): State<Store>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let service = DoctorService::new(&store);
    let filter = DoctorFilter {
        specialty: query.specialty,
        available: query.available,
    };
    let doctors = service.list_doctors(&filter)?;
    Ok(Json(doctors))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(store): State<Store>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Doctor>, AppError> {
    let service = DoctorService::new(&store);
    let doctor = service.get_doctor_by_id(doctor_id)?;
    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(store): State<Store>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    request.validate()?;
    let service = DoctorService::new(&store);
    let doctor = service.create_doctor(request)?;
    Ok((StatusCode::CREATED, Json(doctor)))
}
