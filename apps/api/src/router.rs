use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use shared_database::Store;

pub fn create_router(store: Store) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Scheduler API is running!" }))
        .nest("/api/doctors", doctor_routes(store.clone()))
        .nest("/api/appointments", appointment_routes(store))
}
