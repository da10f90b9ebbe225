use axum::{
    routing::get,
    Router,
};

use shared_database::Store;

use crate::handlers;

pub fn appointment_routes(store: Store) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .patch(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .with_state(store)
}
