use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::{booking_routes, BookingState};
use consultation_cell::{consultation_routes, ConsultationState};
use shared_config::AppConfig;
use shared_database::BackendClient;
use shared_utils::Clock;

pub fn create_router(config: &AppConfig, backend: Arc<dyn BackendClient>, clock: Arc<dyn Clock>) -> Router {
    let booking = Arc::new(BookingState::new(
        backend.clone(),
        clock.clone(),
        config.storage_bucket.clone(),
    ));
    let consultations = Arc::new(ConsultationState::new(backend, clock, config.person_relation));

    Router::new()
        .route("/", get(|| async { "MedCheck scheduling API is running!" }))
        .nest("/agendar", booking_routes(booking))
        .nest("/consultas", consultation_routes(consultations))
}
