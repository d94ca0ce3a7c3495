use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use shared_database::BackendClient;
use shared_utils::Clock;

use crate::handlers;
use crate::models::MAX_REQUEST_BYTES;
use crate::services::submission::BookingService;

pub struct BookingState {
    pub service: BookingService,
}

impl BookingState {
    pub fn new(backend: Arc<dyn BackendClient>, clock: Arc<dyn Clock>, bucket: impl Into<String>) -> Self {
        Self {
            service: BookingService::new(backend, clock, bucket),
        }
    }
}

pub fn booking_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/", get(handlers::get_form_rules).post(handlers::submit_booking))
        // Oversized files must reach the handler to get the size banner
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}
