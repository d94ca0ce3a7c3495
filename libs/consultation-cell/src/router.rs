use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use headers::HeaderMapExt;

use shared_database::BackendClient;
use shared_models::AppError;
use shared_utils::Clock;

use crate::handlers;
use crate::services::listing::ConsultationQueryService;
use crate::session::{SessionId, SessionRegistry};

pub struct ConsultationState {
    pub registry: SessionRegistry,
}

impl ConsultationState {
    pub fn new(backend: Arc<dyn BackendClient>, clock: Arc<dyn Clock>, person_relation: bool) -> Self {
        let service = ConsultationQueryService::new(backend).with_person_relation(person_relation);
        Self {
            registry: SessionRegistry::new(Arc::new(service), clock),
        }
    }
}

/// Resolve the `X-Session-Id` header to its browser and hand it to the
/// handler as an extension. Access to the list itself is checked by the
/// browser.
pub async fn session_guard(
    State(state): State<Arc<ConsultationState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = request
        .headers()
        .typed_get::<SessionId>()
        .ok_or_else(|| AppError::Auth("Falta el encabezado X-Session-Id".to_string()))?;

    let browser = state
        .registry
        .get(session.as_str())
        .await
        .ok_or_else(|| AppError::Auth("Sesión desconocida".to_string()))?;

    request.extensions_mut().insert(browser);

    Ok(next.run(request).await)
}

pub fn consultation_routes(state: Arc<ConsultationState>) -> Router {
    let public_routes = Router::new().route("/acceso", post(handlers::request_access));

    let session_routes = Router::new()
        .route("/", get(handlers::list_consultations))
        .route("/{id}/alternar", post(handlers::toggle_consultation))
        .layer(middleware::from_fn_with_state(state.clone(), session_guard));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .with_state(state)
}
