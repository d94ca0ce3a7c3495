use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::TypedHeader;
use tracing::info;

use shared_models::AppError;

use crate::browser::ConsultationBrowser;
use crate::models::{parse_date, AccessRequest, AccessResponse, ListQuery, ListSnapshot, ListStatus};
use crate::router::ConsultationState;
use crate::session::SessionId;

#[axum::debug_handler]
pub async fn request_access(
    State(state): State<Arc<ConsultationState>>,
    session: Option<TypedHeader<SessionId>>,
    Json(payload): Json<AccessRequest>,
) -> Result<Json<AccessResponse>, AppError> {
    let requested = session.map(|TypedHeader(id)| id.0);
    let (session_id, _) = state.registry.authorize(requested, &payload.passphrase).await?;

    info!("Session {} may browse consultations", session_id);

    Ok(Json(AccessResponse {
        authorized: true,
        session_id,
    }))
}

/// Lists the consultations for `?fecha=YYYY-MM-DD`, or for today when the
/// parameter is absent. A backend failure still returns the snapshot, in
/// its error state, with 502.
#[axum::debug_handler]
pub async fn list_consultations(
    Extension(browser): Extension<Arc<ConsultationBrowser>>,
    Query(query): Query<ListQuery>,
) -> Result<(StatusCode, Json<ListSnapshot>), AppError> {
    let snapshot = match query.date.as_deref().filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => browser.select_date(parse_date(raw)?).await?,
        None => browser.show_today().await?,
    };

    let status = if snapshot.status == ListStatus::Error {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    Ok((status, Json(snapshot)))
}

#[axum::debug_handler]
pub async fn toggle_consultation(
    Extension(browser): Extension<Arc<ConsultationBrowser>>,
    Path(id): Path<i64>,
) -> Result<Json<ListSnapshot>, AppError> {
    Ok(Json(browser.toggle_expand(id).await?))
}
