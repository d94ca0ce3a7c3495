use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use consultation_cell::{consultation_routes, ConsultationState};
use shared_utils::test_utils::{FakeBackend, FakeFailure, MockSupabaseResponses};
use shared_utils::FixedClock;

fn create_test_state(backend: Arc<FakeBackend>) -> Arc<ConsultationState> {
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
    Arc::new(ConsultationState::new(backend, clock, false))
}

fn create_test_app(backend: Arc<FakeBackend>) -> Router {
    consultation_routes(create_test_state(backend))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn access_request(passphrase: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/acceso")
        .header("content-type", "application/json");
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder
        .body(Body::from(json!({ "passphrase": passphrase }).to_string()))
        .unwrap()
}

fn session_request(method: &str, uri: &str, session: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-session-id", session)
        .body(Body::empty())
        .unwrap()
}

async fn open_session(app: &Router) -> String {
    let (status, body) = send(app, access_request("medcheck", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["autorizado"], true);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_wrong_passphrase_is_unauthorized() {
    let app = create_test_app(Arc::new(FakeBackend::new()));

    let (status, body) = send(&app, access_request("Medcheck", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Contraseña incorrecta. Intenta nuevamente.");
}

#[tokio::test]
async fn test_rejected_access_leaves_no_session() {
    let state = create_test_state(Arc::new(FakeBackend::new()));
    let app = consultation_routes(state.clone());

    for _ in 0..100 {
        let (status, _) = send(&app, access_request("wrong", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(state.registry.len().await, 0);

    open_session(&app).await;
    assert_eq!(state.registry.len().await, 1);
}

#[tokio::test]
async fn test_list_requires_session_header() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let request = Request::builder().uri("/?fecha=2025-03-10").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, session_request("GET", "/?fecha=2025-03-10", "desconocida")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_locked_session_cannot_list() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    // A failed attempt with a client-chosen id opens no session
    let (status, _) = send(&app, access_request("otra", Some("mi-sesion"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, session_request("GET", "/", "mi-sesion")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(backend.queries().is_empty());
}

#[tokio::test]
async fn test_list_and_toggle_detail() {
    let backend = Arc::new(FakeBackend::new().with_rows(
        "2025-03-10",
        vec![
            MockSupabaseResponses::consultation_row(1, "Ana Ruiz", "2025-03-10"),
            MockSupabaseResponses::consultation_row(2, "Luis Gómez", "2025-03-10"),
        ],
    ));
    let app = create_test_app(backend.clone());
    let session = open_session(&app).await;

    let (status, body) = send(&app, session_request("GET", "/?fecha=2025-03-10", &session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado"], "cargado");
    assert_eq!(body["total"], 2);
    assert_eq!(body["consultas"][0]["fecha"], "10/03/2025");
    assert!(body["expandida"].is_null());

    let (status, body) = send(&app, session_request("POST", "/2/alternar", &session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expandida"]["id"], 2);
    assert_eq!(body["expandida"]["colaborador"]["nombre"], "Luis Gómez");
    assert_eq!(body["expandida"]["archivo"], "No especificado");

    let (_, body) = send(&app, session_request("POST", "/2/alternar", &session)).await;
    assert!(body["expandida"].is_null());

    let (status, _) = send(&app, session_request("POST", "/42/alternar", &session)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_defaults_to_today() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());
    let session = open_session(&app).await;

    let (status, body) = send(&app, session_request("GET", "/", &session)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fecha"], "2025-03-10");
    assert_eq!(body["estado"], "vacio");
}

#[tokio::test]
async fn test_invalid_date_is_bad_request() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());
    let session = open_session(&app).await;

    let (status, _) = send(&app, session_request("GET", "/?fecha=10-03-2025", &session)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.queries().is_empty());
}

#[tokio::test]
async fn test_backend_failure_returns_error_snapshot() {
    let backend = Arc::new(FakeBackend::new().failing_query(FakeFailure::Unreachable));
    let app = create_test_app(backend);
    let session = open_session(&app).await;

    let (status, body) = send(&app, session_request("GET", "/?fecha=2025-03-10", &session)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["estado"], "error");
    assert_eq!(body["error"], "Error al conectar con la base de datos");
}
