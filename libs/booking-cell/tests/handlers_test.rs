use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use booking_cell::{booking_routes, BookingState, MAX_ATTACHMENT_BYTES};
use shared_utils::test_utils::{FakeBackend, FakeFailure};
use shared_utils::FixedClock;

fn create_test_app(backend: Arc<FakeBackend>) -> Router {
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    booking_routes(Arc::new(BookingState::new(backend, clock, "archivos")))
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_submit_booking_success() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(
        app,
        json!({
            "nombre": "Ana Ruiz",
            "empresa": "Díaz Gill Laboratorios",
            "fecha": "2025-03-10",
            "motivo": "Hemograma completo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["banner"]["tipo"], "exito");
    assert_eq!(body["banner"]["texto"], "¡Tu consulta ha sido agendada exitosamente!");
    assert_eq!(body["formulario"]["nombre"], "");
    assert!(body["aviso"].is_string());

    let inserted = &backend.inserts()[0];
    assert_eq!(inserted["empresa"], "Díaz Gill Laboratorios");
    assert_eq!(inserted["motivo"], "Hemograma completo");
}

#[tokio::test]
async fn test_submit_booking_with_data_url_attachment() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, _) = post_json(
        app,
        json!({
            "nombre": "Ana Ruiz",
            "fecha": "2025-03-10",
            "archivo": { "nombre": "Radiografía.png", "datos": "data:image/png;base64,iVBORw==" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        backend.uploads(),
        vec![("archivos".to_string(), "1740787200000_Radiografia.png".to_string(), 4)]
    );
}

#[tokio::test]
async fn test_submit_booking_validation_keeps_form() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(app, json!({ "nombre": "", "email": "ana@empresa.com", "fecha": "2025-03-10" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["banner"]["tipo"], "error");
    assert_eq!(body["formulario"]["email"], "ana@empresa.com");
    assert!(body.get("aviso").is_none());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_submit_booking_unsupported_type() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(
        app,
        json!({
            "nombre": "Ana Ruiz",
            "fecha": "2025-03-10",
            "archivo": { "nombre": "nota.txt", "tipo": "text/plain", "datos": "aG9sYQ==" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["archivo"], "nota.txt");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_submit_booking_upload_failure_is_bad_gateway() {
    let backend = Arc::new(FakeBackend::new().failing_upload(FakeFailure::Unreachable));
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(
        app,
        json!({
            "nombre": "Ana Ruiz",
            "fecha": "2025-03-10",
            "archivo": { "nombre": "a.pdf", "tipo": "application/pdf", "datos": "JVBERi0xLjc=" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["banner"]["texto"], "No se pudo subir el archivo: connection refused");
    assert!(backend.inserts().is_empty());
}

#[tokio::test]
async fn test_submit_booking_rejects_bad_base64() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(
        app,
        json!({
            "nombre": "Ana Ruiz",
            "fecha": "2025-03-10",
            "archivo": { "nombre": "a.pdf", "tipo": "application/pdf", "datos": "%%%" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("base64"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_form_rules() {
    let app = create_test_app(Arc::new(FakeBackend::new()));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["fecha_minima"], "2025-03-01");
    assert_eq!(body["tamano_maximo_bytes"], 5 * 1024 * 1024);
    assert_eq!(body["tipos_permitidos"].as_array().unwrap().len(), 5);
}

fn png_booking(size: usize) -> Value {
    json!({
        "nombre": "Ana Ruiz",
        "empresa": "Díaz Gill Laboratorios",
        "fecha": "2025-03-10",
        "archivo": {
            "nombre": "tomografia.png",
            "tipo": "image/png",
            "datos": BASE64.encode(vec![0u8; size])
        }
    })
}

#[tokio::test]
async fn test_submit_booking_accepts_attachment_at_size_limit() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(app, png_booking(MAX_ATTACHMENT_BYTES)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["banner"]["tipo"], "exito");
    assert_eq!(
        backend.uploads(),
        vec![("archivos".to_string(), "1740787200000_tomografia.png".to_string(), MAX_ATTACHMENT_BYTES)]
    );
    assert_eq!(backend.inserts().len(), 1);
}

#[tokio::test]
async fn test_submit_booking_oversized_attachment_keeps_form() {
    let backend = Arc::new(FakeBackend::new());
    let app = create_test_app(backend.clone());

    let (status, body) = post_json(app, png_booking(MAX_ATTACHMENT_BYTES + 1)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["banner"]["tipo"], "error");
    assert_eq!(body["banner"]["texto"], "El archivo supera el tamaño máximo permitido de 5 MB.");
    assert_eq!(body["formulario"]["nombre"], "Ana Ruiz");
    assert_eq!(body["formulario"]["empresa"], "Díaz Gill Laboratorios");
    assert_eq!(body["archivo"], "tomografia.png");
    assert!(backend.calls().is_empty());
}
