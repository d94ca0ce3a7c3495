use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::debug;

use shared_models::AppError;

use crate::form::BookingForm;
use crate::models::{
    Attachment, AttachmentPayload, BookingPayload, BookingResponse, FormRules, MediaType,
    FOLLOW_UP_NOTICE, MAX_ATTACHMENT_BYTES,
};
use crate::router::BookingState;

#[axum::debug_handler]
pub async fn get_form_rules(State(state): State<Arc<BookingState>>) -> Json<FormRules> {
    Json(FormRules {
        min_date: state.service.clock().today(),
        permitted_types: MediaType::ALL.iter().map(|t| t.mime().to_string()).collect(),
        max_attachment_bytes: MAX_ATTACHMENT_BYTES,
    })
}

#[axum::debug_handler]
pub async fn submit_booking(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<BookingPayload>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let attachment = payload.attachment.map(decode_attachment).transpose()?;
    let mut form = BookingForm::with_values(payload.request, attachment);

    let status = match form.submit(&state.service).await {
        Ok(()) => StatusCode::CREATED,
        Err(e) => e.status(),
    };

    let banner = form
        .banner()
        .cloned()
        .ok_or_else(|| AppError::Internal("Submission finished without an outcome".to_string()))?;
    let notice = banner.is_success().then(|| FOLLOW_UP_NOTICE.to_string());

    Ok((
        status,
        Json(BookingResponse {
            banner,
            attachment: form.attachment.as_ref().map(|a| a.file_name.clone()),
            form: form.request,
            notice,
        }),
    ))
}

fn decode_attachment(payload: AttachmentPayload) -> Result<Attachment, AppError> {
    let AttachmentPayload {
        file_name,
        media_type,
        file_data,
    } = payload;

    // Accept both raw base64 and "data:<mime>;base64,<data>"
    let (declared, encoded) = match file_data
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
    {
        Some((mime, data)) => (Some(mime.to_string()), data),
        None => (None, file_data.as_str()),
    };

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| AppError::BadRequest(format!("El archivo adjunto no es base64 válido: {}", e)))?;

    let media_type = media_type.or(declared).unwrap_or_default();
    debug!("Decoded attachment {} ({} bytes, {})", file_name, bytes.len(), media_type);

    Ok(Attachment::new(file_name, media_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_raw_base64() {
        let attachment = decode_attachment(AttachmentPayload {
            file_name: "informe.pdf".to_string(),
            media_type: Some("application/pdf".to_string()),
            file_data: "JVBERi0xLjc=".to_string(),
        })
        .unwrap();

        assert_eq!(attachment.bytes, b"%PDF-1.7");
        assert_eq!(attachment.media_type, "application/pdf");
    }

    #[test]
    fn test_decode_data_url_uses_embedded_type() {
        let attachment = decode_attachment(AttachmentPayload {
            file_name: "foto.png".to_string(),
            media_type: None,
            file_data: "data:image/png;base64,iVBORw==".to_string(),
        })
        .unwrap();

        assert_eq!(attachment.media_type, "image/png");
        assert_eq!(attachment.size(), 4);
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        let result = decode_attachment(AttachmentPayload {
            file_name: "x.pdf".to_string(),
            media_type: Some("application/pdf".to_string()),
            file_data: "***".to_string(),
        });

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
