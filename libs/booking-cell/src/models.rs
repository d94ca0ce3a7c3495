use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::BackendError;
use shared_models::{AppError, Banner, NewConsultation};

/// Upper bound for an attachment, 5 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Body limit for `POST /agendar`. The attachment travels base64 encoded
/// (4 bytes per 3) inside the JSON, next to the form fields.
pub const MAX_REQUEST_BYTES: usize = (MAX_ATTACHMENT_BYTES + 2) / 3 * 4 + 64 * 1024;

pub const MISSING_FIELDS_MESSAGE: &str = "Por favor completa el nombre y la fecha de consulta.";
pub const INVALID_DATE_MESSAGE: &str = "La fecha de consulta no es válida.";
pub const PAST_DATE_MESSAGE: &str = "La fecha de consulta no puede ser anterior a hoy.";
pub const SUCCESS_MESSAGE: &str = "¡Tu consulta ha sido agendada exitosamente!";
pub const FOLLOW_UP_NOTICE: &str =
    "Nuestro equipo se pondrá en contacto contigo en las próximas 24 horas para confirmar tu cita.";

/// Values of the booking form as typed by the user. Everything is kept as
/// entered so a failed submission can be retried without re-typing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "empresa", default)]
    pub employer: String,
    #[serde(rename = "cargo", default)]
    pub job_title: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "numero_documento", default)]
    pub document_number: String,
    #[serde(rename = "fecha", default)]
    pub requested_date: String,
    #[serde(rename = "motivo", default)]
    pub notes: String,
}

impl ConsultationRequest {
    /// Check required fields and the requested date against `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidatedRequest, SubmissionError> {
        let name = self.name.trim();
        let date = self.requested_date.trim();

        if name.is_empty() || date.is_empty() {
            return Err(SubmissionError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let requested_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| SubmissionError::Validation(INVALID_DATE_MESSAGE.to_string()))?;

        if requested_date < today {
            return Err(SubmissionError::Validation(PAST_DATE_MESSAGE.to_string()));
        }

        Ok(ValidatedRequest {
            name: name.to_string(),
            email: optional(&self.email),
            employer: optional(&self.employer),
            job_title: optional(&self.job_title),
            phone: optional(&self.phone),
            document_number: optional(&self.document_number),
            requested_date,
            notes: optional(&self.notes),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub name: String,
    pub email: Option<String>,
    pub employer: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
    pub document_number: Option<String>,
    pub requested_date: NaiveDate,
    pub notes: Option<String>,
}

impl ValidatedRequest {
    pub fn into_record(self, attachment_url: Option<String>) -> NewConsultation {
        NewConsultation {
            name: self.name,
            email: self.email,
            employer: self.employer,
            job_title: self.job_title,
            phone: self.phone,
            document_number: self.document_number,
            requested_date: self.requested_date,
            notes: self.notes,
            attachment_url,
        }
    }
}

/// A file chosen in the form, not yet screened.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaType {
    Pdf,
    Docx,
    Xlsx,
    Png,
    Jpeg,
}

impl MediaType {
    pub const ALL: [MediaType; 5] = [
        MediaType::Pdf,
        MediaType::Docx,
        MediaType::Xlsx,
        MediaType::Png,
        MediaType::Jpeg,
    ];

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            MediaType::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
        }
    }

    /// Case-insensitive match on the essence of a MIME type; parameters such
    /// as `; charset=` are ignored.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        Self::ALL.into_iter().find(|media_type| media_type.mime() == essence)
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {size} bytes (max {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(#[source] BackendError),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[source] BackendError),
}

impl SubmissionError {
    /// Short text for the failure banner, with the backend cause when known.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(message) => message.clone(),
            SubmissionError::UnsupportedFileType(_) => {
                "Tipo de archivo no permitido. Solo se aceptan PDF, DOCX, XLSX, PNG o JPG.".to_string()
            }
            SubmissionError::FileTooLarge { .. } => {
                "El archivo supera el tamaño máximo permitido de 5 MB.".to_string()
            }
            SubmissionError::UploadFailed(cause) => with_cause("No se pudo subir el archivo", cause),
            SubmissionError::PersistenceFailed(cause) => {
                with_cause("No se pudo agendar la consulta", cause)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubmissionError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SubmissionError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            SubmissionError::UploadFailed(_) | SubmissionError::PersistenceFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

fn with_cause(prefix: &str, cause: &BackendError) -> String {
    let cause = cause.cause().trim();
    if cause.is_empty() {
        format!("{}.", prefix)
    } else {
        format!("{}: {}", prefix, cause)
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        let message = err.user_message();
        match err {
            SubmissionError::Validation(_) => AppError::ValidationError(message),
            SubmissionError::UnsupportedFileType(_) => AppError::UnsupportedMediaType(message),
            SubmissionError::FileTooLarge { .. } => AppError::PayloadTooLarge(message),
            SubmissionError::UploadFailed(_) | SubmissionError::PersistenceFailed(_) => {
                AppError::ExternalService(message)
            }
        }
    }
}

// HTTP payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentPayload {
    #[serde(rename = "nombre")]
    pub file_name: String,
    /// Declared media type; taken from the data URL when omitted.
    #[serde(rename = "tipo", default)]
    pub media_type: Option<String>,
    /// Base64 content, optionally as a `data:<mime>;base64,` URL.
    #[serde(rename = "datos")]
    pub file_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPayload {
    #[serde(flatten)]
    pub request: ConsultationRequest,
    #[serde(rename = "archivo", default)]
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub banner: Banner,
    /// Form values after the submission: cleared on success, kept on failure.
    #[serde(rename = "formulario")]
    pub form: ConsultationRequest,
    /// Name of the attachment still held by the form, if any.
    #[serde(rename = "archivo", default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(rename = "aviso", default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRules {
    #[serde(rename = "fecha_minima")]
    pub min_date: NaiveDate,
    #[serde(rename = "tipos_permitidos")]
    pub permitted_types: Vec<String>,
    #[serde(rename = "tamano_maximo_bytes")]
    pub max_attachment_bytes: usize,
}
