use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::BackendError;
use shared_models::AppError;

pub const WRONG_PASSPHRASE_MESSAGE: &str = "Contraseña incorrecta. Intenta nuevamente.";
pub const LOCKED_MESSAGE: &str = "Ingresa la contraseña para ver las consultas.";
pub const FETCH_FAILED_MESSAGE: &str = "Error al cargar las consultas";
pub const UNREACHABLE_MESSAGE: &str = "Error al conectar con la base de datos";

#[derive(Debug, Error)]
pub enum ConsultationError {
    #[error("Failed to load consultations: {0}")]
    Fetch(#[source] BackendError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Consultation list is locked for this session")]
    Unauthorized,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Consultation {0} is not in the current list")]
    UnknownRecord(i64),
}

impl ConsultationError {
    pub fn user_message(&self) -> String {
        match self {
            ConsultationError::Fetch(cause) if cause.is_unreachable() => UNREACHABLE_MESSAGE.to_string(),
            ConsultationError::Fetch(_) => FETCH_FAILED_MESSAGE.to_string(),
            ConsultationError::Auth(message) => message.clone(),
            ConsultationError::Unauthorized => LOCKED_MESSAGE.to_string(),
            ConsultationError::InvalidDate(raw) => format!("Fecha no válida: {}", raw),
            ConsultationError::UnknownRecord(id) => format!("La consulta {} no está en la lista", id),
        }
    }
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        let message = err.user_message();
        match err {
            ConsultationError::Fetch(_) => AppError::ExternalService(message),
            ConsultationError::Auth(_) | ConsultationError::Unauthorized => AppError::Auth(message),
            ConsultationError::InvalidDate(_) => AppError::BadRequest(message),
            ConsultationError::UnknownRecord(_) => AppError::NotFound(message),
        }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ConsultationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ConsultationError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListStatus {
    /// No date has been queried yet.
    #[serde(rename = "inactivo")]
    Idle,
    #[serde(rename = "cargando")]
    Loading,
    #[serde(rename = "cargado")]
    Loaded,
    /// The query succeeded with zero records.
    #[serde(rename = "vacio")]
    Empty,
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationSummary {
    pub id: i64,
    #[serde(rename = "numero")]
    pub position: usize,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "registrado", default)]
    pub registered_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterSection {
    #[serde(rename = "empresa")]
    pub employer: String,
    #[serde(rename = "cargo")]
    pub job_title: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub email: String,
    #[serde(rename = "registrado_en")]
    pub registered_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSection {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cargo")]
    pub job_title: String,
    #[serde(rename = "numero_documento")]
    pub document_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSection {
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "estudios_solicitados")]
    pub requested_studies: String,
}

/// Expanded view of one record. Every absent optional value is rendered as
/// the "No especificado" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationDetail {
    pub id: i64,
    #[serde(rename = "solicitante")]
    pub requester: RequesterSection,
    #[serde(rename = "colaborador")]
    pub employee: EmployeeSection,
    #[serde(rename = "consulta")]
    pub appointment: AppointmentSection,
    #[serde(rename = "archivo")]
    pub attachment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSnapshot {
    #[serde(rename = "fecha")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "estado")]
    pub status: ListStatus,
    pub error: Option<String>,
    pub total: usize,
    #[serde(rename = "consultas")]
    pub consultations: Vec<ConsultationSummary>,
    #[serde(rename = "expandida")]
    pub expanded: Option<ConsultationDetail>,
}

// HTTP payloads

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub passphrase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResponse {
    #[serde(rename = "autorizado")]
    pub authorized: bool,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "fecha")]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(" 2025-03-10 ").unwrap(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_matches!(parse_date("mañana"), Err(ConsultationError::InvalidDate(_)));
    }

    #[test]
    fn test_fetch_messages_distinguish_unreachable_backend() {
        let unreachable = ConsultationError::Fetch(BackendError::Network("timeout".to_string()));
        assert_eq!(unreachable.user_message(), UNREACHABLE_MESSAGE);

        let rejected = ConsultationError::Fetch(BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(rejected.user_message(), FETCH_FAILED_MESSAGE);
    }

    #[test]
    fn test_status_serializes_in_spanish() {
        assert_eq!(serde_json::to_value(ListStatus::Empty).unwrap(), "vacio");
        assert_eq!(serde_json::to_value(ListStatus::Error).unwrap(), "error");
    }
}
