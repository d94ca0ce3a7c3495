use thiserror::Error;

/// Failures reported by the managed backend or by the transport to it.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Backend client misconfigured: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Text worth showing to a user, without the variant prefix.
    pub fn cause(&self) -> &str {
        match self {
            BackendError::Api { message, .. } => message,
            BackendError::Network(msg)
            | BackendError::Decode(msg)
            | BackendError::Configuration(msg) => msg,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
