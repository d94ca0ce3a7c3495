use serde::{Deserialize, Serialize};

/// Outcome message shown after a user action. Banners are not dismissed
/// automatically; they stay until the next action replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(rename = "tipo")]
    pub kind: BannerKind,
    #[serde(rename = "texto")]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerKind {
    #[serde(rename = "exito")]
    Success,
    #[serde(rename = "error")]
    Error,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == BannerKind::Success
    }
}
