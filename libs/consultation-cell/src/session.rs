use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use headers::{Error as HeaderError, Header};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_utils::Clock;

use crate::browser::ConsultationBrowser;
use crate::models::ConsultationError;
use crate::services::access::MemorySessionStorage;
use crate::services::listing::ConsultationQueryService;

static SESSION_ID_HEADER: HeaderName = HeaderName::from_static("x-session-id");

/// `X-Session-Id`: identifies the browser session that owns a
/// consultation list and its access flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Header for SessionId {
    fn name() -> &'static HeaderName {
        &SESSION_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let id = value.to_str().map_err(|_| HeaderError::invalid())?.trim();

        if id.is_empty() {
            return Err(HeaderError::invalid());
        }

        Ok(SessionId(id.to_string()))
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Live sessions, each with its own session storage and list view.
///
/// A session enters the registry only after its passphrase matched, and stays
/// for the lifetime of the process; nothing expires it. Its storage is created
/// with it, so a session stays unlocked because the registry keeps the same
/// browser, not because `AccessGate::restore` finds an earlier flag.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ConsultationBrowser>>>,
    service: Arc<ConsultationQueryService>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(service: Arc<ConsultationQueryService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            service,
            clock,
        }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<ConsultationBrowser>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Check `passphrase` against the live session `requested`, or against a
    /// fresh one when the id is absent or unknown. The fresh session is only
    /// registered when the passphrase matched.
    pub async fn authorize(
        &self,
        requested: Option<String>,
        passphrase: &str,
    ) -> Result<(String, Arc<ConsultationBrowser>), ConsultationError> {
        if let Some(id) = requested.as_deref() {
            if let Some(browser) = self.get(id).await {
                browser.authorize(passphrase).await?;
                return Ok((id.to_string(), browser));
            }
        }

        let browser = Arc::new(ConsultationBrowser::new(
            self.service.clone(),
            self.clock.clone(),
            Arc::new(MemorySessionStorage::new()),
        ));
        browser.authorize(passphrase).await?;

        let id = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone(), browser.clone());
        debug!("Opened consultation session {}", id);

        Ok((id, browser))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
