//! Passphrase gate for the consultation list.
//!
//! This is a UI speed bump, not access control: the passphrase is a constant
//! shipped with the client, compared in plain text, with no lockout or rate
//! limiting. Anyone who can read the client can read the list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::models::WRONG_PASSPHRASE_MESSAGE;

pub const ACCESS_PASSPHRASE: &str = "medcheck";
pub const AUTH_STORAGE_KEY: &str = "verConsultasAuth";

/// Key/value storage scoped to one browser session.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.insert(key.to_string(), value.to_string());
    }
}

/// Holds the session authorization flag. The flag starts from whatever the
/// session storage remembers and only `authorize` can raise it.
pub struct AccessGate {
    authorized: bool,
    error: Option<String>,
    storage: Arc<dyn SessionStorage>,
}

impl AccessGate {
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let authorized = storage.get_item(AUTH_STORAGE_KEY).as_deref() == Some("true");
        Self {
            authorized,
            error: None,
            storage,
        }
    }

    pub fn authorize(&mut self, passphrase: &str) -> bool {
        self.clear_error();

        if passphrase.trim() == ACCESS_PASSPHRASE {
            self.storage.set_item(AUTH_STORAGE_KEY, "true");
            self.authorized = true;
            info!("Consultation list unlocked for session");
            true
        } else {
            warn!("Rejected consultation list passphrase");
            self.error = Some(WRONG_PASSPHRASE_MESSAGE.to_string());
            false
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> (AccessGate, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        (AccessGate::restore(storage.clone()), storage)
    }

    #[test]
    fn test_matching_passphrase_unlocks_and_persists() {
        let (mut gate, storage) = gate();
        assert!(!gate.is_authorized());

        assert!(gate.authorize("medcheck"));
        assert!(gate.is_authorized());
        assert_eq!(gate.error(), None);
        assert_eq!(storage.get_item(AUTH_STORAGE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_passphrase_is_trimmed() {
        let (mut gate, _) = gate();
        assert!(gate.authorize("  medcheck\n"));
    }

    #[test]
    fn test_mismatch_sets_error_and_keeps_flag() {
        for attempt in ["Medcheck", " ", "", "medcheck1", "MEDCHECK"] {
            let (mut gate, storage) = gate();

            assert!(!gate.authorize(attempt));
            assert!(!gate.is_authorized());
            assert_eq!(gate.error(), Some(WRONG_PASSPHRASE_MESSAGE));
            assert_eq!(storage.get_item(AUTH_STORAGE_KEY), None);
        }
    }

    #[test]
    fn test_failed_attempt_after_unlock_keeps_access() {
        let (mut gate, _) = gate();
        gate.authorize("medcheck");

        assert!(!gate.authorize("otra"));
        assert!(gate.is_authorized());
        assert!(gate.error().is_some());

        gate.clear_error();
        assert_eq!(gate.error(), None);
    }

    #[test]
    fn test_restore_reads_session_storage() {
        let storage = Arc::new(MemorySessionStorage::new());
        AccessGate::restore(storage.clone()).authorize("medcheck");

        // Same session, new screen instance
        let reloaded = AccessGate::restore(storage);
        assert!(reloaded.is_authorized());
    }

    #[test]
    fn test_restore_ignores_other_values() {
        let storage = Arc::new(MemorySessionStorage::new());
        storage.set_item(AUTH_STORAGE_KEY, "yes");
        assert!(!AccessGate::restore(storage).is_authorized());
    }
}
