use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

const SERVICE_NAME: &str = "studyhall";
const ACCOUNT_NAME: &str = "session";

/// An opaque bearer credential issued by the identity service.
///
/// Presence of a credential never implies validity; only a successful
/// resolve confirms it. `saved_at` is recorded for diagnostics only, the
/// client enforces no local expiry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            saved_at: Utc::now(),
        }
    }
}

/// Durable storage for the current credential.
///
/// All methods are synchronous; implementations must not perform network
/// I/O. An unavailable storage medium reads as "no credential" so startup
/// fails safe toward unauthenticated.
pub trait CredentialStore: Send + Sync {
    /// Whether a credential is currently stored. No side effects.
    fn has_credential(&self) -> bool;

    /// Read the stored credential, if any. Unreadable or corrupt data is
    /// treated as absent.
    fn load(&self) -> Option<Credential>;

    /// Overwrite any existing credential. Atomic from the caller's
    /// perspective: no reader observes a partially-written value.
    fn save(&self, credential: &Credential) -> Result<()>;

    /// Remove the stored credential. Idempotent; clearing an empty store
    /// is a no-op, never an error.
    fn clear(&self) -> Result<()>;
}

/// Credential storage in the OS keychain via keyring.
///
/// The credential is serialized to JSON and stored as the entry secret
/// under a fixed service/account pair.
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_entry(SERVICE_NAME, ACCOUNT_NAME)
    }

    /// Use a non-default keychain entry, e.g. to isolate test runs.
    pub fn with_entry(service: &str, account: &str) -> Self {
        Self {
            service: service.to_string(),
            account: account.to_string(),
        }
    }

    fn entry(&self) -> keyring::Result<Entry> {
        Entry::new(&self.service, &self.account)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn has_credential(&self) -> bool {
        self.entry()
            .and_then(|entry| entry.get_password())
            .is_ok()
    }

    fn load(&self) -> Option<Credential> {
        let entry = self.entry().ok()?;
        let secret = entry.get_password().ok()?;
        match serde_json::from_str(&secret) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!(error = %e, "Stored credential is unreadable, treating as absent");
                None
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let secret =
            serde_json::to_string(credential).context("Failed to serialize credential")?;
        let entry = self.entry().context("Failed to create keyring entry")?;
        entry
            .set_password(&secret)
            .context("Failed to store credential in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let entry = self.entry().context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

/// In-process credential storage.
///
/// Used by tests and by embedding hosts that handle persistence themselves.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn has_credential(&self) -> bool {
        self.slot.lock().expect("credential slot poisoned").is_some()
    }

    fn load(&self) -> Option<Credential> {
        self.slot.lock().expect("credential slot poisoned").clone()
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock().expect("credential slot poisoned") = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().expect("credential slot poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.has_credential());
        assert!(store.load().is_none());

        let credential = Credential::new("tok-1", Some("refresh-1".to_string()));
        store.save(&credential).expect("save");

        assert!(store.has_credential());
        assert_eq!(store.load(), Some(credential));
    }

    #[test]
    fn memory_store_save_overwrites() {
        let store = MemoryStore::new();
        store.save(&Credential::new("old", None)).expect("save");
        store.save(&Credential::new("new", None)).expect("save");

        assert_eq!(store.load().expect("credential").access_token, "new");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemoryStore::new();
        store.clear().expect("clear on empty store");

        store.save(&Credential::new("tok-1", None)).expect("save");
        store.clear().expect("clear");
        store.clear().expect("second clear");
        assert!(!store.has_credential());
    }
}
