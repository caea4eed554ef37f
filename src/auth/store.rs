//! Credential persistence.
//!
//! A small key/value abstraction over the values the session keeps across
//! reloads: the credential pair plus provider-specific auxiliary state. All
//! operations are infallible from the caller's point of view; backends that
//! cannot persist log and carry on, so the session works in environments
//! without storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

pub const ACCESS_TOKEN: &str = "access_token";
pub const RENEWAL_TOKEN: &str = "renewal_token";
pub const PROVIDER_ID_TOKEN: &str = "provider_id_token";
pub const FORCE_FRESH_LOGIN: &str = "force_fresh_login";
pub const PENDING_REDIRECT: &str = "pending_redirect";
pub const PKCE_VERIFIER: &str = "pkce_verifier";

/// Key/value persistence for session credentials and auxiliary login state.
///
/// Absence of a key is never an error; it reads back as `None`.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Store for environments without persistent storage. Writes are discarded.
#[derive(Debug, Default)]
pub struct NoopStore;

impl CredentialStore for NoopStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

/// JSON-file-backed store used by the CLI.
///
/// The whole map is rewritten on every change; disk failures are logged and
/// otherwise ignored so a read-only filesystem degrades to an in-memory
/// session instead of breaking login.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStore {
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = Self::load(&path);
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(data) => data,
            Err(err) => {
                warn!("ignoring unreadable session file {}: {err}", path.display());
                HashMap::new()
            }
        }
    }

    fn persist(&self, data: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!("cannot create session directory {}: {err}", parent.display());
                return;
            }
        }
        let json = match serde_json::to_string_pretty(data) {
            Ok(json) => json,
            Err(err) => {
                warn!("cannot encode session file: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, json) {
            warn!("cannot write session file {}: {err}", self.path.display());
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_string(), value.to_string());
        self.persist(&data);
    }

    fn remove(&self, key: &str) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        if data.remove(key).is_some() {
            self.persist(&data);
        }
    }
}
