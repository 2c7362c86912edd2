//! Session persistence: bearer token and current user.
//!
//! # Design
//! `SessionStore` is an explicit session context that each collaborator
//! receives, instead of a process-wide local storage. It owns a
//! `KeyValueStore` backend and a `Notifier`. Reads never fail: an absent or
//! unreadable value is reported through the notifier and returned as `None`.
//! Writes go to the backend sequentially (user first, then token) and surface
//! backend errors to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::notify::Notifier;
use crate::types::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "currentUser";

pub const MISSING_TOKEN_NOTICE: &str = "Authentication token is missing.";
pub const MISSING_USER_NOTICE: &str = "User information is missing.";

/// String key-value storage that survives between runs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile store, for tests and short-lived hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, read once at open and written through on every
/// change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(StoreError::Corrupt)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "opened session file");
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries).map_err(StoreError::Encode)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The `{token, currentUser}` pair for one signed-in user.
#[derive(Debug)]
pub struct SessionStore<S, N> {
    store: S,
    notifier: N,
}

impl<S: KeyValueStore, N: Notifier> SessionStore<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// The stored bearer token. Notifies once when there is none.
    pub fn get_token(&self) -> Option<String> {
        let token = self.store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        if token.is_none() {
            self.notifier.notify(MISSING_TOKEN_NOTICE);
        }
        token
    }

    /// The stored current user. Notifies once when there is none or the
    /// record cannot be parsed.
    pub fn get_user(&self) -> Option<User> {
        let user = self.store.get(USER_KEY).and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user record is unreadable");
                None
            }
        });
        if user.is_none() {
            self.notifier.notify(MISSING_USER_NOTICE);
        }
        user
    }

    pub fn set_session(&mut self, token: &str, user: &User) -> Result<(), StoreError> {
        self.set_user(user)?;
        self.store.set(TOKEN_KEY, token)?;
        debug!(user = %user.name, "session stored");
        Ok(())
    }

    /// Overwrite the stored user, keeping the token.
    pub fn set_user(&mut self, user: &User) -> Result<(), StoreError> {
        let raw = serde_json::to_string(user).map_err(StoreError::Encode)?;
        self.store.set(USER_KEY, &raw)
    }

    pub fn clear_session(&mut self) -> Result<(), StoreError> {
        self.store.remove(USER_KEY)?;
        self.store.remove(TOKEN_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn into_parts(self) -> (S, N) {
        (self.store, self.notifier)
    }
}
