#![warn(missing_docs)]
//! # criadouro-session
//!
//! ## Purpose
//! Persists the authenticated session (opaque token + minimal user profile)
//! and composes the authorization headers attached to backend calls.
//!
//! ## Responsibilities
//! - Store/retrieve/clear the token and profile through an injectable
//!   key-value storage backend.
//! - Compose request headers: `Authorization` is present iff a token is
//!   stored, never sent blank.
//! - Synthesize a local session token for backends that omit one at login.
//!
//! ## Data flow
//! Login flow calls [`Session::save`] -> gateways call
//! [`Session::auth_headers`] per request -> logout calls [`Session::clear`].
//!
//! ## Ownership and lifetimes
//! The session owns an `Arc<dyn SessionStorage>` so one storage backend can
//! back multiple gateway handles without lifetime coupling.
//!
//! ## Error model
//! Storage failures and invalid saves surface as [`SessionError`] variants.
//!
//! ## Security and privacy notes
//! Token values are never logged by this crate; callers must treat header
//! lists as sensitive. Local storage carries no schema version, matching the
//! two-key layout of the device store it replaces.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key for the opaque bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "auth_user";

/// Length of locally synthesized session tokens.
const LOCAL_TOKEN_LEN: usize = 32;

/// Minimal user profile persisted alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend-assigned user identifier.
    pub id: u64,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Abstract key-value backend for session persistence.
pub trait SessionStorage: Send + Sync {
    /// Reads one stored value.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] when the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Writes one value.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] when the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Deletes one value; deleting an absent key is not an error.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] when the backend cannot be written.
    fn delete(&self, key: &str) -> Result<(), SessionError>;
}

/// In-memory storage backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SessionError::Storage("session store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SessionError::Storage("session store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SessionError::Storage("session store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed storage: one JSON object holding the session keys.
///
/// # Notes
/// The file carries no schema version. Reads of a missing file behave as an
/// empty store.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Creates a backend persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|error| SessionError::Storage(format!("corrupt session file: {error}"))),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(error) => Err(SessionError::Storage(format!(
                "session file read failed: {error}"
            ))),
        }
    }

    fn store(&self, entries: &HashMap<String, String>) -> Result<(), SessionError> {
        let raw = serde_json::to_string(entries)
            .map_err(|error| SessionError::Storage(format!("session encode failed: {error}")))?;
        fs::write(&self.path, raw)
            .map_err(|error| SessionError::Storage(format!("session file write failed: {error}")))
    }
}

impl SessionStorage for FileSessionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Storage("session file lock poisoned".to_string()))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Storage("session file lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), SessionError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| SessionError::Storage("session file lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        entries.remove(key);
        self.store(&entries)
    }
}

/// Explicit session context passed to every gateway call.
pub struct Session {
    storage: std::sync::Arc<dyn SessionStorage>,
}

impl Session {
    /// Creates a session context over the given storage backend.
    pub fn new(storage: std::sync::Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Persists the token and profile, replacing any previous session.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidToken`] for blank tokens and
    /// [`SessionError::Storage`] for backend failures.
    pub fn save(&self, token: &str, profile: &UserProfile) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::InvalidToken);
        }

        let encoded = serde_json::to_string(profile)
            .map_err(|error| SessionError::Storage(format!("profile encode failed: {error}")))?;
        self.storage.write(TOKEN_KEY, token)?;
        self.storage.write(USER_KEY, &encoded)
    }

    /// Returns the stored token, if any.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] for backend failures.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        self.storage.read(TOKEN_KEY)
    }

    /// Returns the stored profile, if any.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] for backend failures or a corrupt
    /// profile entry.
    pub fn user(&self) -> Result<Option<UserProfile>, SessionError> {
        match self.storage.read(USER_KEY)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|error| SessionError::Storage(format!("corrupt profile entry: {error}"))),
        }
    }

    /// Returns `true` when a token is currently stored.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] for backend failures.
    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.token()?.is_some())
    }

    /// Removes both session keys. Clearing an absent session is a no-op.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] for backend failures.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.storage.delete(TOKEN_KEY)?;
        self.storage.delete(USER_KEY)
    }

    /// Composes headers for backend requests.
    ///
    /// # Semantics
    /// Always includes `Content-Type: application/json`. Includes
    /// `Authorization: Bearer <token>` iff a token is stored; the key is
    /// entirely absent otherwise, so a blank bearer value is never sent.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] for backend failures.
    pub fn auth_headers(&self) -> Result<Vec<(String, String)>, SessionError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.token()? {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        Ok(headers)
    }
}

/// Synthesizes a local session token for login responses that omit one.
pub fn synthesize_local_token<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(Alphanumeric)
        .take(LOCAL_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Session persistence and composition errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token was blank and will not be stored.
    #[error("session token is blank and will not be stored")]
    InvalidToken,
    /// Storage backend failure.
    #[error("session storage failure: {0}")]
    Storage(String),
}
