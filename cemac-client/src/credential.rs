// cemac-client/src/credential.rs
// Session credential storage - JSON file

use serde::{Deserialize, Serialize};
use shared::models::User;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Default credential file name
pub const CREDENTIAL_FILE: &str = "session.json";

/// Logged-in session: bearer token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub auth_token: String,
    pub user: User,
    /// When the session was stored (Unix millis)
    pub saved_at: i64,
}

impl Credential {
    pub fn new(auth_token: String, user: User) -> Self {
        Self {
            auth_token,
            user,
            saved_at: shared::util::now_millis(),
        }
    }
}

/// Credential storage
#[derive(Debug, Clone)]
pub struct CredentialStorage {
    path: PathBuf,
}

impl CredentialStorage {
    /// Create credential storage at `base_path/filename`
    pub fn new(base_path: impl Into<PathBuf>, filename: &str) -> Self {
        let path = base_path.into().join(filename);
        Self { path }
    }

    /// Ensure the parent directory exists
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Save credential
    pub fn save(&self, credential: &Credential) -> std::io::Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, json)
    }

    /// Load credential; a corrupt file is treated as no session
    pub fn load(&self) -> Option<Credential> {
        if !self.path.exists() {
            return None;
        }
        let json = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&json) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable credential file");
                None
            }
        }
    }

    /// Check whether a credential exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete credential
    pub fn delete(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Storage path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Bearer token shared between the HTTP client and [`crate::AuthService`]
#[derive(Debug, Clone, Default)]
pub struct SharedToken(Arc<RwLock<Option<String>>>);

impl SharedToken {
    pub fn new(token: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(token)))
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn is_set(&self) -> bool {
        self.0.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}
