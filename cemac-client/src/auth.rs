//! Session management
//!
//! Keeps the bearer token and the logged-in user in [`CredentialStorage`] and
//! in the [`SharedToken`] read by the HTTP transport.

use std::sync::Arc;

use shared::models::{RegisterRequest, User};

use crate::api::AuthApi;
use crate::credential::{Credential, CredentialStorage, SharedToken};
use crate::{ClientError, ClientResult};

/// Login / logout / verification over an [`AuthApi`]
pub struct AuthService<A> {
    api: Arc<A>,
    storage: CredentialStorage,
    token: SharedToken,
}

impl<A: AuthApi> AuthService<A> {
    /// Create the service, restoring a stored session if there is one
    pub fn new(api: Arc<A>, storage: CredentialStorage, token: SharedToken) -> Self {
        if let Some(credential) = storage.load() {
            tracing::debug!(user = %credential.user.email, "Restored stored session");
            token.set(credential.auth_token);
        }
        Self {
            api,
            storage,
            token,
        }
    }

    /// Log in and persist the session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let response = match self.api.login(email, password).await {
            Ok(r) => r,
            Err(ClientError::Timeout(msg)) => {
                tracing::warn!(email, "Login timed out");
                return Err(ClientError::Timeout(msg));
            }
            Err(e) => {
                tracing::warn!(email, error = %e, "Login failed");
                return Err(e);
            }
        };

        let credential = Credential::new(response.token, response.user);
        self.storage.save(&credential)?;
        self.token.set(credential.auth_token.clone());
        tracing::info!(user = %credential.user.email, role = %credential.user.role, "Logged in");
        Ok(credential.user)
    }

    /// Log out; the local session is dropped even when the remote call fails
    pub async fn logout(&self) -> ClientResult<()> {
        if self.token.is_set()
            && let Err(e) = self.api.logout().await
        {
            tracing::warn!(error = %e, "Remote logout failed, clearing local session anyway");
        }
        self.invalidate();
        tracing::info!("Logged out");
        Ok(())
    }

    /// Drop the local session without calling the server (forced logout)
    pub fn invalidate(&self) {
        self.token.clear();
        if let Err(e) = self.storage.delete() {
            tracing::error!(path = %self.storage.path().display(), error = %e, "Failed to delete credential file");
        }
    }

    /// Check the stored token against the server
    ///
    /// Returns `Ok(false)` and drops the session when the server rejects it.
    pub async fn verify(&self) -> ClientResult<bool> {
        if !self.token.is_set() {
            return Ok(false);
        }
        match self.api.verify().await {
            Ok(v) if v.valid => Ok(true),
            Ok(_) | Err(ClientError::Unauthorized(_)) => {
                tracing::info!("Stored session rejected by server");
                self.invalidate();
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Register a new dashboard user
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let user = self.api.register(request).await?;
        tracing::info!(email = %user.email, "User registered");
        Ok(user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_set()
    }

    /// User of the stored session
    pub fn current_user(&self) -> Option<User> {
        if !self.token.is_set() {
            return None;
        }
        self.storage.load().map(|c| c.user)
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }
}
