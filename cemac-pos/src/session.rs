//! Login state
//!
//! [`Session`] validates credentials locally before calling the auth API.
//! Services depend on the narrower [`SessionGuard`]: they need the current
//! user and a way to force a logout when the server answers 401.

use std::sync::Arc;

use cemac_client::{AuthApi, AuthService, ClientError, ClientResult, CredentialStorage, SharedToken};
use shared::models::{RegisterRequest, User};

use crate::error::{PosError, PosResult};
use crate::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, validate_email, validate_required_text,
};

/// What services need from the session
pub trait SessionGuard: Send + Sync {
    fn current_user(&self) -> Option<User>;

    /// Drop the local session after the server rejected the token
    fn expire(&self);

    fn require_user(&self) -> PosResult<User> {
        self.current_user().ok_or(PosError::NotAuthenticated)
    }
}

/// Map a remote result, forcing a logout on 401
pub fn guard<T>(session: &dyn SessionGuard, result: ClientResult<T>) -> PosResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ClientError::Unauthorized(message)) => {
            tracing::warn!(%message, "Token rejected by server, forcing logout");
            session.expire();
            Err(PosError::SessionExpired)
        }
        Err(e) => Err(PosError::Client(e)),
    }
}

pub struct Session<A> {
    auth: AuthService<A>,
}

impl<A: AuthApi> Session<A> {
    pub fn new(api: Arc<A>, storage: CredentialStorage, token: SharedToken) -> Self {
        Self {
            auth: AuthService::new(api, storage, token),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> PosResult<User> {
        let email = email.trim();
        validate_email(email)?;
        if password.is_empty() {
            return Err(PosError::validation("La contraseña es obligatoria"));
        }
        Ok(self.auth.login(email, password).await?)
    }

    pub async fn logout(&self) -> PosResult<()> {
        Ok(self.auth.logout().await?)
    }

    /// Check the stored session with the server
    pub async fn verify(&self) -> PosResult<bool> {
        Ok(self.auth.verify().await?)
    }

    pub async fn register(&self, request: RegisterRequest) -> PosResult<User> {
        validate_required_text(&request.name, "Nombre", MAX_NAME_LEN)?;
        validate_email(&request.email)?;
        let len = request.password.chars().count();
        if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
            return Err(PosError::validation(format!(
                "La contraseña debe tener entre {MIN_PASSWORD_LEN} y {MAX_PASSWORD_LEN} caracteres"
            )));
        }
        Ok(self.auth.register(&request).await?)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn auth(&self) -> &AuthService<A> {
        &self.auth
    }
}

impl<A: AuthApi> SessionGuard for Session<A> {
    fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    fn expire(&self) {
        self.auth.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::models::{LoginResponse, VerifyResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingAuth {
        calls: AtomicUsize,
    }

    fn user() -> User {
        User {
            id: "u1".into(),
            email: "caja@cemac.mx".into(),
            name: "Caja 1".into(),
            role: "vendedor".into(),
            active: true,
        }
    }

    #[async_trait]
    impl AuthApi for CountingAuth {
        async fn login(&self, _email: &str, _password: &str) -> ClientResult<LoginResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LoginResponse {
                token: "tok".into(),
                user: user(),
            })
        }
        async fn logout(&self) -> ClientResult<()> {
            Err(ClientError::Api {
                status: 500,
                message: "down".into(),
            })
        }
        async fn verify(&self) -> ClientResult<VerifyResponse> {
            Err(ClientError::Unauthorized("expired".into()))
        }
        async fn register(&self, _request: &RegisterRequest) -> ClientResult<User> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(user())
        }
    }

    fn session(dir: &std::path::Path) -> (Session<CountingAuth>, Arc<CountingAuth>) {
        let api = Arc::new(CountingAuth::default());
        let storage = CredentialStorage::new(dir, "session.json");
        (Session::new(api.clone(), storage, SharedToken::default()), api)
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_server() {
        let dir = tempfile::tempdir().unwrap();
        let (session, api) = session(dir.path());

        assert!(session.login("no-es-correo", "x").await.is_err());
        assert!(session.login("caja@cemac.mx", "").await.is_err());
        let short = RegisterRequest {
            name: "Caja".into(),
            email: "caja@cemac.mx".into(),
            password: "123".into(),
            role: None,
        };
        assert!(matches!(session.register(short).await, Err(PosError::Validation(_))));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) = session(dir.path());

        session.login(" caja@cemac.mx ", "secreto").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.require_user().unwrap().email, "caja@cemac.mx");

        // remote logout fails, local session is still dropped
        session.logout().await.unwrap();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_user(), Err(PosError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_guard_expires_on_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) = session(dir.path());
        session.login("caja@cemac.mx", "secreto").await.unwrap();

        let ok: PosResult<u8> = guard(&session, Ok(1));
        assert_eq!(ok.unwrap(), 1);

        let not_found: PosResult<()> = guard(&session, Err(ClientError::NotFound("x".into())));
        assert!(matches!(not_found, Err(PosError::Client(_))));
        assert!(session.is_authenticated());

        let expired: PosResult<()> = guard(&session, Err(ClientError::Unauthorized("t".into())));
        assert!(matches!(expired, Err(PosError::SessionExpired)));
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_verify_rejected_drops_session() {
        let dir = tempfile::tempdir().unwrap();
        let (session, _) = session(dir.path());
        session.login("caja@cemac.mx", "secreto").await.unwrap();
        assert!(!session.verify().await.unwrap());
        assert!(!session.is_authenticated());
    }
}
