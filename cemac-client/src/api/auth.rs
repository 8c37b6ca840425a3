//! `/auth/*` endpoints

use async_trait::async_trait;
use reqwest::Method;
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, User, VerifyResponse};
use shared::response::MaybeWrapped;

use super::{CemacClient, unwrap_data};
use crate::http::HttpClient;
use crate::{ClientError, ClientResult};

/// The login endpoint answers `{token, user}`, `{success, token, user}` or
/// `{success, data: {token, user}}`; failures carry only a message.
fn parse_login(value: serde_json::Value) -> ClientResult<LoginResponse> {
    let payload = match value.get("data") {
        Some(data) if data.get("token").is_some() || data.get("accessToken").is_some() => {
            data.clone()
        }
        _ => value.clone(),
    };
    serde_json::from_value(payload).map_err(|_| {
        let message = value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .unwrap_or("Credenciales inválidas")
            .to_string();
        ClientError::Unauthorized(message)
    })
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse>;
    async fn logout(&self) -> ClientResult<()>;
    async fn verify(&self) -> ClientResult<VerifyResponse>;
    async fn register(&self, request: &RegisterRequest) -> ClientResult<User>;
}

#[async_trait]
impl<H: HttpClient> AuthApi for CemacClient<H> {
    async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let value: serde_json::Value = self
            .auth
            .request(
                Method::POST,
                "/auth/login",
                &[],
                Some(&req),
                Some(self.login_timeout),
            )
            .await?;
        parse_login(value)
    }

    async fn logout(&self) -> ClientResult<()> {
        let _: serde_json::Value = self.auth.post_empty("/auth/logout").await?;
        Ok(())
    }

    async fn verify(&self) -> ClientResult<VerifyResponse> {
        let value: serde_json::Value = self.auth.get("/auth/verify").await?;
        let payload = value.get("data").cloned().unwrap_or_else(|| value.clone());
        let mut verified: VerifyResponse = serde_json::from_value(payload)?;
        if value.get("success").and_then(|s| s.as_bool()) == Some(true) {
            verified.valid = true;
        }
        Ok(verified)
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<User> {
        let resp: MaybeWrapped<User> = self.auth.post("/auth/register", request).await?;
        unwrap_data(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_shapes() {
        let user = serde_json::json!({"id": "u1", "email": "caja@cemac.mx", "name": "Caja"});

        let flat = serde_json::json!({"token": "t1", "user": user});
        assert_eq!(parse_login(flat).unwrap().token, "t1");

        let flagged = serde_json::json!({"success": true, "token": "t2", "user": user});
        assert_eq!(parse_login(flagged).unwrap().token, "t2");

        let nested = serde_json::json!({"success": true, "data": {"accessToken": "t3", "user": user}});
        assert_eq!(parse_login(nested).unwrap().token, "t3");

        let failed = serde_json::json!({"success": false, "message": "Contraseña incorrecta"});
        match parse_login(failed) {
            Err(ClientError::Unauthorized(msg)) => assert_eq!(msg, "Contraseña incorrecta"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
