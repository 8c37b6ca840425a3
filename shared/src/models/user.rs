//! User and auth DTOs

use serde::{Deserialize, Serialize};

/// Dashboard user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten, with = "crate::types::record_id")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "username", alias = "displayName")]
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_role() -> String {
    "vendedor".to_string()
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// Name printed on sales (`vendedor`)
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: User,
}

/// Register request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Token verification result (GET /auth/verify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub user: Option<User>,
}

/// Update user payload (PUT /auth/users/:id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
