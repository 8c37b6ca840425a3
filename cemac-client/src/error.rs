//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection refused, DNS, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Request exceeded its client-side timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required or token rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied (403)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by server-side validation (400/422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local credential storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Client misconfigured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}

impl ClientError {
    /// Whether the session must be dropped
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// HTTP status equivalent, used when relaying errors (408 for timeouts)
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Timeout(_) => Some(408),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Validation(_) => Some(400),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Timeout(_) => {
                "El servidor tardó demasiado en responder. Intenta de nuevo.".to_string()
            }
            ClientError::Http(_) => "No se pudo conectar con el servidor.".to_string(),
            ClientError::Unauthorized(_) => {
                "Tu sesión expiró. Inicia sesión nuevamente.".to_string()
            }
            ClientError::Forbidden(msg)
            | ClientError::NotFound(msg)
            | ClientError::Validation(msg)
            | ClientError::InvalidResponse(msg)
            | ClientError::Api { message: msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
