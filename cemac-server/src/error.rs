//! Server error type
//!
//! Rendered as the same `{ "success": false, "error": ... }` envelope the
//! remote API uses, so the POS client parses both alike.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use shared::response::ApiResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("El asistente JAVI no está configurado en el servidor")]
    AssistantDisabled,

    #[error("El servicio externo no respondió a tiempo")]
    Timeout,

    #[error("Servicio externo no disponible: {0}")]
    Upstream(String),

    #[error("El servicio externo respondió {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::AssistantDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) | Self::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(e.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
