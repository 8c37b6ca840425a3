//! POS error types
//!
//! | Kind | Origin | Surfaced as |
//! |------|--------|-------------|
//! | Validation, EmptyCart, StockExceeded, ... | checked locally, no request sent | inline notification |
//! | Client | remote call failed | notification with the server message |
//! | SessionExpired | remote call answered 401 | forced logout, back to login |

use cemac_client::ClientError;
use shared::models::SaleStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosError {
    // ========== Local validation ==========
    /// Invalid user input
    #[error("{0}")]
    Validation(String),

    /// Submit attempted with no products
    #[error("El carrito está vacío")]
    EmptyCart,

    /// Product has no stock left
    #[error("{0} no tiene stock disponible")]
    OutOfStock(String),

    /// Quantity would exceed the product's stock
    #[error("Solo hay {max} unidades disponibles de {product}")]
    StockExceeded { product: String, max: u32 },

    /// Cart line index out of range
    #[error("Línea de carrito inválida: {0}")]
    InvalidLine(usize),

    /// Sale status change not allowed
    #[error("No se puede cambiar una venta {from} a {to}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },

    /// Record not found locally
    #[error("No encontrado: {0}")]
    NotFound(String),

    // ========== Session ==========
    /// No logged-in user
    #[error("No hay una sesión activa")]
    NotAuthenticated,

    /// The server rejected the token; the session was dropped
    #[error("La sesión expiró")]
    SessionExpired,

    /// Action reserved to administrators
    #[error("Solo un administrador puede realizar esta acción")]
    AdminRequired,

    // ========== Infrastructure ==========
    /// Remote call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Local state storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Local state could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PosError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Raised before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::EmptyCart
                | Self::OutOfStock(_)
                | Self::StockExceeded { .. }
                | Self::InvalidLine(_)
                | Self::InvalidTransition { .. }
                | Self::AdminRequired
        )
    }

    /// Text for the user-facing notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type PosResult<T> = Result<T, PosError>;
