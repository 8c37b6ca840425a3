//! Sale Model (venta)

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Sale lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Pendiente,
    EnProceso,
    Completada,
    Cancelada,
    Devuelta,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnProceso => "en_proceso",
            Self::Completada => "completada",
            Self::Cancelada => "cancelada",
            Self::Devuelta => "devuelta",
        }
    }

    /// Whether a sale in this status may move to `next`
    ///
    /// ```text
    /// pendiente  -> en_proceso | completada | cancelada
    /// en_proceso -> completada | cancelada
    /// completada -> devuelta
    /// ```
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        use SaleStatus::*;
        matches!(
            (self, next),
            (Pendiente, EnProceso | Completada | Cancelada)
                | (EnProceso, Completada | Cancelada)
                | (Completada, Devuelta)
        )
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method accepted at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Efectivo,
    Tarjeta,
    Transferencia,
}

/// Line of a persisted sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
}

impl SaleLine {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Sale record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(flatten, with = "crate::types::record_id")]
    pub id: String,
    /// Customer display name
    #[serde(default)]
    pub cliente: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Seller display name
    #[serde(default)]
    pub vendedor: String,
    #[serde(default)]
    pub products: Vec<SaleLine>,
    /// Discount percentage (0-100)
    #[serde(default)]
    pub descuento: f64,
    /// Tax percentage (0-100)
    #[serde(default)]
    pub iva: f64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub iva_amount: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default, deserialize_with = "crate::types::lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

impl Sale {
    /// Creation instant, when the server sent a parseable one
    pub fn created_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.created_at.as_ref().and_then(Timestamp::to_datetime)
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.products.iter().map(|l| l.quantity).sum()
    }
}

/// Create sale payload (POST /sales)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreate {
    pub cliente: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub vendedor: String,
    pub products: Vec<SaleLine>,
    pub descuento: f64,
    pub iva: f64,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub iva_amount: f64,
    pub total: f64,
}

/// Status change payload (PUT /sales/:id/status)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleStatusUpdate {
    pub status: SaleStatus,
}
