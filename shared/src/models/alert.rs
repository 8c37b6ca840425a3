//! Stock Alert Model

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Alert urgency, ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Urgente,
    Alta,
    Media,
    Baja,
}

impl AlertPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgente => "urgente",
            Self::Alta => "alta",
            Self::Media => "media",
            Self::Baja => "baja",
        }
    }
}

/// Alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Stock reached zero
    SinStock,
    /// Stock under the lowest threshold
    StockBajo,
}

/// User-managed status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Pendiente,
    EnProceso,
    Resuelta,
    Ignorada,
}

impl AlertStatus {
    /// Still requires attention
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pendiente | Self::EnProceso)
    }
}

/// Stock alert derived from the product list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    #[serde(default)]
    pub status: AlertStatus,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub stock: i64,
    pub message: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Status change payload (PUT /alerts/:id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertStatusUpdate {
    pub status: AlertStatus,
}
