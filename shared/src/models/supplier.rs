//! Supplier Model

use serde::{Deserialize, Serialize};

/// Supplier (proveedor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(flatten, with = "crate::types::record_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Create / update supplier payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
