//! Product Model

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Inventory product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten, with = "crate::types::record_id")]
    pub id: String,
    pub name: String,
    /// SKU / barcode
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Sale price
    #[serde(default)]
    pub price: f64,
    /// Purchase cost
    #[serde(default)]
    pub cost: Option<f64>,
    /// Units on hand; absent for service-like items that are not stock-tracked
    #[serde(default, deserialize_with = "crate::types::lenient_count")]
    pub stock: Option<i64>,
    #[serde(default)]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "crate::types::lenient_timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "crate::types::lenient_timestamp")]
    pub updated_at: Option<Timestamp>,
}

impl Product {
    /// Units that can be sold right now
    pub fn available_stock(&self) -> i64 {
        self.stock.unwrap_or(0).max(0)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}
