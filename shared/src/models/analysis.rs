//! Sales analysis DTOs (GET /analysis/sales[...])

use serde::{Deserialize, Serialize};

/// Aggregate sales figures computed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAnalysis {
    /// Number of sales in the analysed period
    #[serde(default, alias = "salesCount")]
    pub total_sales: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub average_ticket: f64,
    /// Sales registered today, when the server reports it
    #[serde(default)]
    pub sales_today: Option<u64>,
    #[serde(default)]
    pub revenue_today: Option<f64>,
}

/// One point of the daily sales series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesPoint {
    /// Day (YYYY-MM-DD)
    pub date: String,
    #[serde(default, alias = "count")]
    pub sales: u64,
    #[serde(default, alias = "total")]
    pub revenue: f64,
}

/// Best selling product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u64,
    pub revenue: f64,
}
