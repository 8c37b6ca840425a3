//! Brand Model

use serde::{Deserialize, Serialize};

/// Product brand (marca)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(flatten, with = "crate::types::record_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Create / update brand payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandInput {
    pub name: String,
    pub description: Option<String>,
}
