//! Request query types

use serde::{Deserialize, Serialize};

/// Pagination query parameters (`?page=&limit=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: u32,
    /// Items per page (clamped to 100)
    pub limit: u32,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 50 }
    }
}
