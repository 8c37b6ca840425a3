//! Shared types for the CEMAC point-of-sale toolkit
//!
//! Wire models exchanged with the remote CEMAC API, request/response
//! envelopes and small time helpers used by every crate in the workspace.

pub mod models;
pub mod request;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::{ApiResponse, Listing};
pub use types::Timestamp;
