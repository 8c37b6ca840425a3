//! Data models
//!
//! Records exchanged with the remote CEMAC API. Field names follow the API's
//! JSON (camelCase, with the Spanish keys the sales endpoints use).
//! IDs are opaque strings: some collections still come from Firestore.

pub mod alert;
pub mod analysis;
pub mod brand;
pub mod category;
pub mod customer;
pub mod product;
pub mod sale;
pub mod supplier;
pub mod user;

// Re-exports
pub use alert::*;
pub use analysis::*;
pub use brand::*;
pub use category::*;
pub use customer::*;
pub use product::*;
pub use sale::*;
pub use supplier::*;
pub use user::*;
