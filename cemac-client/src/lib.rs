//! CEMAC Client - typed client for the remote CEMAC REST API
//!
//! Provides bearer-authenticated HTTP calls for every resource the dashboard
//! uses (inventory, catalog, customers, sales, alerts, analysis, users), the
//! persisted session credential and the assistant proxy client.

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;

pub use api::{
    AlertApi, AnalysisApi, AuthApi, CatalogApi, CemacClient, CustomerApi, InventoryApi, SalesApi,
    UserApi,
};
pub use assistant::{AssistantApi, AssistantClient, AssistantReply, AssistantRequest, ChatTurn};
pub use auth::AuthService;
pub use config::ClientConfig;
pub use credential::{Credential, CredentialStorage, SharedToken};
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};

// Re-export shared types for convenience
pub use shared::models::{LoginResponse, User};
