//! CEMAC local server
//!
//! Hosts the browser assets, forwards `/auth/*` to the external auth API and
//! keeps the JAVI model key server-side behind `/api/assistant/chat`.

pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{ServerError, ServerResult};
pub use routes::build_app;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Initialize the `tracing` subscriber; `RUST_LOG` overrides `level`
pub fn init_logger(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cemac_server={level},tower_http={level}")));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
