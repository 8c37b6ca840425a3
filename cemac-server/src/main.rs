//! cemac-server: static host and API proxy for the CEMAC POS

use anyhow::Context;
use cemac_server::{AppState, Config, build_app, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_logger(&config.log_level, config.log_json);

    if !config.static_dir.join("index.html").exists() {
        tracing::warn!(dir = %config.static_dir.display(), "index.html not found in static dir");
    }
    if !config.assistant_enabled() {
        tracing::warn!("ASSISTANT_API_KEY not set; JAVI chat is disabled");
    }

    let addr = config.bind_addr();
    let state = AppState::new(config).context("failed to build upstream HTTP client")?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("cemac-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
