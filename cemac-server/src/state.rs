use std::sync::Arc;

use crate::config::Config;
use crate::error::ServerResult;
use crate::llm::LlmClient;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Client used for the `/auth/*` passthrough
    pub http: reqwest::Client,
    /// `None` when no assistant key is configured
    pub llm: Option<Arc<LlmClient>>,
}

impl AppState {
    pub fn new(config: Config) -> ServerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let llm = config.assistant_api_key.clone().map(|key| {
            Arc::new(LlmClient::new(
                http.clone(),
                config.assistant_api_url.clone(),
                key,
                config.assistant_model.clone(),
            ))
        });

        Ok(Self {
            config: Arc::new(config),
            http,
            llm,
        })
    }
}
