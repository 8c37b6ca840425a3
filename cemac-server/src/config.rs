//! Local server configuration

use std::path::PathBuf;
use std::time::Duration;

/// External auth deployment the `/auth/*` routes forward to
pub const DEFAULT_AUTH_API_URL: &str = "https://cemac-api.onrender.com";

/// OpenAI compatible chat completions endpoint
pub const DEFAULT_ASSISTANT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";

/// Server configuration, read from environment variables
///
/// | Variable | Default |
/// |----------|---------|
/// | HOST | 0.0.0.0 |
/// | PORT | 3000 |
/// | STATIC_DIR | public |
/// | AUTH_API_URL | https://cemac-api.onrender.com |
/// | ASSISTANT_API_URL | https://api.openai.com/v1/chat/completions |
/// | ASSISTANT_API_KEY | unset (assistant disabled) |
/// | ASSISTANT_MODEL | gpt-4o-mini |
/// | UPSTREAM_TIMEOUT_SECS | 30 |
/// | LOG_LEVEL | info |
/// | LOG_JSON | false |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory with the browser assets and `index.html`
    pub static_dir: PathBuf,
    pub auth_api_url: String,
    pub assistant_api_url: String,
    /// Model API key; never sent to the browser
    pub assistant_api_key: Option<String>,
    pub assistant_model: String,
    pub upstream_timeout: Duration,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: non_empty("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
            static_dir: non_empty("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            auth_api_url: non_empty("AUTH_API_URL")
                .unwrap_or_else(|| DEFAULT_AUTH_API_URL.into()),
            assistant_api_url: non_empty("ASSISTANT_API_URL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_API_URL.into()),
            assistant_api_key: non_empty("ASSISTANT_API_KEY"),
            assistant_model: non_empty("ASSISTANT_MODEL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.into()),
            upstream_timeout: Duration::from_secs(
                non_empty("UPSTREAM_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: non_empty("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
