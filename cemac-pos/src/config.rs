use std::path::PathBuf;
use std::time::Duration;

use cemac_client::ClientConfig;
use cemac_client::config::{DEFAULT_API_URL, DEFAULT_LOGIN_TIMEOUT_SECS};

use crate::cart::DEFAULT_IVA;

/// Auth endpoints live on a separate deployment
pub const DEFAULT_AUTH_URL: &str = "https://cemac-api.onrender.com";

/// Local server hosting the assistant proxy
pub const DEFAULT_ASSISTANT_URL: &str = "http://localhost:3000";

/// POS configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | API_BASE_URL | https://cemac-api.vercel.app | remote REST API |
/// | AUTH_API_URL | https://cemac-api.onrender.com | `/auth/*` endpoints |
/// | ASSISTANT_URL | http://localhost:3000 | local server with the assistant proxy |
/// | DATA_DIR | ./cemac-data | session and local state files |
/// | DEFAULT_IVA | 16 | tax rate of new carts (%) |
/// | HISTORY_PAGE_SIZE | 50 | sales per history page |
/// | LOGIN_TIMEOUT_SECS | 10 | login request timeout |
/// | REQUEST_TIMEOUT_SECS | unset | timeout of every other request |
/// | LOG_LEVEL | info | tracing filter |
/// | LOG_DIR | unset | daily rolling log files |
/// | LOG_JSON | false | JSON log lines |
#[derive(Debug, Clone)]
pub struct PosConfig {
    pub api_base_url: String,
    pub auth_api_url: String,
    pub assistant_url: String,
    pub data_dir: PathBuf,
    pub default_iva: f64,
    pub history_page_size: u32,
    pub login_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl PosConfig {
    /// Load from the process environment (and `.env` when present)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Self {
            api_base_url: non_empty("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            auth_api_url: non_empty("AUTH_API_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            assistant_url: non_empty("ASSISTANT_URL")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_URL.into()),
            data_dir: non_empty("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./cemac-data")),
            default_iva: non_empty("DEFAULT_IVA")
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| (0.0..=100.0).contains(v))
                .unwrap_or(DEFAULT_IVA),
            history_page_size: non_empty("HISTORY_PAGE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            login_timeout: Duration::from_secs(
                non_empty("LOGIN_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_LOGIN_TIMEOUT_SECS),
            ),
            request_timeout: non_empty("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: non_empty("LOG_DIR"),
            log_json: non_empty("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Client settings for the remote API
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_base_url.clone())
            .with_auth_url(self.auth_api_url.clone())
            .with_login_timeout(self.login_timeout);
        match self.request_timeout {
            Some(timeout) => config.with_request_timeout(timeout),
            None => config,
        }
    }

    /// Client settings for the local server's assistant proxy
    pub fn assistant_client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.assistant_url.clone());
        match self.request_timeout {
            Some(timeout) => config.with_request_timeout(timeout),
            None => config,
        }
    }
}

impl Default for PosConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PosConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.auth_api_url, DEFAULT_AUTH_URL);
        assert_eq!(config.default_iva, 16.0);
        assert_eq!(config.login_timeout, Duration::from_secs(10));
        assert!(config.request_timeout.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("API_BASE_URL", "http://127.0.0.1:9000"),
            ("DEFAULT_IVA", "250"),
            ("HISTORY_PAGE_SIZE", "20"),
            ("REQUEST_TIMEOUT_SECS", "30"),
            ("LOG_JSON", "true"),
            ("LOG_DIR", "  "),
        ]
        .into_iter()
        .collect();
        let config = PosConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.default_iva, 16.0);
        assert_eq!(config.history_page_size, 20);
        assert!(config.log_json);
        assert!(config.log_dir.is_none());

        let client = config.client_config();
        assert_eq!(client.auth_base_url(), DEFAULT_AUTH_URL);
        assert_eq!(client.request_timeout, Some(Duration::from_secs(30)));
    }
}
