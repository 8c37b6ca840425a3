//! Client configuration

use std::time::Duration;

/// Default remote API
pub const DEFAULT_API_URL: &str = "https://cemac-api.vercel.app";

/// Login is the only call with a client-side timeout
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 10;

/// Client configuration for connecting to the CEMAC API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://cemac-api.vercel.app")
    pub base_url: String,

    /// Base URL of the auth endpoints; defaults to `base_url`
    pub auth_url: Option<String>,

    /// Bearer token restored from a previous session
    pub token: Option<String>,

    /// Timeout applied to every request; `None` leaves it to the connection
    pub request_timeout: Option<Duration>,

    /// Timeout of the login request
    pub login_timeout: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_url: None,
            token: None,
            request_timeout: None,
            login_timeout: Duration::from_secs(DEFAULT_LOGIN_TIMEOUT_SECS),
        }
    }

    /// Set the auth base URL
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the general request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the login timeout
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Base URL used for `/auth/*`
    pub fn auth_base_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_falls_back_to_base() {
        let config = ClientConfig::new("http://api.local");
        assert_eq!(config.auth_base_url(), "http://api.local");

        let config = config.with_auth_url("http://auth.local");
        assert_eq!(config.auth_base_url(), "http://auth.local");
        assert_eq!(config.login_timeout, Duration::from_secs(10));
        assert!(config.request_timeout.is_none());
    }
}
