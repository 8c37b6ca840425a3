// cemac-client/src/http.rs
// HTTP client - network transport for the remote API

use crate::{ClientConfig, ClientError, ClientResult, SharedToken};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error body returned by the API on failure
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Query string pairs
pub type Query<'a> = &'a [(&'a str, String)];

/// HTTP client trait
///
/// `request` is the single transport primitive; the verb helpers build on it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized;

    fn base_url(&self) -> &str;

    fn token(&self) -> Option<String>;

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, &[], None, None)
            .await
    }

    async fn get_query<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, query, None, None)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::POST, path, &[], Some(body), None).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::POST, path, &[], None, None)
            .await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.request(Method::PUT, path, &[], Some(body), None).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::DELETE, path, &[], None, None)
            .await
    }
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: SharedToken,
}

impl NetworkHttpClient {
    pub fn new(base_url: &str, token: SharedToken) -> ClientResult<Self> {
        Self::with_timeout(base_url, token, None)
    }

    /// Build from configuration with a shared token handle
    pub fn from_config(config: &ClientConfig, token: SharedToken) -> ClientResult<Self> {
        if let Some(t) = &config.token {
            token.set(t.clone());
        }
        Self::with_timeout(&config.base_url, token, config.request_timeout)
    }

    fn with_timeout(
        base_url: &str,
        token: SharedToken,
        timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Shared token handle
    pub fn token_handle(&self) -> SharedToken {
        self.token.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.get().map(|t| format!("Bearer {}", t))
    }

    async fn handle_response<T: DeserializeOwned>(
        method: &Method,
        url: &str,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| {
                    if text.trim().is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Request failed")
                            .to_string()
                    } else {
                        text.clone()
                    }
                });
            tracing::warn!(%method, url, status = status.as_u16(), %message, "API request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
                StatusCode::FORBIDDEN => ClientError::Forbidden(message),
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Validation(message)
                }
                StatusCode::REQUEST_TIMEOUT => ClientError::Timeout(message),
                _ => ClientError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        // DELETE and some PUTs answer with an empty body
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| {
            ClientError::InvalidResponse(format!("{} {}: {}", method, url, e))
        })
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(path);
        let mut req = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        tracing::debug!(%method, url, "API request");
        let response = req.send().await?;
        Self::handle_response(&method, &url, response).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> Option<String> {
        self.token.get()
    }
}
