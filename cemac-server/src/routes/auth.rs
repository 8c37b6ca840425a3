//! `/auth/*` passthrough to the external auth API
//!
//! Method, query string, body, `Authorization` and `Content-Type` are
//! forwarded; the upstream status and body come back unchanged. The path is
//! forwarded still percent-encoded so escaped `/`, `?` and `#` stay inside
//! their segment.

use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/{*path}", any(proxy))
}

async fn proxy(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let url = upstream_url(&state.config.auth_api_url, uri.path(), uri.query());
    tracing::debug!(%method, %url, "Forwarding auth request");

    let mut request = state.http.request(method, &url);
    for name in [AUTHORIZATION, CONTENT_TYPE] {
        if let Some(value) = headers.get(&name) {
            request = request.header(name, value.clone());
        }
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request.send().await?;
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = upstream.bytes().await?;

    if status.is_server_error() {
        tracing::warn!(%status, %url, "Auth API returned an error");
    }

    let mut response = Response::builder().status(status);
    if let Some(content_type) = content_type {
        response = response.header(CONTENT_TYPE, content_type);
    }
    response
        .body(Body::from(bytes))
        .map_err(|e| ServerError::Upstream(e.to_string()))
}

/// `raw_path` is the incoming `/auth/...` path, not decoded
fn upstream_url(base: &str, raw_path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}{}", base.trim_end_matches('/'), raw_path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_url() {
        assert_eq!(
            upstream_url("https://cemac-api.onrender.com/", "/auth/login", None),
            "https://cemac-api.onrender.com/auth/login"
        );
        assert_eq!(
            upstream_url("http://h", "/auth/users/7", Some("role=admin")),
            "http://h/auth/users/7?role=admin"
        );
        assert_eq!(upstream_url("http://h", "/auth/verify", Some("")), "http://h/auth/verify");
        assert_eq!(
            upstream_url("http://h", "/auth/users/a%3Frole%3Dadmin", None),
            "http://h/auth/users/a%3Frole%3Dadmin"
        );
    }
}
