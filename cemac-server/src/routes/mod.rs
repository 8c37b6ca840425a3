use axum::Router;
use axum::extract::DefaultBodyLimit;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

pub mod assistant;
pub mod auth;
pub mod health;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All API routes, without static files or middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(assistant::router())
}

/// Fully configured application
///
/// Unknown paths fall through to the static directory, and paths with no
/// matching file get `index.html` so client-side routes survive a reload.
pub fn build_app(state: AppState) -> Router {
    let static_dir = &state.config.static_dir;
    let assets = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    build_router()
        .fallback_service(assets)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Propagate sits inside Set so it sees the generated id
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
