use axum::http::{HeaderValue, header};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers::{search, serve_path};

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let timeout = state.request_timeout;
    let state = Arc::new(state);

    Router::new()
        .route("/api/search", get(search))
        // listing, documents and static assets
        .fallback(serve_path)
        .with_state(state)
        // keep pages from being framed by other sites
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
