use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Static files compiled into the binary, keyed by URL path.
const ASSETS: &[(&str, &str, &str)] = &[
    (
        "/javascript/index.js",
        "text/javascript; charset=utf-8",
        include_str!("../../assets/javascript/index.js"),
    ),
    (
        "/javascript/highlight.js",
        "text/javascript; charset=utf-8",
        include_str!("../../assets/javascript/highlight.js"),
    ),
    (
        "/css/dark.css",
        "text/css; charset=utf-8",
        include_str!("../../assets/css/dark.css"),
    ),
    (
        "/css/light.css",
        "text/css; charset=utf-8",
        include_str!("../../assets/css/light.css"),
    ),
    (
        "/css/highlight.css",
        "text/css; charset=utf-8",
        include_str!("../../assets/css/highlight.css"),
    ),
];

pub fn lookup(path: &str) -> Option<(&'static str, &'static str)> {
    ASSETS
        .iter()
        .find(|(asset, _, _)| *asset == path)
        .map(|(_, content_type, body)| (*content_type, *body))
}

/// Serves an embedded asset, or 404 when there is none at `path`.
pub fn serve(path: &str) -> Response {
    match lookup(path) {
        Some((content_type, body)) => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
