use crate::error::OraError;
use crate::page::template::render_listing;
use crate::page::{LazyPage, PageOptions};
use crate::server::conditional::serve_content;
use crate::server::listing::scan_listing;
use crate::server::{AppState, assets, clean_path, contains_dot_dot, resolve};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{error, warn};

/// Error wrapper for page and listing handlers.
///
/// Clients only get the status line; the error itself is logged.
pub struct PageError(pub OraError);

impl From<OraError> for PageError {
    fn from(e: OraError) -> Self {
        PageError(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let reason = status.canonical_reason().unwrap_or("error");
        (status, reason).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub term: String,
}

/// `GET /api/search?term=<phrase>`
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    match state.search.query(&params.term).await {
        Ok(hits) => (StatusCode::OK, Json(hits)).into_response(),
        Err(e) => {
            error!(error = %e, term = %params.term, "search failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "err": "search failed" })),
            )
                .into_response()
        }
    }
}

/// Serves the listing, documents and static assets.
pub async fn serve_path(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let decoded = percent_decode_str(uri.path())
        .decode_utf8()
        .map_err(|_| OraError::InvalidRequest("URL path is not valid UTF-8".to_string()))?;
    let url_path = clean_path(&decoded);

    if contains_dot_dot(&url_path) {
        warn!(path = %url_path, "rejected path traversal");
        return Err(OraError::InvalidRequest("invalid URL path".to_string()).into());
    }

    if url_path == "/" {
        return Ok(index_page(&state).await);
    }

    if !url_path.ends_with(state.suffix.as_str()) {
        return Ok(assets::serve(&url_path));
    }

    let file_path = resolve(&state.root, &url_path);
    let options = PageOptions {
        theme: state.theme.clone(),
    };
    let page = LazyPage::open(state.source.clone(), file_path, options)?;

    Ok(serve_content(&method, &headers, page).await?)
}

async fn index_page(state: &AppState) -> Response {
    let root = state.root.clone();
    let suffix = state.suffix.clone();

    let rows = match tokio::task::spawn_blocking(move || {
        scan_listing(&root, &suffix, SystemTime::now())
    })
    .await
    {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            error!(error = %e, "could not scan document tree");
            return (StatusCode::BAD_GATEWAY, "could not serve index").into_response();
        }
        Err(e) => {
            error!(error = %e, "listing task failed");
            return (StatusCode::BAD_GATEWAY, "could not serve index").into_response();
        }
    };

    match render_listing("Index", &state.theme, &rows) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!(error = %e, "could not render index");
            (StatusCode::BAD_GATEWAY, "could not serve index").into_response()
        }
    }
}
