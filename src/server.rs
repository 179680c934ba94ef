//! HTTP surface of the document server.
//!
//! - `GET /` lists every document under the served root
//! - `GET /api/search?term=<phrase>` returns the ids of matching documents
//! - `GET /<path><suffix>` compiles and serves a document, honoring
//!   conditional and range requests
//! - anything else is looked up in the embedded static assets

pub mod assets;
pub mod conditional;
pub mod handlers;
pub mod listing;
pub mod router;

use crate::domain::DocumentSource;
use crate::search::QueryEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub use router::create_router;

/// Shared, read-only state of the request handlers.
pub struct AppState {
    pub root: PathBuf,
    pub theme: String,
    pub suffix: String,
    pub source: Arc<dyn DocumentSource>,
    pub search: QueryEngine,
    /// Upper bound on handling a single request.
    pub request_timeout: Duration,
}

/// Normalizes a decoded URL path: collapses repeated separators and drops `.`
/// segments. `..` segments are kept so they can be rejected afterwards.
pub fn clean_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    format!("/{}", segments.join("/"))
}

/// True when any `/` or `\` separated segment of `path` is `..`.
pub fn contains_dot_dot(path: &str) -> bool {
    if !path.contains("..") {
        return false;
    }
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Joins a cleaned URL path onto the served root.
///
/// Callers must have rejected `..` segments first.
pub fn resolve(root: &std::path::Path, url_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in url_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn clean_path_collapses_separators() {
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("//notes/./a.md"), "/notes/a.md");
        assert_eq!(clean_path("/notes/../a.md"), "/notes/../a.md");
    }

    #[test]
    fn dot_dot_is_found_with_either_separator() {
        assert!(contains_dot_dot("/notes/../secret.md"));
        assert!(contains_dot_dot("/notes/..\\secret.md"));
        assert!(contains_dot_dot("\\..\\secret.md"));
        assert!(!contains_dot_dot("/notes/a..b.md"));
        assert!(!contains_dot_dot("/notes/a.md"));
    }

    #[test]
    fn resolve_joins_segments_under_root() {
        let root = Path::new("/srv/docs");
        assert_eq!(
            resolve(root, "/notes/a.md"),
            Path::new("/srv/docs/notes/a.md")
        );
    }
}
