use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OraError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("could not compile page: {0}")]
    Compilation(String),

    #[error("index walk failed: {0}")]
    IndexWalk(#[source] std::io::Error),

    #[error("index commit failed: {0}")]
    IndexCommit(#[source] sqlx::Error),

    #[error("search failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl OraError {
    /// Maps an error onto the HTTP status reported to clients.
    ///
    /// Only `NotFound` and `InvalidRequest` are client-facing; index and search
    /// failures answer with a gateway-class status and everything else with 500.
    pub fn status(&self) -> StatusCode {
        match self {
            OraError::NotFound(_) => StatusCode::NOT_FOUND,
            OraError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OraError::IndexWalk(_)
            | OraError::IndexCommit(_)
            | OraError::Query(_)
            | OraError::Db(_) => StatusCode::BAD_GATEWAY,
            OraError::Compilation(_) | OraError::Io(_) | OraError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type OraResult<T> = Result<T, OraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(
            OraError::NotFound("a.md".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            OraError::InvalidRequest("..".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn server_errors_are_5xx() {
        let walk = OraError::IndexWalk(std::io::Error::other("denied"));
        assert!(walk.status().is_server_error());
        assert!(OraError::Compilation("theme".into()).status().is_server_error());
        assert!(OraError::Query(sqlx::Error::PoolClosed).status().is_server_error());
    }
}
