//! Error types for the group cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the group cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty key passed to a lookup
    #[error("key is required")]
    InvalidKey,

    /// No group registered under this name
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// A group was configured without a data source
    #[error("Group '{0}' has no loader")]
    MissingLoader(String),

    /// The loader failed; its error is passed through untouched
    #[error(transparent)]
    Load(#[from] anyhow::Error),

    /// A remote peer could not serve the request
    #[error("Peer error: {0}")]
    Peer(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Key Not Found ==
/// Loader error for a key the data source has no row for.
///
/// Loaders return it (boxed into `anyhow::Error`) to tell a missing row
/// apart from a failing data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} not exist")]
pub struct KeyNotFound(pub String);

// == IntoResponse Implementation ==
/// Loader errors map to 404 when they wrap [`KeyNotFound`] and to 502
/// otherwise, since the data source itself failed.
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Load(err) if err.is::<KeyNotFound>() => StatusCode::NOT_FOUND,
            CacheError::Load(_) => StatusCode::BAD_GATEWAY,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::MissingLoader(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the group cache.
pub type Result<T> = std::result::Result<T, CacheError>;
