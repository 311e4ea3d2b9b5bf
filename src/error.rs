//! Error types for relief-node
//!
//! Domain errors map to client-facing HTTP status codes; storage and
//! configuration failures map to server errors. Nothing here crashes the
//! process; every variant is converted to a response at the boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Main error type for relief-node operations
#[derive(Debug, thiserror::Error)]
pub enum ReliefError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("request {0} is already resolved")]
    AlreadyResolved(i64),

    #[error("insufficient inventory for '{item}': requested {requested}, available {available}")]
    InsufficientInventory {
        item: String,
        requested: i64,
        available: i64,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ReliefError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyResolved(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientInventory { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReliefError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type alias for relief-node operations
pub type Result<T> = std::result::Result<T, ReliefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ReliefError::NotFound("request 9".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ReliefError::AlreadyResolved(1).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReliefError::InsufficientInventory {
                item: "tents".into(),
                requested: 10,
                available: 5
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReliefError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_insufficient_inventory_message_names_item_and_amounts() {
        let err = ReliefError::InsufficientInventory {
            item: "water - bottled".into(),
            requested: 3,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("water - bottled"));
        assert!(msg.contains('3'));
        assert!(msg.contains('1'));
    }
}
