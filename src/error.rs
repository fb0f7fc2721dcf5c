//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::KeyType;

// == Cache Error Enum ==
/// Unified error type for the cache facade, its stores and the admin API.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A value shape with no store-side mapping
    #[error("Unsupported type of cache value: {0}")]
    UnsupportedType(String),

    /// The store reported a representation the facade cannot read
    #[error("Unknown key type: {0}")]
    UnknownType(String),

    /// A sorted set read with an unusable range
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A key holds a different representation than the operation needs
    #[error("Type mismatch on '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: KeyType,
    },

    /// Member removal on a key that is not a set, sorted set or hash
    #[error("'{key}' must be a set, sorted set or hash (found {found})")]
    InvalidType { key: String, found: KeyType },

    /// Namespaced key construction with an unrecognized namespace
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// The backing store failed or rejected a command
    #[error("[{backend}] store error: {message}")]
    Store {
        backend: &'static str,
        message: String,
    },
}

impl CacheError {
    /// Create a new store error.
    pub fn store(backend: &'static str, message: impl Into<String>) -> Self {
        CacheError::Store {
            backend,
            message: message.into(),
        }
    }

    /// Store error for a command issued against a key of another type.
    pub fn wrong_type(backend: &'static str, key: &str) -> Self {
        Self::store(
            backend,
            format!("WRONGTYPE operation against '{key}' holding the wrong kind of value"),
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_)
            | CacheError::InvalidRange(_)
            | CacheError::UnsupportedType(_)
            | CacheError::UnknownNamespace(_) => StatusCode::BAD_REQUEST,
            CacheError::TypeMismatch { .. } | CacheError::InvalidType { .. } => {
                StatusCode::CONFLICT
            }
            CacheError::UnknownType(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;
