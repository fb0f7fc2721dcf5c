//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::{CacheValue, Removed, Scalar, SetOpOutcome};

/// Response body for GET /entries/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: CacheValue,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: CacheValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /entries
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
}

impl PutResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /entries
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// `nothing`, `one` or `many`
    pub matched: &'static str,
    /// Values of the removed keys, when requested
    pub values: Vec<Option<CacheValue>>,
}

impl From<Removed> for RemoveResponse {
    fn from(removed: Removed) -> Self {
        match removed {
            Removed::Nothing => Self {
                matched: "nothing",
                values: Vec::new(),
            },
            Removed::One(value) => Self {
                matched: "one",
                values: value.into_iter().map(Some).collect(),
            },
            Removed::Many(values) => Self {
                matched: "many",
                values,
            },
        }
    }
}

/// Response body for DELETE /entries/:key/members
#[derive(Debug, Clone, Serialize)]
pub struct RemoveMemberResponse {
    pub key: String,
    pub removed: bool,
}

/// Response body for GET /keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub pattern: String,
    pub count: usize,
    pub keys: Vec<String>,
}

impl KeysResponse {
    pub fn new(pattern: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            pattern: pattern.into(),
            count: keys.len(),
            keys,
        }
    }
}

/// Response body for GET /size
#[derive(Debug, Clone, Serialize)]
pub struct SizeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Key count, member count, or -1 for scalars and absent keys
    pub size: i64,
}

/// Response body for POST /sets/union and POST /sets/inter
///
/// Exactly one of `members` and `key` is present.
#[derive(Debug, Clone, Serialize)]
pub struct SetOpResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Scalar>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub cardinality: usize,
}

impl From<SetOpOutcome> for SetOpResponse {
    fn from(outcome: SetOpOutcome) -> Self {
        match outcome {
            SetOpOutcome::Members(members) => Self {
                cardinality: members.len(),
                members: Some(members.into_iter().collect()),
                key: None,
            },
            SetOpOutcome::Stored { key, cardinality } => Self {
                members: None,
                key: Some(key),
                cardinality,
            },
        }
    }
}

/// Response body for POST /ns-key
#[derive(Debug, Clone, Serialize)]
pub struct NsKeyResponse {
    pub key: String,
}

/// Response body for POST /flush
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub message: String,
}

/// Response body for GET /info
#[derive(Debug, Clone, Serialize)]
pub struct InfoResponse {
    pub backend: &'static str,
    pub info: BTreeMap<String, String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Store the cache runs on
    pub backend: &'static str,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backend: &'static str) -> Self {
        Self {
            status: "healthy".to_string(),
            backend,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
