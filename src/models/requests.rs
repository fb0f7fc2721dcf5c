//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value as Json;

use crate::cache::{GetOptions, ShapeHint, ZRange};
use crate::error::{CacheError, Result};

/// Request body for PUT /entries
///
/// `value` is any JSON scalar, array or flat object; `shape` picks between
/// list/set for arrays and hash/sorted set for objects.
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: Json,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub shape: ShapeHint,
}

impl PutRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Query string of GET /entries/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    #[serde(default)]
    pub raw: bool,
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl GetQuery {
    /// Read options; a score range needs both `min` and `max`.
    pub fn options(&self) -> Result<GetOptions> {
        let range = match (self.min, self.max) {
            (Some(min), Some(max)) => ZRange::Score { min, max },
            (None, None) => ZRange::Index {
                start: self.start.unwrap_or(0),
                stop: self.stop.unwrap_or(-1),
            },
            _ => {
                return Err(CacheError::InvalidRange(
                    "score range needs both min and max".to_string(),
                ))
            }
        };
        Ok(GetOptions {
            range,
            raw: self.raw,
        })
    }
}

/// Query string of DELETE /entries
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveQuery {
    pub pattern: String,
    /// Return the removed values; on unless `get_value=false`
    #[serde(default = "enabled")]
    pub get_value: bool,
}

fn enabled() -> bool {
    true
}

/// Request body for DELETE /entries/:key/members
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveMemberRequest {
    pub member: Json,
}

fn match_all() -> String {
    "*".to_string()
}

/// Query string of GET /keys
#[derive(Debug, Clone, Deserialize)]
pub struct KeysQuery {
    #[serde(default = "match_all")]
    pub pattern: String,
}

/// Query string of GET /size
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SizeQuery {
    pub key: Option<String>,
}

/// Request body for POST /sets/union and POST /sets/inter
#[derive(Debug, Clone, Deserialize)]
pub struct SetOpRequest {
    pub keys: Vec<String>,
    #[serde(default)]
    pub inplace: bool,
}

/// Request body for POST /ns-key
///
/// `params` is an ordered list of `[name, value]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct NsKeyRequest {
    pub namespace: String,
    pub resource: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub params: Vec<(String, Json)>,
}
