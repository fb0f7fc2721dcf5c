//! Value Model
//!
//! Native values the typed cache accepts and returns. The caller picks the
//! [`CacheValue`] variant, which decides the store-side representation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{CacheError, Result};

// == Scalar ==
/// A single cacheable value.
///
/// Serializes as the matching JSON literal. Floats compare and hash by
/// their total order, so scalars can be stored in ordered sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// `false` for null, `false`, zero and the empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(b) => *b,
            Scalar::Int(i) => *i != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON scalar; arrays and objects have no scalar mapping.
    pub fn from_json(value: Json) -> Result<Self> {
        match value {
            Json::Null => Ok(Scalar::Null),
            Json::Bool(b) => Ok(Scalar::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => n
                    .as_f64()
                    .map(Scalar::Float)
                    .ok_or_else(|| CacheError::UnsupportedType(format!("number {n}"))),
            },
            Json::String(s) => Ok(Scalar::Str(s)),
            Json::Array(_) => Err(CacheError::UnsupportedType("nested array".to_string())),
            Json::Object(_) => Err(CacheError::UnsupportedType("nested object".to_string())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Scalar::Null => 0,
            Scalar::Bool(_) => 1,
            Scalar::Int(_) => 2,
            Scalar::Float(_) => 3,
            Scalar::Str(_) => 4,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Scalar::Null => {}
            Scalar::Bool(b) => b.hash(state),
            Scalar::Int(i) => i.hash(state),
            Scalar::Float(f) => f.to_bits().hash(state),
            Scalar::Str(s) => s.hash(state),
        }
    }
}

/// Plain rendering, used for hash fields, sorted set members and key params.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

// == Cache Value ==
/// A value as written to or read from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CacheValue {
    /// Stored as a string key.
    Scalar(Scalar),
    /// Stored as a list; writes append.
    List(Vec<Scalar>),
    /// Stored as a set; writes add members.
    Set(BTreeSet<Scalar>),
    /// Stored as a hash; writes merge fields.
    Map(BTreeMap<String, Scalar>),
    /// Stored as a sorted set of `(member, score)`; writes add or rescore.
    SortedMap(Vec<(String, f64)>),
}

/// How to map a JSON object or array onto a cache value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeHint {
    /// Arrays become lists, objects become hashes.
    #[default]
    Auto,
    /// Arrays become sets.
    Set,
    /// Objects of numbers become sorted sets.
    Sorted,
}

impl CacheValue {
    /// Infers a cache value from dynamically shaped JSON.
    ///
    /// Fails with `UnsupportedType` for a top-level null, nested
    /// containers, or non-numeric scores of a sorted map.
    pub fn from_json(value: Json, hint: ShapeHint) -> Result<Self> {
        match value {
            Json::Null => Err(CacheError::UnsupportedType("null".to_string())),
            Json::Array(items) => {
                let items = items
                    .into_iter()
                    .map(Scalar::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(match hint {
                    ShapeHint::Set => CacheValue::Set(items.into_iter().collect()),
                    _ => CacheValue::List(items),
                })
            }
            Json::Object(fields) if hint == ShapeHint::Sorted => fields
                .into_iter()
                .map(|(member, score)| match score.as_f64() {
                    Some(score) => Ok((member, score)),
                    None => Err(CacheError::UnsupportedType(format!(
                        "score of '{member}' is not a number"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(CacheValue::SortedMap),
            Json::Object(fields) => fields
                .into_iter()
                .map(|(field, value)| Scalar::from_json(value).map(|v| (field, v)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(CacheValue::Map),
            scalar => Scalar::from_json(scalar).map(CacheValue::Scalar),
        }
    }

    /// Store-side kind name, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheValue::Scalar(_) => "string",
            CacheValue::List(_) => "list",
            CacheValue::Set(_) => "set",
            CacheValue::Map(_) => "hash",
            CacheValue::SortedMap(_) => "zset",
        }
    }

    pub fn is_empty_collection(&self) -> bool {
        match self {
            CacheValue::Scalar(_) => false,
            CacheValue::List(items) => items.is_empty(),
            CacheValue::Set(members) => members.is_empty(),
            CacheValue::Map(fields) => fields.is_empty(),
            CacheValue::SortedMap(members) => members.is_empty(),
        }
    }
}

impl From<Scalar> for CacheValue {
    fn from(value: Scalar) -> Self {
        CacheValue::Scalar(value)
    }
}

macro_rules! scalar_cache_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CacheValue {
                fn from(value: $ty) -> Self {
                    CacheValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_cache_value!(&str, String, i64, i32, f64, bool);
