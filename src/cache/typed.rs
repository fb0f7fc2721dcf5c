//! Typed Cache Facade
//!
//! Maps [`CacheValue`]s onto the primitives of an injected [`Store`],
//! preserving the store-side type of each key.
//!
//! Every operation is a sequence of independent store round trips. The
//! type probe that precedes a write, and the key match that precedes a
//! pattern delete, are not atomic with respect to other writers.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CacheError, Result};
use crate::store::{KeyType, Store};

use super::codec::{decode, encode};
use super::value::{CacheValue, Scalar};

/// TTL in seconds of keys materialized by `union` and `inter`.
pub const DEFAULT_RESULT_TTL: u64 = 3600;

// == Read Options ==
/// Which part of a sorted set `get` returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZRange {
    /// Inclusive rank range; negative indices count from the end.
    Index { start: i64, stop: i64 },
    /// Inclusive score range.
    Score { min: f64, max: f64 },
}

impl Default for ZRange {
    fn default() -> Self {
        ZRange::Index { start: 0, stop: -1 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GetOptions {
    pub range: ZRange,
    /// Return a string entry as the stored JSON literal, without decoding.
    /// A string written through the cache keeps its quotes.
    pub raw: bool,
}

// == Results ==
/// Outcome of a pattern `remove`.
#[derive(Debug, Clone, PartialEq)]
pub enum Removed {
    /// No key matched.
    Nothing,
    /// Exactly one key matched; its value when requested.
    One(Option<CacheValue>),
    /// Several keys matched; their values in match order when requested,
    /// otherwise empty.
    Many(Vec<Option<CacheValue>>),
}

/// Outcome of `union` and `inter`.
#[derive(Debug, Clone, PartialEq)]
pub enum SetOpOutcome {
    /// The computed members, nothing persisted.
    Members(BTreeSet<Scalar>),
    /// The result was written to a fresh key with the result TTL.
    Stored { key: String, cardinality: usize },
}

#[derive(Debug, Clone, Copy)]
enum SetOp {
    Union,
    Inter,
}

impl SetOp {
    fn name(self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Inter => "inter",
        }
    }
}

// == Typed Cache ==
/// The cache facade. Cheap to clone; clones share the store handle.
#[derive(Clone)]
pub struct TypedCache {
    store: Arc<dyn Store>,
    result_ttl: u64,
}

fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    Ok(())
}

/// Rejects TTLs whose expiry instant does not fit a millisecond timestamp.
fn ensure_ttl(ttl: u64) -> Result<()> {
    let now_ms = Utc::now().timestamp_millis();
    let fits = i64::try_from(ttl)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .and_then(|ms| ms.checked_add(now_ms))
        .is_some();
    if !fits {
        return Err(CacheError::InvalidRequest(format!(
            "ttl of {ttl}s is out of range"
        )));
    }
    Ok(())
}

fn decode_all(raw: Vec<String>) -> impl Iterator<Item = Scalar> {
    raw.into_iter().map(|item| decode(&item))
}

impl TypedCache {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }

    /// Sets the TTL applied to materialized set-algebra results.
    /// `0` keeps them persistent.
    pub fn with_result_ttl(mut self, seconds: u64) -> Self {
        self.result_ttl = seconds;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // == Put ==
    /// Writes `value` under `key`.
    ///
    /// A new key takes the shape of the value. An existing key is extended
    /// when compatible: a scalar overwrites a string or is appended to a
    /// list or set, and a collection merges into a key of the same kind.
    /// Anything else fails with `TypeMismatch` and leaves the key as is.
    ///
    /// `ttl` (seconds) refreshes the key's expiry after the write; `None`
    /// or `Some(0)` leave it alone. Overwriting a string clears its TTL.
    pub async fn put(&self, key: &str, value: impl Into<CacheValue>, ttl: Option<u64>) -> Result<()> {
        let value = value.into();
        ensure_key(key)?;
        if let Some(ttl) = ttl {
            ensure_ttl(ttl)?;
        }
        if let CacheValue::SortedMap(members) = &value {
            if let Some((member, _)) = members.iter().find(|(_, score)| score.is_nan()) {
                return Err(CacheError::InvalidRequest(format!(
                    "score of '{member}' is NaN"
                )));
            }
        }

        let existing = self.store.key_type(key).await?;
        if let KeyType::Other(name) = existing {
            return Err(CacheError::UnknownType(name));
        }

        let compatible = matches!(
            (&value, &existing),
            (_, KeyType::None)
                | (
                    CacheValue::Scalar(_),
                    KeyType::String | KeyType::List | KeyType::Set
                )
                | (CacheValue::List(_), KeyType::List)
                | (CacheValue::Set(_), KeyType::Set)
                | (CacheValue::Map(_), KeyType::Hash)
                | (CacheValue::SortedMap(_), KeyType::ZSet)
        );
        if !compatible {
            warn!(
                "Rejected {} write to '{}' holding a {}",
                value.kind(),
                key,
                existing
            );
            return Err(CacheError::TypeMismatch {
                key: key.to_string(),
                expected: value.kind().to_string(),
                found: existing,
            });
        }

        if value.is_empty_collection() {
            debug!("Skipping empty {} write to '{}'", value.kind(), key);
        } else {
            let kind = value.kind();
            match value {
                CacheValue::Scalar(scalar) => match existing {
                    KeyType::List => self.store.rpush(key, vec![encode(&scalar)]).await?,
                    KeyType::Set => self.store.sadd(key, vec![encode(&scalar)]).await?,
                    _ => self.store.set(key, encode(&scalar)).await?,
                },
                CacheValue::List(items) => {
                    self.store.rpush(key, items.iter().map(encode).collect()).await?
                }
                CacheValue::Set(members) => {
                    self.store.sadd(key, members.iter().map(encode).collect()).await?
                }
                CacheValue::Map(fields) => {
                    let fields = fields
                        .into_iter()
                        .map(|(field, value)| (field, encode(&value)))
                        .collect();
                    self.store.hset(key, fields).await?
                }
                CacheValue::SortedMap(members) => self.store.zadd(key, members).await?,
            }
            debug!("Put {} value at '{}' (existing: {})", kind, key, existing);
        }

        if let Some(ttl) = ttl.filter(|ttl| *ttl > 0) {
            self.store.expire(key, ttl).await?;
        }
        Ok(())
    }

    // == Get ==
    /// Reads `key` with default options.
    pub async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        self.get_with(key, GetOptions::default()).await
    }

    /// Reads `key`, dispatching on its store-side type.
    ///
    /// Strings come back as a decoded scalar (or the stored text when
    /// `raw`), hashes as maps, lists as lists, sets as sets. Sorted sets
    /// come back as a list of member names ascending by score, limited to
    /// `options.range`. Absent keys and empty collections read as `None`.
    pub async fn get_with(&self, key: &str, options: GetOptions) -> Result<Option<CacheValue>> {
        let value = match self.store.key_type(key).await? {
            KeyType::None => None,
            KeyType::String => self.store.get(key).await?.map(|raw| {
                CacheValue::Scalar(if options.raw {
                    Scalar::Str(raw)
                } else {
                    decode(&raw)
                })
            }),
            KeyType::Hash => {
                let fields = self.store.hgetall(key).await?;
                (!fields.is_empty()).then(|| {
                    CacheValue::Map(
                        fields
                            .into_iter()
                            .map(|(field, value)| (field, decode(&value)))
                            .collect(),
                    )
                })
            }
            KeyType::List => {
                let items = self.store.lrange(key, 0, -1).await?;
                (!items.is_empty()).then(|| CacheValue::List(decode_all(items).collect()))
            }
            KeyType::Set => {
                let members = self.store.smembers(key).await?;
                (!members.is_empty()).then(|| CacheValue::Set(decode_all(members).collect()))
            }
            KeyType::ZSet => {
                let members = match options.range {
                    ZRange::Index { start, stop } => self.store.zrange(key, start, stop).await?,
                    ZRange::Score { min, max } => {
                        if min.is_nan() || max.is_nan() {
                            return Err(CacheError::InvalidRange(format!(
                                "score range ({min}, {max}) of '{key}'"
                            )));
                        }
                        self.store.zrangebyscore(key, min, max).await?
                    }
                };
                (!members.is_empty())
                    .then(|| CacheValue::List(members.into_iter().map(Scalar::Str).collect()))
            }
            KeyType::Other(name) => return Err(CacheError::UnknownType(name)),
        };
        Ok(value)
    }

    pub async fn has(&self, key: &str) -> Result<bool> {
        self.store.exists(key).await
    }

    // == Remove ==
    /// Deletes every key matching the glob `pattern`.
    pub async fn remove(&self, pattern: &str, get_value: bool) -> Result<Removed> {
        let keys = self.store.keys(pattern).await?;
        let mut values = Vec::new();
        for key in &keys {
            if get_value {
                values.push(self.get(key).await?);
            }
            self.store.del(key).await?;
        }
        debug!("Removed {} key(s) matching '{}'", keys.len(), pattern);

        Ok(match keys.len() {
            0 => Removed::Nothing,
            1 => Removed::One(values.pop().flatten()),
            _ => Removed::Many(values),
        })
    }

    /// Removes one member from a set, sorted set or hash (by field name).
    ///
    /// Returns whether the member was present. Strings, lists and absent
    /// keys fail with `InvalidType`.
    pub async fn remove_from(&self, key: &str, member: impl Into<Scalar>) -> Result<bool> {
        let member = member.into();
        let removed = match self.store.key_type(key).await? {
            KeyType::Set => self.store.srem(key, &encode(&member)).await?,
            KeyType::ZSet => self.store.zrem(key, &member.to_string()).await?,
            KeyType::Hash => self.store.hdel(key, &member.to_string()).await?,
            KeyType::Other(name) => return Err(CacheError::UnknownType(name)),
            found => {
                return Err(CacheError::InvalidType {
                    key: key.to_string(),
                    found,
                })
            }
        };
        debug!("Removed member {:?} from '{}': {}", member, key, removed);
        Ok(removed)
    }

    // == Size ==
    /// Number of keys in the store, or the member count of `key`.
    ///
    /// Strings and absent keys have no meaningful size and report `-1`.
    pub async fn size(&self, key: Option<&str>) -> Result<i64> {
        let Some(key) = key else {
            return Ok(self.store.dbsize().await? as i64);
        };
        match self.store.key_type(key).await? {
            kind @ (KeyType::Hash | KeyType::List | KeyType::Set | KeyType::ZSet) => {
                Ok(self.store.card(key, &kind).await? as i64)
            }
            _ => Ok(-1),
        }
    }

    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.store.keys(pattern).await
    }

    /// Deletes every key of the store. Irreversible.
    pub async fn flush(&self) -> Result<()> {
        self.store.flushdb().await?;
        info!("Flushed {} store", self.store.name());
        Ok(())
    }

    pub async fn info(&self) -> Result<std::collections::BTreeMap<String, String>> {
        self.store.info().await
    }

    // == Set Algebra ==
    /// Union of the sets (or sorted sets) at `keys`.
    ///
    /// Sorted-set operands are always materialized into a fresh key, since
    /// the store only offers a storing variant for them. Plain sets are
    /// returned directly unless `inplace` is set.
    pub async fn union(&self, keys: &[&str], inplace: bool) -> Result<SetOpOutcome> {
        self.set_op(SetOp::Union, keys, inplace).await
    }

    /// Intersection of the sets (or sorted sets) at `keys`; see [`Self::union`].
    pub async fn inter(&self, keys: &[&str], inplace: bool) -> Result<SetOpOutcome> {
        self.set_op(SetOp::Inter, keys, inplace).await
    }

    async fn set_op(&self, op: SetOp, keys: &[&str], inplace: bool) -> Result<SetOpOutcome> {
        if keys.is_empty() {
            return Err(CacheError::InvalidRequest(format!(
                "{} needs at least one key",
                op.name()
            )));
        }

        // Absent keys act as empty sets; all others must share one kind.
        let mut operand_kind: Option<KeyType> = None;
        for key in keys {
            let found = self.store.key_type(key).await?;
            let accepted = match &operand_kind {
                _ if found == KeyType::None => true,
                None => matches!(found, KeyType::Set | KeyType::ZSet),
                Some(kind) => *kind == found,
            };
            if !accepted {
                let expected = operand_kind
                    .map_or_else(|| "set or zset".to_string(), |kind| kind.to_string());
                return Err(CacheError::TypeMismatch {
                    key: key.to_string(),
                    expected,
                    found,
                });
            }
            if operand_kind.is_none() && found != KeyType::None {
                operand_kind = Some(found);
            }
        }

        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        let sorted = operand_kind == Some(KeyType::ZSet);

        if !sorted && !inplace {
            let members = match op {
                SetOp::Union => self.store.sunion(&keys).await?,
                SetOp::Inter => self.store.sinter(&keys).await?,
            };
            return Ok(SetOpOutcome::Members(decode_all(members).collect()));
        }

        let dest = format!("{}-{}", op.name(), Uuid::new_v4());
        let cardinality = match (op, sorted) {
            (SetOp::Union, true) => self.store.zunionstore(&dest, &keys).await?,
            (SetOp::Inter, true) => self.store.zinterstore(&dest, &keys).await?,
            (SetOp::Union, false) => self.store.sunionstore(&dest, &keys).await?,
            (SetOp::Inter, false) => self.store.sinterstore(&dest, &keys).await?,
        };
        if self.result_ttl > 0 {
            self.store.expire(&dest, self.result_ttl).await?;
        }
        debug!(
            "Stored {} of {} keys at '{}' ({} members)",
            op.name(),
            keys.len(),
            dest,
            cardinality
        );

        Ok(SetOpOutcome::Stored {
            key: dest,
            cardinality,
        })
    }
}
