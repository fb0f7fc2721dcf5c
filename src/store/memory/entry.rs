//! Cache Entry Module
//!
//! A single keyspace entry of the memory store: one of the five Redis
//! value kinds plus TTL metadata.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::KeyType;

// == Stored Value ==
/// Store-side representation of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Str(String),
    List(Vec<String>),
    Set(HashSet<String>),
    Hash(HashMap<String, String>),
    /// member -> score
    ZSet(HashMap<String, f64>),
}

impl StoredValue {
    pub fn key_type(&self) -> KeyType {
        match self {
            StoredValue::Str(_) => KeyType::String,
            StoredValue::List(_) => KeyType::List,
            StoredValue::Set(_) => KeyType::Set,
            StoredValue::Hash(_) => KeyType::Hash,
            StoredValue::ZSet(_) => KeyType::ZSet,
        }
    }

    /// Member count, `None` for strings.
    pub fn card(&self) -> Option<usize> {
        match self {
            StoredValue::Str(_) => None,
            StoredValue::List(items) => Some(items.len()),
            StoredValue::Set(members) => Some(members.len()),
            StoredValue::Hash(fields) => Some(fields.len()),
            StoredValue::ZSet(members) => Some(members.len()),
        }
    }

    /// Collections are deleted once their last member goes away.
    pub fn is_empty_collection(&self) -> bool {
        self.card() == Some(0)
    }

    /// Members ordered by score, ties broken by member.
    pub fn zset_sorted(members: &HashMap<String, f64>) -> Vec<(&String, f64)> {
        let mut sorted: Vec<(&String, f64)> = members.iter().map(|(m, s)| (m, *s)).collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

// == Cache Entry ==
/// An entry with its value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: StoredValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    /// Creates an entry that never expires.
    pub fn new(value: StoredValue) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Sets the entry to expire `ttl_seconds` from now.
    pub fn expire_in(&mut self, ttl_seconds: u64) {
        let ttl_ms = ttl_seconds.saturating_mul(1000);
        self.expires_at = Some(current_timestamp_ms().saturating_add(ttl_ms));
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
