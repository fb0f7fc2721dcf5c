//! Memory Store Statistics
//!
//! Counters reported through `INFO` by the in-memory store.

use std::collections::BTreeMap;

// == Cache Stats ==
/// Keyspace counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Reads that found a live key
    pub hits: u64,
    /// Reads of absent or expired keys
    pub misses: u64,
    /// Keys dropped to honor the capacity bound
    pub evictions: u64,
    /// Keys dropped because their TTL elapsed
    pub expired: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn record_read(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    /// Renders the counters as `INFO`-style fields.
    pub fn to_info(&self, keys: usize) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        info.insert("backend".to_string(), "memory".to_string());
        info.insert("keys".to_string(), keys.to_string());
        info.insert("hits".to_string(), self.hits.to_string());
        info.insert("misses".to_string(), self.misses.to_string());
        info.insert("evictions".to_string(), self.evictions.to_string());
        info.insert("expired".to_string(), self.expired.to_string());
        info.insert("hit_rate".to_string(), format!("{:.4}", self.hit_rate()));
        info
    }
}
