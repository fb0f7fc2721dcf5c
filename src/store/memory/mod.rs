//! Memory Store
//!
//! In-process [`Store`] with Redis command semantics, TTL expiration and
//! an optional LRU capacity bound.

mod entry;
mod glob;
mod keyspace;
mod lru;
mod stats;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{KeyType, Store};

use keyspace::Keyspace;

pub use stats::CacheStats;

/// Configuration for MemoryStore.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Maximum number of keys; 0 disables the bound.
    pub max_entries: usize,
}

/// Shared in-memory keyspace. Clones share the same data.
///
/// Every command takes the write lock: reads update hit/miss statistics,
/// LRU order and lazily drop expired keys.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> Self {
        Self {
            keyspace: Arc::new(RwLock::new(Keyspace::new(config.max_entries))),
        }
    }

    /// Drops every expired key, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.keyspace.write().await.cleanup_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.keyspace.read().await.stats().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn key_type(&self, key: &str) -> Result<KeyType> {
        Ok(self.keyspace.write().await.key_type(key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.keyspace.write().await.exists(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.keyspace.write().await.get(key)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.keyspace.write().await.set(key, value);
        Ok(())
    }

    async fn hset(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        self.keyspace.write().await.hset(key, fields)
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        self.keyspace.write().await.hgetall(key)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        self.keyspace.write().await.hdel(key, field)
    }

    async fn rpush(&self, key: &str, values: Vec<String>) -> Result<()> {
        self.keyspace.write().await.rpush(key, values)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.keyspace.write().await.lrange(key, start, stop)
    }

    async fn sadd(&self, key: &str, members: Vec<String>) -> Result<()> {
        self.keyspace.write().await.sadd(key, members)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        self.keyspace.write().await.srem(key, member)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.keyspace.write().await.smembers(key)
    }

    async fn sunion(&self, keys: &[String]) -> Result<Vec<String>> {
        self.keyspace.write().await.sunion(keys)
    }

    async fn sinter(&self, keys: &[String]) -> Result<Vec<String>> {
        self.keyspace.write().await.sinter(keys)
    }

    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.keyspace.write().await.sunionstore(dest, keys)
    }

    async fn sinterstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.keyspace.write().await.sinterstore(dest, keys)
    }

    async fn zadd(&self, key: &str, members: Vec<(String, f64)>) -> Result<()> {
        self.keyspace.write().await.zadd(key, members)
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool> {
        self.keyspace.write().await.zrem(key, member)
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.keyspace.write().await.zrange(key, start, stop)
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        self.keyspace.write().await.zrangebyscore(key, min, max)
    }

    async fn zunionstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.keyspace.write().await.zunionstore(dest, keys)
    }

    async fn zinterstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.keyspace.write().await.zinterstore(dest, keys)
    }

    async fn card(&self, key: &str, kind: &KeyType) -> Result<usize> {
        self.keyspace.write().await.card(key, kind)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self.keyspace.write().await.keys(pattern))
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        Ok(self.keyspace.write().await.expire(key, seconds))
    }

    async fn del(&self, key: &str) -> Result<bool> {
        Ok(self.keyspace.write().await.del(key))
    }

    async fn dbsize(&self) -> Result<usize> {
        Ok(self.keyspace.write().await.dbsize())
    }

    async fn flushdb(&self) -> Result<()> {
        self.keyspace.write().await.flushdb();
        Ok(())
    }

    async fn info(&self) -> Result<BTreeMap<String, String>> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.stats().to_info(keyspace.len()))
    }
}
