//! Store Module
//!
//! Backends the typed cache runs on. A store exposes the primitive
//! commands of a Redis-style key/value server over plain strings; the
//! facade in [`crate::cache`] decides which primitive to use.

mod memory;
mod redis;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::tasks::spawn_cleanup_task;

pub use memory::{CacheStats, MemoryStore, MemoryStoreConfig};
pub use self::redis::{RedisStore, RedisStoreConfig};

// == Key Type ==
/// Store-side representation of a key, as reported by `TYPE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyType {
    None,
    String,
    List,
    Set,
    Hash,
    ZSet,
    /// Anything else the server knows about (streams, modules, ...)
    Other(String),
}

impl KeyType {
    /// Parses the reply of a `TYPE` command.
    pub fn parse(name: &str) -> Self {
        match name {
            "none" => KeyType::None,
            "string" => KeyType::String,
            "list" => KeyType::List,
            "set" => KeyType::Set,
            "hash" => KeyType::Hash,
            "zset" => KeyType::ZSet,
            other => KeyType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            KeyType::None => "none",
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::Hash => "hash",
            KeyType::ZSet => "zset",
            KeyType::Other(name) => name,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Store Trait ==
/// Primitive command set of a Redis-style key/value store.
///
/// Every method is a single round trip. Commands issued against a key of
/// another type fail with a `WRONGTYPE` store error, mirroring Redis.
/// Writes of empty collections are not supported by Redis and should not
/// be issued.
#[async_trait]
pub trait Store: Send + Sync {
    /// A name for logs and errors, e.g. "memory" or "redis".
    fn name(&self) -> &'static str;

    async fn key_type(&self, key: &str) -> Result<KeyType>;
    async fn exists(&self, key: &str) -> Result<bool>;

    // strings
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;

    // hashes
    async fn hset(&self, key: &str, fields: Vec<(String, String)>) -> Result<()>;
    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>>;
    async fn hdel(&self, key: &str, field: &str) -> Result<bool>;

    // lists
    async fn rpush(&self, key: &str, values: Vec<String>) -> Result<()>;
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    // sets
    async fn sadd(&self, key: &str, members: Vec<String>) -> Result<()>;
    async fn srem(&self, key: &str, member: &str) -> Result<bool>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>>;
    async fn sunion(&self, keys: &[String]) -> Result<Vec<String>>;
    async fn sinter(&self, keys: &[String]) -> Result<Vec<String>>;
    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<usize>;
    async fn sinterstore(&self, dest: &str, keys: &[String]) -> Result<usize>;

    // sorted sets
    async fn zadd(&self, key: &str, members: Vec<(String, f64)>) -> Result<()>;
    async fn zrem(&self, key: &str, member: &str) -> Result<bool>;
    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;
    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>>;
    async fn zunionstore(&self, dest: &str, keys: &[String]) -> Result<usize>;
    async fn zinterstore(&self, dest: &str, keys: &[String]) -> Result<usize>;

    /// Member count of a collection: HLEN, LLEN, SCARD or ZCARD by `kind`.
    async fn card(&self, key: &str, kind: &KeyType) -> Result<usize>;

    // keyspace
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;
    async fn expire(&self, key: &str, seconds: u64) -> Result<bool>;
    async fn del(&self, key: &str) -> Result<bool>;
    async fn dbsize(&self) -> Result<usize>;
    async fn flushdb(&self) -> Result<()>;
    async fn info(&self) -> Result<BTreeMap<String, String>>;
}

// == Connect ==
/// An opened store, with the expiry sweep of the memory backend.
pub struct Connection {
    pub store: Arc<dyn Store>,
    /// Running cleanup task; `None` for Redis, which expires keys itself.
    pub cleanup: Option<JoinHandle<()>>,
}

/// Builds the store selected by the configuration.
///
/// The memory backend gets its cleanup task spawned on the current runtime.
pub async fn connect(config: &Config) -> Result<Connection> {
    match config.backend {
        Backend::Memory => {
            info!("Using in-memory store (max_entries={})", config.max_entries);
            let memory = MemoryStore::new(MemoryStoreConfig {
                max_entries: config.max_entries,
            });
            let cleanup = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
            info!("Background cleanup task started");
            Ok(Connection {
                store: Arc::new(memory),
                cleanup: Some(cleanup),
            })
        }
        Backend::Redis => {
            info!(
                "Connecting to Redis at {}:{} db {}",
                config.redis_host, config.redis_port, config.redis_db
            );
            let store = RedisStore::new(RedisStoreConfig {
                url: config.redis_url(),
            })
            .await?;
            Ok(Connection {
                store: Arc::new(store),
                cleanup: None,
            })
        }
    }
}
