//! Redis Store
//!
//! [`Store`] backed by a Redis server through one multiplexed connection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};

use crate::error::{CacheError, Result};
use crate::store::{KeyType, Store};

const BACKEND: &str = "redis";

/// Configuration for RedisStore.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    ///
    /// Format: `redis://[username:password@]host[:port][/database]`
    pub url: String,
}

/// Redis-backed store.
///
/// The connection is opened once; every command clones the multiplexed
/// handle, so a `RedisStore` can be shared freely across tasks.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

fn command_failed(command: &'static str) -> impl FnOnce(RedisError) -> CacheError {
    move |e| CacheError::store(BACKEND, format!("{command} failed: {e}"))
}

impl RedisStore {
    /// Connects to the server named by `config.url`.
    pub async fn new(config: RedisStoreConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            CacheError::store(BACKEND, format!("Failed to create Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::store(BACKEND, format!("Failed to connect to Redis: {e}")))?;

        Ok(RedisStore { connection })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Runs a `*STORE` command that writes into `dest` and returns a cardinality.
    async fn store_into(&self, command: &'static str, dest: &str, keys: &[String]) -> Result<usize> {
        let mut cmd = redis::cmd(command);
        cmd.arg(dest);
        if command.starts_with('Z') {
            cmd.arg(keys.len());
        }
        cmd.arg(keys)
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed(command))
    }
}

/// Parses the text reply of `INFO` into `field -> value`.
fn parse_info(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

#[async_trait]
impl Store for RedisStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn key_type(&self, key: &str) -> Result<KeyType> {
        let name: String = redis::cmd("TYPE")
            .arg(key)
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("TYPE"))?;
        Ok(KeyType::parse(&name))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.conn().exists(key).await.map_err(command_failed("EXISTS"))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn().get(key).await.map_err(command_failed("GET"))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.conn().set(key, value).await.map_err(command_failed("SET"))
    }

    async fn hset(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        self.conn()
            .hset_multiple(key, fields.as_slice())
            .await
            .map_err(command_failed("HSET"))
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let fields: BTreeMap<String, String> = self
            .conn()
            .hgetall(key)
            .await
            .map_err(command_failed("HGETALL"))?;
        Ok(fields.into_iter().collect())
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        let removed: usize = self.conn().hdel(key, field).await.map_err(command_failed("HDEL"))?;
        Ok(removed > 0)
    }

    async fn rpush(&self, key: &str, values: Vec<String>) -> Result<()> {
        let _: usize = self.conn().rpush(key, values).await.map_err(command_failed("RPUSH"))?;
        Ok(())
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.conn()
            .lrange(key, start as isize, stop as isize)
            .await
            .map_err(command_failed("LRANGE"))
    }

    async fn sadd(&self, key: &str, members: Vec<String>) -> Result<()> {
        let _: usize = self.conn().sadd(key, members).await.map_err(command_failed("SADD"))?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let removed: usize = self.conn().srem(key, member).await.map_err(command_failed("SREM"))?;
        Ok(removed > 0)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.conn().smembers(key).await.map_err(command_failed("SMEMBERS"))
    }

    async fn sunion(&self, keys: &[String]) -> Result<Vec<String>> {
        self.conn().sunion(keys).await.map_err(command_failed("SUNION"))
    }

    async fn sinter(&self, keys: &[String]) -> Result<Vec<String>> {
        self.conn().sinter(keys).await.map_err(command_failed("SINTER"))
    }

    async fn sunionstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.store_into("SUNIONSTORE", dest, keys).await
    }

    async fn sinterstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.store_into("SINTERSTORE", dest, keys).await
    }

    async fn zadd(&self, key: &str, members: Vec<(String, f64)>) -> Result<()> {
        let mut cmd = redis::cmd("ZADD");
        cmd.arg(key);
        for (member, score) in &members {
            cmd.arg(*score).arg(member);
        }
        let _: usize = cmd
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("ZADD"))?;
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool> {
        let removed: usize = self.conn().zrem(key, member).await.map_err(command_failed("ZREM"))?;
        Ok(removed > 0)
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.conn()
            .zrange(key, start as isize, stop as isize)
            .await
            .map_err(command_failed("ZRANGE"))
    }

    async fn zrangebyscore(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        redis::cmd("ZRANGEBYSCORE")
            .arg(key)
            .arg(min)
            .arg(max)
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("ZRANGEBYSCORE"))
    }

    async fn zunionstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.store_into("ZUNIONSTORE", dest, keys).await
    }

    async fn zinterstore(&self, dest: &str, keys: &[String]) -> Result<usize> {
        self.store_into("ZINTERSTORE", dest, keys).await
    }

    async fn card(&self, key: &str, kind: &KeyType) -> Result<usize> {
        let command = match kind {
            KeyType::Hash => "HLEN",
            KeyType::List => "LLEN",
            KeyType::Set => "SCARD",
            KeyType::ZSet => "ZCARD",
            other => {
                return Err(CacheError::store(
                    BACKEND,
                    format!("no cardinality command for {other} keys"),
                ))
            }
        };
        redis::cmd(command)
            .arg(key)
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed(command))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.conn().keys(pattern).await.map_err(command_failed("KEYS"))
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let applied: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("EXPIRE"))?;
        Ok(applied == 1)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let removed: usize = self.conn().del(key).await.map_err(command_failed("DEL"))?;
        Ok(removed > 0)
    }

    async fn dbsize(&self) -> Result<usize> {
        redis::cmd("DBSIZE")
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("DBSIZE"))
    }

    async fn flushdb(&self) -> Result<()> {
        redis::cmd("FLUSHDB")
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("FLUSHDB"))
    }

    async fn info(&self) -> Result<BTreeMap<String, String>> {
        let raw: String = redis::cmd("INFO")
            .query_async(&mut self.conn())
            .await
            .map_err(command_failed("INFO"))?;
        Ok(parse_info(&raw))
    }
}
