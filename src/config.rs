//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_RESULT_TTL;

/// Which store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "redis" => Ok(Backend::Redis),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    pub redis_password: Option<String>,
    /// Key bound of the memory backend; 0 is unbounded
    pub max_entries: usize,
    /// Memory backend expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// TTL in seconds of stored union/intersection results
    pub result_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_DB` - Redis database index (default: 0)
    /// - `REDIS_PASSWORD` - Redis password (default: none)
    /// - `MAX_ENTRIES` - Memory backend key bound (default: 0, unbounded)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `RESULT_TTL` - TTL of stored set-algebra results (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_or("CACHE_BACKEND", defaults.backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: env_or("REDIS_PORT", defaults.redis_port),
            redis_db: env_or("REDIS_DB", defaults.redis_db),
            redis_password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            result_ttl: env_or("RESULT_TTL", defaults.result_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Connection URL of the configured Redis server.
    pub fn redis_url(&self) -> String {
        let auth = self
            .redis_password
            .as_deref()
            .map(|password| format!(":{password}@"))
            .unwrap_or_default();
        format!(
            "redis://{}{}:{}/{}",
            auth, self.redis_host, self.redis_port, self.redis_db
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_db: 0,
            redis_password: None,
            max_entries: 0,
            cleanup_interval: 1,
            result_ttl: DEFAULT_RESULT_TTL,
            server_port: 3000,
        }
    }
}
