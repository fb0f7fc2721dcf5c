//! Typed Cache - a typed key/value cache facade over Redis-style stores
//!
//! Maps native values (scalars, lists, sets, field maps, score maps) onto
//! string, list, set, hash and zset keys, with TTLs, set algebra and
//! namespaced keys. Runs on Redis or on an in-process memory store, and
//! ships a small HTTP admin API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheValue, Scalar, TypedCache};
pub use config::{Backend, Config};
pub use error::{CacheError, Result};
pub use store::Store;
pub use tasks::spawn_cleanup_task;
