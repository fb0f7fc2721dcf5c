//! API Module
//!
//! HTTP handlers and routing for the cache admin REST API.
//!
//! # Endpoints
//! - `PUT /entries` - Store a value (`{key, value, ttl?, shape?}`)
//! - `GET /entries/:key` - Read a value (`?raw=&start=&stop=&min=&max=`)
//! - `DELETE /entries?pattern=&get_value=` - Remove keys matching a pattern
//! - `DELETE /entries/:key/members` - Remove one member of a collection
//! - `GET /keys?pattern=` - List keys
//! - `GET /size?key=` - Key count or member count
//! - `POST /flush` - Delete every key
//! - `POST /sets/union`, `POST /sets/inter` - Set algebra
//! - `POST /ns-key` - Build a namespaced key
//! - `GET /info` - Store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
