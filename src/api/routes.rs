//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    flush_handler, get_handler, health_handler, info_handler, inter_handler, keys_handler,
    ns_key_handler, put_handler, remove_handler, remove_member_handler, size_handler,
    union_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/entries", put(put_handler).delete(remove_handler))
        .route("/entries/:key", get(get_handler))
        .route("/entries/:key/members", delete(remove_member_handler))
        .route("/keys", get(keys_handler))
        .route("/size", get(size_handler))
        .route("/flush", post(flush_handler))
        .route("/sets/union", post(union_handler))
        .route("/sets/inter", post(inter_handler))
        .route("/ns-key", post(ns_key_handler))
        .route("/info", get(info_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
