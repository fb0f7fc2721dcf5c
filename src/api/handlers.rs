//! API Handlers
//!
//! HTTP request handlers for each admin endpoint. Each one is a thin
//! translation between JSON DTOs and a [`TypedCache`] operation.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::{make_ns_key, CacheValue, Scalar, TypedCache};
use crate::error::{CacheError, Result};
use crate::models::{
    FlushResponse, GetQuery, GetResponse, HealthResponse, InfoResponse, KeysQuery, KeysResponse,
    NsKeyRequest, NsKeyResponse, PutRequest, PutResponse, RemoveMemberRequest,
    RemoveMemberResponse, RemoveQuery, RemoveResponse, SetOpRequest, SetOpResponse, SizeQuery,
    SizeResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: TypedCache,
}

impl AppState {
    pub fn new(cache: TypedCache) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /entries
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = CacheValue::from_json(req.value, req.shape)?;
    state.cache.put(&req.key, value, req.ttl).await?;

    Ok(Json(PutResponse::new(req.key)))
}

/// Handler for GET /entries/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let options = query.options()?;
    match state.cache.get_with(&key, options).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries
pub async fn remove_handler(
    State(state): State<AppState>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<RemoveResponse>> {
    let removed = state.cache.remove(&query.pattern, query.get_value).await?;
    Ok(Json(removed.into()))
}

/// Handler for DELETE /entries/:key/members
pub async fn remove_member_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<RemoveMemberRequest>,
) -> Result<Json<RemoveMemberResponse>> {
    let member = Scalar::from_json(req.member)?;
    let removed = state.cache.remove_from(&key, member).await?;
    Ok(Json(RemoveMemberResponse { key, removed }))
}

/// Handler for GET /keys
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Result<Json<KeysResponse>> {
    let keys = state.cache.keys(&query.pattern).await?;
    Ok(Json(KeysResponse::new(query.pattern, keys)))
}

/// Handler for GET /size
pub async fn size_handler(
    State(state): State<AppState>,
    Query(query): Query<SizeQuery>,
) -> Result<Json<SizeResponse>> {
    let size = state.cache.size(query.key.as_deref()).await?;
    Ok(Json(SizeResponse {
        key: query.key,
        size,
    }))
}

/// Handler for POST /flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    state.cache.flush().await?;
    Ok(Json(FlushResponse {
        message: "Cache flushed".to_string(),
    }))
}

fn key_refs(keys: &[String]) -> Vec<&str> {
    keys.iter().map(String::as_str).collect()
}

/// Handler for POST /sets/union
pub async fn union_handler(
    State(state): State<AppState>,
    Json(req): Json<SetOpRequest>,
) -> Result<Json<SetOpResponse>> {
    let outcome = state.cache.union(&key_refs(&req.keys), req.inplace).await?;
    Ok(Json(outcome.into()))
}

/// Handler for POST /sets/inter
pub async fn inter_handler(
    State(state): State<AppState>,
    Json(req): Json<SetOpRequest>,
) -> Result<Json<SetOpResponse>> {
    let outcome = state.cache.inter(&key_refs(&req.keys), req.inplace).await?;
    Ok(Json(outcome.into()))
}

/// Handler for POST /ns-key
pub async fn ns_key_handler(Json(req): Json<NsKeyRequest>) -> Result<Json<NsKeyResponse>> {
    let params = req
        .params
        .into_iter()
        .map(|(name, value)| Scalar::from_json(value).map(|value| (name, value)))
        .collect::<Result<Vec<_>>>()?;
    let params: Vec<(&str, Scalar)> = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.clone()))
        .collect();

    let key = make_ns_key(&req.namespace, &req.resource, req.action.as_deref(), &params)?;
    Ok(Json(NsKeyResponse { key }))
}

/// Handler for GET /info
pub async fn info_handler(State(state): State<AppState>) -> Result<Json<InfoResponse>> {
    let info = state.cache.info().await?;
    Ok(Json(InfoResponse {
        backend: state.cache.store().name(),
        info,
    }))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.store().name()))
}
