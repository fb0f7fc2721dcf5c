//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against the
//! in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use typed_cache::{api::create_router, store::MemoryStore, AppState, TypedCache};

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = TypedCache::new(Arc::new(MemoryStore::default()));
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn put(app: &Router, body: Value) -> StatusCode {
    send(app, "PUT", "/entries", Some(body)).await.0
}

// == PUT /entries ==

#[tokio::test]
async fn test_put_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/entries",
        Some(json!({"key": "test_key", "value": "test_value"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_put_endpoint_with_ttl() {
    let app = create_test_app();

    let status = put(&app, json!({"key": "ttl_key", "value": "v", "ttl": 1})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/entries/ttl_key", None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let (status, _) = send(&app, "GET", "/entries/ttl_key", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_out_of_range_ttl_is_bad_request() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/entries",
        Some(json!({"key": "k", "value": "v", "ttl": u64::MAX / 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("ttl"));
}

#[tokio::test]
async fn test_put_empty_key_is_bad_request() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/entries", Some(json!({"key": "", "value": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_put_nested_value_is_bad_request() {
    let app = create_test_app();

    let status = put(&app, json!({"key": "nested", "value": {"a": [1, 2]}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_type_mismatch_is_conflict() {
    let app = create_test_app();

    assert_eq!(put(&app, json!({"key": "h", "value": {"a": 1}})).await, StatusCode::OK);
    let (status, json) = send(&app, "PUT", "/entries", Some(json!({"key": "h", "value": [1]}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("hash"));
}

// == GET /entries/:key ==

#[tokio::test]
async fn test_get_typed_values() {
    let app = create_test_app();

    put(&app, json!({"key": "n", "value": 4})).await;
    put(&app, json!({"key": "l", "value": [4, "Fds", false, null]})).await;
    put(&app, json!({"key": "m", "value": {"a": 1, "b": "fds"}})).await;

    let (status, json) = send(&app, "GET", "/entries/n", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["value"], json!({"type": "scalar", "value": 4}));

    let (_, json) = send(&app, "GET", "/entries/l", None).await;
    assert_eq!(json["value"], json!({"type": "list", "value": [4, "Fds", false, null]}));

    let (_, json) = send(&app, "GET", "/entries/m", None).await;
    assert_eq!(json["value"], json!({"type": "map", "value": {"a": 1, "b": "fds"}}));
}

#[tokio::test]
async fn test_get_raw_string() {
    let app = create_test_app();
    put(&app, json!({"key": "s", "value": "hello"})).await;

    let (_, json) = send(&app, "GET", "/entries/s?raw=true", None).await;
    assert_eq!(json["value"]["value"], "\"hello\"");
}

#[tokio::test]
async fn test_get_sorted_set_ranges() {
    let app = create_test_app();
    let status = put(
        &app,
        json!({
            "key": "testSortedSet",
            "value": {"name1": 4, "name2": 3, "name3": 2, "name4": 1},
            "shape": "sorted"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/entries/testSortedSet", None).await;
    assert_eq!(json["value"]["value"], json!(["name4", "name3", "name2", "name1"]));

    let (_, json) = send(&app, "GET", "/entries/testSortedSet?start=0&stop=1", None).await;
    assert_eq!(json["value"]["value"], json!(["name4", "name3"]));

    let (_, json) = send(&app, "GET", "/entries/testSortedSet?min=2&max=3", None).await;
    assert_eq!(json["value"]["value"], json!(["name3", "name2"]));

    let (status, _) = send(&app, "GET", "/entries/testSortedSet?min=2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/entries/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

// == DELETE /entries ==

#[tokio::test]
async fn test_remove_by_pattern() {
    let app = create_test_app();
    for i in 0..3 {
        put(&app, json!({"key": format!("user:{i}"), "value": i})).await;
    }
    put(&app, json!({"key": "other", "value": 1})).await;

    let (status, json) = send(&app, "DELETE", "/entries?pattern=user:*&get_value=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], "many");
    assert_eq!(json["values"].as_array().unwrap().len(), 3);

    let (_, json) = send(&app, "GET", "/size", None).await;
    assert_eq!(json["size"], 1);

    let (_, json) = send(&app, "DELETE", "/entries?pattern=missing*", None).await;
    assert_eq!(json["matched"], "nothing");
}

#[tokio::test]
async fn test_remove_returns_value_by_default() {
    let app = create_test_app();
    put(&app, json!({"key": "session", "value": "abc"})).await;

    let (status, json) = send(&app, "DELETE", "/entries?pattern=session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], "one");
    assert_eq!(json["values"], json!(["abc"]));

    put(&app, json!({"key": "session", "value": "abc"})).await;
    let (_, json) = send(&app, "DELETE", "/entries?pattern=session&get_value=false", None).await;
    assert_eq!(json["matched"], "one");
    assert_eq!(json["values"], json!([]));
}

// == DELETE /entries/:key/members ==

#[tokio::test]
async fn test_remove_member() {
    let app = create_test_app();
    put(&app, json!({"key": "testSet", "value": [1, 2, 3, 4, 5], "shape": "set"})).await;

    let (status, json) = send(
        &app,
        "DELETE",
        "/entries/testSet/members",
        Some(json!({"member": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], true);

    let (_, json) = send(&app, "GET", "/size?key=testSet", None).await;
    assert_eq!(json["size"], 4);
}

#[tokio::test]
async fn test_remove_member_from_list_is_conflict() {
    let app = create_test_app();
    put(&app, json!({"key": "l", "value": [1, 2]})).await;

    let (status, _) = send(&app, "DELETE", "/entries/l/members", Some(json!({"member": 1}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// == GET /keys, GET /size, POST /flush ==

#[tokio::test]
async fn test_keys_size_and_flush() {
    let app = create_test_app();
    for i in 0..10 {
        put(&app, json!({"key": format!("test_key_unique_{i}"), "value": "1"})).await;
    }

    let (_, json) = send(&app, "GET", "/keys?pattern=test_key_unique_*", None).await;
    assert_eq!(json["count"], 10);

    let (_, json) = send(&app, "GET", "/keys", None).await;
    assert_eq!(json["pattern"], "*");
    assert_eq!(json["count"], 10);

    let (_, json) = send(&app, "GET", "/size?key=test_key_unique_0", None).await;
    assert_eq!(json["size"], -1);

    let (status, _) = send(&app, "POST", "/flush", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/size", None).await;
    assert_eq!(json["size"], 0);
}

// == POST /sets/union, POST /sets/inter ==

#[tokio::test]
async fn test_union_and_inter() {
    let app = create_test_app();
    put(&app, json!({"key": "s1", "value": [3, 4, 5, 6, 7], "shape": "set"})).await;
    put(&app, json!({"key": "s2", "value": [5, 6, 7, 8, 9], "shape": "set"})).await;

    let (status, json) = send(&app, "POST", "/sets/inter", Some(json!({"keys": ["s1", "s2"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["members"], json!([5, 6, 7]));
    assert_eq!(json["cardinality"], 3);

    let (_, json) = send(
        &app,
        "POST",
        "/sets/union",
        Some(json!({"keys": ["s1", "s2"], "inplace": true})),
    )
    .await;
    assert_eq!(json["cardinality"], 7);
    let stored = json["key"].as_str().unwrap().to_string();
    assert!(stored.starts_with("union-"));

    let (_, json) = send(&app, "GET", &format!("/size?key={stored}"), None).await;
    assert_eq!(json["size"], 7);
}

#[tokio::test]
async fn test_set_op_without_keys_is_bad_request() {
    let app = create_test_app();

    let (status, _) = send(&app, "POST", "/sets/union", Some(json!({"keys": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == POST /ns-key ==

#[tokio::test]
async fn test_ns_key() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/ns-key",
        Some(json!({
            "namespace": "webpage",
            "resource": "home",
            "action": "render",
            "params": [["lang", "en"], ["page", 0]]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "web_home_render?lang=en");
}

// == GET /info, GET /health ==

#[tokio::test]
async fn test_info_endpoint() {
    let app = create_test_app();
    put(&app, json!({"key": "a", "value": 1})).await;
    send(&app, "GET", "/entries/a", None).await;
    send(&app, "GET", "/entries/missing", None).await;

    let (status, json) = send(&app, "GET", "/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["info"]["keys"], "1");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}
