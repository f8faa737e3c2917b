mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{MapCache, issue_token, memory_state_with_cache, test_server};
use linkcore::error::AppError;

#[tokio::test]
async fn test_warm_entry_gone_after_rename() {
    let cache = Arc::new(MapCache::default());
    let state = memory_state_with_cache(cache.clone());
    let link = state
        .allocation_service
        .create("https://example.com/a", Some("abc123"), None)
        .await
        .unwrap();

    state.resolution_service.resolve("abc123").await.unwrap();
    cache.wait_for("abc123").await;

    state
        .lifecycle_service
        .rename(link.id, "xyz789", None)
        .await
        .unwrap();

    assert!(!cache.contains("abc123"));
    let err = state.resolution_service.resolve("abc123").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
    assert_eq!(
        state.resolution_service.resolve("xyz789").await.unwrap(),
        "https://example.com/a"
    );
}

#[tokio::test]
async fn test_warm_entry_gone_after_delete() {
    let cache = Arc::new(MapCache::default());
    let state = memory_state_with_cache(cache.clone());
    let link = state
        .allocation_service
        .create("https://example.com/a", Some("gone11"), None)
        .await
        .unwrap();

    state.resolution_service.resolve("gone11").await.unwrap();
    cache.wait_for("gone11").await;

    state.lifecycle_service.delete(link.id, None).await.unwrap();

    assert!(!cache.contains("gone11"));
    let err = state.resolution_service.resolve("gone11").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_late_fill_does_not_outlive_rename() {
    let cache = Arc::new(MapCache::with_write_delay(Duration::from_millis(30)));
    let state = memory_state_with_cache(cache.clone());
    let link = state
        .allocation_service
        .create("https://example.com/a", Some("abc123"), None)
        .await
        .unwrap();

    // The fill is still sleeping when the rename commits and invalidates.
    state.resolution_service.resolve("abc123").await.unwrap();
    state
        .lifecycle_service
        .rename(link.id, "xyz789", None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!cache.contains("abc123"));
    let err = state.resolution_service.resolve("abc123").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_late_fill_does_not_outlive_delete() {
    let cache = Arc::new(MapCache::with_write_delay(Duration::from_millis(30)));
    let state = memory_state_with_cache(cache.clone());
    let link = state
        .allocation_service
        .create("https://example.com/a", Some("gone11"), None)
        .await
        .unwrap();

    state.resolution_service.resolve("gone11").await.unwrap();
    state.lifecycle_service.delete(link.id, None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!cache.contains("gone11"));
    let err = state.resolution_service.resolve("gone11").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_reused_code_serves_new_destination() {
    let cache = Arc::new(MapCache::default());
    let state = memory_state_with_cache(cache.clone());
    let first = state
        .allocation_service
        .create("https://example.com/old", Some("reused"), None)
        .await
        .unwrap();

    state.resolution_service.resolve("reused").await.unwrap();
    cache.wait_for("reused").await;

    state
        .lifecycle_service
        .rename(first.id, "moved", None)
        .await
        .unwrap();
    state
        .allocation_service
        .create("https://example.com/new", Some("reused"), None)
        .await
        .unwrap();

    assert_eq!(
        state.resolution_service.resolve("reused").await.unwrap(),
        "https://example.com/new"
    );
}

#[tokio::test]
async fn test_redirect_stops_after_rename_over_http() {
    let cache = Arc::new(MapCache::default());
    let state = memory_state_with_cache(cache.clone());
    let (token, _) = issue_token(&state, "alice").await;
    let server = test_server(state);

    let created = server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com/a", "custom_alias": "abc123" }))
        .await
        .json::<serde_json::Value>();

    server
        .get("/abc123")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
    cache.wait_for("abc123").await;

    server
        .patch(&format!("/api/links/{}", created["id"]))
        .authorization_bearer(&token)
        .json(&json!({ "short_code": "xyz789" }))
        .await
        .assert_status_ok();

    server.get("/abc123").await.assert_status_not_found();
}
