mod common;

use axum::{Form, Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use swiplist::{error::SpotifyError, storage::MemoryStore};

/// Refresh endpoint that rotates the access token and counts how many
/// refresh grants it served. Omits refresh_token from the response so the
/// store has to carry the previous one over.
fn refresh_endpoint(count: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/api/token",
            post(
                |State(count): State<Arc<AtomicUsize>>,
                 Form(form): Form<HashMap<String, String>>| async move {
                    assert_eq!(form.get("grant_type").unwrap(), "refresh_token");
                    assert_eq!(form.get("refresh_token").unwrap(), "refresh-1");
                    let n = count.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(json!({
                        "access_token": format!("refreshed-token-{n}"),
                        "expires_in": 3600,
                        "token_type": "Bearer",
                    }))
                },
            ),
        )
        .with_state(count)
}

fn rejecting_endpoint() -> Router {
    Router::new().route(
        "/api/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_grant",
                    "error_description": "Refresh token revoked",
                })),
            )
        }),
    )
}

#[tokio::test]
async fn valid_token_served_without_network() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(Arc::clone(&count))).await;
    let tokens =
        common::token_store(addr, MemoryStore::new(), Some(common::valid_record())).await;

    let record = tokens.ensure_valid().await.unwrap();
    assert_eq!(record.access_token, "valid-token");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_token_refreshed_and_persisted() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(Arc::clone(&count))).await;
    let store = MemoryStore::new();
    let tokens = common::token_store(addr, store.clone(), Some(common::expired_record())).await;

    let record = tokens.ensure_valid().await.unwrap();
    assert_eq!(record.access_token, "refreshed-token-1");
    // Provider did not rotate the refresh token, the old one survives
    assert_eq!(record.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // The refreshed record hit the backing store
    use swiplist::storage::KeyValueStore;
    let persisted = store.get("token").await.unwrap().unwrap();
    assert!(persisted.contains("refreshed-token-1"));
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(Arc::clone(&count))).await;
    let tokens = Arc::new(
        common::token_store(addr, MemoryStore::new(), Some(common::expired_record())).await,
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let tokens = Arc::clone(&tokens);
        handles.push(tokio::spawn(
            async move { tokens.ensure_valid().await },
        ));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap().unwrap().access_token);
    }

    // One network refresh, every caller observes the same rotated token
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(seen.iter().all(|t| t == "refreshed-token-1"));
}

#[tokio::test]
async fn failed_refresh_clears_the_session() {
    let addr = common::serve(rejecting_endpoint()).await;
    let store = MemoryStore::new();
    let tokens = common::token_store(addr, store.clone(), Some(common::expired_record())).await;

    let err = tokens.ensure_valid().await.unwrap_err();
    assert!(matches!(err, SpotifyError::ReauthRequired));

    // Persisted record is gone, a second call fails the same way
    use swiplist::storage::KeyValueStore;
    assert!(store.get("token").await.unwrap().is_none());
    assert!(matches!(
        tokens.ensure_valid().await.unwrap_err(),
        SpotifyError::ReauthRequired
    ));
}

#[tokio::test]
async fn expired_without_refresh_token_requires_reauth() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(Arc::clone(&count))).await;
    let store = MemoryStore::new();
    let mut record = common::expired_record();
    record.refresh_token = None;
    let tokens = common::token_store(addr, store.clone(), Some(record)).await;

    let err = tokens.ensure_valid().await.unwrap_err();
    assert!(matches!(err, SpotifyError::ReauthRequired));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn load_reports_absence_without_error() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(count)).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    assert!(!tokens.load().await.unwrap());
    assert!(matches!(
        tokens.ensure_valid().await.unwrap_err(),
        SpotifyError::ReauthRequired
    ));
}

#[tokio::test]
async fn rejection_refresh_skipped_when_token_already_rotated() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(Arc::clone(&count))).await;
    let tokens =
        common::token_store(addr, MemoryStore::new(), Some(common::expired_record())).await;

    // First rejection path refreshes for real
    let record = tokens.refresh_after_rejection("stale-token").await.unwrap();
    assert_eq!(record.access_token, "refreshed-token-1");
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // A second caller still holding the stale token gets the rotated record
    // without another round trip
    let record = tokens.refresh_after_rejection("stale-token").await.unwrap();
    assert_eq!(record.access_token, "refreshed-token-1");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidate_drops_memory_and_store() {
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(refresh_endpoint(count)).await;
    let store = MemoryStore::new();
    let tokens = common::token_store(addr, store.clone(), Some(common::valid_record())).await;

    tokens.invalidate().await.unwrap();

    use swiplist::storage::KeyValueStore;
    assert!(store.get("token").await.unwrap().is_none());
    assert!(matches!(
        tokens.ensure_valid().await.unwrap_err(),
        SpotifyError::ReauthRequired
    ));
}
