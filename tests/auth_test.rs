mod common;

use axum::{Form, Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use swiplist::{
    error::SpotifyError, management::AuthSessionManager, storage::MemoryStore,
    types::CallbackParams,
};

fn session_manager(store: MemoryStore) -> AuthSessionManager<MemoryStore> {
    AuthSessionManager::new(
        store,
        "https://accounts.example/authorize".to_string(),
        "client-id".to_string(),
        "http://127.0.0.1:9/callback".to_string(),
        "playlist-modify-private".to_string(),
    )
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Token endpoint that accepts any authorization_code grant and counts
/// exchanges.
fn exchange_endpoint(count: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/api/token",
            post(
                |State(count): State<Arc<AtomicUsize>>,
                 Form(form): Form<HashMap<String, String>>| async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(form.get("grant_type").unwrap(), "authorization_code");
                    assert!(form.contains_key("code_verifier"));
                    Json(json!({
                        "access_token": "exchanged-token",
                        "refresh_token": "exchanged-refresh",
                        "expires_in": 3600,
                        "token_type": "Bearer",
                    }))
                },
            ),
        )
        .with_state(count)
}

#[tokio::test]
async fn begin_login_builds_pkce_authorize_url() {
    let sessions = session_manager(MemoryStore::new());
    let url = sessions.begin_login().await.unwrap();

    assert!(url.starts_with("https://accounts.example/authorize?"));
    assert_eq!(query_param(&url, "response_type").unwrap(), "code");
    assert_eq!(query_param(&url, "code_challenge_method").unwrap(), "S256");
    assert!(!query_param(&url, "code_challenge").unwrap().is_empty());
    assert_eq!(query_param(&url, "state").unwrap().chars().count(), 32);
    assert_eq!(query_param(&url, "client_id").unwrap(), "client-id");
}

#[tokio::test]
async fn complete_login_rejects_mismatched_state() {
    let store = MemoryStore::new();
    let sessions = session_manager(store.clone());
    let _url = sessions.begin_login().await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(exchange_endpoint(Arc::clone(&count))).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some("not-the-stored-state".to_string()),
        error: None,
    };
    let err = sessions.complete_login(&tokens, &params).await.unwrap_err();
    assert!(matches!(err, SpotifyError::StateMismatch));

    // No exchange was attempted
    assert_eq!(count.load(Ordering::SeqCst), 0);

    // The session was consumed by the failed attempt
    let err = sessions.complete_login(&tokens, &params).await.unwrap_err();
    assert!(matches!(err, SpotifyError::MissingVerifier));
}

#[tokio::test]
async fn complete_login_without_pending_session_fails() {
    let sessions = session_manager(MemoryStore::new());
    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(exchange_endpoint(count)).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some("whatever".to_string()),
        error: None,
    };
    let err = sessions.complete_login(&tokens, &params).await.unwrap_err();
    assert!(matches!(err, SpotifyError::MissingVerifier));
}

#[tokio::test]
async fn complete_login_exchanges_code_for_token() {
    let sessions = session_manager(MemoryStore::new());
    let url = sessions.begin_login().await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(exchange_endpoint(Arc::clone(&count))).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(state),
        error: None,
    };
    let record = sessions.complete_login(&tokens, &params).await.unwrap();

    assert_eq!(record.access_token, "exchanged-token");
    assert_eq!(record.refresh_token.as_deref(), Some("exchanged-refresh"));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Expiry carries the 60s safety margin
    let now = chrono::Utc::now().timestamp();
    assert!(record.expires_at > now + 3400);
    assert!(record.expires_at <= now + 3540);

    // ensure_valid returns the fresh record without any further exchange
    let again = tokens.ensure_valid().await.unwrap();
    assert_eq!(again.access_token, "exchanged-token");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn complete_login_surfaces_provider_rejection() {
    let sessions = session_manager(MemoryStore::new());
    let url = sessions.begin_login().await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let app = Router::new().route(
        "/api/token",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json::<Value>(json!({
                    "error": "invalid_grant",
                    "error_description": "Authorization code expired",
                })),
            )
        }),
    );
    let addr = common::serve(app).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    let params = CallbackParams {
        code: Some("expired-code".to_string()),
        state: Some(state),
        error: None,
    };
    match sessions.complete_login(&tokens, &params).await.unwrap_err() {
        SpotifyError::AuthExchange { error, description } => {
            assert_eq!(error, "invalid_grant");
            assert_eq!(description, "Authorization code expired");
        }
        other => panic!("expected AuthExchange, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_login_surfaces_denied_authorization() {
    let sessions = session_manager(MemoryStore::new());
    let url = sessions.begin_login().await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let addr = common::serve(exchange_endpoint(Arc::clone(&count))).await;
    let tokens = common::token_store(addr, MemoryStore::new(), None).await;

    let params = CallbackParams {
        code: None,
        state: Some(state),
        error: Some("access_denied".to_string()),
    };
    match sessions.complete_login(&tokens, &params).await.unwrap_err() {
        SpotifyError::AuthExchange { error, .. } => assert_eq!(error, "access_denied"),
        other => panic!("expected AuthExchange, got {other:?}"),
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
