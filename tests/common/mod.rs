#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use chrono::Utc;
use reqwest::Client;
use swiplist::{
    management::TokenStore,
    storage::{KeyValueStore, MemoryStore},
    types::TokenRecord,
};

/// Binds a mock Spotify endpoint router on an ephemeral local port and
/// serves it in the background.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn valid_record() -> TokenRecord {
    TokenRecord {
        access_token: "valid-token".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

pub fn expired_record() -> TokenRecord {
    TokenRecord {
        access_token: "stale-token".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Utc::now().timestamp() - 100,
    }
}

/// Token store pointed at a mock token endpoint, optionally pre-seeded with
/// a persisted record.
pub async fn token_store(
    addr: SocketAddr,
    store: MemoryStore,
    record: Option<TokenRecord>,
) -> TokenStore<MemoryStore> {
    if let Some(record) = &record {
        store
            .set("token", &serde_json::to_string(record).unwrap())
            .await
            .unwrap();
    }
    let tokens = TokenStore::new(
        Client::new(),
        format!("http://{addr}/api/token"),
        "client-id".to_string(),
        store,
    );
    if record.is_some() {
        assert!(tokens.load().await.unwrap());
    }
    tokens
}
