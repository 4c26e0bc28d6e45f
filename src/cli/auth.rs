use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::{AuthSessionManager, TokenStore},
    server::{AuthFlowState, start_api_server},
    storage::{FileStore, MemoryStore},
    success,
    types::TokenRecord,
    warning,
};

/// Runs the complete PKCE login flow.
///
/// Generates the verifier/challenge pair and anti-CSRF state, launches the
/// local callback server, opens the authorization URL in the default
/// browser and waits up to 60 seconds for the callback to complete the
/// exchange. The token store persists the record, so subsequent commands
/// run without re-authorizing until the refresh token dies.
pub async fn auth() {
    let sessions = AuthSessionManager::new(
        MemoryStore::new(),
        config::spotify_apiauth_url(),
        config::spotify_client_id(),
        config::spotify_redirect_uri(),
        config::spotify_scope(),
    );
    let tokens = Arc::new(TokenStore::new(
        Client::new(),
        config::spotify_apitoken_url(),
        config::spotify_client_id(),
        FileStore::new("cache"),
    ));

    let auth_url = match sessions.begin_login().await {
        Ok(url) => url,
        Err(e) => error!("Failed to start login: {}", e),
    };

    let state = Arc::new(AuthFlowState {
        sessions,
        tokens,
        completed: Mutex::new(None),
    });

    let server_state = Arc::clone(&state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(&state).await {
        Some(_) => success!("Authentication successful!"),
        None => error!("Authentication failed or timed out."),
    }
}

/// Polls the shared state for a completed login with a 60-second timeout,
/// one-second interval.
async fn wait_for_token(state: &AuthFlowState) -> Option<TokenRecord> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let completed = state.completed.lock().await;
        if let Some(record) = completed.as_ref() {
            return Some(record.clone());
        }
        drop(completed);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
