use std::sync::Arc;

use axum::{Extension, extract::Query, response::Html};

use crate::{error::SpotifyError, server::AuthFlowState, types::CallbackParams, warning};

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<Arc<AuthFlowState>>,
) -> Html<&'static str> {
    match state
        .sessions
        .complete_login(&state.tokens, &params)
        .await
    {
        Ok(record) => {
            let mut completed = state.completed.lock().await;
            *completed = Some(record);
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(SpotifyError::StateMismatch) => {
            warning!("Callback state did not match the pending login session.");
            Html("<h4>Login rejected: state mismatch. Start the login again.</h4>")
        }
        Err(SpotifyError::MissingVerifier) => {
            Html("<h4>No pending login session. Start the login again.</h4>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
