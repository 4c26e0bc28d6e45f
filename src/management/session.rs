use crate::{
    error::SpotifyError,
    spotify,
    storage::KeyValueStore,
    types::{AuthSession, CallbackParams, TokenRecord},
    utils,
};

const SESSION_KEY: &str = "pkce_session";

/// Builds and validates the PKCE authorization request/response pair.
///
/// The pending session lives in short-lived storage between `begin_login`
/// and `complete_login` and is consumed exactly once: whatever the outcome
/// of the callback, the stored verifier is discarded so it can never be
/// replayed.
pub struct AuthSessionManager<S> {
    store: S,
    auth_url: String,
    client_id: String,
    redirect_uri: String,
    scope: String,
}

impl<S: KeyValueStore> AuthSessionManager<S> {
    pub fn new(
        store: S,
        auth_url: String,
        client_id: String,
        redirect_uri: String,
        scope: String,
    ) -> Self {
        AuthSessionManager {
            store,
            auth_url,
            client_id,
            redirect_uri,
            scope,
        }
    }

    /// Starts a login: generates the verifier, challenge and anti-CSRF
    /// state, stores the pending session and returns the authorization URL
    /// the user agent must navigate to.
    pub async fn begin_login(&self) -> Result<String, SpotifyError> {
        let verifier = utils::generate_code_verifier();
        let challenge = utils::generate_code_challenge(&verifier);
        let state = utils::generate_state_token();

        let session = AuthSession {
            verifier,
            state: state.clone(),
            redirect_uri: self.redirect_uri.clone(),
        };
        let json = serde_json::to_string(&session)
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        self.store.set(SESSION_KEY, &json).await?;

        Ok(spotify::auth::authorize_url(
            &self.auth_url,
            &self.client_id,
            &self.redirect_uri,
            &self.scope,
            &challenge,
            &state,
        ))
    }

    /// Completes a login from the callback parameters.
    ///
    /// The pending session is taken out of storage before any validation so
    /// a stale verifier can never be reused, then the returned state is
    /// checked against the stored one and the code is exchanged through the
    /// token store.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::MissingVerifier`] when no session is pending
    ///   (second tab, expired session).
    /// - [`SpotifyError::StateMismatch`] when the returned state differs
    ///   from the stored one; the attempt must be discarded, not retried.
    /// - [`SpotifyError::AuthExchange`] when the provider rejected the
    ///   authorization or the code exchange.
    pub async fn complete_login<T: KeyValueStore>(
        &self,
        tokens: &super::TokenStore<T>,
        params: &CallbackParams,
    ) -> Result<TokenRecord, SpotifyError> {
        let session = self.take_session().await?;

        match params.state.as_deref() {
            Some(state) if state == session.state => {}
            _ => return Err(SpotifyError::StateMismatch),
        }

        if let Some(error) = &params.error {
            return Err(SpotifyError::AuthExchange {
                error: error.clone(),
                description: String::new(),
            });
        }

        let Some(code) = params.code.as_deref() else {
            return Err(SpotifyError::AuthExchange {
                error: "invalid_request".to_string(),
                description: "callback carried no authorization code".to_string(),
            });
        };

        tokens
            .exchange_code(code, &session.verifier, &session.redirect_uri)
            .await
    }

    // Read-then-delete so the session is consumed on success and failure
    // alike.
    async fn take_session(&self) -> Result<AuthSession, SpotifyError> {
        let Some(json) = self.store.get(SESSION_KEY).await? else {
            return Err(SpotifyError::MissingVerifier);
        };
        self.store.delete(SESSION_KEY).await?;
        serde_json::from_str(&json).map_err(|_| SpotifyError::MissingVerifier)
    }
}
