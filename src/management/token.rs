use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    error::SpotifyError,
    spotify,
    storage::KeyValueStore,
    types::{TokenRecord, TokenResponse},
};

const TOKEN_KEY: &str = "token";

/// Owns the current token record and its lifecycle.
///
/// The record is persisted to the backing store on every mutation and
/// cleared when a refresh fails irrecoverably. All mutation happens behind
/// one async mutex that is held across the refresh request, so concurrent
/// callers collapse into a single in-flight refresh: the first caller does
/// the network round trip, everyone else blocks on the lock and then
/// observes the already-refreshed record. Duplicate refreshes would
/// invalidate each other's refresh token at the provider.
pub struct TokenStore<S> {
    http: Client,
    token_url: String,
    client_id: String,
    store: S,
    current: Mutex<Option<TokenRecord>>,
}

impl<S: KeyValueStore> TokenStore<S> {
    pub fn new(http: Client, token_url: String, client_id: String, store: S) -> Self {
        TokenStore {
            http,
            token_url,
            client_id,
            store,
            current: Mutex::new(None),
        }
    }

    /// Populates the in-memory record from the backing store, if a token
    /// was persisted by a previous run.
    pub async fn load(&self) -> Result<bool, SpotifyError> {
        let Some(json) = self.store.get(TOKEN_KEY).await? else {
            return Ok(false);
        };
        let record: TokenRecord = serde_json::from_str(&json)
            .map_err(|e| SpotifyError::Storage(format!("corrupt token record: {e}")))?;
        *self.current.lock().await = Some(record);
        Ok(true)
    }

    /// Exchanges an authorization code plus PKCE verifier for a fresh token
    /// record, persisting it as the current one.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenRecord, SpotifyError> {
        let resp = spotify::auth::exchange_code_pkce(
            &self.http,
            &self.token_url,
            &self.client_id,
            code,
            verifier,
            redirect_uri,
        )
        .await?;

        let mut current = self.current.lock().await;
        self.install(&mut current, resp, None).await
    }

    /// Returns a token record guaranteed not to be expired.
    ///
    /// A still-valid record is returned without any I/O. An expired record
    /// with a refresh token triggers exactly one refresh across all
    /// concurrent callers; an expired record without one yields
    /// [`SpotifyError::ReauthRequired`].
    pub async fn ensure_valid(&self) -> Result<TokenRecord, SpotifyError> {
        let mut current = self.current.lock().await;

        match current.as_ref() {
            Some(record) if !record.is_expired() => Ok(record.clone()),
            Some(_) => self.refresh_locked(&mut current).await,
            None => Err(SpotifyError::ReauthRequired),
        }
    }

    /// Forces a refresh after the API rejected `stale_access_token` with a
    /// 401. When another caller already rotated the token, the fresh record
    /// is returned without issuing a second refresh.
    pub async fn refresh_after_rejection(
        &self,
        stale_access_token: &str,
    ) -> Result<TokenRecord, SpotifyError> {
        let mut current = self.current.lock().await;

        if let Some(record) = current.as_ref() {
            if record.access_token != stale_access_token {
                return Ok(record.clone());
            }
        }

        self.refresh_locked(&mut current).await
    }

    /// Drops the in-memory and persisted record, forcing a fresh login.
    pub async fn invalidate(&self) -> Result<(), SpotifyError> {
        let mut current = self.current.lock().await;
        *current = None;
        self.store.delete(TOKEN_KEY).await
    }

    // Caller must hold the lock; this is the single critical section per
    // token lifetime.
    async fn refresh_locked(
        &self,
        current: &mut Option<TokenRecord>,
    ) -> Result<TokenRecord, SpotifyError> {
        let Some(record) = current.as_ref() else {
            return Err(SpotifyError::ReauthRequired);
        };
        let Some(refresh) = record.refresh_token.clone() else {
            *current = None;
            self.store.delete(TOKEN_KEY).await?;
            return Err(SpotifyError::ReauthRequired);
        };

        match spotify::auth::refresh_token(&self.http, &self.token_url, &self.client_id, &refresh)
            .await
        {
            Ok(resp) => self.install(current, resp, Some(refresh)).await,
            Err(_) => {
                // An unusable refresh token cannot recover on retry.
                *current = None;
                self.store.delete(TOKEN_KEY).await?;
                Err(SpotifyError::ReauthRequired)
            }
        }
    }

    async fn install(
        &self,
        current: &mut Option<TokenRecord>,
        resp: TokenResponse,
        previous_refresh: Option<String>,
    ) -> Result<TokenRecord, SpotifyError> {
        let record = TokenRecord::from_response(resp, previous_refresh);
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        self.store.set(TOKEN_KEY, &json).await?;
        *current = Some(record.clone());
        Ok(record)
    }
}
