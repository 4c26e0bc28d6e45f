use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tokio::time::sleep;

use crate::{error::SpotifyError, management::TokenStore, storage::KeyValueStore, warning};

/// Total send attempts before a persistent 429 becomes
/// [`SpotifyError::RateLimitExceeded`].
pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 3;

/// Fallback delay when a 429 arrives without a parseable Retry-After.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Rate-limited wrapper around every outbound Web API call.
///
/// Each request is authorized with a token from [`TokenStore::ensure_valid`].
/// A 429 response suspends for the provider's Retry-After delay and retries,
/// capped at [`MAX_RATE_LIMIT_ATTEMPTS`] attempts so a hostile limit cannot
/// block forever. A 401 forces exactly one token refresh and one retry; a
/// second 401 means the session is gone for good. Everything else is handed
/// back to the caller, which maps non-2xx statuses via
/// [`ApiClient::expect_success`].
pub struct ApiClient<S> {
    http: Client,
    api_base: String,
    tokens: Arc<TokenStore<S>>,
}

impl<S: KeyValueStore> ApiClient<S> {
    pub fn new(http: Client, api_base: String, tokens: Arc<TokenStore<S>>) -> Self {
        ApiClient {
            http,
            api_base,
            tokens,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Response, SpotifyError> {
        self.request(Method::GET, path, None::<&()>, None).await
    }

    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, SpotifyError> {
        self.request(Method::POST, path, Some(body), None).await
    }

    /// PUT with a raw body and explicit content type, used for the
    /// base64-encoded JPEG cover upload.
    pub async fn put_raw(
        &self,
        path: &str,
        body: String,
        content_type: &'static str,
    ) -> Result<Response, SpotifyError> {
        self.request(Method::PUT, path, None::<&()>, Some((body, content_type)))
            .await
    }

    async fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        raw: Option<(String, &'static str)>,
    ) -> Result<Response, SpotifyError> {
        let url = format!("{}{}", self.api_base, path);
        let mut attempts: u32 = 0;
        let mut refreshed_once = false;

        loop {
            let token = self.tokens.ensure_valid().await?;

            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&token.access_token);
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some((raw_body, content_type)) = &raw {
                request = request
                    .header(reqwest::header::CONTENT_TYPE, *content_type)
                    .body(raw_body.clone());
            }

            let response = request.send().await?;
            attempts += 1;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempts >= MAX_RATE_LIMIT_ATTEMPTS {
                    return Err(SpotifyError::RateLimitExceeded { attempts });
                }
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warning!(
                    "Rate limited on {}, retrying in {}s (attempt {}/{})",
                    path,
                    retry_after,
                    attempts,
                    MAX_RATE_LIMIT_ATTEMPTS
                );
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if response.status() == StatusCode::UNAUTHORIZED {
                if refreshed_once {
                    return Err(SpotifyError::ReauthRequired);
                }
                self.tokens
                    .refresh_after_rejection(&token.access_token)
                    .await?;
                refreshed_once = true;
                continue;
            }

            return Ok(response);
        }
    }

    /// Maps a non-2xx response to [`SpotifyError::RemoteApi`], surfacing the
    /// provider's body verbatim for diagnostics.
    pub async fn expect_success(response: Response) -> Result<Response, SpotifyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SpotifyError::RemoteApi {
            status: status.as_u16(),
            body,
        })
    }
}
