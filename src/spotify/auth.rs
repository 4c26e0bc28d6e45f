use reqwest::Client;

use crate::{
    error::SpotifyError,
    types::{TokenErrorResponse, TokenResponse},
};

/// Builds the full authorization redirect URL for the PKCE flow.
///
/// The user agent navigates here to grant access; Spotify redirects back to
/// `redirect_uri` with a `code` and the same `state`. The challenge must be
/// the S256 transform of the verifier stored in the pending login session.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    challenge: &str,
    state: &str,
) -> String {
    format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={challenge}&code_challenge_method=S256&state={state}&scope={scope}",
        auth_url = auth_url,
        client_id = urlencoding::encode(client_id),
        redirect_uri = urlencoding::encode(redirect_uri),
        challenge = challenge,
        state = state,
        scope = urlencoding::encode(scope),
    )
}

/// Exchanges an authorization code for a token using PKCE.
///
/// The code verifier proves that the client completing the flow is the one
/// that initiated it. The authorization code is single-use and short-lived,
/// so the exchange happens immediately after the callback.
///
/// # Errors
///
/// Returns [`SpotifyError::AuthExchange`] carrying the provider's error
/// payload when the grant is rejected, or [`SpotifyError::Network`] on
/// transport failures.
pub async fn exchange_code_pkce(
    http: &Client,
    token_url: &str,
    client_id: &str,
    code: &str,
    verifier: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, SpotifyError> {
    let res = http
        .post(token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    parse_token_response(res).await
}

/// Refreshes an access token with the `refresh_token` grant.
///
/// The response may or may not rotate the refresh token; the caller keeps
/// the previous one when it is absent.
pub async fn refresh_token(
    http: &Client,
    token_url: &str,
    client_id: &str,
    refresh_token: &str,
) -> Result<TokenResponse, SpotifyError> {
    let res = http
        .post(token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ])
        .send()
        .await?;

    parse_token_response(res).await
}

async fn parse_token_response(res: reqwest::Response) -> Result<TokenResponse, SpotifyError> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        // The token endpoint reports rejections as {error, error_description}.
        return match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => Err(SpotifyError::AuthExchange {
                error: err.error,
                description: err.error_description.unwrap_or_default(),
            }),
            Err(_) => Err(SpotifyError::RemoteApi {
                status: status.as_u16(),
                body,
            }),
        };
    }

    serde_json::from_str::<TokenResponse>(&body).map_err(|e| SpotifyError::RemoteApi {
        status: status.as_u16(),
        body: format!("unparseable token response: {e}"),
    })
}
