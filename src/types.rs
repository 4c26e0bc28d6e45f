use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Safety margin subtracted from the provider's reported expiry so a call
/// never starts with a token that expires mid-flight.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// The persisted token record. Owned exclusively by the token store and
/// mutated only by the exchange and refresh operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp after which the access token must not be used.
    pub expires_at: i64,
}

impl TokenRecord {
    /// Builds a record from a token endpoint response, applying the expiry
    /// margin. When the provider does not rotate the refresh token the
    /// previous one is carried over.
    pub fn from_response(resp: TokenResponse, previous_refresh: Option<String>) -> Self {
        TokenRecord {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + resp.expires_in - TOKEN_EXPIRY_MARGIN_SECS,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }
}

/// Successful token endpoint response, for both grant types.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Error object the token endpoint returns on a rejected grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Transient PKCE login session. Created at login start, consumed exactly
/// once on callback, destroyed after the exchange whether it succeeds or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub verifier: String,
    pub state: String,
    pub redirect_uri: String,
}

/// Query parameters Spotify appends to the redirect back to us.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// A song as handed over by the review subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

impl Song {
    pub fn new(title: &str, artist: &str) -> Self {
        Song {
            title: title.to_string(),
            artist: artist.to_string(),
            preview_url: None,
            artwork_url: None,
        }
    }
}

#[derive(Tabled)]
pub struct UnmatchedTableRow {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TracksPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksPage {
    pub items: Vec<TrackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    pub uri: String,
    pub name: String,
    pub artists: Vec<TrackArtist>,
    /// Only present when the search request is scoped to a market.
    #[serde(default)]
    pub is_playable: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}

/// What an export run hands back to the caller.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub playlist_url: String,
    pub matched: usize,
    pub total: usize,
    pub unmatched: Vec<Song>,
    pub artwork_uploaded: bool,
}
