//! Configuration management for the Swiplist export CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. The configuration system follows
//! a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults for the public Spotify endpoints
//!
//! The crate implements the public-client PKCE flow only, so there is no
//! client-secret accessor anywhere in here.

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file in the local data
/// directory, creating the directory structure if needed.
///
/// The file is looked up at:
/// - Linux: `~/.local/share/swiplist/.env`
/// - macOS: `~/Library/Application Support/swiplist/.env`
/// - Windows: `%LOCALAPPDATA%/swiplist/.env`
///
/// Variables already present in the environment keep priority. A missing
/// file is not an error so that fully env-configured setups work.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("swiplist/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let _ = dotenv::from_path(path);
    Ok(())
}

/// Returns the bind address for the local OAuth callback server.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not
/// set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify OAuth redirect URI. This must match the redirect URI
/// registered in the Spotify application settings and point at the local
/// callback server's `/callback` route.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the space-delimited OAuth scopes requested during login.
///
/// Defaults to the playlist-modification, cover-upload and profile scopes
/// the export pipeline needs.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| {
        "playlist-modify-private playlist-modify-public ugc-image-upload user-read-private"
            .to_string()
    })
}

/// Returns the Spotify OAuth authorization URL, defaulting to the public
/// endpoint.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify OAuth token exchange URL, defaulting to the public
/// endpoint.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the Spotify Web API base URL, defaulting to the public endpoint.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}
