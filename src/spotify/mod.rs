//! # Spotify Integration Layer
//!
//! HTTP-facing half of the export subsystem. Each submodule covers one
//! domain of the Web API:
//!
//! - [`auth`] - OAuth 2.0 PKCE token endpoint operations: building the
//!   authorization redirect, exchanging an authorization code plus verifier
//!   for a token, and refreshing with a refresh token. Public-client flow
//!   only, no client secret is ever sent.
//! - [`client`] - The rate-limited API client every Web API call goes
//!   through. Attaches the bearer token from the token store, waits out
//!   429 responses up to a fixed attempt cap, forces exactly one token
//!   refresh on a 401 and retries once.
//! - [`profile`] - Current-user profile lookup (`GET /me`).
//! - [`search`] - Track search scoped by title and artist, feeding the
//!   matcher's candidate set.
//! - [`playlist`] - Playlist creation, batched track insertion and cover
//!   image upload.
//!
//! All request/response shapes live in [`crate::types`]; failures are
//! [`crate::error::SpotifyError`] values so callers can tell fatal
//! conditions (auth loss, rate-limit exhaustion) apart from per-item ones.

pub mod auth;
pub mod client;
pub mod playlist;
pub mod profile;
pub mod search;
