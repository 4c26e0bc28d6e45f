//! HTTP endpoints for the local OAuth callback server.
//!
//! - [`callback`] completes the PKCE flow: validates the anti-CSRF state
//!   against the pending login session and exchanges the authorization code
//!   for a token.
//! - [`health`] reports application status and version for quick checks
//!   that the temporary server is up before the browser redirect lands.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
