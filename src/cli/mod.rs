//! # CLI Module
//!
//! User-facing commands for the Swiplist export tool.
//!
//! - [`auth`] - Runs the OAuth 2.0 PKCE login: starts the local callback
//!   server, opens the authorization URL in the browser and waits for the
//!   callback to complete, persisting the token for later runs.
//! - [`export`] - Reads the starred and approved song lists handed over by
//!   the review subsystem and drives the export pipeline, printing the
//!   playlist URL, a match summary and a table of unmatched songs.
//!
//! Commands load their configuration via [`crate::config`] and present
//! progress with the crate's colored output macros plus an `indicatif`
//! spinner for the long-running export.

mod auth;
mod export;

pub use auth::auth;
pub use export::{ExportArgs, export};
