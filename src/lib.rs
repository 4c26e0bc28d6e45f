//! Swiplist Spotify Export Library
//!
//! This library implements the Spotify-facing half of the Swiplist song
//! curator: OAuth 2.0 PKCE authorization, token lifecycle with refresh
//! de-duplication, a rate-limited Web API client, scored track matching, and
//! the batched playlist-export pipeline.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `cover` - Programmatic playlist cover generation
//! - `error` - Error taxonomy shared across the integration
//! - `management` - Login session, token store and export orchestration
//! - `matcher` - Search-and-score track matching
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `storage` - Key/value persistence for tokens and login sessions
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and export-order utilities

pub mod api;
pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod management;
pub mod matcher;
pub mod server;
pub mod spotify;
pub mod storage;
pub mod types;
pub mod utils;

/// A convenient Result type alias for CLI glue code that may fail with any
/// error. Library components return [`error::SpotifyError`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for unrecoverable CLI errors; library code propagates
/// [`error::SpotifyError`] instead of terminating the process.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
