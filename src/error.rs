use thiserror::Error;

/// Error taxonomy for the Spotify integration.
///
/// Login-phase failures (`StateMismatch`, `MissingVerifier`, `AuthExchange`)
/// are fatal to the current login attempt and require the user to start
/// over. `ReauthRequired` means the stored token is irrecoverably invalid;
/// the persisted record has already been cleared when it is returned.
/// `RateLimitExceeded` leaves the token valid but aborts the current job.
///
/// A track that cannot be matched is not an error: the matcher returns
/// `Ok(None)` and the exporter aggregates it into the unmatched count.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("authorization state mismatch, discarding login attempt")]
    StateMismatch,

    #[error("no pending login session, start the login again")]
    MissingVerifier,

    #[error("code exchange rejected ({error}): {description}")]
    AuthExchange { error: String, description: String },

    #[error("session expired, please sign in again")]
    ReauthRequired,

    #[error("rate limited by Spotify, gave up after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Spotify API returned {status}: {body}")]
    RemoteApi { status: u16, body: String },

    #[error("playlist creation failed: {0}")]
    PlaylistCreate(String),

    #[error("no songs to export, approve or star some songs first")]
    NothingToExport,

    #[error("cover upload failed: {0}")]
    ArtworkUpload(String),

    #[error("export cancelled")]
    Cancelled,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
