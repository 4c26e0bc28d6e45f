use tokio_util::sync::CancellationToken;

use crate::{
    cover,
    error::SpotifyError,
    info, matcher,
    spotify::{self, client::ApiClient},
    storage::KeyValueStore,
    types::{ExportOutcome, Song},
    utils, warning,
};

/// Provider ceiling on URIs per track-insertion call.
pub const TRACK_BATCH_SIZE: usize = 100;

/// Stages of an export job, in pipeline order. `PlaylistCreate` failure is
/// fatal; `Matching` and `ArtworkUpload` failures degrade to a partial
/// result instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    ProfileFetch,
    PlaylistCreate,
    Matching,
    TrackInsertion,
    ArtworkUpload,
    Done,
}

impl ExportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStage::Idle => "idle",
            ExportStage::ProfileFetch => "profile-fetch",
            ExportStage::PlaylistCreate => "playlist-create",
            ExportStage::Matching => "matching",
            ExportStage::TrackInsertion => "track-insertion",
            ExportStage::ArtworkUpload => "artwork-upload",
            ExportStage::Done => "done",
        }
    }
}

/// Orchestrates one export: profile lookup, playlist creation, sequential
/// track matching, batched insertion and cover upload.
///
/// Matching runs sequentially on purpose. Resolving in order keeps the
/// append order trivially correct and the serial calls self-throttle
/// against the provider's rate limits. The cancellation token is checked
/// between iterations so a user navigating away does not leave a long
/// catalog export running.
pub struct PlaylistExporter<'a, S> {
    client: &'a ApiClient<S>,
}

impl<'a, S: KeyValueStore> PlaylistExporter<'a, S> {
    pub fn new(client: &'a ApiClient<S>) -> Self {
        PlaylistExporter { client }
    }

    /// Runs the full export. Starred songs come first, then approved songs
    /// not already starred; unmatched songs are counted and skipped, never
    /// abort the job.
    pub async fn export(
        &self,
        starred: &[Song],
        approved: &[Song],
        playlist_name: &str,
        description: &str,
        cancel: &CancellationToken,
    ) -> Result<ExportOutcome, SpotifyError> {
        let ordered = utils::build_export_order(starred, approved);
        if ordered.is_empty() {
            return Err(SpotifyError::NothingToExport);
        }
        let total = ordered.len();

        let mut stage = ExportStage::ProfileFetch;
        info!("Export stage: {}", stage.as_str());
        let profile = spotify::profile::current_user(self.client).await?;

        stage = ExportStage::PlaylistCreate;
        info!("Export stage: {}", stage.as_str());
        let playlist =
            spotify::playlist::create(self.client, &profile.id, playlist_name, description)
                .await
                .map_err(|e| SpotifyError::PlaylistCreate(e.to_string()))?;
        let playlist_url = playlist
            .external_urls
            .as_ref()
            .and_then(|urls| urls.spotify.clone())
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", playlist.id));

        stage = ExportStage::Matching;
        info!("Export stage: {}", stage.as_str());
        let market = profile.country.as_deref();
        let mut uris: Vec<String> = Vec::with_capacity(total);
        let mut unmatched: Vec<Song> = Vec::new();

        for song in &ordered {
            if cancel.is_cancelled() {
                return Err(SpotifyError::Cancelled);
            }

            match matcher::find_best_match(self.client, song, market).await {
                Ok(Some(track)) => uris.push(track.uri),
                Ok(None) => {
                    warning!("No match for \"{}\" by {}", song.title, song.artist);
                    unmatched.push(song.clone());
                }
                // Rate-limit exhaustion and auth loss abort the job; an
                // unexpected per-search response is absorbed as unmatched.
                Err(e @ SpotifyError::RateLimitExceeded { .. }) => return Err(e),
                Err(e @ SpotifyError::ReauthRequired) => return Err(e),
                Err(e) => {
                    warning!(
                        "Search failed for \"{}\" by {}: {}",
                        song.title,
                        song.artist,
                        e
                    );
                    unmatched.push(song.clone());
                }
            }
        }

        stage = ExportStage::TrackInsertion;
        info!("Export stage: {}", stage.as_str());
        for chunk in uris.chunks(TRACK_BATCH_SIZE) {
            spotify::playlist::add_tracks(self.client, &playlist.id, chunk.to_vec()).await?;
        }

        stage = ExportStage::ArtworkUpload;
        info!("Export stage: {}", stage.as_str());
        let artwork_uploaded = match self.upload_artwork(&playlist.id, playlist_name).await {
            Ok(()) => true,
            Err(e) => {
                // The playlist stays valid without artwork.
                warning!("Cover upload skipped: {}", e);
                false
            }
        };

        stage = ExportStage::Done;
        info!("Export stage: {}", stage.as_str());
        Ok(ExportOutcome {
            playlist_url,
            matched: uris.len(),
            total,
            unmatched,
            artwork_uploaded,
        })
    }

    async fn upload_artwork(&self, playlist_id: &str, title: &str) -> Result<(), SpotifyError> {
        let jpeg = cover::generate_cover(title)?;
        spotify::playlist::upload_cover(self.client, playlist_id, &jpeg)
            .await
            .map_err(|e| SpotifyError::ArtworkUpload(e.to_string()))
    }
}
