use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::SpotifyError,
    spotify::client::ApiClient,
    storage::KeyValueStore,
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatePlaylistResponse,
    },
};

/// Creates an empty private playlist owned by `user_id`.
pub async fn create<S: KeyValueStore>(
    client: &ApiClient<S>,
    user_id: &str,
    name: &str,
    description: &str,
) -> Result<CreatePlaylistResponse, SpotifyError> {
    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: false,
    };

    let response = client
        .post(&format!("/users/{user_id}/playlists"), &body)
        .await?;
    let response = ApiClient::<S>::expect_success(response).await?;
    response
        .json::<CreatePlaylistResponse>()
        .await
        .map_err(SpotifyError::from)
}

/// Appends one batch of track URIs to a playlist. Callers chunk to the
/// provider's 100-URI ceiling and must not reorder across chunks. Returns
/// the snapshot id sequencing further edits.
pub async fn add_tracks<S: KeyValueStore>(
    client: &ApiClient<S>,
    playlist_id: &str,
    uris: Vec<String>,
) -> Result<String, SpotifyError> {
    let body = AddTracksRequest { uris };
    let response = client
        .post(&format!("/playlists/{playlist_id}/tracks"), &body)
        .await?;
    let response = ApiClient::<S>::expect_success(response).await?;
    let parsed = response.json::<AddTracksResponse>().await?;
    Ok(parsed.snapshot_id)
}

/// Uploads a JPEG cover image, base64-encoded as the provider requires.
pub async fn upload_cover<S: KeyValueStore>(
    client: &ApiClient<S>,
    playlist_id: &str,
    jpeg: &[u8],
) -> Result<(), SpotifyError> {
    let encoded = STANDARD.encode(jpeg);
    let response = client
        .put_raw(
            &format!("/playlists/{playlist_id}/images"),
            encoded,
            "image/jpeg",
        )
        .await?;
    ApiClient::<S>::expect_success(response).await?;
    Ok(())
}
