use crate::{
    error::SpotifyError, spotify::client::ApiClient, storage::KeyValueStore, types::UserProfile,
};

/// Fetches the authorized user's profile. The id owns created playlists and
/// the country code scopes search-result playability.
pub async fn current_user<S: KeyValueStore>(
    client: &ApiClient<S>,
) -> Result<UserProfile, SpotifyError> {
    let response = client.get("/me").await?;
    let response = ApiClient::<S>::expect_success(response).await?;
    response
        .json::<UserProfile>()
        .await
        .map_err(SpotifyError::from)
}
