use crate::{
    error::SpotifyError,
    spotify::client::ApiClient,
    storage::KeyValueStore,
    types::{SearchResponse, TrackItem},
};

/// Searches the track catalog scoped by title and artist.
///
/// The query uses Spotify's field filters so a common title does not drown
/// in unrelated artists. When `market` is given the response carries
/// per-track playability for that market.
pub async fn search_tracks<S: KeyValueStore>(
    client: &ApiClient<S>,
    title: &str,
    artist: &str,
    market: Option<&str>,
    limit: u8,
) -> Result<Vec<TrackItem>, SpotifyError> {
    let query = format!("track:{title} artist:{artist}");
    let mut path = format!(
        "/search?type=track&q={}&limit={}",
        urlencoding::encode(&query),
        limit
    );
    if let Some(market) = market {
        path.push_str(&format!("&market={}", urlencoding::encode(market)));
    }

    let response = client.get(&path).await?;
    let response = ApiClient::<S>::expect_success(response).await?;
    let parsed = response.json::<SearchResponse>().await?;

    Ok(parsed.tracks.map(|page| page.items).unwrap_or_default())
}
