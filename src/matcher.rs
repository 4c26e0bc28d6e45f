//! Search-and-score track matching.
//!
//! Resolving a (title, artist) pair to a catalog URI is ambiguous: the
//! catalog is full of live cuts, remasters and covers that share a title.
//! The matcher requests a small candidate set and scores each candidate
//! against the requested song after normalizing both sides, preferring
//! exact title/artist matches and playable tracks while biasing away from
//! re-recorded variants. Absence of a match is an expected outcome and is
//! reported as `None`, never as an error.

use unicode_normalization::UnicodeNormalization;

use crate::{
    error::SpotifyError,
    spotify::{self, client::ApiClient},
    storage::KeyValueStore,
    types::{Song, TrackItem},
};

/// How many candidates a single lookup requests.
pub const CANDIDATE_LIMIT: u8 = 5;

const SCORE_TITLE_MATCH: i32 = 2;
const SCORE_ARTIST_MATCH: i32 = 2;
const SCORE_PLAYABLE: i32 = 1;
const SCORE_RERECORDING: i32 = -1;

/// Title markers of alternate recordings we bias away from.
const RERECORDING_MARKERS: &[&str] = &[
    "live",
    "acoustic",
    "remaster",
    "remastered",
    "rerecorded",
    "re recorded",
    "demo",
];

/// Normalizes a title or artist name for comparison: diacritics stripped,
/// case folded, punctuation collapsed to single spaces.
pub fn normalize(input: &str) -> String {
    let stripped: String = input
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whether a candidate title looks like a live/acoustic/remaster variant.
pub fn is_rerecording(title: &str) -> bool {
    let normalized = normalize(title);
    normalized
        .split(' ')
        .any(|word| RERECORDING_MARKERS.contains(&word))
        || RERECORDING_MARKERS
            .iter()
            .any(|marker| marker.contains(' ') && normalized.contains(marker))
}

/// Scores one candidate against the requested song.
pub fn score_candidate(song: &Song, candidate: &TrackItem) -> i32 {
    let mut score = 0;

    if normalize(&candidate.name) == normalize(&song.title) {
        score += SCORE_TITLE_MATCH;
    }

    let wanted_artist = normalize(&song.artist);
    if candidate
        .artists
        .iter()
        .any(|a| normalize(&a.name) == wanted_artist)
    {
        score += SCORE_ARTIST_MATCH;
    }

    if candidate.is_playable == Some(true) {
        score += SCORE_PLAYABLE;
    }

    if is_rerecording(&candidate.name) {
        score += SCORE_RERECORDING;
    }

    score
}

/// Picks the best-scoring candidate; ties go to the provider's original
/// result order (first listed wins). Empty input yields `None`.
pub fn pick_best<'a>(song: &Song, candidates: &'a [TrackItem]) -> Option<&'a TrackItem> {
    let mut best: Option<(&TrackItem, i32)> = None;
    for candidate in candidates {
        let score = score_candidate(song, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Resolves a song to its best-guess catalog item via scored search.
///
/// `market` scopes playability to the caller's country. Returns `Ok(None)`
/// when the candidate set is empty.
pub async fn find_best_match<S: KeyValueStore>(
    client: &ApiClient<S>,
    song: &Song,
    market: Option<&str>,
) -> Result<Option<TrackItem>, SpotifyError> {
    let candidates = spotify::search::search_tracks(
        client,
        &song.title,
        &song.artist,
        market,
        CANDIDATE_LIMIT,
    )
    .await?;

    Ok(pick_best(song, &candidates).cloned())
}
