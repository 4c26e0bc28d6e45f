use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Song;

/// Generates a PKCE code verifier: 128 alphanumeric characters, well above
/// the 43-character minimum required by RFC 7636.
pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

/// Derives the S256 code challenge: base64url(SHA-256(verifier)), unpadded.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generates the opaque anti-CSRF state token round-tripped through the
/// authorization redirect.
pub fn generate_state_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Builds the export order: starred songs first, then approved songs that
/// are not already starred. Order within each list is preserved; duplicates
/// are dropped by (title, artist) identity.
pub fn build_export_order(starred: &[Song], approved: &[Song]) -> Vec<Song> {
    let mut ordered: Vec<Song> = Vec::with_capacity(starred.len() + approved.len());
    let mut seen: Vec<(String, String)> = Vec::new();

    for song in starred.iter().chain(approved.iter()) {
        let identity = (song.title.clone(), song.artist.clone());
        if !seen.contains(&identity) {
            seen.push(identity);
            ordered.push(song.clone());
        }
    }

    ordered
}
