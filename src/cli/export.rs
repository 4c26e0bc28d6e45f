use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    config, error, info,
    management::{PlaylistExporter, TokenStore},
    spotify::client::ApiClient,
    storage::FileStore,
    success,
    types::{Song, UnmatchedTableRow},
    warning,
};

#[derive(Parser, Debug, Clone)]
#[command(about = "Export starred and approved songs to a Spotify playlist")]
pub struct ExportArgs {
    /// JSON file with the ordered starred songs ([{"title", "artist"}, ...])
    #[arg(long)]
    pub starred: Option<PathBuf>,

    /// JSON file with the ordered approved songs
    #[arg(long)]
    pub approved: Option<PathBuf>,

    /// Playlist name; defaults to a dated Swiplist title
    #[arg(long)]
    pub name: Option<String>,
}

/// Drives one export run from the review subsystem's hand-over files to a
/// finished playlist. Ctrl-C cancels between matching steps.
pub async fn export(args: ExportArgs) {
    let starred = load_songs(args.starred.as_deref()).await;
    let approved = load_songs(args.approved.as_deref()).await;

    if starred.is_empty() && approved.is_empty() {
        error!("No songs to export. Approve or star some songs first.");
    }

    let tokens = Arc::new(TokenStore::new(
        Client::new(),
        config::spotify_apitoken_url(),
        config::spotify_client_id(),
        FileStore::new("cache"),
    ));
    match tokens.load().await {
        Ok(true) => {}
        Ok(false) => error!("No stored token. Please run swiplist auth first."),
        Err(e) => error!("Failed to load token: {}", e),
    }

    let client = ApiClient::new(Client::new(), config::spotify_apiurl(), tokens);
    let exporter = PlaylistExporter::new(&client);

    let playlist_name = args
        .name
        .unwrap_or_else(|| format!("Swiplist Picks {}", Utc::now().format("%Y-%m-%d")));
    let description = "Curated with Swiplist".to_string();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!(
        "Exporting {} songs to \"{}\"...",
        starred.len() + approved.len(),
        playlist_name
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let outcome = exporter
        .export(&starred, &approved, &playlist_name, &description, &cancel)
        .await;
    pb.finish_and_clear();

    match outcome {
        Ok(outcome) => {
            success!(
                "Playlist ready: {} ({}/{} songs matched)",
                outcome.playlist_url,
                outcome.matched,
                outcome.total
            );
            if !outcome.artwork_uploaded {
                info!("Cover artwork was not uploaded; the playlist is fine without it.");
            }
            if !outcome.unmatched.is_empty() {
                warning!("{} songs could not be matched:", outcome.unmatched.len());
                let rows: Vec<UnmatchedTableRow> = outcome
                    .unmatched
                    .iter()
                    .map(|song| UnmatchedTableRow {
                        title: song.title.clone(),
                        artist: song.artist.clone(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
        }
        Err(e) => error!("Export failed: {}", e),
    }
}

async fn load_songs(path: Option<&std::path::Path>) -> Vec<Song> {
    let Some(path) = path else {
        return Vec::new();
    };
    let content = match async_fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => error!("Failed to read {}: {}", path.display(), e),
    };
    match serde_json::from_str(&content) {
        Ok(songs) => songs,
        Err(e) => error!("Failed to parse {}: {}", path.display(), e),
    }
}
