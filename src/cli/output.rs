use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::{Config, OutputType},
    engine::{
        materializer,
        suggestion::{self, Suggestion},
    },
    error,
    error::SpotError,
    management::PlaylistCacheManager,
    spotify::CatalogClient,
    success,
    types::{SuggestionTableRow, User},
    warning,
};

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

pub fn render_table(suggestions: &[Suggestion]) -> String {
    let rows: Vec<SuggestionTableRow> = suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| s.table_row(i + 1))
        .collect();
    Table::new(rows).to_string()
}

pub async fn load_cache(config: &Config) -> PlaylistCacheManager {
    let path = config.playlist_cache_path();
    match PlaylistCacheManager::load(&path).await {
        Ok(cache) => cache,
        Err(e) => {
            warning!("Ignoring unreadable playlist cache: {}", e);
            PlaylistCacheManager::new(path, None)
        }
    }
}

/// Prints the suggestions and, in playlist output mode, writes them to `target`.
pub async fn publish<C: CatalogClient>(
    client: &C,
    config: &Config,
    user: &User,
    target: &str,
    suggestions: &[Suggestion],
    cache: &PlaylistCacheManager,
) {
    println!("\n{}\n", render_table(suggestions));
    success!("Generated {} suggestions", suggestions.len());

    if config.output_type != OutputType::Playlist {
        return;
    }

    let tracks = suggestion::tracks_of(suggestions);
    let pb = spinner(&format!("Writing {} tracks to {}...", tracks.len(), target));
    let result = materializer::reconcile(
        client,
        user,
        target,
        &tracks,
        config.playlist_chunk_size,
        Some(cache),
    )
    .await;
    pb.finish_and_clear();

    match result {
        Ok(playlist) => success!(
            "Set playlist {} with the suggested tracks (snapshot {})",
            playlist.name,
            playlist.snapshot_id
        ),
        Err(SpotError::Reconcile { playlist, source }) => error!(
            "Playlist {} was left with {} tracks at snapshot {}: {}",
            playlist.name,
            playlist.tracks.len(),
            playlist.snapshot_id,
            source
        ),
        Err(e) => error!("Failed to write playlist {}: {}", target, e),
    }
}
