//! # Suggestion Engine
//!
//! Everything between the catalog client and the console. The engine runs one
//! step at a time: every catalog call completes before the next one starts.
//!
//! - [`pagination`] - Walks paginated listings with a bounded number of requests
//! - [`tracks`] - Song identity, deduplication and grouping by artists
//! - [`album`] - Finds the richest release of a track, with a per-run album memo
//! - [`suggestion`] - Filters, scores and ranks candidate tracks
//! - [`playlist`] - Lists tracked and discovery playlists through the cache
//! - [`materializer`] - Writes a list of tracks into a named remote playlist
//! - [`recommendation`] - Candidate tracks from the recommendation feed

pub mod album;
pub mod materializer;
pub mod pagination;
pub mod playlist;
pub mod recommendation;
pub mod suggestion;
pub mod tracks;

use crate::{
    Res,
    config::{Config, CredentialsFlow},
    info,
    management::PlaylistCacheManager,
    spotify::CatalogClient,
    types::{Playlist, Track, User},
};

/// The listener, their tracked playlists and the deduplicated tracks in them.
#[derive(Debug, Clone)]
pub struct State {
    pub user: User,
    pub playlists: Vec<Playlist>,
    pub tracks: Vec<Track>,
}

/// The logged in user for the redirect flow, the configured public profile otherwise.
pub async fn resolve_user<C: CatalogClient>(client: &C, config: &Config) -> Res<User> {
    match config.credentials_flow {
        CredentialsFlow::Redirect => client.get_current_user().await,
        CredentialsFlow::ClientCredentials => client.get_public_user(&config.user_name).await,
    }
}

pub async fn gather_state<C: CatalogClient>(
    client: &C,
    config: &Config,
    cache: &mut PlaylistCacheManager,
) -> Res<State> {
    let user = resolve_user(client, config).await?;
    info!("Fetching playlists of user {}", user.label());

    let playlists =
        playlist::matching_pattern(client, &user, &config.playlist_pattern, cache).await?;
    let tracks = playlist::flatten_tracks(&playlists)?;
    info!(
        "Playlist count: {}, total track count: {}",
        playlists.len(),
        tracks.len()
    );

    Ok(State {
        user,
        playlists,
        tracks,
    })
}
