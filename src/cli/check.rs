use crate::{
    cli::output,
    config::Config,
    engine::{self, playlist},
    error, info, success,
    spotify::CatalogClient,
    utils, warning,
};

/// Tells whether the currently playing track is already in a tracked playlist.
pub async fn check_track<C: CatalogClient>(client: &C, config: &Config) {
    let playing = match client.get_currently_playing().await {
        Ok(playing) => playing,
        Err(e) => error!("Failed to read playback state: {}", e),
    };

    let Some(item) = playing.filter(|p| p.is_playing).and_then(|p| p.item) else {
        warning!("User doesn't seem to listen to Spotify currently");
        return;
    };

    info!(
        "User is listening to {} by {}. Checking if it's new",
        item.name,
        utils::join_artists(&item.artists, ", ")
    );

    let track = match client.get_track(&item.id).await {
        Ok(track) => track,
        Err(e) => error!("Failed to fetch track {}: {}", item.id, e),
    };

    let mut cache = output::load_cache(config).await;
    let state = match engine::gather_state(client, config, &mut cache).await {
        Ok(state) => state,
        Err(e) => error!("Failed to list tracked playlists: {}", e),
    };

    match playlist::find_by_track(&state.playlists, &track) {
        Ok(found) if found.is_empty() => success!("The track is new, quite amazing I'd say!"),
        Ok(found) => {
            let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
            info!("The track is already on {}", names.join(", "));
        }
        Err(e) => error!("{}", e),
    }
}

/// Reports numbers missing from the sequence of tracked playlists.
pub async fn check_holes<C: CatalogClient>(client: &C, config: &Config) {
    let mut cache = output::load_cache(config).await;
    let state = match engine::gather_state(client, config, &mut cache).await {
        Ok(state) => state,
        Err(e) => error!("Failed to list tracked playlists: {}", e),
    };

    let holes = playlist::playlist_holes(&state.playlists, &config.playlist_pattern);
    if holes.is_empty() {
        success!("No holes among {} playlists", state.playlists.len());
        return;
    }

    for hole in holes {
        warning!("Found a potential hole at {}", hole);
    }
}
