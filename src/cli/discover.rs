use crate::{
    cli::output,
    config::Config,
    engine::{
        self, album::AlbumResolver, playlist, suggestion::ScoringRules,
        suggestion::SuggestionBuilder,
    },
    error, info,
    spotify::CatalogClient,
    warning,
};

/// Suggests the tracks of the discovery playlists that are new to the listener.
pub async fn discover<C: CatalogClient>(client: &C, config: &Config) {
    let mut cache = output::load_cache(config).await;

    let pb = output::spinner("Listing tracked playlists...");
    let state = engine::gather_state(client, config, &mut cache).await;
    pb.finish_and_clear();
    let state = match state {
        Ok(state) => state,
        Err(e) => error!("Failed to list tracked playlists: {}", e),
    };

    let discovery = match playlist::discovery(client, &state.user, &config.discovery_playlists).await
    {
        Ok(discovery) => discovery,
        Err(e) => error!("Failed to list discovery playlists: {}", e),
    };
    if discovery.is_empty() {
        warning!(
            "None of the discovery playlists ({}) were found",
            config.discovery_playlists.join(", ")
        );
    }
    for list in &discovery {
        info!("Discovery playlist {} has {} tracks", list.name, list.tracks.len());
    }

    let mut resolver = AlbumResolver::from_config(config);
    let rules = ScoringRules::from_config(config);
    let pb = output::spinner("Scoring candidates...");
    let suggestions = SuggestionBuilder::new(client, &mut resolver, &rules, &state.tracks)
        .from_playlists(&discovery)
        .await;
    pb.finish_and_clear();

    match suggestions {
        Ok(suggestions) => {
            output::publish(
                client,
                config,
                &state.user,
                &config.discovery_target,
                &suggestions,
                &cache,
            )
            .await
        }
        Err(e) => error!("Failed to build suggestions: {}", e),
    }
}
