use crate::{
    cli::output,
    config::Config,
    engine::{
        self, album::AlbumResolver, recommendation, suggestion::ScoringRules,
        suggestion::SuggestionBuilder,
    },
    error, info,
    spotify::CatalogClient,
};

/// Suggests tracks from the recommendation feed seeded by the listener's top artists.
pub async fn recommend<C: CatalogClient>(client: &C, config: &Config) {
    let mut cache = output::load_cache(config).await;

    let pb = output::spinner("Listing tracked playlists...");
    let state = engine::gather_state(client, config, &mut cache).await;
    pb.finish_and_clear();
    let state = match state {
        Ok(state) => state,
        Err(e) => error!("Failed to list tracked playlists: {}", e),
    };

    // One resolver for both steps so albums fetched for the year filter are reused.
    let mut resolver = AlbumResolver::from_config(config);
    let candidates = match recommendation::recommend(client, &mut resolver, config).await {
        Ok(candidates) => candidates,
        Err(e) => error!("Failed to fetch recommendations: {}", e),
    };
    info!("Received {} recommended tracks", candidates.len());

    let rules = ScoringRules::from_config(config);
    let pb = output::spinner("Scoring candidates...");
    let suggestions = SuggestionBuilder::new(client, &mut resolver, &rules, &state.tracks)
        .from_tracks(&candidates)
        .await;
    pb.finish_and_clear();

    match suggestions {
        Ok(suggestions) => {
            output::publish(
                client,
                config,
                &state.user,
                &config.recommendations_target,
                &suggestions,
                &cache,
            )
            .await
        }
        Err(e) => error!("Failed to build suggestions: {}", e),
    }
}
