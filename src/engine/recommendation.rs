use crate::{
    Res,
    config::Config,
    engine::album::AlbumResolver,
    info,
    spotify::CatalogClient,
    types::{AudioFeatures, Seeds, Track, TrackAttributes},
    utils,
};

const SEED_ARTIST_COUNT: usize = 5;
const TOP_TRACK_COUNT: usize = 20;
const RECOMMENDATIONS_PER_SEED: usize = 100;

const ATTRIBUTE_SPREAD: f64 = 0.3;
const ATTRIBUTE_CEILING: f64 = 0.8;
const ENERGY_FLOOR: f64 = 0.3;

/// Derives the recommendation filter from the listener's taste: each ceiling
/// sits a little above the average of their top tracks, energy a little below.
pub fn track_attributes(features: &[AudioFeatures]) -> TrackAttributes {
    let avg = |pick: fn(&AudioFeatures) -> f64| {
        utils::average(&features.iter().map(pick).collect::<Vec<f64>>())
    };
    let ceiling = |value: f64| (value + ATTRIBUTE_SPREAD).min(ATTRIBUTE_CEILING);

    TrackAttributes {
        max_acousticness: Some(ceiling(avg(|f| f.acousticness))),
        max_instrumentalness: Some(ceiling(avg(|f| f.instrumentalness))),
        max_liveness: Some(ceiling(avg(|f| f.liveness))),
        min_energy: Some((avg(|f| f.energy) - ATTRIBUTE_SPREAD).max(ENERGY_FLOOR)),
        max_valence: Some(ceiling(avg(|f| f.valence))),
    }
}

/// Collects recommended tracks, one recommendation request per top artist.
///
/// Recommendations are fetched again as full tracks and kept only when their
/// album was released in or after the configured year.
pub async fn recommend<C: CatalogClient>(
    client: &C,
    resolver: &mut AlbumResolver,
    config: &Config,
) -> Res<Vec<Track>> {
    let top_artists = client.get_top_artists(SEED_ARTIST_COUNT).await?;
    let top_tracks = client.get_top_tracks(TOP_TRACK_COUNT).await?;
    let features = client
        .get_audio_features(&utils::catalog_ids(&top_tracks))
        .await?;
    let attributes = track_attributes(&features);

    let mut recommended = Vec::new();
    for artist in &top_artists {
        info!("Fetching recommendations seeded by artist {}", artist.name);
        let seeds = Seeds {
            artists: vec![artist.id.clone()],
            ..Default::default()
        };

        let suggested = client
            .get_recommendations(&seeds, &attributes, RECOMMENDATIONS_PER_SEED, &config.country)
            .await?;
        let tracks = client.get_tracks(&utils::catalog_ids(&suggested)).await?;
        let kept = released_since(client, resolver, tracks, config.recommendations_from_year).await?;

        info!(
            "Fetched {} recommendations seeded by artist {}",
            kept.len(),
            artist.name
        );
        recommended.extend(kept);
    }

    Ok(recommended)
}

async fn released_since<C: CatalogClient>(
    client: &C,
    resolver: &mut AlbumResolver,
    tracks: Vec<Track>,
    from_year: i32,
) -> Res<Vec<Track>> {
    let album_ids: Vec<String> = tracks.iter().map(|t| t.album.id.clone()).collect();
    resolver.get_many(client, &album_ids).await?;

    Ok(tracks
        .into_iter()
        .filter(|t| {
            resolver
                .memo()
                .get(&t.album.id)
                .and_then(|album| album.release_year())
                .is_some_and(|year| year >= from_year)
        })
        .collect())
}
