use crate::{
    Res,
    engine::playlist,
    error::SpotError,
    info,
    management::PlaylistCacheManager,
    spotify::CatalogClient,
    types::{Playlist, Track, User},
    utils,
};

/// Makes the user's playlist `name` contain exactly `desired`, in order.
///
/// An existing playlist with that exact name is emptied first, otherwise a
/// private one is created. Tracks are then appended `chunk_size` at a time,
/// each request moving the snapshot id forward. Requests already applied are
/// not rolled back: a failing chunk returns [`SpotError::Reconcile`] holding the
/// playlist as of the last successful request.
///
/// The playlist cache is consulted for the existing playlist's tracks so an
/// unchanged snapshot is not listed again.
///
/// # Arguments
///
/// * `client` - Catalog the playlist lives in
/// * `user` - Owner of the playlist
/// * `name` - Exact playlist name to look up or create
/// * `desired` - Tracks in their final order; tracks without an id are skipped
/// * `chunk_size` - Tracks per add or remove request, at least 1
/// * `cache` - Optional playlist cache for the existing playlist's tracks
///
/// # Returns
///
/// The playlist as it now stands remotely, with its latest snapshot id.
///
/// # Errors
///
/// A failing add or remove request yields [`SpotError::Reconcile`]; any
/// earlier failure while looking up or creating the playlist is returned as is.
///
/// # Example
///
/// ```ignore
/// let playlist = reconcile(&client, &user, "Spotted™ Discovery", &tracks, 100, Some(&cache)).await?;
/// success!("Playlist {} holds {} tracks", playlist.name, playlist.tracks.len());
/// ```
pub async fn reconcile<C: CatalogClient>(
    client: &C,
    user: &User,
    name: &str,
    desired: &[Track],
    chunk_size: usize,
    cache: Option<&PlaylistCacheManager>,
) -> Res<Playlist> {
    let chunk_size = chunk_size.max(1);
    let existing = playlist::list_summaries(client, user)
        .await?
        .into_iter()
        .find(|s| s.name == name);

    let mut target = match existing {
        Some(summary) => {
            let cached = cache
                .and_then(|c| c.find_by_snapshot(&summary.snapshot_id))
                .filter(|p| p.id == summary.id)
                .cloned();
            let mut target = cached.unwrap_or_else(|| Playlist::from_summary(&summary));
            playlist::populate(client, &mut target).await?;
            clear(client, &mut target, chunk_size).await?;
            target
        }
        None => {
            let summary = client.create_playlist(&user.id, name, false).await?;
            info!("Created playlist {}", summary.name);
            let mut target = Playlist::from_summary(&summary);
            target.populated = true;
            target
        }
    };

    let additions: Vec<&Track> = desired.iter().filter(|t| !t.id.is_empty()).collect();
    for chunk in additions.chunks(chunk_size) {
        let ids: Vec<String> = chunk.iter().map(|t| t.id.clone()).collect();
        match client.add_tracks(&target.id, &ids).await {
            Ok(snapshot_id) => {
                target.snapshot_id = snapshot_id;
                target.tracks.extend(chunk.iter().map(|t| (*t).clone()));
            }
            Err(e) => return Err(partial(target, e)),
        }
    }

    info!("Playlist {} now holds {} tracks", target.name, target.tracks.len());
    Ok(target)
}

async fn clear<C: CatalogClient>(client: &C, target: &mut Playlist, chunk_size: usize) -> Res<()> {
    let ids: Vec<String> = utils::catalog_ids(&target.tracks)
        .into_iter()
        .filter(|id| !id.is_empty())
        .collect();

    for chunk in ids.chunks(chunk_size) {
        match client.remove_tracks(&target.id, chunk).await {
            Ok(snapshot_id) => {
                target.snapshot_id = snapshot_id;
                target.tracks.retain(|t| !chunk.contains(&t.id));
            }
            Err(e) => return Err(partial(target.clone(), e)),
        }
    }

    target.tracks.clear();
    Ok(())
}

fn partial(playlist: Playlist, source: SpotError) -> SpotError {
    SpotError::Reconcile {
        playlist: Box::new(playlist),
        source: Box::new(source),
    }
}
