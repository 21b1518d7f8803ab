use std::collections::BTreeSet;

use regex::Regex;

use crate::{
    Res,
    engine::{pagination, tracks::TrackIndex},
    info,
    management::PlaylistCacheManager,
    spotify::CatalogClient,
    types::{Playlist, SimplePlaylist, Track, User},
};

const PLAYLISTS_PAGE_LIMIT: usize = 50;
const PLAYLIST_TRACKS_PAGE_LIMIT: usize = 100;

pub async fn list_summaries<C: CatalogClient>(client: &C, user: &User) -> Res<Vec<SimplePlaylist>> {
    let label = format!("playlists of {}", user.label());
    pagination::walk(&label, PLAYLISTS_PAGE_LIMIT, |offset, limit| {
        client.list_user_playlists(&user.id, offset, limit)
    })
    .await
}

/// Lists a playlist's tracks, leaving out entries the catalog no longer resolves.
pub async fn list_tracks<C: CatalogClient>(client: &C, playlist: &Playlist) -> Res<Vec<Track>> {
    let label = format!("tracks of {}", playlist.name);
    let items = pagination::walk(&label, PLAYLIST_TRACKS_PAGE_LIMIT, |offset, limit| {
        client.list_playlist_tracks(&playlist.id, offset, limit)
    })
    .await?;

    Ok(items.into_iter().filter_map(|item| item.track).collect())
}

/// Lists the playlist's tracks unless that already happened.
pub async fn populate<C: CatalogClient>(client: &C, playlist: &mut Playlist) -> Res<()> {
    if playlist.populated {
        return Ok(());
    }

    playlist.tracks = list_tracks(client, playlist).await?;
    playlist.populated = true;
    Ok(())
}

/// The number captured by the pattern's first group, 0 when there is none.
pub fn pattern_number(pattern: &Regex, name: &str) -> u32 {
    pattern
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// The listener's tracked playlists: every playlist whose name matches
/// `pattern`, highest captured number first.
///
/// Playlists whose snapshot id is still in the cache are taken from there,
/// the rest are listed. The cache is rewritten with the result.
pub async fn matching_pattern<C: CatalogClient>(
    client: &C,
    user: &User,
    pattern: &Regex,
    cache: &mut PlaylistCacheManager,
) -> Res<Vec<Playlist>> {
    let summaries = list_summaries(client, user).await?;
    let mut playlists = Vec::new();
    let mut cached = 0;

    for summary in summaries.iter().filter(|s| pattern.is_match(&s.name)) {
        match cache.find_by_snapshot(&summary.snapshot_id) {
            Some(playlist) if playlist.id == summary.id => {
                cached += 1;
                playlists.push(playlist.clone());
            }
            _ => {
                let mut playlist = Playlist::from_summary(summary);
                populate(client, &mut playlist).await?;
                playlists.push(playlist);
            }
        }
    }

    playlists.sort_by_key(|p| std::cmp::Reverse(pattern_number(pattern, &p.name)));
    info!(
        "Found {} playlists matching {} ({} from cache)",
        playlists.len(),
        pattern.as_str(),
        cached
    );

    cache.replace_all(playlists.clone()).persist().await?;
    Ok(playlists)
}

/// Discovery playlists by exact name, always listed fresh.
pub async fn discovery<C: CatalogClient>(
    client: &C,
    user: &User,
    names: &[String],
) -> Res<Vec<Playlist>> {
    let summaries = list_summaries(client, user).await?;
    let mut playlists = Vec::new();

    for summary in summaries.iter().filter(|s| names.contains(&s.name)) {
        let mut playlist = Playlist::from_summary(summary);
        populate(client, &mut playlist).await?;
        playlists.push(playlist);
    }

    Ok(playlists)
}

/// Every track of the given playlists, deduplicated by song identity.
pub fn flatten_tracks(playlists: &[Playlist]) -> Res<Vec<Track>> {
    let mut index = TrackIndex::default();
    for playlist in playlists {
        for track in playlist.populated_tracks()? {
            index.insert(track.clone());
        }
    }
    Ok(index.into_tracks())
}

/// Playlists containing the given song.
pub fn find_by_track<'p>(playlists: &'p [Playlist], track: &Track) -> Res<Vec<&'p Playlist>> {
    let mut found = Vec::new();
    for playlist in playlists {
        if TrackIndex::from_tracks(playlist.populated_tracks()?).contains(track) {
            found.push(playlist);
        }
    }
    Ok(found)
}

/// Numbers missing between 1 and the highest numbered playlist.
pub fn playlist_holes(playlists: &[Playlist], pattern: &Regex) -> Vec<u32> {
    let numbers: BTreeSet<u32> = playlists
        .iter()
        .map(|p| pattern_number(pattern, &p.name))
        .filter(|n| *n > 0)
        .collect();

    let Some(&highest) = numbers.last() else {
        return Vec::new();
    };

    (1..highest).filter(|n| !numbers.contains(n)).collect()
}
