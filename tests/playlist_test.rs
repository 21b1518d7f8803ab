mod common;

use common::{FakeCatalog, album_with_count, artist, populated_playlist, track, track_on};
use regex::Regex;
use spotted::{
    engine::playlist::{
        discovery, find_by_track, flatten_tracks, matching_pattern, pattern_number,
        playlist_holes, populate,
    },
    management::PlaylistCacheManager,
    types::{Playlist, SimplePlaylist},
};
use tempfile::TempDir;

fn pattern() -> Regex {
    Regex::new("^Metal ([0-9]+)").unwrap()
}

fn named(names: &[&str]) -> Vec<Playlist> {
    names
        .iter()
        .map(|name| populated_playlist(name, name, "s", Vec::new()))
        .collect()
}

#[tokio::test]
async fn test_matching_pattern_sorts_and_writes_cache() {
    let band = artist("Band");
    let lp = album_with_count("lp", "2020-01-01", 6, &["a", "b", "c"], &[band]);
    let catalog = FakeCatalog::new();
    catalog
        .with_playlist("p2", "Metal 2", &[track_on(&lp, 0)])
        .with_playlist("p10", "Metal 10", &[track_on(&lp, 1)])
        .with_playlist("dw", "Discover Weekly", &[track_on(&lp, 2)])
        .with_playlist("p1", "Metal 1", &[]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache").join("playlists.json");
    let mut cache = PlaylistCacheManager::new(&path, None);

    let playlists = matching_pattern(&catalog, &catalog.user, &pattern(), &mut cache)
        .await
        .unwrap();

    let names: Vec<&str> = playlists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Metal 10", "Metal 2", "Metal 1"]);
    assert!(playlists.iter().all(|p| p.populated));
    assert_eq!(catalog.count_calls("list_playlist_tracks"), 3);

    let reloaded = PlaylistCacheManager::load(&path).await.unwrap();
    assert_eq!(reloaded.count(), 3);
    for playlist in &playlists {
        assert_eq!(reloaded.find_by_snapshot(&playlist.snapshot_id), Some(playlist));
    }
}

#[tokio::test]
async fn test_matching_pattern_reuses_cached_snapshots() {
    let band = artist("Band");
    let lp = album_with_count("lp", "2020-01-01", 6, &["a", "b"], &[band]);
    let catalog = FakeCatalog::new();
    catalog
        .with_playlist("p1", "Metal 1", &[track_on(&lp, 0)])
        .with_playlist("p2", "Metal 2", &[track_on(&lp, 1)]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playlists.json");
    let current = catalog.summary("Metal 1").unwrap();
    let cached = populated_playlist("p1", "Metal 1", &current.snapshot_id, vec![track_on(&lp, 0)]);
    let stale = populated_playlist("p2", "Metal 2", "outdated", Vec::new());
    let mut cache = PlaylistCacheManager::new(&path, Some(vec![cached.clone(), stale]));

    let playlists = matching_pattern(&catalog, &catalog.user, &pattern(), &mut cache)
        .await
        .unwrap();

    assert_eq!(catalog.count_calls("list_playlist_tracks:p1"), 0);
    assert_eq!(catalog.count_calls("list_playlist_tracks:p2"), 1);
    assert_eq!(playlists[1], cached);
    assert_eq!(playlists[0].tracks.len(), 1);
}

#[tokio::test]
async fn test_cache_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let cache = PlaylistCacheManager::load(&dir.path().join("nope.json"))
        .await
        .unwrap();

    assert_eq!(cache.count(), 0);
}

#[tokio::test]
async fn test_cache_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playlists.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(PlaylistCacheManager::load(&path).await.is_err());
}

#[test]
fn test_cache_ignores_unpopulated_entries() {
    let mut unpopulated = populated_playlist("p1", "Metal 1", "s1", Vec::new());
    unpopulated.populated = false;
    let cache = PlaylistCacheManager::new(
        "unused.json",
        Some(vec![unpopulated, populated_playlist("p2", "Metal 2", "s2", Vec::new())]),
    );

    assert!(cache.find_by_snapshot("s1").is_none());
    assert_eq!(cache.find_by_snapshot("s2").map(|p| p.id.as_str()), Some("p2"));
}

#[tokio::test]
async fn test_populate_happens_once() {
    let band = artist("Band");
    let lp = album_with_count("lp", "2020-01-01", 6, &["a"], &[band]);
    let catalog = FakeCatalog::new();
    catalog.with_playlist("p1", "Metal 1", &[track_on(&lp, 0)]);

    let mut playlist = Playlist::from_summary(&SimplePlaylist {
        id: "p1".to_string(),
        name: "Metal 1".to_string(),
        snapshot_id: "s".to_string(),
    });
    assert!(playlist.populated_tracks().is_err());

    populate(&catalog, &mut playlist).await.unwrap();
    populate(&catalog, &mut playlist).await.unwrap();

    assert_eq!(playlist.populated_tracks().unwrap().len(), 1);
    assert_eq!(catalog.count_calls("list_playlist_tracks"), 1);
}

#[tokio::test]
async fn test_discovery_selects_by_exact_name() {
    let band = artist("Band");
    let lp = album_with_count("lp", "2020-01-01", 6, &["a", "b"], &[band]);
    let catalog = FakeCatalog::new();
    catalog
        .with_playlist("dw", "Discover Weekly", &[track_on(&lp, 0)])
        .with_playlist("dw2", "Discover Weekly Archive", &[track_on(&lp, 1)])
        .with_playlist("rr", "Release Radar", &[]);

    let names = vec!["Discover Weekly".to_string(), "Release Radar".to_string()];
    let playlists = discovery(&catalog, &catalog.user, &names).await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["dw", "rr"]);
    assert!(playlists.iter().all(|p| p.populated));
}

#[test]
fn test_flatten_and_find_by_track() {
    let band = artist("Band");
    let lp = album_with_count("lp", "2020-01-01", 6, &["a", "b", "c"], &[band.clone()]);
    let reissue = album_with_count("re", "2024-01-01", 6, &[], &[band.clone()]);
    let playlists = vec![
        populated_playlist("p2", "Metal 2", "s2", vec![track_on(&lp, 0), track_on(&lp, 1)]),
        populated_playlist("p1", "Metal 1", "s1", vec![track_on(&lp, 1), track_on(&lp, 2)]),
    ];

    assert_eq!(flatten_tracks(&playlists).unwrap().len(), 3);

    let same_song = track("re-1", "b", &[band.clone()], &reissue);
    let found = find_by_track(&playlists, &same_song).unwrap();
    let ids: Vec<&str> = found.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);

    let new_song = track("re-2", "z", &[band], &reissue);
    assert!(find_by_track(&playlists, &new_song).unwrap().is_empty());
}

#[test]
fn test_pattern_number() {
    assert_eq!(pattern_number(&pattern(), "Metal 042"), 42);
    assert_eq!(pattern_number(&pattern(), "Rock 3"), 0);
    assert_eq!(pattern_number(&Regex::new("^Metal").unwrap(), "Metal 3"), 0);
}

#[test]
fn test_playlist_holes() {
    let holes = playlist_holes(&named(&["Metal 6", "Metal 4", "Metal 3", "Metal 1"]), &pattern());
    assert_eq!(holes, vec![2, 5]);

    assert!(playlist_holes(&named(&["Metal 2", "Metal 1"]), &pattern()).is_empty());
    assert!(playlist_holes(&[], &pattern()).is_empty());
}
