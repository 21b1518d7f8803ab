#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use spotted::{
    Res,
    error::SpotError,
    spotify::CatalogClient,
    types::{
        Album, Artist, AudioFeatures, CurrentlyPlaying, Paging, Playlist, PlaylistItem, Seeds,
        SimpleAlbum, SimpleArtist, SimplePlaylist, SimpleTrack, Track, TrackAttributes, User,
    },
};

pub fn artist(name: &str) -> SimpleArtist {
    SimpleArtist {
        id: format!("artist-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
    }
}

/// An album whose listing holds one track per name, ids `<album id>-t<n>`.
pub fn album(
    id: &str,
    name: &str,
    release_date: &str,
    track_names: &[&str],
    artists: &[SimpleArtist],
) -> Album {
    let items: Vec<SimpleTrack> = track_names
        .iter()
        .enumerate()
        .map(|(i, track)| SimpleTrack {
            id: format!("{}-t{}", id, i),
            name: track.to_string(),
            uri: format!("spotify:track:{}-t{}", id, i),
            artists: artists.to_vec(),
        })
        .collect();

    Album {
        id: id.to_string(),
        name: name.to_string(),
        album_type: "album".to_string(),
        release_date: release_date.to_string(),
        release_date_precision: "day".to_string(),
        artists: artists.to_vec(),
        tracks: Paging {
            total: items.len(),
            items,
        },
    }
}

/// An album of `count` filler tracks plus the given ones up front.
pub fn album_with_count(
    id: &str,
    release_date: &str,
    count: usize,
    track_names: &[&str],
    artists: &[SimpleArtist],
) -> Album {
    let fillers: Vec<String> = (track_names.len()..count)
        .map(|i| format!("Filler {}", i))
        .collect();
    let mut names: Vec<&str> = track_names.to_vec();
    names.extend(fillers.iter().map(|s| s.as_str()));
    album(id, &format!("Album {}", id), release_date, &names, artists)
}

pub fn simple_album(album: &Album) -> SimpleAlbum {
    SimpleAlbum {
        id: album.id.clone(),
        name: album.name.clone(),
        album_type: album.album_type.clone(),
        release_date: album.release_date.clone(),
        release_date_precision: album.release_date_precision.clone(),
        artists: album.artists.clone(),
    }
}

/// The full track behind the album listing entry at `index`.
pub fn track_on(album: &Album, index: usize) -> Track {
    let listed = &album.tracks.items[index];
    Track {
        id: listed.id.clone(),
        name: listed.name.clone(),
        uri: listed.uri.clone(),
        artists: listed.artists.clone(),
        album: simple_album(album),
    }
}

pub fn track(id: &str, name: &str, artists: &[SimpleArtist], album: &Album) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        uri: format!("spotify:track:{}", id),
        artists: artists.to_vec(),
        album: simple_album(album),
    }
}

pub fn populated_playlist(id: &str, name: &str, snapshot_id: &str, tracks: Vec<Track>) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        snapshot_id: snapshot_id.to_string(),
        tracks,
        populated: true,
    }
}

pub fn paging<T: Clone>(items: &[T], offset: usize, limit: usize) -> Paging<T> {
    Paging {
        items: items.iter().skip(offset).take(limit).cloned().collect(),
        total: items.len(),
    }
}

pub fn listener() -> User {
    User {
        id: "listener".to_string(),
        display_name: Some("Listener".to_string()),
    }
}

fn not_found(endpoint: &str, id: &str) -> SpotError {
    SpotError::response(endpoint, format!("{} not found", id))
}

/// In-memory catalog that records every call it receives.
pub struct FakeCatalog {
    pub user: User,
    tracks: RefCell<HashMap<String, Track>>,
    albums: RefCell<HashMap<String, Album>>,
    artist_albums: RefCell<HashMap<String, Vec<SimpleAlbum>>>,
    playlists: RefCell<Vec<SimplePlaylist>>,
    playlist_tracks: RefCell<HashMap<String, Vec<Track>>>,
    top_artists: RefCell<Vec<Artist>>,
    top_tracks: RefCell<Vec<Track>>,
    features: RefCell<Vec<AudioFeatures>>,
    recommendations: RefCell<HashMap<String, Vec<SimpleTrack>>>,
    playing: RefCell<Option<CurrentlyPlaying>>,
    fail_adds_from: Cell<Option<usize>>,
    fail_removes_from: Cell<Option<usize>>,
    snapshots: Cell<u32>,
    pub calls: RefCell<Vec<String>>,
    pub add_sizes: RefCell<Vec<usize>>,
    pub remove_sizes: RefCell<Vec<usize>>,
    pub recommendation_requests: RefCell<Vec<(Seeds, TrackAttributes, usize, String)>>,
    pub created_public: RefCell<Vec<bool>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            user: listener(),
            tracks: RefCell::new(HashMap::new()),
            albums: RefCell::new(HashMap::new()),
            artist_albums: RefCell::new(HashMap::new()),
            playlists: RefCell::new(Vec::new()),
            playlist_tracks: RefCell::new(HashMap::new()),
            top_artists: RefCell::new(Vec::new()),
            top_tracks: RefCell::new(Vec::new()),
            features: RefCell::new(Vec::new()),
            recommendations: RefCell::new(HashMap::new()),
            playing: RefCell::new(None),
            fail_adds_from: Cell::new(None),
            fail_removes_from: Cell::new(None),
            snapshots: Cell::new(0),
            calls: RefCell::new(Vec::new()),
            add_sizes: RefCell::new(Vec::new()),
            remove_sizes: RefCell::new(Vec::new()),
            recommendation_requests: RefCell::new(Vec::new()),
            created_public: RefCell::new(Vec::new()),
        }
    }

    /// Registers the album and a full track for every entry of its listing.
    pub fn with_album(&self, album: &Album) -> &Self {
        for index in 0..album.tracks.items.len() {
            self.with_track(&track_on(album, index));
        }
        self.albums
            .borrow_mut()
            .insert(album.id.clone(), album.clone());
        self
    }

    pub fn with_track(&self, track: &Track) -> &Self {
        self.tracks
            .borrow_mut()
            .insert(track.id.clone(), track.clone());
        self
    }

    pub fn with_artist_albums(&self, artist: &SimpleArtist, albums: &[&Album]) -> &Self {
        for album in albums {
            self.with_album(album);
        }
        self.artist_albums.borrow_mut().insert(
            artist.id.clone(),
            albums.iter().map(|a| simple_album(a)).collect(),
        );
        self
    }

    pub fn with_playlist(&self, id: &str, name: &str, tracks: &[Track]) -> &Self {
        for track in tracks {
            self.with_track(track);
        }
        let snapshot_id = self.next_snapshot();
        self.playlists.borrow_mut().push(SimplePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            snapshot_id,
        });
        self.playlist_tracks
            .borrow_mut()
            .insert(id.to_string(), tracks.to_vec());
        self
    }

    pub fn with_top(&self, artists: Vec<Artist>, tracks: Vec<Track>, features: Vec<AudioFeatures>) -> &Self {
        *self.top_artists.borrow_mut() = artists;
        *self.top_tracks.borrow_mut() = tracks;
        *self.features.borrow_mut() = features;
        self
    }

    pub fn with_recommendations(&self, seed_artist_id: &str, tracks: &[Track]) -> &Self {
        for track in tracks {
            self.with_track(track);
        }
        let simple = tracks
            .iter()
            .map(|t| SimpleTrack {
                id: t.id.clone(),
                name: t.name.clone(),
                uri: t.uri.clone(),
                artists: t.artists.clone(),
            })
            .collect();
        self.recommendations
            .borrow_mut()
            .insert(seed_artist_id.to_string(), simple);
        self
    }

    pub fn with_playing(&self, playing: Option<CurrentlyPlaying>) -> &Self {
        *self.playing.borrow_mut() = playing;
        self
    }

    /// Makes the `n`th add request (zero based) and every later one fail.
    pub fn fail_adds_from(&self, n: usize) -> &Self {
        self.fail_adds_from.set(Some(n));
        self
    }

    /// Makes the `n`th remove request (zero based) and every later one fail.
    pub fn fail_removes_from(&self, n: usize) -> &Self {
        self.fail_removes_from.set(Some(n));
        self
    }

    pub fn summary(&self, name: &str) -> Option<SimplePlaylist> {
        self.playlists
            .borrow()
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    pub fn remote_tracks(&self, playlist_id: &str) -> Vec<Track> {
        self.playlist_tracks
            .borrow()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn next_snapshot(&self) -> String {
        self.snapshots.set(self.snapshots.get() + 1);
        format!("snapshot-{}", self.snapshots.get())
    }

    fn touch_playlist(&self, playlist_id: &str) -> Res<String> {
        let snapshot_id = self.next_snapshot();
        let mut playlists = self.playlists.borrow_mut();
        let summary = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found("/playlists", playlist_id))?;
        summary.snapshot_id = snapshot_id.clone();
        Ok(snapshot_id)
    }
}

impl CatalogClient for FakeCatalog {
    async fn get_track(&self, id: &str) -> Res<Track> {
        self.record(format!("get_track:{}", id));
        self.tracks
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("/tracks", id))
    }

    async fn get_tracks(&self, ids: &[String]) -> Res<Vec<Track>> {
        self.record(format!("get_tracks:{}", ids.len()));
        let tracks = self.tracks.borrow();
        Ok(ids.iter().filter_map(|id| tracks.get(id).cloned()).collect())
    }

    async fn get_album(&self, id: &str) -> Res<Album> {
        self.record(format!("get_album:{}", id));
        self.albums
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("/albums", id))
    }

    async fn get_albums(&self, ids: &[String]) -> Res<Vec<Album>> {
        self.record(format!("get_albums:{}", ids.join(",")));
        let albums = self.albums.borrow();
        Ok(ids.iter().filter_map(|id| albums.get(id).cloned()).collect())
    }

    async fn list_artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimpleAlbum>> {
        self.record(format!("list_artist_albums:{}:{}", artist_id, include_groups));
        let albums = self.artist_albums.borrow();
        let listed = albums.get(artist_id).cloned().unwrap_or_default();
        Ok(paging(&listed, offset, limit))
    }

    async fn list_user_playlists(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimplePlaylist>> {
        self.record(format!("list_user_playlists:{}", user_id));
        let playlists = self.playlists.borrow();
        Ok(paging(playlists.as_slice(), offset, limit))
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<PlaylistItem>> {
        self.record(format!("list_playlist_tracks:{}", playlist_id));
        let items: Vec<PlaylistItem> = self
            .remote_tracks(playlist_id)
            .into_iter()
            .map(|t| PlaylistItem { track: Some(t) })
            .collect();
        Ok(paging(&items, offset, limit))
    }

    async fn get_audio_features(&self, ids: &[String]) -> Res<Vec<AudioFeatures>> {
        self.record(format!("get_audio_features:{}", ids.len()));
        Ok(self.features.borrow().clone())
    }

    async fn get_recommendations(
        &self,
        seeds: &Seeds,
        attributes: &TrackAttributes,
        limit: usize,
        country: &str,
    ) -> Res<Vec<SimpleTrack>> {
        self.record("get_recommendations".to_string());
        self.recommendation_requests.borrow_mut().push((
            seeds.clone(),
            attributes.clone(),
            limit,
            country.to_string(),
        ));
        let recommendations = self.recommendations.borrow();
        Ok(seeds
            .artists
            .first()
            .and_then(|id| recommendations.get(id))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Res<SimplePlaylist> {
        self.record(format!("create_playlist:{}:{}", user_id, name));
        self.created_public.borrow_mut().push(public);
        let summary = SimplePlaylist {
            id: format!("created-{}", self.created_public.borrow().len()),
            name: name.to_string(),
            snapshot_id: self.next_snapshot(),
        };
        self.playlists.borrow_mut().push(summary.clone());
        self.playlist_tracks
            .borrow_mut()
            .insert(summary.id.clone(), Vec::new());
        Ok(summary)
    }

    async fn remove_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String> {
        self.record(format!("remove_tracks:{}", playlist_id));
        let attempt = self.remove_sizes.borrow().len();
        self.remove_sizes.borrow_mut().push(ids.len());
        if self.fail_removes_from.get().is_some_and(|n| attempt >= n) {
            return Err(SpotError::response(
                format!("/playlists/{}/tracks", playlist_id),
                "502 Bad Gateway",
            ));
        }

        if let Some(tracks) = self.playlist_tracks.borrow_mut().get_mut(playlist_id) {
            tracks.retain(|t| !ids.contains(&t.id));
        }
        self.touch_playlist(playlist_id)
    }

    async fn add_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String> {
        self.record(format!("add_tracks:{}", playlist_id));
        let attempt = self.add_sizes.borrow().len();
        self.add_sizes.borrow_mut().push(ids.len());
        if self.fail_adds_from.get().is_some_and(|n| attempt >= n) {
            return Err(SpotError::response(
                format!("/playlists/{}/tracks", playlist_id),
                "502 Bad Gateway",
            ));
        }

        let known = self.tracks.borrow();
        if let Some(tracks) = self.playlist_tracks.borrow_mut().get_mut(playlist_id) {
            tracks.extend(ids.iter().filter_map(|id| known.get(id).cloned()));
        }
        drop(known);
        self.touch_playlist(playlist_id)
    }

    async fn get_current_user(&self) -> Res<User> {
        self.record("get_current_user".to_string());
        Ok(self.user.clone())
    }

    async fn get_public_user(&self, username: &str) -> Res<User> {
        self.record(format!("get_public_user:{}", username));
        Ok(self.user.clone())
    }

    async fn get_top_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        self.record(format!("get_top_artists:{}", limit));
        Ok(self.top_artists.borrow().iter().take(limit).cloned().collect())
    }

    async fn get_top_tracks(&self, limit: usize) -> Res<Vec<Track>> {
        self.record(format!("get_top_tracks:{}", limit));
        Ok(self.top_tracks.borrow().iter().take(limit).cloned().collect())
    }

    async fn get_currently_playing(&self) -> Res<Option<CurrentlyPlaying>> {
        self.record("get_currently_playing".to_string());
        Ok(self.playing.borrow().clone())
    }
}
