//! # Spotify Integration Module
//!
//! The remote catalog as seen by the suggestion engine. [`CatalogClient`] is the
//! narrow capability set the engine depends on; [`client::SpotifyClient`] is the
//! reqwest implementation talking to the Spotify Web API, and [`auth`] obtains
//! the tokens it needs through either the client-credentials or the
//! authorization-code (PKCE) flow.
//!
//! ```text
//! Engine (pagination, albums, suggestions, playlists)
//!          ↓
//! CatalogClient
//!          ↓
//! SpotifyClient (bearer token, retries)  ←  auth (client credentials / PKCE redirect)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /tracks/{id}`, `GET /tracks` - single and bulk track lookups
//! - `GET /albums/{id}`, `GET /albums` - single and bulk album lookups
//! - `GET /artists/{id}/albums` - artist discography, filtered by release type
//! - `GET /users/{id}/playlists`, `GET /playlists/{id}/tracks` - playlist listings
//! - `GET /audio-features`, `GET /recommendations` - recommendation inputs and feed
//! - `GET /me/top/artists`, `GET /me/top/tracks` - recommendation seeds
//! - `POST /users/{id}/playlists` - playlist creation
//! - `POST|DELETE /playlists/{id}/tracks` - playlist membership changes
//! - `GET /me`, `GET /users/{id}` - user profiles
//! - `GET /me/player/currently-playing` - playback state
//!
//! Every paginated call takes `(offset, limit)` and returns a [`Paging`] with the
//! items of that page and the total reported by the server.

pub mod auth;
pub mod client;

pub use client::SpotifyClient;

use crate::{
    Res,
    types::{
        Album, Artist, AudioFeatures, CurrentlyPlaying, Paging, PlaylistItem, Seeds, SimpleAlbum,
        SimplePlaylist, SimpleTrack, Track, TrackAttributes, User,
    },
};

/// Release types considered when scanning an artist's catalog.
pub const ALBUM_AND_SINGLE: &str = "album,single";

#[allow(async_fn_in_trait)]
pub trait CatalogClient {
    async fn get_track(&self, id: &str) -> Res<Track>;

    /// Looks up several tracks, splitting `ids` into as many requests as needed.
    async fn get_tracks(&self, ids: &[String]) -> Res<Vec<Track>>;

    async fn get_album(&self, id: &str) -> Res<Album>;

    /// Looks up several albums in a single request. Unknown ids are skipped.
    async fn get_albums(&self, ids: &[String]) -> Res<Vec<Album>>;

    async fn list_artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimpleAlbum>>;

    async fn list_user_playlists(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimplePlaylist>>;

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<PlaylistItem>>;

    async fn get_audio_features(&self, ids: &[String]) -> Res<Vec<AudioFeatures>>;

    async fn get_recommendations(
        &self,
        seeds: &Seeds,
        attributes: &TrackAttributes,
        limit: usize,
        country: &str,
    ) -> Res<Vec<SimpleTrack>>;

    async fn create_playlist(&self, user_id: &str, name: &str, public: bool)
    -> Res<SimplePlaylist>;

    /// Removes every occurrence of the given tracks and returns the new snapshot id.
    async fn remove_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String>;

    /// Appends the given tracks and returns the new snapshot id.
    async fn add_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String>;

    async fn get_current_user(&self) -> Res<User>;

    async fn get_public_user(&self, username: &str) -> Res<User>;

    async fn get_top_artists(&self, limit: usize) -> Res<Vec<Artist>>;

    async fn get_top_tracks(&self, limit: usize) -> Res<Vec<Track>>;

    /// `None` when nothing is playing on any device.
    async fn get_currently_playing(&self) -> Res<Option<CurrentlyPlaying>>;
}
