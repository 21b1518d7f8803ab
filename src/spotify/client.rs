use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    Res,
    error::SpotError,
    management::TokenManager,
    spotify::{CatalogClient, auth::Credentials},
    types::{
        AddTracksRequest, Album, Artist, AudioFeatures, AudioFeaturesResponse,
        CreatePlaylistRequest, CurrentlyPlaying, Paging, PlaylistItem, RecommendationsResponse,
        RemoveTracksRequest, Seeds, SeveralAlbumsResponse, SeveralTracksResponse, SimpleAlbum,
        SimplePlaylist, SimpleTrack, SnapshotResponse, Track, TrackAttributes, TrackUri, User,
    },
    utils, warning,
};

const MAX_RETRIES: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const TRACKS_PER_REQUEST: usize = 50;
const AUDIO_FEATURES_PER_REQUEST: usize = 100;

/// Spotify Web API client backing [`CatalogClient`].
///
/// Holds the token manager behind a mutex so every request can refresh an
/// expiring access token before it is sent.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    credentials: Credentials,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    /// Creates a client for the API rooted at `api_url`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL of the Web API, without a trailing slash
    /// * `credentials` - Application credentials, used when the token is renewed
    /// * `tokens` - Token manager holding the current access token
    ///
    /// # Example
    ///
    /// ```ignore
    /// let credentials = Credentials::from_config(&config);
    /// let token = client_credentials_token(&credentials).await?;
    /// let client = SpotifyClient::new(config.api_url.clone(), credentials, TokenManager::new(token, None));
    /// ```
    pub fn new(api_url: impl Into<String>, credentials: Credentials, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            credentials,
            tokens: Mutex::new(tokens),
        }
    }

    async fn access_token(&self) -> Res<String> {
        let mut tokens = self.tokens.lock().await;
        tokens.get_valid_token(&self.credentials).await
    }

    /// Sends a request with a fresh bearer token.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `endpoint` - Path below the API root, e.g. `/me`
    /// * `query` - Query string pairs
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Response)` - The first response with a success status
    /// - `Err(SpotError)` - Token renewal failure, network error, or error status
    ///
    /// # Retry Logic
    ///
    /// 502 Bad Gateway is retried after 10 seconds. 429 Too Many Requests is
    /// retried after its `Retry-After` delay as long as that stays within
    /// two minutes. Both share a budget of three retries.
    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Res<Response> {
        let url = format!("{}{}", self.api_url, endpoint);
        let mut attempt = 0;

        loop {
            let token = self.access_token().await?;
            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(token)
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SpotError::http(endpoint, e))?;

            if attempt < MAX_RETRIES {
                match response.status() {
                    StatusCode::BAD_GATEWAY => {
                        attempt += 1;
                        sleep(Duration::from_secs(10)).await;
                        continue;
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(1);
                        if retry_after <= MAX_RETRY_AFTER_SECS {
                            attempt += 1;
                            sleep(Duration::from_secs(retry_after)).await;
                            continue;
                        }
                        warning!(
                            "Retry after has reached an abnormal high of {} seconds for {}.",
                            retry_after,
                            endpoint
                        );
                    }
                    _ => {}
                }
            }

            return response
                .error_for_status()
                .map_err(|e| SpotError::http(endpoint, e));
        }
    }

    /// GETs `endpoint` and decodes the JSON body as `T`.
    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Res<T> {
        self.execute(Method::GET, endpoint, query, None)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SpotError::http(endpoint, e))
    }

    /// Sends `body` as JSON and decodes the JSON response as `T`.
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Res<T> {
        let body = serde_json::to_value(body)?;
        self.execute(method, endpoint, &[], Some(&body))
            .await?
            .json::<T>()
            .await
            .map_err(|e| SpotError::http(endpoint, e))
    }
}

fn page_query(offset: usize, limit: usize) -> Vec<(&'static str, String)> {
    vec![("offset", offset.to_string()), ("limit", limit.to_string())]
}

impl CatalogClient for SpotifyClient {
    async fn get_track(&self, id: &str) -> Res<Track> {
        self.get(&format!("/tracks/{}", id), &[]).await
    }

    /// Fetches tracks in batches of 50 ids. Ids the catalog does not know are
    /// left out of the result.
    async fn get_tracks(&self, ids: &[String]) -> Res<Vec<Track>> {
        let mut tracks = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(TRACKS_PER_REQUEST) {
            let response: SeveralTracksResponse =
                self.get("/tracks", &[("ids", chunk.join(","))]).await?;
            tracks.extend(response.tracks.into_iter().flatten());
        }
        Ok(tracks)
    }

    async fn get_album(&self, id: &str) -> Res<Album> {
        self.get(&format!("/albums/{}", id), &[]).await
    }

    /// Fetches one batch of albums. The caller keeps `ids` within the API's
    /// batch limit of 20.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<Album>)` - Known albums in request order, empty for no ids
    /// - `Err(SpotError)` - Network error or error status
    async fn get_albums(&self, ids: &[String]) -> Res<Vec<Album>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response: SeveralAlbumsResponse =
            self.get("/albums", &[("ids", ids.join(","))]).await?;
        Ok(response.albums.into_iter().flatten().collect())
    }

    /// One page of an artist's releases.
    ///
    /// # Arguments
    ///
    /// * `artist_id` - Artist whose releases are listed
    /// * `include_groups` - Comma separated release groups, e.g. `album,single`
    /// * `offset` - Index of the first release in the page
    /// * `limit` - Page size, at most 50
    async fn list_artist_albums(
        &self,
        artist_id: &str,
        include_groups: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimpleAlbum>> {
        let mut query = page_query(offset, limit);
        query.push(("include_groups", include_groups.to_string()));
        self.get(&format!("/artists/{}/albums", artist_id), &query)
            .await
    }

    async fn list_user_playlists(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<SimplePlaylist>> {
        self.get(
            &format!("/users/{}/playlists", user_id),
            &page_query(offset, limit),
        )
        .await
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Res<Paging<PlaylistItem>> {
        self.get(
            &format!("/playlists/{}/tracks", playlist_id),
            &page_query(offset, limit),
        )
        .await
    }

    /// Fetches audio features in batches of 100 ids.
    async fn get_audio_features(&self, ids: &[String]) -> Res<Vec<AudioFeatures>> {
        let mut features = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(AUDIO_FEATURES_PER_REQUEST) {
            let response: AudioFeaturesResponse = self
                .get("/audio-features", &[("ids", chunk.join(","))])
                .await?;
            features.extend(response.audio_features.into_iter().flatten());
        }
        Ok(features)
    }

    /// Recommendations for the seeds, narrowed by `attributes`.
    ///
    /// Empty seed lists are left out of the query, as are unset attributes.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let seeds = Seeds { artists: vec![artist.id.clone()], ..Default::default() };
    /// let tracks = client.get_recommendations(&seeds, &attributes, 100, "DE").await?;
    /// ```
    async fn get_recommendations(
        &self,
        seeds: &Seeds,
        attributes: &TrackAttributes,
        limit: usize,
        country: &str,
    ) -> Res<Vec<SimpleTrack>> {
        let mut query: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("market", country.to_string()),
        ];
        for (key, values) in [
            ("seed_artists", &seeds.artists),
            ("seed_tracks", &seeds.tracks),
            ("seed_genres", &seeds.genres),
        ] {
            if !values.is_empty() {
                query.push((key, values.join(",")));
            }
        }
        query.extend(attributes.query_pairs());

        let response: RecommendationsResponse = self.get("/recommendations", &query).await?;
        Ok(response.tracks)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Res<SimplePlaylist> {
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: "Suggestions by spotted".to_string(),
            public,
        };
        self.send(
            Method::POST,
            &format!("/users/{}/playlists", user_id),
            &request,
        )
        .await
    }

    /// Removes every occurrence of the given tracks from the playlist.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(String)` - The playlist's new snapshot id
    /// - `Err(SpotError)` - Network error or error status
    async fn remove_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String> {
        let request = RemoveTracksRequest {
            tracks: ids
                .iter()
                .map(|id| TrackUri {
                    uri: utils::track_uri(id),
                })
                .collect(),
        };
        let response: SnapshotResponse = self
            .send(
                Method::DELETE,
                &format!("/playlists/{}/tracks", playlist_id),
                &request,
            )
            .await?;
        Ok(response.snapshot_id)
    }

    /// Appends the tracks to the end of the playlist and returns the new
    /// snapshot id.
    async fn add_tracks(&self, playlist_id: &str, ids: &[String]) -> Res<String> {
        let request = AddTracksRequest {
            uris: ids.iter().map(|id| utils::track_uri(id)).collect(),
        };
        let response: SnapshotResponse = self
            .send(
                Method::POST,
                &format!("/playlists/{}/tracks", playlist_id),
                &request,
            )
            .await?;
        Ok(response.snapshot_id)
    }

    async fn get_current_user(&self) -> Res<User> {
        self.get("/me", &[]).await
    }

    async fn get_public_user(&self, username: &str) -> Res<User> {
        self.get(&format!("/users/{}", username), &[]).await
    }

    async fn get_top_artists(&self, limit: usize) -> Res<Vec<Artist>> {
        let page: Paging<Artist> = self
            .get("/me/top/artists", &[("limit", limit.to_string())])
            .await?;
        Ok(page.items)
    }

    async fn get_top_tracks(&self, limit: usize) -> Res<Vec<Track>> {
        let page: Paging<Track> = self
            .get("/me/top/tracks", &[("limit", limit.to_string())])
            .await?;
        Ok(page.items)
    }

    /// The listener's current track. 204 No Content means nothing is playing.
    async fn get_currently_playing(&self) -> Res<Option<CurrentlyPlaying>> {
        let endpoint = "/me/player/currently-playing";
        let response = self.execute(Method::GET, endpoint, &[], None).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        response
            .json::<CurrentlyPlaying>()
            .await
            .map(Some)
            .map_err(|e| SpotError::http(endpoint, e))
    }
}
