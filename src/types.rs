use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// Entities that carry a catalog id and a display name.
pub trait CatalogItem {
    fn catalog_id(&self) -> &str;
    fn display_name(&self) -> &str;
}

/// Entities credited to an ordered list of artists.
pub trait Credited: CatalogItem {
    fn artists(&self) -> &[SimpleArtist];
}

// Spotify sends `null` ids and uris for local files.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleArtist {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimpleAlbum {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date_precision: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date_precision: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub tracks: Paging<SimpleTrack>,
}

impl Album {
    /// Total number of tracks on the album, not just the ones in the first listing page.
    pub fn track_count(&self) -> usize {
        self.tracks.total
    }

    pub fn release_year(&self) -> Option<i32> {
        parse_release_year(&self.release_date, &self.release_date_precision)
    }
}

pub fn parse_release_year(release_date: &str, precision: &str) -> Option<i32> {
    let date = match precision {
        "day" => NaiveDate::parse_from_str(release_date, "%Y-%m-%d").ok(),
        "month" => NaiveDate::parse_from_str(&format!("{}-01", release_date), "%Y-%m-%d").ok(),
        _ => None,
    };

    match date {
        Some(d) => Some(d.year()),
        None => release_date.get(..4).and_then(|y| y.parse().ok()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleTrack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    #[serde(default)]
    pub album: SimpleAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// A listener's playlist together with its lazily listed tracks.
///
/// `tracks` must not be read before `populated` is set, see
/// [`Playlist::populated_tracks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub snapshot_id: String,
    pub tracks: Vec<Track>,
    pub populated: bool,
}

impl Playlist {
    pub fn from_summary(summary: &SimplePlaylist) -> Self {
        Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            snapshot_id: summary.snapshot_id.clone(),
            tracks: Vec::new(),
            populated: false,
        }
    }

    pub fn populated_tracks(&self) -> crate::Res<&[Track]> {
        if !self.populated {
            return Err(crate::error::SpotError::PlaylistNotPopulated(
                self.name.clone(),
            ));
        }
        Ok(&self.tracks)
    }

    pub fn reference(&self) -> PlaylistRef {
        PlaylistRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub energy: f64,
    pub valence: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seeds {
    pub artists: Vec<String>,
    pub tracks: Vec<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackAttributes {
    pub max_acousticness: Option<f64>,
    pub max_instrumentalness: Option<f64>,
    pub max_liveness: Option<f64>,
    pub min_energy: Option<f64>,
    pub max_valence: Option<f64>,
}

impl TrackAttributes {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("max_acousticness", self.max_acousticness),
            ("max_instrumentalness", self.max_instrumentalness),
            ("max_liveness", self.max_liveness),
            ("min_energy", self.min_energy),
            ("max_valence", self.max_valence),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, format!("{:.3}", v))))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub is_playing: bool,
    pub item: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAlbumsResponse {
    pub albums: Vec<Option<Album>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<SimpleTrack>,
}

#[derive(Tabled)]
pub struct SuggestionTableRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Playlist")]
    pub playlist: String,
    #[tabled(rename = "Artist(s)")]
    pub artists: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "Score")]
    pub score: i64,
    #[tabled(rename = "Spotify URI")]
    pub uri: String,
}

macro_rules! catalog_item {
    ($($ty:ty),*) => {
        $(
            impl CatalogItem for $ty {
                fn catalog_id(&self) -> &str {
                    &self.id
                }

                fn display_name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

catalog_item!(
    SimpleArtist,
    Artist,
    SimpleAlbum,
    Album,
    SimpleTrack,
    Track,
    SimplePlaylist,
    Playlist
);

macro_rules! credited {
    ($($ty:ty),*) => {
        $(
            impl Credited for $ty {
                fn artists(&self) -> &[SimpleArtist] {
                    &self.artists
                }
            }
        )*
    };
}

credited!(SimpleAlbum, Album, SimpleTrack, Track);
