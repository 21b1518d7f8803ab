//! Configuration management for Spotted.
//!
//! Configuration is read exactly once at process start and frozen into a
//! [`Config`] value that is passed by reference to every component that needs
//! it. Sources, highest priority first:
//! 1. Command-line flags
//! 2. Environment variables (including a `.env` file in the local data directory)
//! 3. Application defaults

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use regex::Regex;

use crate::{Res, error::SpotError, utils};

pub const APP_DIR: &str = "spotted";

pub const DEFAULT_WORD_PENALTIES: [(&str, i64); 4] = [
    ("instrumental", -50),
    ("acoustic", -30),
    ("re-imagined", -30),
    ("remix", -30),
];

pub const DISCOVER_WEEKLY_NAME: &str = "Discover Weekly";
pub const RELEASE_RADAR_NAME: &str = "Release Radar";

/// Loads environment variables from `<data_local_dir>/spotted/.env`.
///
/// Creates the directory if needed. A missing `.env` file is not an error,
/// every value can also come from the process environment or a flag.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotted/.env`
/// - macOS: `~/Library/Application Support/spotted/.env`
/// - Windows: `%LOCALAPPDATA%/spotted/.env`
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| SpotError::io(parent, e))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| SpotError::Config(e.to_string()))?;
    }
    Ok(())
}

pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// Print the suggestions as a table
    Console,
    /// Print the table and write the suggestions to a playlist
    Playlist,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsFlow {
    /// Machine credentials, public data only
    ClientCredentials,
    /// Browser login with a local callback server
    Redirect,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Spotify application client id
    #[clap(long, env = "SPOTIFY_API_AUTH_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Spotify application client secret
    #[clap(long, env = "SPOTIFY_API_AUTH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Spotify user name, used with the client-credentials flow
    #[clap(long = "user", env = "SPOTIFY_USER_ID", default_value = "drklump")]
    pub user_name: String,

    #[clap(long, env = "SPOTIFY_API_URL", default_value = "https://api.spotify.com/v1")]
    pub api_url: String,

    #[clap(
        long,
        env = "SPOTIFY_API_AUTH_URL",
        default_value = "https://accounts.spotify.com/authorize"
    )]
    pub auth_url: String,

    #[clap(
        long,
        env = "SPOTIFY_API_TOKEN_URL",
        default_value = "https://accounts.spotify.com/api/token"
    )]
    pub token_url: String,

    #[clap(
        long,
        env = "SPOTIFY_API_AUTH_SCOPE",
        default_value = "user-read-private playlist-read-private playlist-modify-private playlist-modify-public user-top-read user-read-currently-playing user-read-playback-state"
    )]
    pub scope: String,

    /// Address of the local callback server
    #[clap(long, env = "SERVER_ADDRESS", default_value = "127.0.0.1")]
    pub address: String,

    /// Port of the local callback server
    #[clap(long, env = "SERVER_PORT", default_value_t = 4000)]
    pub port: u16,

    #[clap(long, value_enum, default_value = "console")]
    pub output_type: OutputType,

    #[clap(long, value_enum, default_value = "client-credentials")]
    pub credentials_flow: CredentialsFlow,

    /// Regex selecting the playlists that make up your collection
    #[clap(long, env = "SPOTTED_PLAYLIST_PATTERN", default_value = "^Metal ([0-9]+)")]
    pub playlist_pattern: String,

    /// Playlists used as suggestion sources; can be repeated
    #[clap(long = "discovery-playlist", num_args = 1)]
    pub discovery_playlists: Vec<String>,

    /// Albums with fewer tracks trigger a search through the artist's catalog
    #[clap(long, default_value_t = 3)]
    pub minimum_album_track_count: usize,

    #[clap(long, default_value_t = 20)]
    pub album_chunk_size: usize,

    /// Tracks per add/remove request when writing playlists
    #[clap(long, default_value_t = 100)]
    pub playlist_chunk_size: usize,

    /// Score penalty for a word in the track name, as WORD=PENALTY; the penalty is always subtracted, can be repeated
    #[clap(long = "word-penalty", value_parser = utils::parse_word_penalty, num_args = 1)]
    pub word_penalties: Vec<(String, i64)>,

    #[clap(long, default_value = RELEASE_RADAR_NAME)]
    pub favoured_playlist: String,

    #[clap(long, default_value_t = 20)]
    pub favoured_bonus: i64,

    /// Market used for recommendations
    #[clap(long, env = "SPOTTED_COUNTRY", default_value = "SE")]
    pub country: String,

    /// Recommendations released before this year are dropped
    #[clap(long, default_value_t = 2016)]
    pub recommendations_from_year: i32,

    /// Directory holding the token and playlist caches
    #[clap(long, env = "SPOTTED_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Immutable configuration for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_name: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    pub address: String,
    pub port: u16,
    pub output_type: OutputType,
    pub credentials_flow: CredentialsFlow,
    pub playlist_pattern: Regex,
    pub discovery_playlists: Vec<String>,
    pub minimum_album_track_count: usize,
    pub album_chunk_size: usize,
    pub playlist_chunk_size: usize,
    pub word_penalties: Vec<(String, i64)>,
    pub favoured_playlist: String,
    pub favoured_bonus: i64,
    pub country: String,
    pub recommendations_from_year: i32,
    pub cache_dir: PathBuf,
    pub discovery_target: String,
    pub recommendations_target: String,
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Res<Self> {
        if args.album_chunk_size == 0 || args.playlist_chunk_size == 0 {
            return Err(SpotError::Config(
                "chunk sizes must be greater than zero".to_string(),
            ));
        }

        let playlist_pattern = Regex::new(&args.playlist_pattern).map_err(|e| {
            SpotError::Config(format!(
                "invalid playlist pattern '{}': {}",
                args.playlist_pattern, e
            ))
        })?;

        let discovery_playlists = if args.discovery_playlists.is_empty() {
            vec![
                DISCOVER_WEEKLY_NAME.to_string(),
                RELEASE_RADAR_NAME.to_string(),
            ]
        } else {
            args.discovery_playlists
        };

        let word_penalties = if args.word_penalties.is_empty() {
            DEFAULT_WORD_PENALTIES
                .iter()
                .map(|(word, penalty)| (word.to_string(), *penalty))
                .collect()
        } else {
            args.word_penalties
        };

        Ok(Self {
            client_id: args.client_id,
            client_secret: args.client_secret,
            user_name: args.user_name,
            api_url: args.api_url.trim_end_matches('/').to_string(),
            auth_url: args.auth_url,
            token_url: args.token_url,
            scope: args.scope,
            address: args.address,
            port: args.port,
            output_type: args.output_type,
            credentials_flow: args.credentials_flow,
            playlist_pattern,
            discovery_playlists,
            minimum_album_track_count: args.minimum_album_track_count,
            album_chunk_size: args.album_chunk_size,
            playlist_chunk_size: args.playlist_chunk_size,
            word_penalties,
            favoured_playlist: args.favoured_playlist,
            favoured_bonus: args.favoured_bonus,
            country: args.country,
            recommendations_from_year: args.recommendations_from_year,
            cache_dir: args.cache_dir.unwrap_or_else(|| data_dir().join("cache")),
            discovery_target: "Spotted™ Discovery".to_string(),
            recommendations_target: "Spotted™ Recommendations".to_string(),
        })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://{}:{}/callback", self.address, self.port)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn token_cache_path(&self) -> PathBuf {
        self.cache_dir.join("token.json")
    }

    pub fn playlist_cache_path(&self) -> PathBuf {
        self.cache_dir.join("playlists.json")
    }
}
