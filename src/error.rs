use std::path::PathBuf;

use thiserror::Error;

use crate::types::Playlist;

#[derive(Debug, Error)]
pub enum SpotError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {endpoint}: {message}")]
    Response { endpoint: String, message: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("tracks of playlist {0} have not been listed yet")]
    PlaylistNotPopulated(String),

    #[error("playlist {} was only partially updated (snapshot {}): {source}", playlist.name, playlist.snapshot_id)]
    Reconcile {
        playlist: Box<Playlist>,
        #[source]
        source: Box<SpotError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl SpotError {
    pub fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        SpotError::Http {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn response(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        SpotError::Response {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SpotError::Io {
            path: path.into(),
            source,
        }
    }
}
