use std::path::{Path, PathBuf};

use crate::{Res, error::SpotError, info, types::Playlist};

/// On-disk snapshot of listed playlists, keyed by snapshot id.
///
/// A cached playlist is only reused while its snapshot id matches the remote
/// one; any change to the remote track membership produces a new snapshot id
/// and with it a cache miss.
pub struct PlaylistCacheManager {
    path: PathBuf,
    playlists: Vec<Playlist>,
}

impl PlaylistCacheManager {
    pub fn new(path: impl Into<PathBuf>, playlists: Option<Vec<Playlist>>) -> Self {
        Self {
            path: path.into(),
            playlists: playlists.unwrap_or_default(),
        }
    }

    /// Reads the cache file. A missing file yields an empty cache.
    pub async fn load(path: &Path) -> Res<Self> {
        let content = match async_fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(path, None));
            }
            Err(e) => return Err(SpotError::io(path, e)),
        };

        let playlists: Vec<Playlist> = serde_json::from_str(&content)?;
        info!("Successfully read cache file {}", path.display());
        Ok(Self::new(path, Some(playlists)))
    }

    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| SpotError::io(parent, e))?;
        }

        let json = serde_json::to_string(&self.playlists)?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| SpotError::io(&self.path, e))?;
        info!(
            "Successfully wrote {} playlists to the cache file {}",
            self.count(),
            self.path.display()
        );
        Ok(())
    }

    /// A populated playlist with the given snapshot id, if cached.
    pub fn find_by_snapshot(&self, snapshot_id: &str) -> Option<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.populated && p.snapshot_id == snapshot_id)
    }

    pub fn replace_all(&mut self, playlists: Vec<Playlist>) -> &mut Self {
        self.playlists = playlists;
        self
    }

    pub fn count(&self) -> usize {
        self.playlists.len()
    }
}
