use std::collections::{HashMap, HashSet};

use crate::{
    Res,
    config::Config,
    engine::{pagination, tracks},
    spotify::{ALBUM_AND_SINGLE, CatalogClient},
    types::{Album, SimpleAlbum, Track},
};

const ARTIST_ALBUMS_PAGE_LIMIT: usize = 50;

/// Albums fetched during this run, keyed by catalog id.
///
/// Lives as long as the [`AlbumResolver`] owning it and is never written to
/// disk; albums can gain tracks remotely, so nothing here outlives the session.
#[derive(Debug, Default)]
pub struct AlbumMemo {
    albums: HashMap<String, Album>,
}

impl AlbumMemo {
    pub fn get(&self, id: &str) -> Option<&Album> {
        self.albums.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.albums.contains_key(id)
    }

    pub fn insert(&mut self, album: Album) {
        self.albums.insert(album.id.clone(), album);
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }
}

/// Finds the richest release a track appears on.
pub struct AlbumResolver {
    memo: AlbumMemo,
    minimum_track_count: usize,
    chunk_size: usize,
}

impl AlbumResolver {
    pub fn new(minimum_track_count: usize, chunk_size: usize) -> Self {
        Self {
            memo: AlbumMemo::default(),
            minimum_track_count,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.minimum_album_track_count, config.album_chunk_size)
    }

    pub fn memo(&self) -> &AlbumMemo {
        &self.memo
    }

    pub async fn get<C: CatalogClient>(&mut self, client: &C, id: &str) -> Res<Album> {
        if let Some(album) = self.memo.get(id) {
            return Ok(album.clone());
        }

        let album = client.get_album(id).await?;
        self.memo.insert(album.clone());
        Ok(album)
    }

    /// Fetches several albums, only asking the catalog for ids not seen yet.
    ///
    /// Missing ids are requested in chunks of the configured size. Albums come
    /// back in the order of `ids`; ids the catalog does not know are left out.
    pub async fn get_many<C: CatalogClient>(&mut self, client: &C, ids: &[String]) -> Res<Vec<Album>> {
        let mut seen = HashSet::new();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !self.memo.contains(id) && seen.insert(id.as_str()))
            .cloned()
            .collect();

        for chunk in missing.chunks(self.chunk_size) {
            for album in client.get_albums(chunk).await? {
                self.memo.insert(album);
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.memo.get(id).cloned())
            .collect())
    }

    /// Returns the track's own album unless it is thinner than the minimum
    /// track count. In that case every credited artist's albums and singles are
    /// scanned, largest first, for a release containing the same song with more
    /// tracks than the native one. The first hit wins.
    ///
    /// # Arguments
    ///
    /// * `client` - Catalog to fetch albums and artist discographies from
    /// * `track` - Track whose album is wanted
    ///
    /// # Returns
    ///
    /// The richest release holding the track, or its native album when no
    /// bigger one exists. Every fetched album stays in the memo.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut resolver = AlbumResolver::from_config(&config);
    /// let album = resolver.resolve(&client, &track).await?;
    /// ```
    pub async fn resolve<C: CatalogClient>(&mut self, client: &C, track: &Track) -> Res<Album> {
        let native = self.get(client, &track.album.id).await?;
        if native.track_count() >= self.minimum_track_count {
            return Ok(native);
        }

        let key = tracks::canonical_key(track);
        for artist in track.artists.iter().filter(|a| !a.id.is_empty()) {
            let label = format!("albums of {}", artist.name);
            let releases: Vec<SimpleAlbum> =
                pagination::walk(&label, ARTIST_ALBUMS_PAGE_LIMIT, |offset, limit| {
                    client.list_artist_albums(&artist.id, ALBUM_AND_SINGLE, offset, limit)
                })
                .await?;

            let ids: Vec<String> = releases.into_iter().map(|a| a.id).collect();
            let mut candidates = self.get_many(client, &ids).await?;
            candidates.sort_by(|a, b| b.track_count().cmp(&a.track_count()));

            let richer = candidates.into_iter().find(|album| {
                album.track_count() > native.track_count()
                    && album
                        .tracks
                        .items
                        .iter()
                        .any(|t| tracks::canonical_key(t) == key)
            });

            if let Some(album) = richer {
                return Ok(album);
            }
        }

        Ok(native)
    }
}
