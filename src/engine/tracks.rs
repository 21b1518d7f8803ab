//! Track identity and grouping.
//!
//! Two tracks are treated as the same song when their names and their ordered
//! artist names match exactly, regardless of catalog id. This catches the same
//! recording released on a single, an album and a reissue.

use std::collections::HashMap;

use crate::{
    types::{Credited, SimpleArtist, Track},
    utils,
};

pub const ARTIST_SEPARATOR: &str = ",";
pub const KEY_SEPARATOR: &str = ":";

pub fn canonical_key<T: Credited>(track: &T) -> String {
    format!(
        "{}{}{}",
        track.display_name(),
        KEY_SEPARATOR,
        artist_group_key(track.artists())
    )
}

pub fn artist_group_key(artists: &[SimpleArtist]) -> String {
    utils::join_artists(artists, ARTIST_SEPARATOR)
}

/// Tracks keyed by [`canonical_key`].
///
/// Indexing the same key twice keeps the later track at the position of the
/// first one, so iterating the index yields every song once in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackIndex {
    positions: HashMap<String, usize>,
    tracks: Vec<Track>,
}

impl TrackIndex {
    pub fn from_tracks<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a Track>,
    {
        let mut index = Self::default();
        for track in tracks {
            index.insert(track.clone());
        }
        index
    }

    pub fn insert(&mut self, track: Track) {
        let key = canonical_key(&track);
        match self.positions.get(&key) {
            Some(&position) => self.tracks[position] = track,
            None => {
                self.positions.insert(key, self.tracks.len());
                self.tracks.push(track);
            }
        }
    }

    pub fn contains<T: Credited>(&self, track: &T) -> bool {
        self.positions.contains_key(&canonical_key(track))
    }

    pub fn get<T: Credited>(&self, track: &T) -> Option<&Track> {
        self.positions
            .get(&canonical_key(track))
            .map(|&position| &self.tracks[position])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn unique(&self) -> &[Track] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// Groups tracks by their joined artist names, keeping input order within a group.
pub fn group_by_artists(tracks: &[Track]) -> HashMap<String, Vec<Track>> {
    let mut groups: HashMap<String, Vec<Track>> = HashMap::new();
    for track in tracks {
        groups
            .entry(artist_group_key(&track.artists))
            .or_default()
            .push(track.clone());
    }
    groups
}

pub fn count_by_artists(groups: &HashMap<String, Vec<Track>>, artists: &[SimpleArtist]) -> usize {
    groups
        .get(&artist_group_key(artists))
        .map_or(0, |tracks| tracks.len())
}
