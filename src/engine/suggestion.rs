use std::collections::HashMap;

use crate::{
    Res,
    config::Config,
    engine::{album::AlbumResolver, tracks, tracks::TrackIndex},
    spotify::CatalogClient,
    types::{Album, Playlist, PlaylistRef, SuggestionTableRow, Track},
    utils,
};

/// Release year counted as zero. Albums without a readable date score as if
/// released in it.
pub const BASE_YEAR: i32 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRules {
    pub minimum_album_track_count: usize,
    pub word_penalties: Vec<(String, i64)>,
    pub favoured_playlist: String,
    pub favoured_bonus: i64,
}

impl ScoringRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            minimum_album_track_count: config.minimum_album_track_count,
            word_penalties: config.word_penalties.clone(),
            favoured_playlist: config.favoured_playlist.clone(),
            favoured_bonus: config.favoured_bonus,
        }
    }

    pub fn word_penalty(&self, track_name: &str) -> i64 {
        let name = track_name.to_lowercase();
        self.word_penalties
            .iter()
            .filter(|(word, _)| name.contains(&word.to_lowercase()))
            .map(|(_, penalty)| penalty)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Playlist the candidate came from, `None` for recommendations.
    pub playlist: Option<PlaylistRef>,
    pub track: Track,
    pub album: Album,
    pub relevance: i64,
}

impl Suggestion {
    /// Recomputes `relevance` against the given artist groups of the existing corpus.
    pub fn calculate_relevance(&mut self, groups: &HashMap<String, Vec<Track>>, rules: &ScoringRules) {
        let year = self.album.release_year().unwrap_or(BASE_YEAR);
        let mut relevance = i64::from(year - BASE_YEAR);

        relevance += tracks::count_by_artists(groups, &self.track.artists) as i64;
        relevance += rules.word_penalty(&self.track.name);

        let favoured = self
            .playlist
            .as_ref()
            .is_some_and(|p| p.name == rules.favoured_playlist);
        if favoured {
            relevance += rules.favoured_bonus;
        }

        self.relevance = relevance;
    }

    pub fn table_row(&self, rank: usize) -> SuggestionTableRow {
        SuggestionTableRow {
            rank,
            name: utils::truncate(&self.track.name, 30),
            playlist: self
                .playlist
                .as_ref()
                .map(|p| utils::truncate(&p.name, 30))
                .unwrap_or_default(),
            artists: utils::truncate(&tracks::artist_group_key(&self.track.artists), 30),
            album: utils::truncate(&self.album.name, 30),
            year: self
                .album
                .release_year()
                .map(|y| y.to_string())
                .unwrap_or_default(),
            score: self.relevance,
            uri: self.track.uri.clone(),
        }
    }
}

/// Turns candidate tracks into ranked suggestions.
///
/// Candidates already present in the existing corpus are skipped. Each
/// remaining candidate is moved to its richest album, dropped when that album
/// still has no more tracks than the configured minimum, and scored.
pub struct SuggestionBuilder<'a, C: CatalogClient> {
    client: &'a C,
    resolver: &'a mut AlbumResolver,
    rules: &'a ScoringRules,
    existing: TrackIndex,
    groups: HashMap<String, Vec<Track>>,
}

impl<'a, C: CatalogClient> SuggestionBuilder<'a, C> {
    pub fn new(
        client: &'a C,
        resolver: &'a mut AlbumResolver,
        rules: &'a ScoringRules,
        existing: &[Track],
    ) -> Self {
        let existing = TrackIndex::from_tracks(existing);
        let groups = tracks::group_by_artists(existing.unique());
        Self {
            client,
            resolver,
            rules,
            existing,
            groups,
        }
    }

    /// Scores the tracks of each discovery playlist, tagging every suggestion
    /// with its origin. Playlists must be populated.
    pub async fn from_playlists(mut self, playlists: &[Playlist]) -> Res<Vec<Suggestion>> {
        let mut suggestions = Vec::new();
        for playlist in playlists {
            let origin = playlist.reference();
            for candidate in playlist.populated_tracks()? {
                if let Some(suggestion) = self.suggest(candidate, Some(origin.clone())).await? {
                    suggestions.push(suggestion);
                }
            }
        }
        Ok(rank(suggestions))
    }

    /// Scores a flat candidate list without origin playlist.
    pub async fn from_tracks(mut self, candidates: &[Track]) -> Res<Vec<Suggestion>> {
        let mut suggestions = Vec::new();
        for candidate in candidates {
            if let Some(suggestion) = self.suggest(candidate, None).await? {
                suggestions.push(suggestion);
            }
        }
        Ok(rank(suggestions))
    }

    async fn suggest(
        &mut self,
        candidate: &Track,
        playlist: Option<PlaylistRef>,
    ) -> Res<Option<Suggestion>> {
        if self.existing.contains(candidate) {
            return Ok(None);
        }

        let album = self.resolver.resolve(self.client, candidate).await?;
        let track = if album.id != candidate.album.id {
            match album.tracks.items.iter().find(|t| t.name == candidate.name) {
                Some(edition) => self.client.get_track(&edition.id).await?,
                None => candidate.clone(),
            }
        } else {
            candidate.clone()
        };

        if album.track_count() <= self.rules.minimum_album_track_count {
            return Ok(None);
        }

        let mut suggestion = Suggestion {
            playlist,
            track,
            album,
            relevance: 0,
        };
        suggestion.calculate_relevance(&self.groups, self.rules);
        Ok(Some(suggestion))
    }
}

/// Stable sort by relevance, highest first. Ties keep discovery order.
pub fn rank(mut suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    suggestions.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    suggestions
}

pub fn tracks_of(suggestions: &[Suggestion]) -> Vec<Track> {
    suggestions.iter().map(|s| s.track.clone()).collect()
}
