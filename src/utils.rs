use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{CatalogItem, SimpleArtist};

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    random_string(32)
}

fn random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn join_artists(artists: &[SimpleArtist], separator: &str) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<&str>>()
        .join(separator)
}

pub fn catalog_ids<T: CatalogItem>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.catalog_id().to_string()).collect()
}

/// Cuts `input` down to at most `width` characters, ending in `...` when shortened.
pub fn truncate(input: &str, width: usize) -> String {
    const DOTS: &str = "...";

    if input.chars().count() <= width {
        return input.to_string();
    }

    let keep = width.saturating_sub(DOTS.len());
    let mut output: String = input.chars().take(keep).collect();
    output.push_str(DOTS);
    output
}

/// Parses a `word=penalty` pair as given to `--word-penalty`.
///
/// The penalty is stored negative whatever its sign on the command line, so
/// `remix=30` and `remix=-30` both lower a matching track's score by 30.
pub fn parse_word_penalty(value: &str) -> Result<(String, i64), String> {
    let (word, penalty) = value
        .split_once('=')
        .ok_or_else(|| format!("expected WORD=PENALTY, got '{}'", value))?;

    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(format!("missing word in '{}'", value));
    }

    let penalty = penalty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid penalty in '{}': {}", value, e))?;

    Ok((word, -penalty.saturating_abs()))
}

pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}
