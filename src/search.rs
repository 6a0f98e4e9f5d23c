//! The search artifact and the fuzzy scorer that ranks it.
//!
//! The scorer here is the same algorithm the default layout ships to the
//! browser, so `canopy search` and the in-page overlay agree on rankings.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::site::Site;

pub const MAX_RESULTS: usize = 10;
pub const TITLE_BONUS: i64 = 100;
pub const NO_MATCH: i64 = -1;

const CONSECUTIVE_BONUS: i64 = 10;
const BOUNDARY_BONUS: i64 = 5;

/// One record of `search.json`. Field names are read by the browser script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

pub fn build_index(site: &Site<'_>) -> Vec<SearchEntry> {
    site.pages
        .iter()
        .filter(|page| !page.draft)
        .map(|page| SearchEntry {
            url: page.url.clone(),
            title: page.title.clone(),
            section: page.section.clone().unwrap_or_default(),
            tags: page.tags.clone(),
            summary: page.summary.clone(),
        })
        .collect()
}

pub fn write_index(path: &Path, entries: &[SearchEntry]) -> Result<(), BuildError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(entries)?;
        fs::write(path, bytes)
    };
    write().map_err(|source| BuildError::SearchIndexWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_index(path: &Path) -> Result<Vec<SearchEntry>> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read search index {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("{}: invalid search index", path.display()))
}

fn is_boundary(ch: char) -> bool {
    matches!(ch, ' ' | '-' | '_' | '/' | '.' | ',' | ':' | ';')
}

/// Scores `query` as a greedy, case-insensitive subsequence of `text`.
///
/// Returns [`NO_MATCH`] when some query character has no remaining
/// occurrence. Positions are character offsets into the lower-cased text;
/// large offsets can push a genuine match below zero, and callers treat any
/// negative score as no match.
pub fn score_text(query: &str, text: &str) -> i64 {
    if query.is_empty() || text.is_empty() {
        return NO_MATCH;
    }

    let text: Vec<char> = text.to_lowercase().chars().collect();
    let mut score = 0i64;
    let mut last: i64 = -1;

    for ch in query.to_lowercase().chars() {
        let from = (last + 1) as usize;
        let Some(offset) = text.get(from..).and_then(|rest| rest.iter().position(|c| *c == ch))
        else {
            return NO_MATCH;
        };
        let index = (from + offset) as i64;

        if index == last + 1 {
            score += CONSECUTIVE_BONUS;
        }
        if index == 0 || is_boundary(text[index as usize - 1]) {
            score += BOUNDARY_BONUS;
        }
        score -= index;
        last = index;
    }

    score
}

/// Best field score for an entry, with the title bonus applied. A field only
/// counts when its own score is non-negative.
pub fn score_entry(entry: &SearchEntry, query: &str) -> i64 {
    if query.is_empty() {
        return 0;
    }

    let tags = entry.tags.join(" ");
    let fields = [
        (entry.title.as_str(), TITLE_BONUS),
        (entry.summary.as_str(), 0),
        (tags.as_str(), 0),
        (entry.section.as_str(), 0),
    ];

    fields
        .iter()
        .map(|(text, bonus)| (score_text(query, text), bonus))
        .filter(|(score, _)| *score >= 0)
        .map(|(score, bonus)| score + bonus)
        .fold(NO_MATCH, i64::max)
}

/// Ranks entries for `query`: best score first, ties in index order, at most
/// [`MAX_RESULTS`]. A blank query lists the first entries unranked.
pub fn rank<'a>(entries: &'a [SearchEntry], query: &str) -> Vec<(&'a SearchEntry, i64)> {
    let query = query.trim();
    if query.is_empty() {
        return entries.iter().take(MAX_RESULTS).map(|entry| (entry, 0)).collect();
    }

    let mut scored: Vec<(&SearchEntry, i64)> = entries
        .iter()
        .map(|entry| (entry, score_entry(entry, query)))
        .filter(|(_, score)| *score >= 0)
        .collect();
    scored.sort_by(|left, right| right.1.cmp(&left.1));
    scored.truncate(MAX_RESULTS);
    scored
}
