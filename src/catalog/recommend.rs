//! Suggestions drawn from the catalog and the tasting journal
//!
//! Every strategy scores records and returns the best ones first. Equal
//! scores keep catalog order, so the same catalog and journal always give the
//! same suggestions.

use super::index::{Catalog, CatalogSet};
use super::record::Record;
use super::schema::RecordKind;
use crate::journal::JournalEntry;
use crate::{ExplorerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Default number of suggestions
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// Journal rating from which a record counts as liked
pub const LIKED_RATING: u8 = 4;

/// Similar records taken per liked record
const SIMILAR_PER_FAVOURITE: usize = 3;

/// Preferences kept when building a "try next" profile
const TOP_PREFERENCES: usize = 3;

/// Exact-match fields and the weight a match adds to a similarity score
const MATCH_WEIGHTS: &[(&str, f64)] = &[
    ("category", 3.0),
    ("origin", 2.0),
    ("region", 1.0),
    ("caffeine_level", 0.5),
    ("processing", 1.0),
];

const FLAVOR_FIELD: &str = "flavor_profile";
const FLAVOR_WEIGHT: f64 = 2.0;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "with", "of", "in", "to", "for",
];

const BEGINNER_CATEGORIES: &[&str] = &["green", "black", "white"];
const BEGINNER_CAFFEINE: &[&str] = &["low", "low to medium", "medium"];
const FRIENDLY_FLAVORS: &[&str] = &["sweet", "mild", "smooth", "gentle", "delicate"];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// How suggestions are chosen
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Records resembling the record with this id
    SimilarTo { id: String },
    /// Records resembling those rated at least `min_rating` in the journal
    FromRatings { min_rating: u8 },
    /// Records of a category, in catalog order
    Category { value: String },
    /// Records from an origin country, in catalog order
    Origin { value: String },
    /// Approachable records for someone new to tea
    Beginner,
    /// Untried records matching the categories and origins liked so far
    TryNext,
}

/// A suggested record and the score that ranked it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub score: f64,
    pub record: &'a Record,
}

/// Suggest up to `limit` records of `kind`
pub fn recommend<'a>(
    set: &'a CatalogSet,
    kind: RecordKind,
    strategy: &Strategy,
    journal: &[JournalEntry],
    limit: usize,
) -> Result<Vec<Recommendation<'a>>> {
    let catalog = set.catalog(kind);
    let suggestions = match strategy {
        Strategy::SimilarTo { id } => similar_to(catalog, catalog.get(id)?, limit),
        Strategy::FromRatings { min_rating } => from_ratings(catalog, journal, *min_rating, limit),
        Strategy::Category { value } => by_field(catalog, "category", value, limit)?,
        Strategy::Origin { value } => by_field(catalog, "origin", value, limit)?,
        Strategy::Beginner => for_beginners(catalog, limit),
        Strategy::TryNext => try_next(catalog, journal, limit),
    };

    debug!(
        kind = %kind,
        strategy = ?strategy,
        suggestions = suggestions.len(),
        "Recommendations computed"
    );
    Ok(suggestions)
}

/// Positive scores only, best first, catalog order among equals
fn ranked(mut scored: Vec<Recommendation<'_>>, limit: usize) -> Vec<Recommendation<'_>> {
    scored.retain(|r| r.score > 0.0);
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

fn lowered(record: &Record, field: &str) -> Option<String> {
    record
        .text(field)
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn words(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard overlap of the content words of two texts, in 0..=1
fn word_overlap(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count() as f64;
    let total = a.union(&b).count() as f64;
    shared / total
}

/// Additive similarity of two records of the same kind
pub fn similarity(a: &Record, b: &Record) -> f64 {
    let mut score = 0.0;
    for &(field, weight) in MATCH_WEIGHTS {
        if let (Some(x), Some(y)) = (lowered(a, field), lowered(b, field)) {
            if x == y {
                score += weight;
            }
        }
    }
    if let (Some(x), Some(y)) = (a.text(FLAVOR_FIELD), b.text(FLAVOR_FIELD)) {
        score += word_overlap(x, y) * FLAVOR_WEIGHT;
    }
    score
}

fn similar_to<'a>(catalog: &'a Catalog, target: &Record, limit: usize) -> Vec<Recommendation<'a>> {
    let scored = catalog
        .iter()
        .filter(|candidate| candidate.id() != target.id())
        .map(|candidate| Recommendation {
            score: similarity(target, candidate),
            record: candidate,
        })
        .collect();
    ranked(scored, limit)
}

fn from_ratings<'a>(
    catalog: &'a Catalog,
    journal: &[JournalEntry],
    min_rating: u8,
    limit: usize,
) -> Vec<Recommendation<'a>> {
    let liked: HashSet<&str> = journal
        .iter()
        .filter(|e| e.record.kind == catalog.kind() && e.rating >= min_rating)
        .map(|e| e.record.id.as_str())
        .collect();

    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();
    for favourite in catalog.iter().filter(|r| liked.contains(r.id())) {
        for suggestion in similar_to(catalog, favourite, SIMILAR_PER_FAVOURITE) {
            let id = suggestion.record.id();
            if liked.contains(id) || !seen.insert(id) {
                continue;
            }
            suggestions.push(suggestion);
            if suggestions.len() >= limit {
                return suggestions;
            }
        }
    }
    suggestions
}

fn by_field<'a>(
    catalog: &'a Catalog,
    field: &str,
    value: &str,
    limit: usize,
) -> Result<Vec<Recommendation<'a>>> {
    catalog.schema().require_field(field)?;
    let wanted = value.trim().to_lowercase();
    if wanted.is_empty() {
        return Err(ExplorerError::invalid_query(format!(
            "no {} given to recommend by",
            field
        )));
    }

    Ok(catalog
        .iter()
        .filter(|r| lowered(r, field).as_deref() == Some(wanted.as_str()))
        .take(limit)
        .map(|record| Recommendation { score: 1.0, record })
        .collect())
}

fn for_beginners(catalog: &Catalog, limit: usize) -> Vec<Recommendation<'_>> {
    let scored = catalog
        .iter()
        .map(|record| {
            let mut score = 0.0;
            if lowered(record, "category").is_some_and(|c| BEGINNER_CATEGORIES.contains(&c.as_str())) {
                score += 2.0;
            }
            if lowered(record, "caffeine_level").is_some_and(|c| BEGINNER_CAFFEINE.contains(&c.as_str())) {
                score += 1.0;
            }
            if lowered(record, FLAVOR_FIELD)
                .is_some_and(|f| FRIENDLY_FLAVORS.iter().any(|w| f.contains(*w)))
            {
                score += 1.0;
            }
            Recommendation { score, record }
        })
        .collect();
    ranked(scored, limit)
}

/// Most frequent values first; equal counts keep first-seen order
fn most_common(values: impl Iterator<Item = String>, keep: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(keep);
    counts
}

fn try_next<'a>(catalog: &'a Catalog, journal: &[JournalEntry], limit: usize) -> Vec<Recommendation<'a>> {
    let entries: Vec<&JournalEntry> = journal
        .iter()
        .filter(|e| e.record.kind == catalog.kind())
        .collect();
    let tried: HashSet<&str> = entries.iter().map(|e| e.record.id.as_str()).collect();
    let liked: Vec<&Record> = entries
        .iter()
        .filter(|e| e.rating >= LIKED_RATING)
        .filter_map(|e| catalog.get(&e.record.id).ok())
        .collect();

    let categories = most_common(liked.iter().filter_map(|r| lowered(r, "category")), TOP_PREFERENCES);
    let origins = most_common(liked.iter().filter_map(|r| lowered(r, "origin")), TOP_PREFERENCES);

    let scored = catalog
        .iter()
        .filter(|r| !tried.contains(r.id()))
        .map(|record| {
            let category = lowered(record, "category");
            let origin = lowered(record, "origin");
            let mut score = 0.0;
            for (value, count) in &categories {
                if category.as_ref() == Some(value) {
                    score += (*count * 2) as f64;
                }
            }
            for (value, count) in &origins {
                if origin.as_ref() == Some(value) {
                    score += *count as f64;
                }
            }
            Recommendation { score, record }
        })
        .collect();
    ranked(scored, limit)
}
