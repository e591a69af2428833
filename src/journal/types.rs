use crate::catalog::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Weak reference to a catalog record
///
/// The record may disappear on a later reload; entries keep working because
/// they also carry the record's name at the time of writing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: String,
}

impl RecordRef {
    pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl From<&Record> for RecordRef {
    fn from(record: &Record) -> Self {
        Self::new(record.kind(), record.id())
    }
}

impl std::fmt::Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A tasting note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub record: RecordRef,
    /// Record name when the entry was written
    pub record_name: String,
    /// 1 to 5 stars
    pub rating: u8,
    #[serde(default)]
    pub brewing: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Rating as filled and empty stars, e.g. `★★★☆☆`
    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        format!(
            "{}{}",
            "★".repeat(filled),
            "☆".repeat(MAX_RATING as usize - filled)
        )
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Fields supplied by the user for a new entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub record: RecordRef,
    pub record_name: String,
    pub rating: i64,
    pub brewing: String,
    pub notes: String,
}

impl NewEntry {
    pub fn new(record: RecordRef, record_name: impl Into<String>, rating: i64) -> Self {
        Self {
            record,
            record_name: record_name.into(),
            rating,
            brewing: String::new(),
            notes: String::new(),
        }
    }

    /// Entry about a catalog record, snapshotting its name
    pub fn for_record(record: &Record, rating: i64) -> Self {
        Self::new(RecordRef::from(record), record.name(), rating)
    }

    pub fn with_brewing(mut self, brewing: impl Into<String>) -> Self {
        self.brewing = brewing.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Partial edit of an entry; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub rating: Option<i64>,
    pub brewing: Option<String>,
    pub notes: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.brewing.is_none() && self.notes.is_none()
    }
}

/// Clamp a user-supplied rating into 1..=5
pub fn clamp_rating(rating: i64) -> u8 {
    let clamped = rating.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8;
    if clamped as i64 != rating {
        warn!(rating, clamped, "Rating out of range, clamped");
    }
    clamped
}

/// Summary numbers for the journal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalStats {
    pub total_entries: usize,
    pub distinct_records: usize,
    pub average_rating: Option<f64>,
    pub entries_by_kind: BTreeMap<RecordKind, usize>,
    /// Number of entries per star rating
    pub rating_histogram: BTreeMap<u8, usize>,
    pub first_entry: Option<DateTime<Utc>>,
    pub last_entry: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(0), 1);
        assert_eq!(clamp_rating(-3), 1);
        assert_eq!(clamp_rating(4), 4);
        assert_eq!(clamp_rating(9), 5);
    }

    #[test]
    fn test_stars() {
        let entry = JournalEntry {
            id: 1,
            record: RecordRef::new(RecordKind::Tea, "sencha"),
            record_name: "Sencha".to_string(),
            rating: 3,
            brewing: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert_eq!(entry.stars(), "★★★☆☆");
        assert_eq!(entry.last_modified(), entry.created_at);
    }

    #[test]
    fn test_record_ref_display() {
        assert_eq!(
            RecordRef::new(RecordKind::GlossaryTerm, "gongfu").to_string(),
            "glossary_term:gongfu"
        );
    }
}
