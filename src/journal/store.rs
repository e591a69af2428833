use super::types::{clamp_rating, EntryUpdate, JournalEntry, JournalStats, NewEntry, RecordRef};
use crate::catalog::export::{self, ExportFormat};
use crate::{ExplorerError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tasting journal kept in a single JSON file
///
/// The file is read on first use; a missing file is an empty journal. Every
/// change is written to a sibling temporary file and renamed over the journal,
/// so an interrupted write never leaves a truncated store behind.
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    /// Loaded entries, `None` until first access
    entries: Option<Vec<JournalEntry>>,
}

impl JournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&mut self) -> Result<&mut Vec<JournalEntry>> {
        if self.entries.is_none() {
            let loaded = self.read_file()?;
            debug!(path = %self.path.display(), entries = loaded.len(), "Journal loaded");
            self.entries = Some(loaded);
        }

        self.entries
            .as_mut()
            .ok_or_else(|| ExplorerError::Journal("journal cache inconsistency".to_string()))
    }

    fn read_file(&self) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ExplorerError::Journal(format!(
                "cannot read journal {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Write `entries` to disk, then adopt them as the cached state
    ///
    /// The cache only changes once the file has been replaced, so a failed
    /// write leaves both the file and the in-memory journal as they were.
    fn commit(&mut self, entries: Vec<JournalEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_string_pretty(&entries)?;
        content.push('\n');

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;

        self.entries = Some(entries);
        Ok(())
    }

    fn not_found(id: u64) -> ExplorerError {
        ExplorerError::NotFound {
            kind: "journal entry".to_string(),
            id: id.to_string(),
        }
    }

    /// Record a new tasting note
    pub fn add(&mut self, draft: NewEntry) -> Result<JournalEntry> {
        let rating = clamp_rating(draft.rating);
        let mut entries = self.entries()?.clone();
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        let entry = JournalEntry {
            id,
            record: draft.record,
            record_name: draft.record_name.trim().to_string(),
            rating,
            brewing: draft.brewing.trim().to_string(),
            notes: draft.notes.trim().to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        entries.push(entry.clone());
        self.commit(entries)?;

        info!(id, record = %entry.record, rating, "Journal entry added");
        Ok(entry)
    }

    /// Edit rating, brewing or notes of an entry
    pub fn update(&mut self, id: u64, update: EntryUpdate) -> Result<JournalEntry> {
        if update.is_empty() {
            return Err(ExplorerError::Journal(format!(
                "nothing to change for entry {}",
                id
            )));
        }

        let rating = update.rating.map(clamp_rating);
        let mut entries = self.entries()?.clone();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(rating) = rating {
            entry.rating = rating;
        }
        if let Some(brewing) = update.brewing {
            entry.brewing = brewing.trim().to_string();
        }
        if let Some(notes) = update.notes {
            entry.notes = notes.trim().to_string();
        }
        entry.updated_at = Some(Utc::now());
        let updated = entry.clone();
        self.commit(entries)?;

        info!(id, "Journal entry updated");
        Ok(updated)
    }

    /// Remove an entry at the user's request
    pub fn delete(&mut self, id: u64) -> Result<JournalEntry> {
        let mut entries = self.entries()?.clone();
        let position = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        let removed = entries.remove(position);
        self.commit(entries)?;

        info!(id, "Journal entry deleted");
        Ok(removed)
    }

    pub fn get(&mut self, id: u64) -> Result<&JournalEntry> {
        self.entries()?
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::not_found(id))
    }

    /// Every entry in creation order
    pub fn all(&mut self) -> Result<&[JournalEntry]> {
        Ok(self.entries()?.as_slice())
    }

    pub fn len(&mut self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.entries()?.is_empty())
    }

    /// Newest entries first
    pub fn recent(&mut self, limit: usize) -> Result<Vec<&JournalEntry>> {
        let mut entries: Vec<&JournalEntry> = self.entries()?.iter().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn for_record(&mut self, record: &RecordRef) -> Result<Vec<&JournalEntry>> {
        Ok(self
            .entries()?
            .iter()
            .filter(|e| &e.record == record)
            .collect())
    }

    /// Case-insensitive match on record name, brewing and notes
    pub fn search(&mut self, text: &str) -> Result<Vec<&JournalEntry>> {
        let needle = text.trim().to_lowercase();
        let entries = self.entries()?;
        if needle.is_empty() {
            return Ok(entries.iter().collect());
        }
        Ok(entries
            .iter()
            .filter(|e| {
                e.record_name.to_lowercase().contains(&needle)
                    || e.notes.to_lowercase().contains(&needle)
                    || e.brewing.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub fn average_rating(&mut self, record: &RecordRef) -> Result<Option<f64>> {
        let ratings: Vec<f64> = self
            .for_record(record)?
            .iter()
            .map(|e| e.rating as f64)
            .collect();
        Ok(average(&ratings))
    }

    /// Highest rated first; equal ratings show the newest first
    pub fn top_rated(&mut self, limit: usize) -> Result<Vec<&JournalEntry>> {
        let mut entries: Vec<&JournalEntry> = self.entries()?.iter().collect();
        entries.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn stats(&mut self) -> Result<JournalStats> {
        let entries = self.entries()?;
        let mut stats = JournalStats {
            total_entries: entries.len(),
            ..JournalStats::default()
        };

        let mut records = HashSet::new();
        for entry in entries.iter() {
            records.insert(&entry.record);
            *stats.entries_by_kind.entry(entry.record.kind).or_default() += 1;
            *stats.rating_histogram.entry(entry.rating).or_default() += 1;
        }
        stats.distinct_records = records.len();

        let ratings: Vec<f64> = entries.iter().map(|e| e.rating as f64).collect();
        stats.average_rating = average(&ratings);
        stats.first_entry = entries.iter().map(|e| e.created_at).min();
        stats.last_entry = entries.iter().map(|e| e.created_at).max();
        Ok(stats)
    }

    /// Serialize every entry in creation order
    pub fn export(&mut self, format: ExportFormat) -> Result<Vec<u8>> {
        let entries: Vec<&JournalEntry> = self.entries()?.iter().collect();
        export::export_journal(&entries, format)
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
