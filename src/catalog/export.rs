//! CSV and JSON export of query results and journal entries
//!
//! Column and key order always comes from the record kind's schema, so two
//! exports of the same records are byte-identical.

use super::record::Record;
use super::schema::RecordKind;
use crate::journal::JournalEntry;
use crate::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One row per record, nested values flattened
    #[default]
    Csv,
    /// Pretty-printed array keeping nesting
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExplorerError::invalid_query(format!(
                "unknown export format '{}'. Expected: csv, json",
                other
            ))),
        }
    }
}

/// Serialize records of one kind
pub fn export_records(kind: RecordKind, records: &[&Record], format: ExportFormat) -> Result<Vec<u8>> {
    if let Some(stray) = records.iter().find(|r| r.kind() != kind) {
        return Err(ExplorerError::invalid_query(format!(
            "cannot export {} '{}' as part of a {} export",
            stray.kind(),
            stray.id(),
            kind
        )));
    }

    let bytes = match format {
        ExportFormat::Csv => records_to_csv(kind, records)?,
        ExportFormat::Json => to_pretty_json(records)?,
    };
    debug!(kind = %kind, format = %format, records = records.len(), bytes = bytes.len(), "Exported records");
    Ok(bytes)
}

fn records_to_csv(kind: RecordKind, records: &[&Record]) -> Result<Vec<u8>> {
    let schema = kind.schema();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let header = std::iter::once("id").chain(schema.field_names());
    writer.write_record(header)?;

    for record in records {
        let row = std::iter::once(record.id().to_string()).chain(
            record
                .fields()
                .map(|(_, value)| value.map(|v| v.flatten()).unwrap_or_default()),
        );
        writer.write_record(row)?;
    }

    finish(writer)
}

/// Column order of journal CSV exports
const JOURNAL_COLUMNS: &[&str] = &[
    "id",
    "kind",
    "record_id",
    "record_name",
    "rating",
    "brewing",
    "notes",
    "created_at",
    "updated_at",
];

/// Serialize journal entries
pub fn export_journal(entries: &[&JournalEntry], format: ExportFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ExportFormat::Json => to_pretty_json(entries)?,
        ExportFormat::Csv => {
            let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
            writer.write_record(JOURNAL_COLUMNS)?;
            for entry in entries {
                writer.write_record([
                    entry.id.to_string(),
                    entry.record.kind.to_string(),
                    entry.record.id.clone(),
                    entry.record_name.clone(),
                    entry.rating.to_string(),
                    entry.brewing.clone(),
                    entry.notes.clone(),
                    entry.created_at.to_rfc3339(),
                    entry.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                ])?;
            }
            finish(writer)?
        }
    };
    debug!(format = %format, entries = entries.len(), "Exported journal");
    Ok(bytes)
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ExplorerError::Io(e.into_error()))
}
