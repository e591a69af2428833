//! Indexed catalogs and the swappable catalog set

use super::compare::{self, Comparison};
use super::export::{self, ExportFormat};
use super::loader::{CatalogLoader, CatalogSource, LoadReport};
use super::query::{self, Predicate};
use super::recommend::{self, Recommendation, Strategy};
use super::record::Record;
use super::schema::{FieldKind, RecordKind, Schema};
use super::value::FieldValue;
use crate::journal::JournalEntry;
use crate::{ExplorerError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// All records of one kind, indexed by id and by category/list field values
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: RecordKind,
    records: Vec<Record>,
    by_id: HashMap<String, usize>,
    /// field -> lower-cased value -> ascending record positions
    by_value: HashMap<&'static str, HashMap<String, Vec<usize>>>,
}

impl Catalog {
    pub fn new(kind: RecordKind, records: Vec<Record>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_value: HashMap<&'static str, HashMap<String, Vec<usize>>> = HashMap::new();

        for (position, record) in records.iter().enumerate() {
            by_id.insert(record.id().to_string(), position);

            for (def, value) in record.present_fields() {
                let keys: Vec<String> = match (def.kind, value) {
                    (FieldKind::Category(_), FieldValue::Category(v)) => vec![v.to_lowercase()],
                    (FieldKind::List, FieldValue::List(items)) => {
                        items.iter().map(|i| i.to_lowercase()).collect()
                    }
                    _ => continue,
                };
                let field_index = by_value.entry(def.name).or_default();
                for key in keys {
                    let positions = field_index.entry(key).or_default();
                    if positions.last() != Some(&position) {
                        positions.push(position);
                    }
                }
            }
        }

        Self {
            kind,
            records,
            by_id,
            by_value,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn schema(&self) -> &'static Schema {
        self.kind.schema()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records in catalog order; the iterator can be cloned to restart it
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Result<&Record> {
        self.by_id
            .get(id)
            .map(|&position| &self.records[position])
            .ok_or_else(|| ExplorerError::NotFound {
                kind: self.kind.to_string(),
                id: id.to_string(),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Positions of records whose indexed `field` holds `value`
    ///
    /// `None` means the field is not indexed; an indexed field with no match
    /// yields an empty slice.
    pub fn positions(&self, field: &str, value: &str) -> Option<&[usize]> {
        if !self.is_indexed(field) {
            return None;
        }
        Some(
            self.by_value
                .get(field)
                .and_then(|values| values.get(&value.to_lowercase()))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        )
    }

    fn is_indexed(&self, field: &str) -> bool {
        matches!(
            self.schema().field(field).map(|def| def.kind),
            Some(FieldKind::Category(_)) | Some(FieldKind::List)
        )
    }

    /// Distinct values of a text, category or list field, sorted case-insensitively
    pub fn distinct_values(&self, field: &str) -> Result<Vec<String>> {
        let def = self.schema().require_field(field)?;
        let mut values: Vec<String> = Vec::new();
        for record in &self.records {
            let found: Vec<&str> = match record.get(def.name) {
                Some(FieldValue::Text(v)) | Some(FieldValue::Category(v)) => vec![v.as_str()],
                Some(FieldValue::List(items)) => items.iter().map(String::as_str).collect(),
                Some(FieldValue::Range(_)) | Some(FieldValue::Map(_)) => {
                    return Err(ExplorerError::invalid_query(format!(
                        "field '{}' is a {} field and has no distinct text values",
                        field,
                        def.kind.label()
                    )));
                }
                None => Vec::new(),
            };
            for value in found {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
        values.sort_by_key(|v| v.to_lowercase());
        Ok(values)
    }
}

/// One catalog per record kind, immutable once built
///
/// This is the query surface the presentation layer talks to. A reload builds
/// a fresh set; see [`CatalogHandle`].
#[derive(Debug, Clone)]
pub struct CatalogSet {
    catalogs: HashMap<RecordKind, Catalog>,
    report: LoadReport,
    loaded_at: DateTime<Utc>,
}

impl CatalogSet {
    pub fn new(catalogs: HashMap<RecordKind, Catalog>, report: LoadReport) -> Self {
        Self {
            catalogs,
            report,
            loaded_at: Utc::now(),
        }
    }

    /// Load a set from data files
    pub fn load(loader: &CatalogLoader, source: &CatalogSource) -> Result<Self> {
        loader.load(source)
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Catalog for a kind; every kind is present, possibly empty
    pub fn catalog(&self, kind: RecordKind) -> &Catalog {
        self.catalogs
            .get(&kind)
            .unwrap_or_else(|| empty_catalog(kind))
    }

    /// All records of a kind in stable order
    pub fn list(&self, kind: RecordKind) -> std::slice::Iter<'_, Record> {
        self.catalog(kind).iter()
    }

    pub fn filter(&self, kind: RecordKind, predicates: &[Predicate]) -> Result<Vec<&Record>> {
        query::filter(self.catalog(kind), predicates)
    }

    pub fn search(&self, kind: RecordKind, text: &str) -> Vec<&Record> {
        query::search(self.catalog(kind), text)
    }

    pub fn get_by_id(&self, kind: RecordKind, id: &str) -> Result<&Record> {
        self.catalog(kind).get(id)
    }

    pub fn compare(&self, selection: &[(RecordKind, String)], max_items: usize) -> Result<Comparison> {
        compare::compare(self, selection, max_items)
    }

    pub fn export(&self, kind: RecordKind, records: &[&Record], format: ExportFormat) -> Result<Vec<u8>> {
        export::export_records(kind, records, format)
    }

    /// Distinct values of a text, category or list field
    pub fn distinct_values(&self, kind: RecordKind, field: &str) -> Result<Vec<String>> {
        self.catalog(kind).distinct_values(field)
    }

    pub fn recommend(
        &self,
        kind: RecordKind,
        strategy: &Strategy,
        journal: &[JournalEntry],
        limit: usize,
    ) -> Result<Vec<Recommendation<'_>>> {
        recommend::recommend(self, kind, strategy, journal, limit)
    }
}

fn empty_catalog(kind: RecordKind) -> &'static Catalog {
    static EMPTY: once_cell::sync::Lazy<HashMap<RecordKind, Catalog>> =
        once_cell::sync::Lazy::new(|| {
            RecordKind::ALL
                .into_iter()
                .map(|k| (k, Catalog::new(k, Vec::new())))
                .collect()
        });
    &EMPTY[&kind]
}

/// Shared owner of the current catalog set
///
/// Readers take a snapshot (`Arc`) and keep querying it even if a reload
/// happens meanwhile. A reload builds the new set completely before swapping
/// the pointer, so nobody ever sees a mixture of old and new data. A failed
/// reload leaves the current set untouched.
#[derive(Debug)]
pub struct CatalogHandle {
    loader: CatalogLoader,
    source: CatalogSource,
    current: RwLock<Arc<CatalogSet>>,
}

impl CatalogHandle {
    /// Perform the initial load
    pub fn open(loader: CatalogLoader, source: CatalogSource) -> Result<Self> {
        let set = loader.load(&source)?;
        Ok(Self {
            loader,
            source,
            current: RwLock::new(Arc::new(set)),
        })
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// The set current at the time of the call
    pub fn snapshot(&self) -> Arc<CatalogSet> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Re-read the sources and swap in the new set
    pub fn reload(&self) -> Result<Arc<CatalogSet>> {
        let fresh = Arc::new(self.loader.load(&self.source)?);
        self.swap(Arc::clone(&fresh));
        info!(
            records = fresh.report().total_loaded(),
            "Reference catalog reloaded"
        );
        Ok(fresh)
    }

    fn swap(&self, fresh: Arc<CatalogSet>) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = fresh;
    }
}
