//! Loading catalogs from data files
//!
//! A data file is a YAML or JSON mapping from record kind to a sequence of
//! raw records:
//!
//! ```yaml
//! tea:
//!   - name: Sencha
//!     category: Green
//!     brew_temp_c: 70-80
//! tisane:
//!   - id: hibiscus
//!     name: Hibiscus
//!     scientific_name: Hibiscus sabdariffa
//! ```
//!
//! Malformed records abort the load in strict mode and are skipped (and
//! reported) in lenient mode. A file that cannot be read or parsed always
//! aborts the load.

use super::index::{Catalog, CatalogSet};
use super::record::Record;
use super::schema::RecordKind;
use super::value::{coerce, FieldValue};
use crate::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What to do with a record that does not fit its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Abort the whole load on the first malformed record
    #[default]
    Strict,
    /// Skip malformed records, log them and list them in the load report
    Lenient,
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadMode::Strict => write!(f, "strict"),
            LoadMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl FromStr for LoadMode {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(LoadMode::Strict),
            "lenient" => Ok(LoadMode::Lenient),
            other => Err(ExplorerError::Config(format!(
                "Unknown load mode '{}'. Expected: strict, lenient",
                other
            ))),
        }
    }
}

/// The data files a catalog set is built from, in load order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    paths: Vec<PathBuf>,
}

impl CatalogSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

/// A record dropped by a lenient load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub source: PathBuf,
    pub kind: String,
    pub record: String,
    pub reason: String,
}

/// Outcome of a load, kept alongside the catalogs it produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub mode: LoadMode,
    pub sources: Vec<PathBuf>,
    pub loaded: BTreeMap<RecordKind, usize>,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    /// True when records were dropped, so the catalog is incomplete
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn total_loaded(&self) -> usize {
        self.loaded.values().sum()
    }
}

/// Raw contents of one data file
type RawDocument = BTreeMap<String, Vec<Value>>;

/// Builds catalog sets from data files
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    mode: LoadMode,
}

impl CatalogLoader {
    pub fn new(mode: LoadMode) -> Self {
        Self { mode }
    }

    pub fn strict() -> Self {
        Self::new(LoadMode::Strict)
    }

    pub fn lenient() -> Self {
        Self::new(LoadMode::Lenient)
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Read every source file and build a complete catalog set
    ///
    /// Nothing is returned unless the whole load succeeds, so a caller never
    /// observes a half-built set.
    pub fn load(&self, source: &CatalogSource) -> Result<CatalogSet> {
        if source.paths().is_empty() {
            return Err(ExplorerError::SourceUnavailable {
                source_name: "<none>".to_string(),
                reason: "no data files configured".to_string(),
            });
        }

        let mut documents = Vec::with_capacity(source.paths().len());
        for path in source.paths() {
            documents.push((path.clone(), read_document(path)?));
        }

        self.build(documents)
    }

    /// Build a catalog set from a single in-memory document
    pub fn load_str(&self, name: &str, content: &str) -> Result<CatalogSet> {
        let path = PathBuf::from(name);
        let document = parse_document(&path, content)?;
        self.build(vec![(path, document)])
    }

    fn build(&self, documents: Vec<(PathBuf, RawDocument)>) -> Result<CatalogSet> {
        let mut report = LoadReport {
            mode: self.mode,
            sources: documents.iter().map(|(p, _)| p.clone()).collect(),
            ..LoadReport::default()
        };
        let mut records: HashMap<RecordKind, Vec<Record>> = HashMap::new();
        let mut seen_ids: HashMap<RecordKind, HashSet<String>> = HashMap::new();

        for (path, document) in documents {
            for (kind_name, raw_records) in document {
                let kind = match kind_name.parse::<RecordKind>() {
                    Ok(kind) => kind,
                    Err(_) => {
                        let violation = ExplorerError::SchemaViolation {
                            kind: kind_name.clone(),
                            record: "*".to_string(),
                            field: "*".to_string(),
                            reason: "unknown record kind".to_string(),
                        };
                        self.reject(&mut report, &path, &kind_name, "*", violation)?;
                        continue;
                    }
                };

                let ids = seen_ids.entry(kind).or_default();
                let bucket = records.entry(kind).or_default();

                for (position, raw) in raw_records.iter().enumerate() {
                    match build_record(kind, position, raw, ids) {
                        Ok(record) => {
                            ids.insert(record.id().to_string());
                            bucket.push(record);
                        }
                        Err(violation) => {
                            let label = match &violation {
                                ExplorerError::SchemaViolation { record, .. } => record.clone(),
                                _ => format!("#{}", position + 1),
                            };
                            self.reject(&mut report, &path, kind.as_str(), &label, violation)?;
                        }
                    }
                }
            }
        }

        let mut catalogs = HashMap::new();
        for kind in RecordKind::ALL {
            let mut kind_records = records.remove(&kind).unwrap_or_default();
            if let Some(sort_key) = kind.schema().sort_key() {
                kind_records.sort_by_cached_key(|r| {
                    r.text(sort_key).unwrap_or_default().to_lowercase()
                });
            }
            report.loaded.insert(kind, kind_records.len());
            catalogs.insert(kind, Catalog::new(kind, kind_records));
        }

        info!(
            mode = %self.mode,
            records = report.total_loaded(),
            skipped = report.skipped.len(),
            "Reference catalog loaded"
        );

        Ok(CatalogSet::new(catalogs, report))
    }

    /// Apply the configured policy to a malformed record
    fn reject(
        &self,
        report: &mut LoadReport,
        path: &Path,
        kind: &str,
        record: &str,
        violation: ExplorerError,
    ) -> Result<()> {
        match self.mode {
            LoadMode::Strict => Err(violation),
            LoadMode::Lenient => {
                warn!(
                    source = %path.display(),
                    kind,
                    record,
                    "Skipping record: {}",
                    violation
                );
                report.skipped.push(SkippedRecord {
                    source: path.to_path_buf(),
                    kind: kind.to_string(),
                    record: record.to_string(),
                    reason: violation.to_string(),
                });
                Ok(())
            }
        }
    }
}

fn read_document(path: &Path) -> Result<RawDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| ExplorerError::SourceUnavailable {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_document(path, &content)
}

fn parse_document(path: &Path, content: &str) -> Result<RawDocument> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        serde_json::from_str::<Option<RawDocument>>(content).map_err(|e| e.to_string())
    } else {
        serde_yaml_ng::from_str::<Option<RawDocument>>(content).map_err(|e| e.to_string())
    };

    let document = parsed.map_err(|reason| ExplorerError::SourceUnavailable {
        source_name: path.display().to_string(),
        reason,
    })?;

    let document = document.unwrap_or_default();
    debug!(
        source = %path.display(),
        kinds = document.len(),
        "Parsed data file"
    );
    Ok(document)
}

/// Validate one raw record against its schema
fn build_record(
    kind: RecordKind,
    position: usize,
    raw: &Value,
    taken_ids: &HashSet<String>,
) -> Result<Record> {
    let schema = kind.schema();
    let explicit_id = raw
        .get("id")
        .and_then(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty());
    let primary = raw
        .get(schema.primary())
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let label = explicit_id
        .clone()
        .or_else(|| primary.map(str::to_string))
        .unwrap_or_else(|| format!("#{}", position + 1));

    let violation = |field: &str, reason: String| ExplorerError::SchemaViolation {
        kind: kind.to_string(),
        record: label.clone(),
        field: field.to_string(),
        reason,
    };

    let Some(object) = raw.as_object() else {
        return Err(violation("*", "record is not a mapping".to_string()));
    };

    let mut fields: BTreeMap<&'static str, FieldValue> = BTreeMap::new();
    for def in schema.fields() {
        if let Some(raw_value) = object.get(def.name) {
            match coerce(def, raw_value) {
                Ok(Some(value)) => {
                    fields.insert(def.name, value);
                }
                Ok(None) => {}
                Err(reason) => return Err(violation(def.name, reason)),
            }
        }
        if def.required && !fields.contains_key(def.name) {
            return Err(violation(
                def.name,
                "required field is missing or empty".to_string(),
            ));
        }
    }

    for key in object.keys() {
        if key != "id" && schema.field(key).is_none() {
            warn!(kind = %kind, record = %label, field = %key, "Ignoring undeclared field");
        }
    }

    let id = match explicit_id {
        Some(id) => id,
        None => slugify(primary.unwrap_or_default()),
    };
    if id.is_empty() {
        return Err(violation("id", "cannot derive an identifier".to_string()));
    }
    if taken_ids.contains(&id) {
        return Err(violation("id", format!("duplicate identifier '{}'", id)));
    }

    Ok(Record::new(kind, id, fields))
}

/// Lower-case ASCII slug, e.g. `"Darjeeling First Flush"` → `darjeeling-first-flush`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}
