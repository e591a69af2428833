//! Filter predicates and ranked text search

use super::index::Catalog;
use super::record::Record;
use super::schema::{FieldKind, Schema};
use super::value::{FieldValue, NumericRange};
use crate::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single field-level condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match on a category field
    Category { field: String, value: String },
    /// The record's range intersects `range`
    RangeOverlap { field: String, range: NumericRange },
    /// A list field holds `value` (case-insensitive)
    Contains { field: String, value: String },
    /// Case-insensitive substring in any of `fields`
    Text { fields: Vec<String>, needle: String },
}

impl Predicate {
    pub fn category(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Category {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range_overlap(field: impl Into<String>, range: NumericRange) -> Self {
        Predicate::RangeOverlap {
            field: field.into(),
            range,
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn text<I, S>(fields: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Text {
            fields: fields.into_iter().map(Into::into).collect(),
            needle: needle.into(),
        }
    }

    /// Parse a `field=value` expression against a schema
    ///
    /// The predicate kind follows the field's declared kind: category fields
    /// match exactly, range fields take `75`, `70-80` or `70..80`, list fields
    /// test membership and text or map fields match substrings.
    pub fn parse(schema: &Schema, expression: &str) -> Result<Self> {
        let (field, value) = expression.split_once('=').ok_or_else(|| {
            ExplorerError::invalid_query(format!(
                "expected 'field=value', got '{}'",
                expression
            ))
        })?;
        let field = field.trim();
        let value = value.trim();
        if value.is_empty() {
            return Err(ExplorerError::invalid_query(format!(
                "no value given for field '{}'",
                field
            )));
        }

        let def = schema.require_field(field)?;
        let predicate = match def.kind {
            FieldKind::Category(_) => Predicate::category(field, value),
            FieldKind::Range => Predicate::range_overlap(field, value.parse::<NumericRange>()?),
            FieldKind::List => Predicate::contains(field, value),
            FieldKind::Text | FieldKind::Map => Predicate::text([field], value),
        };
        predicate.validate(schema)?;
        Ok(predicate)
    }

    /// Check the predicate against the schema it will run on
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        match self {
            Predicate::Category { field, value } => {
                let def = schema.require_field(field)?;
                let FieldKind::Category(allowed) = def.kind else {
                    return Err(mismatch(field, def.kind, "category match"));
                };
                if def.kind.canonical_category(value).is_none() {
                    return Err(ExplorerError::invalid_query(format!(
                        "'{}' is not a valid {} (expected one of: {})",
                        value,
                        field,
                        allowed.join(", ")
                    )));
                }
            }
            Predicate::RangeOverlap { field, .. } => {
                let def = schema.require_field(field)?;
                if def.kind != FieldKind::Range {
                    return Err(mismatch(field, def.kind, "range overlap"));
                }
            }
            Predicate::Contains { field, .. } => {
                let def = schema.require_field(field)?;
                if def.kind != FieldKind::List {
                    return Err(mismatch(field, def.kind, "list membership"));
                }
            }
            Predicate::Text { fields, needle } => {
                if fields.is_empty() {
                    return Err(ExplorerError::invalid_query(
                        "text predicate names no fields",
                    ));
                }
                if needle.trim().is_empty() {
                    return Err(ExplorerError::invalid_query("text predicate has an empty needle"));
                }
                for field in fields {
                    let def = schema.require_field(field)?;
                    if def.kind == FieldKind::Range {
                        return Err(mismatch(field, def.kind, "text match"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate against one record; the predicate must already be validated
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Category { field, value } => record
                .text(field)
                .map(|v| v.to_lowercase() == value.trim().to_lowercase())
                .unwrap_or(false),
            Predicate::RangeOverlap { field, range } => record
                .range(field)
                .map(|r| r.overlaps(range))
                .unwrap_or(false),
            Predicate::Contains { field, value } => match record.get(field) {
                Some(FieldValue::List(items)) => {
                    let value = value.trim().to_lowercase();
                    items.iter().any(|i| i.to_lowercase() == value)
                }
                _ => false,
            },
            Predicate::Text { fields, needle } => {
                let needle = needle.trim().to_lowercase();
                fields.iter().any(|f| record.field_contains(f, &needle))
            }
        }
    }

    /// Field and lookup key when the catalog keeps a value index for it
    fn index_key(&self) -> Option<(&str, &str)> {
        match self {
            Predicate::Category { field, value } | Predicate::Contains { field, value } => {
                Some((field.as_str(), value.trim()))
            }
            _ => None,
        }
    }
}

fn mismatch(field: &str, kind: FieldKind, wanted: &str) -> ExplorerError {
    ExplorerError::invalid_query(format!(
        "field '{}' is a {} field and cannot be used for {}",
        field,
        kind.label(),
        wanted
    ))
}

/// Records satisfying every predicate, in list order
pub fn filter<'a>(catalog: &'a Catalog, predicates: &[Predicate]) -> Result<Vec<&'a Record>> {
    let schema = catalog.schema();
    for predicate in predicates {
        predicate.validate(schema)?;
    }

    if predicates.is_empty() {
        return Ok(catalog.iter().collect());
    }

    let records = catalog.records();
    let narrowed = predicates
        .iter()
        .find_map(|p| p.index_key())
        .and_then(|(field, value)| catalog.positions(field, value));

    let matched: Vec<&Record> = match narrowed {
        Some(positions) => positions
            .iter()
            .map(|&p| &records[p])
            .filter(|r| predicates.iter().all(|p| p.matches(r)))
            .collect(),
        None => records
            .iter()
            .filter(|r| predicates.iter().all(|p| p.matches(r)))
            .collect(),
    };

    debug!(
        kind = %catalog.kind(),
        predicates = predicates.len(),
        matched = matched.len(),
        "Filter evaluated"
    );
    Ok(matched)
}

/// Case-insensitive search over the kind's searchable fields
///
/// Records whose primary name starts with the query come first, then records
/// matching anywhere else; each tier keeps list order. A blank query returns
/// the whole list.
pub fn search<'a>(catalog: &'a Catalog, text: &str) -> Vec<&'a Record> {
    let query = text.trim().to_lowercase();
    if query.is_empty() {
        return catalog.iter().collect();
    }

    let schema = catalog.schema();
    let mut name_hits = Vec::new();
    let mut other_hits = Vec::new();

    for record in catalog.iter() {
        let prefix = record
            .text(schema.primary())
            .map(|name| name.to_lowercase().starts_with(&query))
            .unwrap_or(false);
        if prefix {
            name_hits.push(record);
        } else if schema
            .searchable_fields()
            .any(|def| record.field_contains(def.name, &query))
        {
            other_hits.push(record);
        }
    }

    debug!(
        kind = %catalog.kind(),
        query = %query,
        name_hits = name_hits.len(),
        other_hits = other_hits.len(),
        "Search evaluated"
    );
    name_hits.extend(other_hits);
    name_hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::CatalogLoader;
    use crate::catalog::schema::RecordKind;
    use crate::catalog::CatalogSet;
    use pretty_assertions::assert_eq;

    const TEAS: &str = r#"
tea:
  - name: Sencha
    category: Green
    region: Shizuoka
    brew_temp_c: 70-80
    cultivars: [Yabukita]
  - name: Assam
    category: Black
    region: Assam
    brew_temp_c: 90-100
  - name: Longjing
    category: Green
    region: Zhejiang
    brew_temp_c: 75-85
    cultivars: [Longjing 43]
  - name: Darjeeling First Flush
    category: Black
    region: Darjeeling
    brew_temp_c: 85-90
  - name: Keemun
    category: Black
    region: Anhui
    flavor_profile: Dark cocoa and stone fruit
"#;

    fn teas() -> CatalogSet {
        CatalogLoader::strict().load_str("teas.yaml", TEAS).unwrap()
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_parse_picks_predicate_from_field_kind() {
        let schema = RecordKind::Tea.schema();
        assert_eq!(
            Predicate::parse(schema, "category=green").unwrap(),
            Predicate::category("category", "green")
        );
        assert_eq!(
            Predicate::parse(schema, "brew_temp_c=70..75").unwrap(),
            Predicate::range_overlap("brew_temp_c", NumericRange::new(70.0, 75.0).unwrap())
        );
        assert_eq!(
            Predicate::parse(schema, "cultivars = Yabukita").unwrap(),
            Predicate::contains("cultivars", "Yabukita")
        );
        assert_eq!(
            Predicate::parse(schema, "region=shiz").unwrap(),
            Predicate::text(["region"], "shiz")
        );
    }

    #[test]
    fn test_list_membership_ignores_case_beyond_ascii() {
        let yaml = r#"
tisane:
  - name: Hibiscus
    scientific_name: Hibiscus sabdariffa
    cultivation_countries: [Égypte, Côte d'Ivoire, Guinée]
  - name: Rooibos
    scientific_name: Aspalathus linearis
    cultivation_countries: [South Africa]
"#;
        let set = CatalogLoader::strict().load_str("tisanes.yaml", yaml).unwrap();
        for query in ["Côte d'Ivoire", "CÔTE D'IVOIRE", "côte d'ivoire", "GUINÉE", "égypte"] {
            let found = set
                .filter(
                    RecordKind::Tisane,
                    &[Predicate::contains("cultivation_countries", query)],
                )
                .unwrap();
            assert_eq!(ids(&found), vec!["hibiscus"], "query {}", query);
        }
    }

    #[test]
    fn test_parse_rejects_bad_expressions() {
        let schema = RecordKind::Tea.schema();
        assert!(Predicate::parse(schema, "category").is_err());
        assert!(Predicate::parse(schema, "category=").is_err());
        assert!(Predicate::parse(schema, "categroy=Green").is_err());
        assert!(Predicate::parse(schema, "category=Purple").is_err());
        assert!(Predicate::parse(schema, "brew_temp_c=hot").is_err());
    }

    #[test]
    fn test_filter_by_category_keeps_order() {
        let set = teas();
        let found = set
            .filter(RecordKind::Tea, &[Predicate::category("category", "Green")])
            .unwrap();
        assert_eq!(ids(&found), vec!["sencha", "longjing"]);
    }

    #[test]
    fn test_filter_range_overlap() {
        let set = teas();
        let range = NumericRange::new(80.0, 86.0).unwrap();
        let found = set
            .filter(RecordKind::Tea, &[Predicate::range_overlap("brew_temp_c", range)])
            .unwrap();
        assert_eq!(ids(&found), vec!["sencha", "longjing", "darjeeling-first-flush"]);
    }

    #[test]
    fn test_filter_conjunction_is_intersection() {
        let set = teas();
        let p1 = Predicate::category("category", "Black");
        let p2 = Predicate::range_overlap("brew_temp_c", NumericRange::new(80.0, 95.0).unwrap());

        let a = set.filter(RecordKind::Tea, std::slice::from_ref(&p1)).unwrap();
        let b = set.filter(RecordKind::Tea, std::slice::from_ref(&p2)).unwrap();
        let both = set.filter(RecordKind::Tea, &[p1, p2]).unwrap();

        let intersection: Vec<&Record> = a.iter().copied().filter(|r| b.contains(r)).collect();
        assert_eq!(ids(&both), ids(&intersection));
        assert_eq!(ids(&both), vec!["assam", "darjeeling-first-flush"]);
    }

    #[test]
    fn test_filter_unknown_field_is_invalid_query() {
        let set = teas();
        let err = set
            .filter(RecordKind::Tea, &[Predicate::category("colour", "Green")])
            .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidQuery(_)));

        let err = set
            .filter(RecordKind::Tea, &[Predicate::contains("region", "Assam")])
            .unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidQuery(_)));
    }

    #[test]
    fn test_filter_contains_and_text() {
        let set = teas();
        let found = set
            .filter(RecordKind::Tea, &[Predicate::contains("cultivars", "longjing 43")])
            .unwrap();
        assert_eq!(ids(&found), vec!["longjing"]);

        let found = set
            .filter(
                RecordKind::Tea,
                &[Predicate::text(["region", "flavor_profile"], "COCOA")],
            )
            .unwrap();
        assert_eq!(ids(&found), vec!["keemun"]);
    }

    #[test]
    fn test_empty_filter_and_search_return_list() {
        let set = teas();
        let all: Vec<&Record> = set.list(RecordKind::Tea).collect();
        assert_eq!(set.filter(RecordKind::Tea, &[]).unwrap(), all);
        assert_eq!(set.search(RecordKind::Tea, ""), all);
        assert_eq!(set.search(RecordKind::Tea, "   "), all);
    }

    #[test]
    fn test_search_ranks_name_prefix_first() {
        let set = teas();
        let found = set.search(RecordKind::Tea, "dar");
        // Keemun matches only through "Dark cocoa" in its flavor profile
        assert_eq!(ids(&found), vec!["darjeeling-first-flush", "keemun"]);
    }

    #[test]
    fn test_search_non_prefix_name_match_is_second_tier() {
        let set = teas();
        let found = set.search(RecordKind::Tea, "SAM");
        assert_eq!(ids(&found), vec!["assam"]);

        let found = set.search(RecordKind::Tea, "green");
        assert_eq!(ids(&found), vec!["sencha", "longjing"]);
    }
}
