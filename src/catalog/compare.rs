//! Side-by-side comparison of records of one kind

use super::index::CatalogSet;
use super::record::Record;
use super::schema::RecordKind;
use super::value::FieldValue;
use crate::{ExplorerError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Default cap on the number of records compared at once
pub const DEFAULT_MAX_COMPARISON: usize = 3;

/// Values of one field across the compared records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparison {
    pub field: &'static str,
    /// Distinct values in first-seen order
    pub values: Vec<FieldValue>,
    /// One value per compared record, in selection order
    pub by_record: Vec<FieldValue>,
    pub all_same: bool,
}

/// A compared record, by id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparedRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub kind: RecordKind,
    pub records: Vec<ComparedRecord>,
    /// Fields present on every selected record, in schema order
    pub fields: Vec<FieldComparison>,
}

impl Comparison {
    pub fn field(&self, name: &str) -> Option<&FieldComparison> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Fields whose values differ between records
    pub fn differences(&self) -> impl Iterator<Item = &FieldComparison> {
        self.fields.iter().filter(|f| !f.all_same)
    }
}

/// Compare 1..=`max_items` records of a single kind
pub fn compare(
    set: &CatalogSet,
    selection: &[(RecordKind, String)],
    max_items: usize,
) -> Result<Comparison> {
    let Some(&(kind, _)) = selection.first() else {
        return Err(ExplorerError::invalid_query("nothing selected to compare"));
    };
    if selection.len() > max_items {
        return Err(ExplorerError::invalid_query(format!(
            "at most {} records can be compared, got {}",
            max_items,
            selection.len()
        )));
    }
    if let Some((other, _)) = selection.iter().find(|(k, _)| *k != kind) {
        return Err(ExplorerError::invalid_query(format!(
            "cannot compare {} records with {} records",
            kind, other
        )));
    }

    let mut seen = HashSet::new();
    let mut records: Vec<&Record> = Vec::with_capacity(selection.len());
    for (_, id) in selection {
        if !seen.insert(id.as_str()) {
            return Err(ExplorerError::invalid_query(format!(
                "{} '{}' is selected more than once",
                kind, id
            )));
        }
        let record = set
            .get_by_id(kind, id)
            .map_err(|e| ExplorerError::invalid_query(format!("cannot compare: {}", e)))?;
        records.push(record);
    }

    let mut fields = Vec::new();
    for def in kind.schema().fields() {
        let present: Option<Vec<&FieldValue>> = records.iter().map(|r| r.get(def.name)).collect();
        let Some(present) = present else {
            continue;
        };

        let by_record: Vec<FieldValue> = present.into_iter().cloned().collect();
        let mut values: Vec<FieldValue> = Vec::new();
        for value in &by_record {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        fields.push(FieldComparison {
            field: def.name,
            all_same: values.len() == 1,
            values,
            by_record,
        });
    }

    Ok(Comparison {
        kind,
        records: records
            .iter()
            .map(|r| ComparedRecord {
                id: r.id().to_string(),
                name: r.name().to_string(),
            })
            .collect(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::loader::CatalogLoader;
    use pretty_assertions::assert_eq;

    const DATA: &str = r#"
tea:
  - name: Sencha
    category: Green
    origin: Japan
    brew_temp_c: 70-80
  - name: Gyokuro
    category: Green
    origin: Japan
    brew_temp_c: 50-60
    aroma: Marine
  - name: Assam
    category: Black
    origin: India
  - name: Keemun
    category: Black
blend:
  - id: earl-grey
    name: Earl Grey
    category: Flavored Black
"#;

    fn set() -> CatalogSet {
        CatalogLoader::strict().load_str("data.yaml", DATA).unwrap()
    }

    fn pick(pairs: &[(RecordKind, &str)]) -> Vec<(RecordKind, String)> {
        pairs.iter().map(|(k, id)| (*k, id.to_string())).collect()
    }

    #[test]
    fn test_compare_shared_fields() {
        let set = set();
        let cmp = compare(
            &set,
            &pick(&[(RecordKind::Tea, "sencha"), (RecordKind::Tea, "gyokuro")]),
            DEFAULT_MAX_COMPARISON,
        )
        .unwrap();

        let fields: Vec<_> = cmp.fields.iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["name", "category", "origin", "brew_temp_c"]);
        assert!(cmp.field("category").unwrap().all_same);
        assert!(cmp.field("origin").unwrap().all_same);
        assert_eq!(cmp.field("brew_temp_c").unwrap().values.len(), 2);
        assert!(cmp.field("aroma").is_none());

        let origin = cmp.field("origin").unwrap();
        assert_eq!(origin.values.len(), 1);
        assert_eq!(origin.by_record.len(), 2);
        assert_eq!(cmp.differences().count(), 2);
    }

    #[test]
    fn test_compare_single_record() {
        let set = set();
        let cmp = compare(&set, &pick(&[(RecordKind::Tea, "assam")]), 3).unwrap();
        assert!(cmp.fields.iter().all(|f| f.all_same));
        assert_eq!(cmp.records[0].name, "Assam");
    }

    #[test]
    fn test_compare_bounds() {
        let set = set();
        assert!(matches!(
            compare(&set, &[], 3).unwrap_err(),
            ExplorerError::InvalidQuery(_)
        ));

        let four = pick(&[
            (RecordKind::Tea, "sencha"),
            (RecordKind::Tea, "gyokuro"),
            (RecordKind::Tea, "assam"),
            (RecordKind::Tea, "keemun"),
        ]);
        assert!(matches!(
            compare(&set, &four, 3).unwrap_err(),
            ExplorerError::InvalidQuery(_)
        ));
        assert!(compare(&set, &four, 4).is_ok());
    }

    #[test]
    fn test_compare_rejects_mixed_kinds() {
        let set = set();
        let mixed = pick(&[
            (RecordKind::Tea, "sencha"),
            (RecordKind::Tea, "gyokuro"),
            (RecordKind::Blend, "earl-grey"),
        ]);
        assert!(matches!(
            compare(&set, &mixed, 3).unwrap_err(),
            ExplorerError::InvalidQuery(_)
        ));
    }

    #[test]
    fn test_compare_rejects_unknown_and_repeated_ids() {
        let set = set();
        let err = compare(&set, &pick(&[(RecordKind::Tea, "matcha")]), 3).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidQuery(ref m) if m.contains("matcha")));

        let repeated = pick(&[(RecordKind::Tea, "sencha"), (RecordKind::Tea, "sencha")]);
        assert!(compare(&set, &repeated, 3).is_err());
    }
}
