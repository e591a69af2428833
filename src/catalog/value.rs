//! Field values and coercion of raw data-file values into them

use super::schema::{FieldDef, FieldKind};
use crate::{ExplorerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Leading `a` or `a-b` reading of a numeric string; trailing units are ignored
static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)(?:\s*(?:\.\.|-|–|to)\s*(-?\d+(?:\.\d+)?))?")
        .expect("range pattern is valid")
});

/// Inclusive numeric range with `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    min: f64,
    max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(ExplorerError::invalid_query("range bounds must be numbers"));
        }
        if min > max {
            return Err(ExplorerError::invalid_query(format!(
                "range minimum {} exceeds maximum {}",
                format_number(min),
                format_number(max)
            )));
        }
        Ok(Self { min, max })
    }

    /// Single reading stored as `(v, v)`
    pub fn single(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_single(&self) -> bool {
        self.min == self.max
    }

    /// Inclusive intersection test
    pub fn overlaps(&self, other: &NumericRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

impl std::fmt::Display for NumericRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single() {
            write!(f, "{}", format_number(self.min))
        } else {
            write!(f, "{}-{}", format_number(self.min), format_number(self.max))
        }
    }
}

impl FromStr for NumericRange {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        let captures = RANGE_PATTERN.captures(s).ok_or_else(|| {
            ExplorerError::invalid_query(format!("'{}' does not start with a number", s.trim()))
        })?;
        let min: f64 = captures[1]
            .parse()
            .map_err(|_| ExplorerError::invalid_query(format!("bad number in '{}'", s)))?;
        match captures.get(2) {
            Some(upper) => {
                let max: f64 = upper
                    .as_str()
                    .parse()
                    .map_err(|_| ExplorerError::invalid_query(format!("bad number in '{}'", s)))?;
                NumericRange::new(min, max)
            }
            None => Ok(NumericRange::single(min)),
        }
    }
}

/// Integers print without a fractional part
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// A typed field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Category(String),
    Range(NumericRange),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    /// Text content for text and category values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&NumericRange> {
        match self {
            FieldValue::Range(r) => Some(r),
            _ => None,
        }
    }

    /// Case-insensitive substring test; `needle` must already be lower-case
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => s.to_lowercase().contains(needle),
            FieldValue::List(items) => items.iter().any(|i| i.to_lowercase().contains(needle)),
            FieldValue::Map(entries) => entries.values().any(|v| v.to_lowercase().contains(needle)),
            FieldValue::Range(_) => false,
        }
    }

    /// Scalar rendering used by tabular export and terminal output
    ///
    /// Ranges print as `min-max` (or `v`), lists join with `"; "`, maps print
    /// `key=value` pairs in key order joined with `"; "`.
    pub fn flatten(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => s.clone(),
            FieldValue::Range(r) => r.to_string(),
            FieldValue::List(items) => items.join("; "),
            FieldValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.flatten())
    }
}

/// Convert a raw value into the declared kind
///
/// `Ok(None)` means the value is absent (null or empty). `Err` carries the
/// reason the value does not fit the declaration.
pub fn coerce(def: &FieldDef, raw: &Value) -> std::result::Result<Option<FieldValue>, String> {
    if raw.is_null() {
        return Ok(None);
    }

    match def.kind {
        FieldKind::Text => Ok(scalar_text(raw)?.map(FieldValue::Text)),
        FieldKind::Category(allowed) => match scalar_text(raw)? {
            None => Ok(None),
            Some(text) => def
                .kind
                .canonical_category(&text)
                .map(|c| Some(FieldValue::Category(c.to_string())))
                .ok_or_else(|| {
                    format!("'{}' is not one of: {}", text, allowed.join(", "))
                }),
        },
        FieldKind::Range => coerce_range(raw).map(|r| r.map(FieldValue::Range)),
        FieldKind::List => coerce_list(raw),
        FieldKind::Map => coerce_map(raw),
    }
}

fn scalar_text(raw: &Value) -> std::result::Result<Option<String>, String> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => return Ok(None),
        Value::Array(_) | Value::Object(_) => {
            return Err("expected a text value".to_string());
        }
    };
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn reason(err: ExplorerError) -> String {
    match err {
        ExplorerError::InvalidQuery(message) => message,
        other => other.to_string(),
    }
}

fn number(raw: &Value) -> std::result::Result<f64, String> {
    raw.as_f64()
        .ok_or_else(|| format!("expected a number, found {}", raw))
}

fn coerce_range(raw: &Value) -> std::result::Result<Option<NumericRange>, String> {
    let range = match raw {
        Value::Number(_) => NumericRange::single(number(raw)?),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.parse::<NumericRange>().map_err(reason)?,
        Value::Array(items) => match items.as_slice() {
            [] => return Ok(None),
            [only] => NumericRange::single(number(only)?),
            [min, max] => NumericRange::new(number(min)?, number(max)?).map_err(reason)?,
            _ => return Err("a range has at most two bounds".to_string()),
        },
        Value::Object(bounds) => {
            let min = bounds
                .get("min")
                .ok_or_else(|| "range object needs a 'min' bound".to_string())
                .and_then(number)?;
            let max = match bounds.get("max") {
                Some(max) => number(max)?,
                None => min,
            };
            NumericRange::new(min, max).map_err(reason)?
        }
        Value::Bool(_) => return Err("expected a number or range".to_string()),
        Value::Null => return Ok(None),
    };
    Ok(Some(range))
}

fn coerce_list(raw: &Value) -> std::result::Result<Option<FieldValue>, String> {
    let candidates: Vec<String> = match raw {
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect(),
        Value::Number(_) | Value::Bool(_) => scalar_text(raw)?.into_iter().collect(),
        Value::Object(_) => return Err("expected a list of text values".to_string()),
        Value::Null => return Ok(None),
    };

    let mut items: Vec<String> = Vec::with_capacity(candidates.len());
    for item in candidates {
        if !item.is_empty() && !items.contains(&item) {
            items.push(item);
        }
    }

    Ok(if items.is_empty() {
        None
    } else {
        Some(FieldValue::List(items))
    })
}

fn coerce_map(raw: &Value) -> std::result::Result<Option<FieldValue>, String> {
    let Value::Object(entries) = raw else {
        return Err("expected a mapping of text values".to_string());
    };

    let mut map = BTreeMap::new();
    for (key, value) in entries {
        if let Some(text) = scalar_text(value)? {
            map.insert(key.trim().to_string(), text);
        }
    }

    Ok(if map.is_empty() {
        None
    } else {
        Some(FieldValue::Map(map))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{FieldDef, RISK_LEVELS};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_range_parsing() {
        assert_eq!("70-80".parse::<NumericRange>().unwrap(), NumericRange::new(70.0, 80.0).unwrap());
        assert_eq!("2-3 min".parse::<NumericRange>().unwrap(), NumericRange::new(2.0, 3.0).unwrap());
        assert_eq!("70..80".parse::<NumericRange>().unwrap(), NumericRange::new(70.0, 80.0).unwrap());
        assert_eq!("85°C".parse::<NumericRange>().unwrap(), NumericRange::single(85.0));
        assert_eq!("1.5 - 2".parse::<NumericRange>().unwrap(), NumericRange::new(1.5, 2.0).unwrap());
        assert!("80-70".parse::<NumericRange>().is_err());
        assert!("hot".parse::<NumericRange>().is_err());
    }

    #[test]
    fn test_range_overlap_is_inclusive() {
        let record = NumericRange::new(70.0, 80.0).unwrap();
        assert!(record.overlaps(&NumericRange::new(80.0, 95.0).unwrap()));
        assert!(record.overlaps(&NumericRange::single(75.0)));
        assert!(!record.overlaps(&NumericRange::new(81.0, 95.0).unwrap()));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(NumericRange::single(85.0).to_string(), "85");
        assert_eq!(NumericRange::new(1.5, 3.0).unwrap().to_string(), "1.5-3");
    }

    #[test]
    fn test_coerce_range_shapes() {
        let def = FieldDef::range("elevation");
        let expected = Some(FieldValue::Range(NumericRange::new(600.0, 2000.0).unwrap()));
        assert_eq!(coerce(&def, &json!([600, 2000])).unwrap(), expected);
        assert_eq!(coerce(&def, &json!({"min": 600, "max": 2000})).unwrap(), expected);
        assert_eq!(coerce(&def, &json!("600-2000 m")).unwrap(), expected);
        assert_eq!(
            coerce(&def, &json!(1200)).unwrap(),
            Some(FieldValue::Range(NumericRange::single(1200.0)))
        );
        assert!(coerce(&def, &json!([2000, 600])).is_err());
        assert!(coerce(&def, &json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_coerce_category_canonicalizes() {
        let def = FieldDef::category("risk_level", RISK_LEVELS);
        assert_eq!(
            coerce(&def, &json!("very high")).unwrap(),
            Some(FieldValue::Category("Very High".to_string()))
        );
        let err = coerce(&def, &json!("Unknown")).unwrap_err();
        assert!(err.contains("Unknown"));
    }

    #[test]
    fn test_coerce_list_dedups_in_order() {
        let def = FieldDef::list("certifications");
        assert_eq!(
            coerce(&def, &json!("Organic, Fair Trade, Organic")).unwrap(),
            Some(FieldValue::List(vec!["Organic".to_string(), "Fair Trade".to_string()]))
        );
        assert_eq!(coerce(&def, &json!([])).unwrap(), None);
    }

    #[test]
    fn test_coerce_map() {
        let def = FieldDef::map("common_names");
        let value = coerce(&def, &json!({"en": "Roselle", "fr": "Oseille de Guinée"}))
            .unwrap()
            .unwrap();
        assert_eq!(value.flatten(), "en=Roselle; fr=Oseille de Guinée");
        assert!(coerce(&def, &json!(["en"])).is_err());
    }

    #[test]
    fn test_empty_text_is_absent() {
        let def = FieldDef::text("aroma");
        assert_eq!(coerce(&def, &json!("   ")).unwrap(), None);
        assert_eq!(coerce(&def, &Value::Null).unwrap(), None);
    }

    #[test]
    fn test_contains_text_covers_nested_values() {
        let list = FieldValue::List(vec!["Bergamot".to_string()]);
        assert!(list.contains_text("berga"));
        assert!(!FieldValue::Range(NumericRange::single(80.0)).contains_text("80"));
    }
}
