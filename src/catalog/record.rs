use super::schema::{FieldDef, RecordKind, Schema};
use super::value::{FieldValue, NumericRange};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// One catalog entry, validated against its kind's schema
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    kind: RecordKind,
    fields: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    /// Build a record from already-validated field values
    pub fn new(
        kind: RecordKind,
        id: impl Into<String>,
        fields: BTreeMap<&'static str, FieldValue>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn schema(&self) -> &'static Schema {
        self.kind.schema()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text of a text or category field
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn range(&self, field: &str) -> Option<&NumericRange> {
        self.get(field).and_then(FieldValue::as_range)
    }

    /// Display name taken from the primary field
    pub fn name(&self) -> &str {
        self.text(self.schema().primary()).unwrap_or(&self.id)
    }

    /// Number of populated fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Every declared field with its value, in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDef, Option<&FieldValue>)> + '_ {
        self.schema()
            .fields()
            .iter()
            .map(move |def| (def, self.fields.get(def.name)))
    }

    /// Populated fields only, in schema order
    pub fn present_fields(&self) -> impl Iterator<Item = (&'static FieldDef, &FieldValue)> + '_ {
        self.fields()
            .filter_map(|(def, value)| value.map(|v| (def, v)))
    }

    /// Case-insensitive substring test against one field
    pub fn field_contains(&self, field: &str, needle_lower: &str) -> bool {
        self.get(field)
            .map(|v| v.contains_text(needle_lower))
            .unwrap_or(false)
    }

    /// Typed view of the shared brewing parameters, if the kind has them
    pub fn brewing(&self) -> Option<BrewingParameters> {
        self.schema().field("brew_temp_c")?;
        Some(BrewingParameters {
            temp_c: self.range("brew_temp_c").copied(),
            temp_f: self.range("brew_temp_f").copied(),
            steep_minutes: self.range("steep_time").copied(),
            ratio: self.text("tea_water_ratio").map(str::to_string),
        })
    }
}

/// Serializes as `{id, kind, <fields in schema order>}`
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("kind", &self.kind)?;
        for (def, value) in self.present_fields() {
            map.serialize_entry(def.name, value)?;
        }
        map.end()
    }
}

/// Brewing parameters shared by teas, blends and tisanes
#[derive(Debug, Clone, PartialEq)]
pub struct BrewingParameters {
    pub temp_c: Option<NumericRange>,
    pub temp_f: Option<NumericRange>,
    pub steep_minutes: Option<NumericRange>,
    pub ratio: Option<String>,
}

impl BrewingParameters {
    /// Temperature as shown in detail views, e.g. `75-80°C / 167-176°F`
    pub fn temperature_display(&self) -> String {
        match (&self.temp_c, &self.temp_f) {
            (Some(c), Some(f)) => format!("{}°C / {}°F", c, f),
            (Some(c), None) => format!("{}°C", c),
            (None, Some(f)) => format!("{}°F", f),
            (None, None) => "Not specified".to_string(),
        }
    }
}
