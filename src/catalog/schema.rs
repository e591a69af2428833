//! Record kinds and their declared schemas
//!
//! Every record kind carries an ordered list of field definitions. The order
//! is the column order of tabular exports and the row order of comparisons,
//! so it must never be derived from map iteration.

use crate::{ExplorerError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const TEA_CATEGORIES: &[&str] = &["White", "Green", "Oolong", "Black", "Pu-erh", "Yellow"];
pub const RISK_LEVELS: &[&str] = &["Low", "Moderate", "High", "Very High"];
pub const LEAF_SIZES: &[&str] = &["Small", "Medium", "Large"];

/// The kinds of record a catalog can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Tea,
    Blend,
    Cultivar,
    Company,
    Product,
    Tisane,
    Region,
    GlossaryTerm,
}

impl RecordKind {
    pub const ALL: [RecordKind; 8] = [
        RecordKind::Tea,
        RecordKind::Blend,
        RecordKind::Cultivar,
        RecordKind::Company,
        RecordKind::Product,
        RecordKind::Tisane,
        RecordKind::Region,
        RecordKind::GlossaryTerm,
    ];

    /// Name used in data files, CLI arguments and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Tea => "tea",
            RecordKind::Blend => "blend",
            RecordKind::Cultivar => "cultivar",
            RecordKind::Company => "company",
            RecordKind::Product => "product",
            RecordKind::Tisane => "tisane",
            RecordKind::Region => "region",
            RecordKind::GlossaryTerm => "glossary_term",
        }
    }

    /// Declared schema for this kind
    pub fn schema(&self) -> &'static Schema {
        match self {
            RecordKind::Tea => &*TEA,
            RecordKind::Blend => &*BLEND,
            RecordKind::Cultivar => &*CULTIVAR,
            RecordKind::Company => &*COMPANY,
            RecordKind::Product => &*PRODUCT,
            RecordKind::Tisane => &*TISANE,
            RecordKind::Region => &*REGION,
            RecordKind::GlossaryTerm => &*GLOSSARY_TERM,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tea" | "teas" => Ok(RecordKind::Tea),
            "blend" | "blends" => Ok(RecordKind::Blend),
            "cultivar" | "cultivars" => Ok(RecordKind::Cultivar),
            "company" | "companies" => Ok(RecordKind::Company),
            "product" | "products" => Ok(RecordKind::Product),
            "tisane" | "tisanes" => Ok(RecordKind::Tisane),
            "region" | "regions" => Ok(RecordKind::Region),
            "glossary_term" | "glossary-term" | "glossary" | "glossary_terms" => {
                Ok(RecordKind::GlossaryTerm)
            }
            other => Err(ExplorerError::invalid_query(format!(
                "unknown record kind '{}'",
                other
            ))),
        }
    }
}

/// Value shape a field is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Text drawn from a fixed set, stored in canonical spelling
    Category(&'static [&'static str]),
    /// Numeric (min, max) pair
    Range,
    /// Ordered list of distinct text values
    List,
    /// Text keyed by text, e.g. common names by language code
    Map,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Category(_) => "category",
            FieldKind::Range => "range",
            FieldKind::List => "list",
            FieldKind::Map => "map",
        }
    }

    /// Canonical spelling of `value` if this is a category field that allows it
    pub fn canonical_category(&self, value: &str) -> Option<&'static str> {
        match self {
            FieldKind::Category(allowed) => {
                let value = value.trim().to_lowercase();
                allowed.iter().copied().find(|a| a.to_lowercase() == value)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub searchable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            searchable: false,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn category(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Category(allowed))
    }

    pub const fn range(name: &'static str) -> Self {
        Self::new(name, FieldKind::Range)
    }

    pub const fn list(name: &'static str) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub const fn map(name: &'static str) -> Self {
        Self::new(name, FieldKind::Map)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn searchable(self) -> Self {
        Self {
            searchable: true,
            ..self
        }
    }
}

/// Brewing parameters shared by teas, blends and tisanes
pub const BREWING_PARAMETERS: &[FieldDef] = &[
    FieldDef::range("brew_temp_c"),
    FieldDef::range("brew_temp_f"),
    FieldDef::range("steep_time"),
    FieldDef::text("tea_water_ratio"),
];

/// Ordered field list for one record kind
#[derive(Debug, Clone)]
pub struct Schema {
    kind: RecordKind,
    primary: &'static str,
    sort_key: Option<&'static str>,
    fields: Vec<FieldDef>,
}

impl Schema {
    fn build(kind: RecordKind, primary: &'static str, groups: &[&[FieldDef]]) -> Self {
        Self {
            kind,
            primary,
            sort_key: None,
            fields: groups.iter().flat_map(|g| g.iter().copied()).collect(),
        }
    }

    fn sorted_by(mut self, field: &'static str) -> Self {
        self.sort_key = Some(field);
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Name of the field holding the record's display name
    pub fn primary(&self) -> &'static str {
        self.primary
    }

    /// Field the catalog is ordered by, if the kind is not kept in load order
    pub fn sort_key(&self) -> Option<&'static str> {
        self.sort_key
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look a field up, treating an unknown name as a caller error
    pub fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field(name).ok_or_else(|| {
            ExplorerError::invalid_query(format!(
                "field '{}' is not defined for {} records",
                name, self.kind
            ))
        })
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

static TEA: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Tea,
        "name",
        &[
            &[
                FieldDef::text("name").required().searchable(),
                FieldDef::category("category", TEA_CATEGORIES)
                    .required()
                    .searchable(),
                FieldDef::text("origin"),
                FieldDef::text("region").searchable(),
                FieldDef::text("processing"),
                FieldDef::text("oxidation"),
                FieldDef::text("flavor_profile").searchable(),
                FieldDef::text("aroma"),
                FieldDef::text("appearance"),
            ],
            BREWING_PARAMETERS,
            &[
                FieldDef::range("reinfusions"),
                FieldDef::text("caffeine_level"),
                FieldDef::text("health_benefits"),
                FieldDef::text("history"),
                FieldDef::text("price_range"),
                FieldDef::list("cultivars"),
            ],
        ],
    )
});

static BLEND: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Blend,
        "name",
        &[
            &[
                FieldDef::text("name").required().searchable(),
                FieldDef::text("category").required().searchable(),
                FieldDef::text("base_tea"),
                FieldDef::list("ingredients").searchable(),
                FieldDef::text("flavor_profile").searchable(),
                FieldDef::text("aroma"),
                FieldDef::text("appearance"),
            ],
            BREWING_PARAMETERS,
            &[
                FieldDef::text("caffeine_level"),
                FieldDef::text("health_benefits"),
                FieldDef::text("origin_region"),
                FieldDef::text("history"),
                FieldDef::text("price_range"),
                FieldDef::list("popular_brands"),
                FieldDef::text("description"),
                FieldDef::text("serving_suggestions"),
            ],
        ],
    )
});

static CULTIVAR: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Cultivar,
        "name",
        &[&[
            FieldDef::text("name").required().searchable(),
            FieldDef::text("species").required().searchable(),
            FieldDef::text("origin_country").searchable(),
            FieldDef::category("leaf_size", LEAF_SIZES),
            FieldDef::text("characteristics").searchable(),
            FieldDef::text("common_uses"),
            FieldDef::text("notes"),
        ]],
    )
});

static COMPANY: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Company,
        "name",
        &[&[
            FieldDef::text("name").required().searchable(),
            FieldDef::text("parent_company"),
            FieldDef::range("founded_year"),
            FieldDef::text("headquarters_city"),
            FieldDef::text("country").required().searchable(),
            FieldDef::text("website"),
            FieldDef::list("certifications"),
            FieldDef::text("market_segment"),
            FieldDef::text("description").searchable(),
        ]],
    )
});

static PRODUCT: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Product,
        "name",
        &[&[
            FieldDef::text("name").required().searchable(),
            FieldDef::text("company").required().searchable(),
            FieldDef::text("tea_type").searchable(),
            FieldDef::text("tea_category"),
            FieldDef::text("bag_type"),
            FieldDef::text("format"),
            FieldDef::text("quantity"),
            FieldDef::range("price"),
            FieldDef::text("price_currency"),
            FieldDef::list("countries_available"),
            FieldDef::text("organic"),
            FieldDef::text("fair_trade"),
            FieldDef::text("special_features"),
        ]],
    )
});

static TISANE: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Tisane,
        "name",
        &[
            &[
                FieldDef::text("name").required().searchable(),
                FieldDef::text("scientific_name").required().searchable(),
                FieldDef::text("plant_family").searchable(),
                FieldDef::map("common_names"),
                FieldDef::text("plant_part_used"),
                FieldDef::text("origin_region"),
                FieldDef::list("cultivation_countries"),
                FieldDef::text("tradition"),
                FieldDef::text("traditional_uses").searchable(),
                FieldDef::text("research_benefits"),
                FieldDef::list("key_compounds"),
                FieldDef::text("flavor_profile").searchable(),
                FieldDef::text("aroma"),
                FieldDef::text("appearance_dry"),
                FieldDef::text("appearance_brew"),
            ],
            BREWING_PARAMETERS,
            &[
                FieldDef::text("caffeine_content"),
                FieldDef::text("price_range"),
                FieldDef::text("availability"),
                FieldDef::category("risk_level", RISK_LEVELS),
                FieldDef::text("pregnancy_safety"),
                FieldDef::map("tcm_properties"),
                FieldDef::map("ayurvedic_properties"),
                FieldDef::text("cultural_significance"),
            ],
        ],
    )
});

static REGION: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::Region,
        "name",
        &[&[
            FieldDef::text("name").required().searchable(),
            FieldDef::text("country").required().searchable(),
            FieldDef::range("latitude"),
            FieldDef::range("longitude"),
            FieldDef::range("elevation"),
            FieldDef::text("climate").searchable(),
            FieldDef::list("famous_teas"),
            FieldDef::text("description"),
        ]],
    )
    .sorted_by("name")
});

static GLOSSARY_TERM: Lazy<Schema> = Lazy::new(|| {
    Schema::build(
        RecordKind::GlossaryTerm,
        "term",
        &[&[
            FieldDef::text("term").required().searchable(),
            FieldDef::text("definition").required().searchable(),
            FieldDef::text("category"),
            FieldDef::list("related_terms"),
        ]],
    )
    .sorted_by("term")
});
