//! Reference Catalog Engine
//!
//! Read-only catalogs of typed records with list, filter, search, lookup,
//! comparison, recommendations and export. A catalog set is built once from data files and
//! replaced wholesale on reload.

pub mod compare;
pub mod export;
pub mod index;
pub mod loader;
pub mod query;
pub mod recommend;
pub mod record;
pub mod schema;
pub mod value;

pub use compare::{Comparison, FieldComparison, DEFAULT_MAX_COMPARISON};
pub use export::ExportFormat;
pub use index::{Catalog, CatalogHandle, CatalogSet};
pub use loader::{CatalogLoader, CatalogSource, LoadMode, LoadReport, SkippedRecord};
pub use query::Predicate;
pub use recommend::{Recommendation, Strategy, DEFAULT_RECOMMENDATIONS, LIKED_RATING};
pub use record::{BrewingParameters, Record};
pub use schema::{FieldDef, FieldKind, RecordKind, Schema};
pub use value::{FieldValue, NumericRange};
