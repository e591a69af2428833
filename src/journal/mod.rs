//! Tasting journal
//!
//! Entries point at catalog records weakly and are persisted separately from
//! the read-only reference data.

pub mod store;
pub mod types;

pub use store::JournalStore;
pub use types::{EntryUpdate, JournalEntry, JournalStats, NewEntry, RecordRef};
