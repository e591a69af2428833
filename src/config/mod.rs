//! Application configuration (`tea-explorer.yaml` plus environment overrides)

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, LoadedConfig};
pub use types::{AppConfig, DataConfig, FeatureConfig, JournalConfig, LoggingConfig};
