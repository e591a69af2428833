use crate::catalog::{LoadMode, DEFAULT_MAX_COMPARISON};
use crate::io::paths::ExplorerPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest and largest accepted `features.max_comparison_items`
pub const COMPARISON_LIMITS: (usize, usize) = (2, 10);

/// Root of `tea-explorer.yaml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub journal: JournalConfig,
    pub features: FeatureConfig,
    pub logging: LoggingConfig,
}

/// Reference data files and how strictly to load them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Data files in load order; relative paths are relative to the config file
    pub sources: Vec<PathBuf>,
    pub load_mode: LoadMode,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                PathBuf::from("data/teas.yaml"),
                PathBuf::from("data/tisanes.yaml"),
            ],
            load_mode: LoadMode::Strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Journal file; the platform data directory is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub max_comparison_items: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_comparison_items: DEFAULT_MAX_COMPARISON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tea_explorer=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Journal location, falling back to the platform data directory
    pub fn journal_path(&self, paths: &ExplorerPaths) -> PathBuf {
        self.journal
            .path
            .clone()
            .unwrap_or_else(|| paths.journal_file())
    }
}
