use super::types::{AppConfig, COMPARISON_LIMITS};
use crate::io::paths::{ExplorerPaths, PathUtils, CONFIG_FILE_NAME};
use crate::{ExplorerError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const ENV_SOURCES: &str = "TEA_EXPLORER_SOURCES";
pub const ENV_LOAD_MODE: &str = "TEA_EXPLORER_LOAD_MODE";
pub const ENV_JOURNAL: &str = "TEA_EXPLORER_JOURNAL";
pub const ENV_MAX_COMPARE: &str = "TEA_EXPLORER_MAX_COMPARE";
pub const ENV_LOG_LEVEL: &str = "TEA_EXPLORER_LOG_LEVEL";

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Configuration together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// `None` when no file was found and defaults are in effect
    pub origin: Option<PathBuf>,
}

/// Finds, reads and validates `tea-explorer.yaml`
///
/// Lookup order: an explicit path, `./tea-explorer.yaml`, the platform config
/// directory, then built-in defaults. Environment variables override whatever
/// the file says.
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
    working_dir: PathBuf,
    paths: ExplorerPaths,
    env: EnvLookup,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit: None,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            paths: ExplorerPaths::default(),
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Use this file instead of searching; it must exist
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_paths(mut self, paths: ExplorerPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Replace the process environment, mainly for tests
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn paths(&self) -> &ExplorerPaths {
        &self.paths
    }

    pub fn load(&self) -> Result<LoadedConfig> {
        let origin = self.locate()?;

        let mut config = match &origin {
            Some(path) => {
                let mut config = Self::read_file(path)?;
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                config.data.sources = config
                    .data
                    .sources
                    .iter()
                    .map(|source| PathUtils::resolve(base, source))
                    .collect();
                config.journal.path = config
                    .journal
                    .path
                    .as_deref()
                    .map(|journal| PathUtils::resolve(base, journal));
                config
            }
            None => {
                let mut config = AppConfig::default();
                config.data.sources = config
                    .data
                    .sources
                    .iter()
                    .map(|source| PathUtils::resolve(&self.working_dir, source))
                    .collect();
                config
            }
        };

        self.apply_env_overrides(&mut config)?;
        Self::validate(&config)?;

        debug!(
            origin = ?origin,
            sources = config.data.sources.len(),
            load_mode = %config.data.load_mode,
            "Configuration loaded"
        );
        Ok(LoadedConfig { config, origin })
    }

    fn locate(&self) -> Result<Option<PathBuf>> {
        if let Some(explicit) = &self.explicit {
            let path = PathUtils::resolve(&self.working_dir, explicit);
            if !path.is_file() {
                return Err(ExplorerError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let candidates = [self.working_dir.join(CONFIG_FILE_NAME), self.paths.config_file()];
        Ok(candidates.into_iter().find(|candidate| candidate.is_file()))
    }

    fn read_file(path: &Path) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExplorerError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        if contents.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml_ng::from_str(&contents).map_err(|e| {
            ExplorerError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(sources) = (self.env)(ENV_SOURCES) {
            let sources = PathUtils::split_list(&sources);
            if !sources.is_empty() {
                config.data.sources = sources
                    .iter()
                    .map(|source| PathUtils::resolve(&self.working_dir, source))
                    .collect();
            }
        }
        if let Some(mode) = (self.env)(ENV_LOAD_MODE) {
            config.data.load_mode = mode.parse()?;
        }
        if let Some(journal) = (self.env)(ENV_JOURNAL) {
            config.journal.path = Some(PathUtils::resolve(&self.working_dir, Path::new(&journal)));
        }
        if let Some(max) = (self.env)(ENV_MAX_COMPARE) {
            config.features.max_comparison_items = max.trim().parse().map_err(|_| {
                ExplorerError::Config(format!("{} must be a whole number, got '{}'", ENV_MAX_COMPARE, max))
            })?;
        }
        if let Some(level) = (self.env)(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        Ok(())
    }

    /// Reject settings the application cannot run with
    pub fn validate(config: &AppConfig) -> Result<()> {
        if config.data.sources.is_empty() {
            return Err(ExplorerError::Config(
                "data.sources must name at least one data file".to_string(),
            ));
        }

        let (min, max) = COMPARISON_LIMITS;
        let items = config.features.max_comparison_items;
        if !(min..=max).contains(&items) {
            return Err(ExplorerError::Config(format!(
                "features.max_comparison_items must be between {} and {}, got {}",
                min, max, items
            )));
        }

        EnvFilter::try_new(&config.logging.level).map_err(|e| {
            ExplorerError::Config(format!(
                "Invalid logging.level '{}': {}",
                config.logging.level, e
            ))
        })?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
