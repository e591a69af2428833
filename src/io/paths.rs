use crate::{ExplorerError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working and config dirs
pub const CONFIG_FILE_NAME: &str = "tea-explorer.yaml";

/// Default journal file name
pub const JOURNAL_FILE_NAME: &str = "tea_journal.json";

/// Platform locations for configuration and user data
#[derive(Debug, Clone)]
pub struct ExplorerPaths {
    /// Where `tea-explorer.yaml` lives
    pub config_dir: PathBuf,
    /// Where the journal lives unless configured otherwise
    pub data_dir: PathBuf,
}

impl ExplorerPaths {
    /// Create new paths instance using standard directories
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "tea-explorer").ok_or_else(|| {
            ExplorerError::Path("Failed to determine project directories".to_string())
        })?;

        Ok(Self {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        })
    }

    /// Keep everything inside one directory
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            config_dir: project_root.to_path_buf(),
            data_dir: project_root.to_path_buf(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn journal_file(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE_NAME)
    }
}

impl Default for ExplorerPaths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            // Fallback to current directory if platform directories fail
            let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Self::for_project(&current_dir)
        })
    }
}

/// Utilities for working with paths
pub struct PathUtils;

impl PathUtils {
    /// Resolve `path` against `base` unless it is already absolute
    pub fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    /// Split a list of paths in the platform's `PATH` syntax
    pub fn split_list(value: &str) -> Vec<PathBuf> {
        std::env::split_paths(value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }
}
