use super::app::Cli;
use crate::catalog::{CatalogHandle, CatalogLoader, CatalogSet, CatalogSource, LoadMode, RecordKind};
use crate::config::{AppConfig, ConfigLoader};
use crate::io::paths::{ExplorerPaths, PathUtils};
use crate::journal::{JournalStore, RecordRef};
use crate::{ExplorerError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a command needs: resolved configuration and where things live
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub paths: ExplorerPaths,
    /// Config file in effect, if any
    pub origin: Option<PathBuf>,
}

impl AppContext {
    pub fn new(config: AppConfig, paths: ExplorerPaths) -> Self {
        Self {
            config,
            paths,
            origin: None,
        }
    }

    /// Load the configuration and apply command-line overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let loader = ConfigLoader::new().with_config_file(cli.config.clone());
        let loaded = loader.load()?;
        let mut context = Self {
            config: loaded.config,
            paths: loader.paths().clone(),
            origin: loaded.origin,
        };
        context.apply_overrides(cli)?;
        Ok(context)
    }

    fn apply_overrides(&mut self, cli: &Cli) -> Result<()> {
        let cwd = std::env::current_dir()?;
        if !cli.data.is_empty() {
            self.config.data.sources = cli
                .data
                .iter()
                .map(|p| PathUtils::resolve(&cwd, p))
                .collect();
        }
        if cli.lenient {
            self.config.data.load_mode = LoadMode::Lenient;
        }
        if let Some(journal) = &cli.journal_file {
            self.config.journal.path = Some(PathUtils::resolve(&cwd, journal));
        }
        if let Some(level) = cli.log_level {
            self.config.logging.level = level.to_filter_directive().to_string();
        }
        ConfigLoader::validate(&self.config)
    }

    pub fn source(&self) -> CatalogSource {
        CatalogSource::new(self.config.data.sources.iter().cloned())
    }

    /// Load the reference data
    ///
    /// A partial (lenient) load is announced on `warnings` before any
    /// browsing output is produced.
    pub fn open_catalog(&self, warnings: &mut dyn Write) -> Result<Arc<CatalogSet>> {
        let handle = CatalogHandle::open(
            CatalogLoader::new(self.config.data.load_mode),
            self.source(),
        )?;
        let set = handle.snapshot();
        let report = set.report();

        if report.is_partial() {
            warn!(skipped = report.skipped.len(), "Reference catalog is partial");
            writeln!(
                warnings,
                "warning: reference data is partial, {} record(s) skipped (run `tea-explorer validate --lenient` for details)",
                report.skipped.len()
            )?;
        }
        info!(records = report.total_loaded(), "Reference catalog ready");
        Ok(set)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.config.journal_path(&self.paths)
    }

    pub fn journal(&self) -> JournalStore {
        JournalStore::new(self.journal_path())
    }

    pub fn max_comparison_items(&self) -> usize {
        self.config.features.max_comparison_items
    }
}

/// Parse `kind:id`, or a bare id when a default kind is given
pub fn parse_selector(selector: &str, default_kind: Option<RecordKind>) -> Result<RecordRef> {
    match selector.split_once(':') {
        Some((kind, id)) if !id.trim().is_empty() => Ok(RecordRef::new(kind.parse()?, id.trim())),
        Some(_) => Err(ExplorerError::invalid_query(format!(
            "'{}' does not name a record id",
            selector
        ))),
        None => {
            let kind = default_kind.ok_or_else(|| {
                ExplorerError::invalid_query(format!(
                    "'{}' needs a kind, write it as kind:id or pass --kind",
                    selector
                ))
            })?;
            Ok(RecordRef::new(kind, selector.trim()))
        }
    }
}

/// Write `bytes` to a file, or to `stdout` when no path is given
pub fn write_output(bytes: &[u8], output: Option<&Path>, stdout: &mut dyn Write) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, bytes)?;
            info!(path = %path.display(), bytes = bytes.len(), "Wrote export");
        }
        None => stdout.write_all(bytes)?,
    }
    Ok(())
}

/// One-line message for the terminal, by error kind
pub fn user_message(error: &ExplorerError) -> String {
    match error {
        ExplorerError::SourceUnavailable { .. } | ExplorerError::SchemaViolation { .. } => {
            format!("cannot open reference data: {}", error)
        }
        ExplorerError::NotFound { kind, id } => format!("no such item: {} '{}'", kind, id),
        ExplorerError::InvalidQuery(message) => format!("invalid query: {}", message),
        other => other.to_string(),
    }
}
