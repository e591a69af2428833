use super::browse::parse_conditions;
use super::CommandHandler;
use crate::catalog::{ExportFormat, Record, RecordKind};
use crate::cli::context::{write_output, AppContext};
use crate::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Handler for the `export` command
pub struct ExportCommand<'a> {
    pub context: &'a AppContext,
    pub kind: RecordKind,
    pub conditions: Vec<String>,
    pub search: Option<String>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
}

impl<'a> ExportCommand<'a> {
    pub fn new(
        context: &'a AppContext,
        kind: RecordKind,
        conditions: Vec<String>,
        search: Option<String>,
        format: ExportFormat,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            context,
            kind,
            conditions,
            search,
            format,
            output,
        }
    }
}

impl CommandHandler for ExportCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let predicates = parse_conditions(self.kind, &self.conditions)?;
        let set = self.context.open_catalog(&mut std::io::stderr())?;

        let mut records: Vec<&Record> = set.filter(self.kind, &predicates)?;
        if let Some(text) = &self.search {
            let hits = set.search(self.kind, text);
            // keep search ranking, restricted to the filtered records
            records = hits.into_iter().filter(|r| records.contains(r)).collect();
        }

        let bytes = set.export(self.kind, &records, self.format)?;
        write_output(&bytes, self.output.as_deref(), out)?;
        info!(kind = %self.kind, records = records.len(), format = %self.format, "Export complete");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "export"
    }
}
