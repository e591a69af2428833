use super::CommandHandler;
use crate::catalog::RecordKind;
use crate::cli::context::{parse_selector, AppContext};
use crate::cli::output;
use crate::Result;
use std::io::Write;

/// Handler for the `compare` command
pub struct CompareCommand<'a> {
    pub context: &'a AppContext,
    pub selectors: Vec<String>,
    pub kind: Option<RecordKind>,
    pub differences: bool,
    pub json: bool,
}

impl<'a> CompareCommand<'a> {
    pub fn new(
        context: &'a AppContext,
        selectors: Vec<String>,
        kind: Option<RecordKind>,
        differences: bool,
        json: bool,
    ) -> Self {
        Self {
            context,
            selectors,
            kind,
            differences,
            json,
        }
    }
}

impl CommandHandler for CompareCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let selection = self
            .selectors
            .iter()
            .map(|s| parse_selector(s, self.kind).map(|r| (r.kind, r.id)))
            .collect::<Result<Vec<_>>>()?;

        let set = self.context.open_catalog(&mut std::io::stderr())?;
        let comparison = set.compare(&selection, self.context.max_comparison_items())?;

        if self.json {
            output::write_json(out, &comparison)
        } else {
            output::render_comparison(out, &comparison, self.differences)
        }
    }

    fn name(&self) -> &'static str {
        "compare"
    }
}
