use super::CommandHandler;
use crate::catalog::CatalogLoader;
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::Result;
use std::io::Write;

/// Handler for the `validate` command
pub struct ValidateCommand<'a> {
    pub context: &'a AppContext,
    pub json: bool,
}

impl<'a> ValidateCommand<'a> {
    pub fn new(context: &'a AppContext, json: bool) -> Self {
        Self { context, json }
    }
}

impl CommandHandler for ValidateCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let loader = CatalogLoader::new(self.context.config.data.load_mode);
        let set = loader.load(&self.context.source())?;

        if self.json {
            output::write_json(out, set.report())
        } else {
            output::render_report(out, set.report())
        }
    }

    fn name(&self) -> &'static str {
        "validate"
    }
}
