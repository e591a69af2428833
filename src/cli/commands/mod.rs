pub mod browse;
pub mod compare;
pub mod export;
pub mod journal;
pub mod recommend;
pub mod validate;

use crate::Result;
use std::io::Write;

/// Common trait for all command handlers
pub trait CommandHandler {
    /// Execute the command, writing its output to `out`
    fn execute(&self, out: &mut dyn Write) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}
