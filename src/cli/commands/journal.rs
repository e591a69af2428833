use super::CommandHandler;
use crate::catalog::RecordKind;
use crate::cli::app::JournalCommands;
use crate::cli::context::{parse_selector, write_output, AppContext};
use crate::cli::output;
use crate::journal::{EntryUpdate, JournalEntry, NewEntry};
use crate::{ExplorerError, Result};
use std::io::Write;

/// Handler for the `journal` subcommands
pub struct JournalCommand<'a> {
    pub context: &'a AppContext,
    pub command: JournalCommands,
}

impl<'a> JournalCommand<'a> {
    pub fn new(context: &'a AppContext, command: JournalCommands) -> Self {
        Self { context, command }
    }

    fn add(
        &self,
        out: &mut dyn Write,
        kind: RecordKind,
        id: &str,
        rating: i64,
        brewing: &str,
        notes: &str,
    ) -> Result<()> {
        let set = self.context.open_catalog(&mut std::io::stderr())?;
        let record = set.get_by_id(kind, id)?;

        let mut store = self.context.journal();
        let entry = store.add(
            NewEntry::for_record(record, rating)
                .with_brewing(brewing)
                .with_notes(notes),
        )?;
        writeln!(
            out,
            "Added entry #{} for {} {}",
            entry.id,
            entry.record_name,
            entry.stars()
        )?;
        Ok(())
    }
}

impl CommandHandler for JournalCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        match &self.command {
            JournalCommands::Add {
                kind,
                id,
                rating,
                brewing,
                notes,
            } => self.add(out, *kind, id, *rating, brewing, notes),

            JournalCommands::List {
                limit,
                top,
                record,
                json,
            } => {
                let mut store = self.context.journal();
                let limit = limit.unwrap_or(usize::MAX);
                let entries: Vec<&JournalEntry> = match record {
                    Some(selector) => {
                        let record = parse_selector(selector, None)?;
                        let mut entries = store.for_record(&record)?;
                        entries.reverse();
                        entries.truncate(limit);
                        entries
                    }
                    None if *top => store.top_rated(limit)?,
                    None => store.recent(limit)?,
                };
                if *json {
                    output::write_json(out, &entries)
                } else {
                    output::render_entries(out, &entries)
                }
            }

            JournalCommands::Edit {
                entry,
                rating,
                brewing,
                notes,
            } => {
                let update = EntryUpdate {
                    rating: *rating,
                    brewing: brewing.clone(),
                    notes: notes.clone(),
                };
                if update.is_empty() {
                    return Err(ExplorerError::Journal(
                        "pass at least one of --rating, --brewing or --notes".to_string(),
                    ));
                }
                let updated = self.context.journal().update(*entry, update)?;
                writeln!(out, "Updated entry #{} {}", updated.id, updated.stars())?;
                Ok(())
            }

            JournalCommands::Delete { entry } => {
                let removed = self.context.journal().delete(*entry)?;
                writeln!(out, "Deleted entry #{} ({})", removed.id, removed.record_name)?;
                Ok(())
            }

            JournalCommands::Search { query } => {
                let mut store = self.context.journal();
                let entries = store.search(query)?;
                output::render_entries(out, &entries)
            }

            JournalCommands::Stats { json } => {
                let stats = self.context.journal().stats()?;
                if *json {
                    output::write_json(out, &stats)
                } else {
                    output::render_stats(out, &stats)
                }
            }

            JournalCommands::Export { format, output } => {
                let bytes = self.context.journal().export(*format)?;
                write_output(&bytes, output.as_deref(), out)
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.command {
            JournalCommands::Add { .. } => "journal add",
            JournalCommands::List { .. } => "journal list",
            JournalCommands::Edit { .. } => "journal edit",
            JournalCommands::Delete { .. } => "journal delete",
            JournalCommands::Search { .. } => "journal search",
            JournalCommands::Stats { .. } => "journal stats",
            JournalCommands::Export { .. } => "journal export",
        }
    }
}
