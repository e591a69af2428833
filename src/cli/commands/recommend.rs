use super::CommandHandler;
use crate::catalog::{RecordKind, Strategy};
use crate::cli::app::{RecommendCommands, RecommendOptions};
use crate::cli::context::AppContext;
use crate::cli::output;
use crate::journal::JournalEntry;
use crate::Result;
use std::io::Write;

/// Handler for the `recommend` subcommands
pub struct RecommendCommand<'a> {
    pub context: &'a AppContext,
    pub command: RecommendCommands,
}

impl<'a> RecommendCommand<'a> {
    pub fn new(context: &'a AppContext, command: RecommendCommands) -> Self {
        Self { context, command }
    }

    fn plan(&self) -> (RecordKind, Strategy, &RecommendOptions) {
        match &self.command {
            RecommendCommands::Similar { kind, id, options } => {
                (*kind, Strategy::SimilarTo { id: id.clone() }, options)
            }
            RecommendCommands::Rated {
                kind,
                min_rating,
                options,
            } => (
                *kind,
                Strategy::FromRatings {
                    min_rating: *min_rating,
                },
                options,
            ),
            RecommendCommands::Category {
                kind,
                value,
                options,
            } => (
                *kind,
                Strategy::Category {
                    value: value.clone(),
                },
                options,
            ),
            RecommendCommands::Origin {
                kind,
                country,
                options,
            } => (
                *kind,
                Strategy::Origin {
                    value: country.clone(),
                },
                options,
            ),
            RecommendCommands::Beginner { kind, options } => (*kind, Strategy::Beginner, options),
            RecommendCommands::Next { kind, options } => (*kind, Strategy::TryNext, options),
        }
    }

    /// Strategies that read the tasting journal
    fn uses_journal(strategy: &Strategy) -> bool {
        matches!(strategy, Strategy::FromRatings { .. } | Strategy::TryNext)
    }
}

impl CommandHandler for RecommendCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<()> {
        let (kind, strategy, options) = self.plan();
        let set = self.context.open_catalog(&mut std::io::stderr())?;

        let mut store = self.context.journal();
        let journal: &[JournalEntry] = if Self::uses_journal(&strategy) {
            store.all()?
        } else {
            &[]
        };

        let suggestions = set.recommend(kind, &strategy, journal, options.limit)?;
        if options.json {
            output::write_json(out, &suggestions)
        } else {
            output::render_recommendations(out, kind, &suggestions)
        }
    }

    fn name(&self) -> &'static str {
        match self.command {
            RecommendCommands::Similar { .. } => "recommend similar",
            RecommendCommands::Rated { .. } => "recommend rated",
            RecommendCommands::Category { .. } => "recommend category",
            RecommendCommands::Origin { .. } => "recommend origin",
            RecommendCommands::Beginner { .. } => "recommend beginner",
            RecommendCommands::Next { .. } => "recommend next",
        }
    }
}
