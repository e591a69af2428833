use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tea_explorer::{
    cli::commands::{
        browse::{BrowseCommand, BrowseQuery},
        compare::CompareCommand,
        export::ExportCommand,
        journal::JournalCommand,
        recommend::RecommendCommand,
        validate::ValidateCommand,
        CommandHandler,
    },
    cli::context::user_message,
    cli::{AppContext, Cli, Commands},
    ExplorerError,
};

/// Filter requested on the command line or through `RUST_LOG`
fn requested_filter(cli: &Cli) -> Option<EnvFilter> {
    match cli.log_level {
        Some(level) => Some(EnvFilter::new(level.to_filter_directive())),
        None => EnvFilter::try_from_default_env().ok(),
    }
}

/// Initialize tracing
///
/// Logs always go to stderr so command output on stdout stays clean.
fn initialize_tracing(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // `--log-level` wins, then `RUST_LOG`; both are known before the config is
    // read, so config discovery is logged too. Only `logging.level` from the
    // config has to wait for the config itself.
    let requested = requested_filter(&cli);
    let from_config = requested.is_none();
    if let Some(filter) = requested {
        initialize_tracing(filter);
    }

    let context = AppContext::from_cli(&cli)?;
    if from_config {
        initialize_tracing(EnvFilter::new(&context.config.logging.level));
    }
    debug!(
        command = cli.command.name(),
        config = ?context.origin,
        sources = ?context.config.data.sources,
        "Starting"
    );

    let handler: Box<dyn CommandHandler + '_> = match cli.command {
        Commands::List { kind, json } => {
            Box::new(BrowseCommand::new(&context, kind, BrowseQuery::List, json))
        }
        Commands::Filter {
            kind,
            conditions,
            json,
        } => Box::new(BrowseCommand::new(
            &context,
            kind,
            BrowseQuery::Filter(conditions),
            json,
        )),
        Commands::Search { kind, query, json } => Box::new(BrowseCommand::new(
            &context,
            kind,
            BrowseQuery::Search(query),
            json,
        )),
        Commands::Show { kind, id, json } => {
            Box::new(BrowseCommand::new(&context, kind, BrowseQuery::Show(id), json))
        }
        Commands::Compare {
            records,
            kind,
            differences,
            json,
        } => Box::new(CompareCommand::new(&context, records, kind, differences, json)),
        Commands::Export {
            kind,
            conditions,
            search,
            format,
            output,
        } => Box::new(ExportCommand::new(
            &context, kind, conditions, search, format, output,
        )),
        Commands::Facets { kind, field, json } => Box::new(BrowseCommand::new(
            &context,
            kind,
            BrowseQuery::Facets(field),
            json,
        )),
        Commands::Recommend { strategy } => Box::new(RecommendCommand::new(&context, strategy)),
        Commands::Validate { json } => Box::new(ValidateCommand::new(&context, json)),
        Commands::Journal { command } => Box::new(JournalCommand::new(&context, command)),
    };

    debug!(command = handler.name(), "Executing command");
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    handler.execute(&mut out)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ExplorerError>() {
                Some(explorer_error) => eprintln!("error: {}", user_message(explorer_error)),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
