use crate::catalog::{ExportFormat, RecordKind, DEFAULT_RECOMMENDATIONS, LIKED_RATING};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tea-explorer: browse a reference catalog of teas and keep a tasting journal
#[derive(Parser, Debug)]
#[command(name = "tea-explorer")]
#[command(version)]
#[command(about = "Browse a reference catalog of teas, blends and tisanes")]
#[command(
    long_about = "tea-explorer loads reference data (teas, blends, cultivars, companies, products, tisanes, regions and glossary terms) from YAML or JSON files and answers list, filter, search, compare and export queries. Tasting notes are kept in a separate journal file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ./tea-explorer.yaml, then the user config dir)
    #[arg(long, global = true, env = "TEA_EXPLORER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data files to load instead of the configured sources
    #[arg(long = "data", global = true)]
    pub data: Vec<PathBuf>,

    /// Skip malformed records instead of refusing to load
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Journal file to use instead of the configured one
    #[arg(long, global = true)]
    pub journal_file: Option<PathBuf>,

    /// Log level (overrides logging.level from the config)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every record of a kind
    List {
        /// Record kind (tea, blend, cultivar, company, product, tisane, region, glossary)
        kind: RecordKind,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List records matching all `field=value` conditions
    Filter {
        kind: RecordKind,

        /// Condition such as `category=Green`, `brew_temp_c=70..80` or `cultivars=Yabukita`
        #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE", required = true)]
        conditions: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Search names and descriptive fields
    Search {
        kind: RecordKind,

        /// Text to look for; empty lists everything
        #[arg(default_value = "")]
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Show one record in full
    Show {
        kind: RecordKind,

        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Compare records of one kind side by side
    Compare {
        /// Records as `kind:id`, or bare ids together with --kind
        #[arg(required = true)]
        records: Vec<String>,

        /// Kind for selectors given without a `kind:` prefix
        #[arg(short, long)]
        kind: Option<RecordKind>,

        /// Only show fields whose values differ
        #[arg(long)]
        differences: bool,

        #[arg(long)]
        json: bool,
    },

    /// Export records to CSV or JSON
    Export {
        kind: RecordKind,

        /// Restrict to records matching `field=value`
        #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE")]
        conditions: Vec<String>,

        /// Restrict to search results (applied after --where)
        #[arg(short, long)]
        search: Option<String>,

        /// Output format (csv, json)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Distinct values of a field, e.g. every tea category or origin
    Facets {
        kind: RecordKind,

        field: String,

        #[arg(long)]
        json: bool,
    },

    /// Suggest records to try
    Recommend {
        #[command(subcommand)]
        strategy: RecommendCommands,
    },

    /// Load the reference data and report what was loaded
    Validate {
        #[arg(long)]
        json: bool,
    },

    /// Tasting journal
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    /// Record a tasting note for a catalog record
    Add {
        kind: RecordKind,

        id: String,

        /// Rating from 1 to 5
        #[arg(short, long, allow_negative_numbers = true)]
        rating: i64,

        /// How it was brewed
        #[arg(short, long, default_value = "")]
        brewing: String,

        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// List entries, newest first
    List {
        /// Maximum number of entries
        #[arg(short, long)]
        limit: Option<usize>,

        /// Order by rating instead of date
        #[arg(long)]
        top: bool,

        /// Only entries about this record (`kind:id`)
        #[arg(long)]
        record: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Change the rating, brewing or notes of an entry
    Edit {
        entry: u64,

        #[arg(short, long, allow_negative_numbers = true)]
        rating: Option<i64>,

        #[arg(short, long)]
        brewing: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an entry
    Delete { entry: u64 },

    /// Search record names, brewing and notes
    Search { query: String },

    /// Summary of the journal
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Export every entry
    Export {
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Options shared by every recommendation strategy
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    /// Maximum number of suggestions
    #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATIONS)]
    pub limit: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum RecommendCommands {
    /// Records resembling one record
    Similar {
        kind: RecordKind,

        id: String,

        #[command(flatten)]
        options: RecommendOptions,
    },

    /// Records resembling the ones you rated highly
    Rated {
        #[arg(default_value = "tea")]
        kind: RecordKind,

        /// Lowest journal rating that counts as liked
        #[arg(long, default_value_t = LIKED_RATING)]
        min_rating: u8,

        #[command(flatten)]
        options: RecommendOptions,
    },

    /// Records of one category
    Category {
        kind: RecordKind,

        value: String,

        #[command(flatten)]
        options: RecommendOptions,
    },

    /// Records from one origin country
    Origin {
        kind: RecordKind,

        country: String,

        #[command(flatten)]
        options: RecommendOptions,
    },

    /// Approachable records for newcomers
    Beginner {
        #[arg(default_value = "tea")]
        kind: RecordKind,

        #[command(flatten)]
        options: RecommendOptions,
    },

    /// Untried records matching what you liked so far
    Next {
        #[arg(default_value = "tea")]
        kind: RecordKind,

        #[command(flatten)]
        options: RecommendOptions,
    },
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::List { .. } => "list",
            Commands::Filter { .. } => "filter",
            Commands::Search { .. } => "search",
            Commands::Show { .. } => "show",
            Commands::Compare { .. } => "compare",
            Commands::Export { .. } => "export",
            Commands::Facets { .. } => "facets",
            Commands::Recommend { .. } => "recommend",
            Commands::Validate { .. } => "validate",
            Commands::Journal { .. } => "journal",
        }
    }
}
