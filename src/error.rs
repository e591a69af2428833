use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Cannot open reference data {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Schema violation in {kind} record '{record}', field '{field}': {reason}")]
    SchemaViolation {
        kind: String,
        record: String,
        field: String,
        reason: String,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No {kind} with id '{id}'")]
    NotFound { kind: String, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Journal error: {0}")]
    Journal(String),

    #[error("Path error: {0}")]
    Path(String),
}

impl ExplorerError {
    /// Shorthand for building an `InvalidQuery` from anything displayable
    pub fn invalid_query(message: impl Into<String>) -> Self {
        ExplorerError::InvalidQuery(message.into())
    }

    /// True for `NotFound`, so callers can tell a miss from a broken record
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExplorerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
