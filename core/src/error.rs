//! Error types for rowdelta

use thiserror::Error;

/// Which input table an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    New,
    Old,
    Both,
}

impl std::fmt::Display for TableSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableSide::New => write!(f, "new table"),
            TableSide::Old => write!(f, "old table"),
            TableSide::Both => write!(f, "new and old tables"),
        }
    }
}

/// Main error type for rowdelta operations
#[derive(Error, Debug)]
pub enum RowdeltaError {
    #[error("Key column '{column}' not found in {side}")]
    MissingKeyColumn { column: String, side: TableSide },

    #[error("Invalid table shape: {0}")]
    InvalidTableShape(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data processing error: {0}")]
    DataProcessing(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl RowdeltaError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidTableShape(msg.into())
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RowdeltaError>;
