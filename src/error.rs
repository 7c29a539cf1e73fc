//! Gordian - Error taxonomy
//!
//! Analysis errors (structural problems with the table handed to the core)
//! are kept apart from ingestion errors (the file could not be turned into a
//! table at all), so callers never confuse a bad input file with a valid
//! dataset that simply has no candidate key.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the trie builder and the key search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Zero rows were given; no trie can represent candidate keys.
    #[error("dataset has no rows")]
    EmptyDataset,

    /// A row's length does not match the column schema.
    #[error("row {row} has {found} values but the schema has {expected} columns")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Two columns in the schema share a name.
    #[error("duplicate column name in schema: {name}")]
    DuplicateColumn { name: String },

    /// An arity cap that would leave nothing to evaluate.
    #[error("max arity must be at least 1, got {max_arity}")]
    InvalidMaxArity { max_arity: usize },

    /// The selected strategy has no implementation.
    #[error("classification strategy '{strategy}' is not implemented")]
    StrategyUnavailable { strategy: String },
}

/// Errors raised while loading a file into a [`Dataset`](crate::dataset::Dataset).
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("unsupported input format: {} (expected .csv, .tsv or .json)", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON document is an object without the expected records member.
    #[error("JSON document has no '{key}' array of records")]
    MissingDatasetKey { key: String },

    /// A JSON record is not an object.
    #[error("JSON record {index} is not an object")]
    InvalidRecord { index: usize },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
