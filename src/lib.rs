//! Gordian - Candidate-key discovery for tabular datasets.
//!
//! Given only data, finds the minimal column combinations whose values
//! identify every row (candidate keys) and the maximal combinations that do
//! not.
//!
//! ## Pipeline
//!
//! - **Ingestion** (`format`): CSV, TSV and JSON records into a `Dataset`.
//! - **Trie** (`trie`, `paths`): shared prefix tree over normalized rows,
//!   with membership checks and decoding of distinct rows.
//! - **Search** (`combinations`, `classifier`): frequency-counting sweep
//!   over column combinations of decreasing arity, parallel per arity.
//! - **Reporting** (`report`): text and JSON rendering for the CLI.

pub mod classifier;
pub mod combinations;
pub mod dataset;
pub mod error;
pub mod format;
pub mod paths;
pub mod report;
pub mod trie;

pub use classifier::{classify, Classification, ColumnCombination, KeySearch, Strategy};
pub use dataset::{Dataset, Row};
pub use error::{AnalysisError, IngestError};
