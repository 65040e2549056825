//! Error types for the Assay library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rule with the same name is already registered for the table.
    #[error("Rule '{rule}' is already registered for table '{table}'")]
    DuplicateRule { table: String, rule: String },

    /// A rule definition is missing a field its rule type requires.
    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// A referenced column does not exist in the dataset.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column holds values of a type the operation cannot use.
    #[error("Type mismatch in column '{column}': expected {expected}")]
    TypeMismatch { column: String, expected: String },

    /// A column or mask does not match the dataset's row count.
    #[error("Length mismatch for '{column}': expected {expected} rows, got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A predicate or derivation failed while evaluating.
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Result type alias for Assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;
