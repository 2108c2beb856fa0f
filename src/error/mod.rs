//! Error handling for the adherence pipeline.

use thiserror::Error;

/// Errors raised while loading CDM data or computing adherence
#[derive(Debug, Error)]
pub enum AdherenceError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error processing Arrow record batches
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing a JSON configuration file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is missing from a record batch
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column exists but holds an unexpected Arrow type
    #[error("Invalid data type for column '{column}', expected {expected}")]
    InvalidDataType {
        /// Name of the offending column
        column: String,
        /// Description of the expected array type
        expected: String,
    },

    /// The analysis configuration fails validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Contextual error from IO glue code
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for adherence pipeline operations
pub type Result<T> = std::result::Result<T, AdherenceError>;
