//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input has no header row.
    #[error("input has no header row")]
    EmptyInput,

    /// A required input column is missing.
    #[error("required column missing: {column}")]
    Schema { column: String },

    /// One input row could not be parsed. Recovered by skipping the row;
    /// surfaced to callers only as a count.
    #[error("cannot parse row {line}: {reason}")]
    RowParse { line: usize, reason: String },

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] mdtrack_core::Error),
}
