//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Record has more fields than a worksheet can hold
    #[error("Row {row} has {fields} fields, more than the {max} column limit")]
    TooManyFields { row: usize, fields: usize, max: u16 },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetblocks_core::Error),
}
