//! Error types for the finance ledger.

use crate::money::Amount;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operation.
///
/// Every variant is recoverable; callers report it and carry on.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open or read the data file
    #[error("cannot read {}: {}", path.display(), source)]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to open or write the data file
    #[error("cannot write {}: {}", path.display(), source)]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV stream error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output stream error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Position does not address a transaction
    #[error("index {index} is out of range (ledger holds {len} transactions)")]
    IndexOutOfRange { index: i64, len: usize },

    /// Budget category was blank
    #[error("category cannot be empty")]
    EmptyCategory,

    /// Budget limit below zero
    #[error("limit cannot be negative: {0}")]
    NegativeLimit(Amount),

    /// Argument does not match the required shape
    #[error("invalid format {got:?}, must be {expected}")]
    InvalidFormat { expected: &'static str, got: String },

    /// Budget check requested with no budgets
    #[error("no budgets defined")]
    NoBudgetsDefined,

    /// Date failed validation
    #[error("invalid date {0:?}, must be YYYY-MM-DD")]
    InvalidDate(String),

    /// Amount failed validation
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}
