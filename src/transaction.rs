//! Transaction model and its data-file row form.

use crate::error::{LedgerError, Result};
use crate::money::Amount;
use crate::validate::{trim, validate_date};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Category assigned when the user leaves it blank.
pub const DEFAULT_CATEGORY: &str = "Miscellaneous";

/// A single dated money movement.
///
/// Transactions are immutable once built and have no identity of their own;
/// the ledger addresses them by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    date: String,
    category: String,
    amount: Amount,
    description: String,
}

impl Transaction {
    /// Builds a transaction from already-checked parts.
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        amount: Amount,
        description: impl Into<String>,
    ) -> Self {
        Transaction {
            date: date.into(),
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    /// Builds a transaction from raw user input.
    ///
    /// The date must pass [`validate_date`] and the amount must be a single
    /// numeric literal. A blank category becomes [`DEFAULT_CATEGORY`].
    pub fn from_input(date: &str, category: &str, amount: &str, description: &str) -> Result<Self> {
        if !validate_date(date) {
            return Err(LedgerError::InvalidDate(date.to_string()));
        }

        let amount =
            Amount::from_str(amount).map_err(|_| LedgerError::InvalidAmount(amount.to_string()))?;

        let category = match trim(category) {
            "" => DEFAULT_CATEGORY,
            c => c,
        };

        Ok(Transaction::new(date, category, amount, description))
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` for expenses (negative amounts).
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// Row form written to the data file.
    pub(crate) fn to_row(&self) -> TransactionRow<'_> {
        TransactionRow {
            date: &self.date,
            category: &self.category,
            amount: self.amount,
            description: self.description.replace(',', ";"),
        }
    }
}

impl fmt::Display for Transaction {
    /// Fixed-width rendering shared by listings and search results.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} | {:>15} | {:>10} | {}",
            self.date, self.category, self.amount, self.description
        )
    }
}

/// One line of the data file: `date,category,amount,description`.
///
/// Commas in the description become semicolons so the line always splits
/// into four fields. Categories are written verbatim.
#[derive(Debug, Serialize)]
pub(crate) struct TransactionRow<'a> {
    pub date: &'a str,
    pub category: &'a str,
    pub amount: Amount,
    pub description: String,
}
