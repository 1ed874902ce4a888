//! # Finance Ledger
//!
//! A single-user personal finance ledger. Records dated, categorised
//! transactions, keeps them in a flat comma-delimited file, and derives
//! monthly income/expense totals and per-category budget checks.
//!
//! ## Design Principles
//!
//! - **Decimal amounts**: `rust_decimal` values, stored as entered and shown
//!   with 2 decimal places
//! - **Position addressing**: transactions have no ID; deletes and sorts
//!   renumber them
//! - **Recoverable failures**: every error is a [`LedgerError`] value and bad
//!   data file lines are skipped and reported, never fatal
//!
//! ## Example
//!
//! ```
//! use finance_ledger::{Amount, Ledger, Transaction};
//!
//! let mut ledger = Ledger::new();
//! ledger.add(Transaction::from_input("2024-03-05", "Food", "-20", "lunch").unwrap());
//! ledger.add(Transaction::from_input("2024-03-10", "Salary", "1000", "").unwrap());
//!
//! let summary = ledger.monthly_summary("2024-03").unwrap();
//! assert_eq!(summary.net, Amount::from(980));
//! ```

pub mod budget;
pub mod error;
pub mod ledger;
pub mod money;
pub mod shell;
pub mod transaction;
pub mod validate;

pub use budget::{Budget, BudgetChange, BudgetStatus};
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LoadReport, MonthlySummary, SearchMode, SkipReason, SkippedRow, SortKey};
pub use money::Amount;
pub use shell::{Shell, ShellOptions};
pub use transaction::{Transaction, DEFAULT_CATEGORY};
