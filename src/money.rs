//! Signed monetary amount backed by `rust_decimal`.
//!
//! Values keep the scale they were entered with. Only rendering is fixed:
//! two decimal places for display, shortest form for the data file.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// A signed decimal amount. Non-negative is income, negative is expense.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use finance_ledger::Amount;
///
/// let amount = Amount::from_str(" -20.5 ").unwrap();
/// assert!(amount.is_negative());
/// assert_eq!(amount.to_string(), "-20.50");
/// assert_eq!(amount.to_file_repr(), "-20.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal places used when rendering for display.
    pub const DISPLAY_SCALE: usize = 2;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Amount(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` for expenses.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Self {
        Amount(self.0.abs())
    }

    /// Shortest textual form, as written to the data file (`-20`, `12.5`).
    pub fn to_file_repr(&self) -> String {
        self.0.normalize().to_string()
    }
}

/// Error returned when text is not a single numeric literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a number: {:?}", self.0)
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parses a plain or scientific literal, ignoring surrounding whitespace.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseAmountError(s.to_string());

        // rust_decimal tolerates digit separators; a numeric literal does not.
        let literal_chars = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
        if !literal_chars || !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(err());
        }

        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount)
            .map_err(|_| err())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl fmt::Display for Amount {
    /// Renders rounded to two decimals; honours width and alignment flags.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Decimal's precision flag truncates, so round explicitly.
        let rounded = self
            .0
            .round_dp_with_strategy(Self::DISPLAY_SCALE as u32, RoundingStrategy::MidpointAwayFromZero);
        f.pad(&format!("{:.prec$}", rounded, prec = Self::DISPLAY_SCALE))
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_file_repr())
    }
}
