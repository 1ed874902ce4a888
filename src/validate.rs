//! Input validation helpers shared by the shell and the file loader.
//!
//! These checks are syntactic. [`validate_date`] in particular accepts
//! impossible dates such as `2023-02-31`; only field ranges are checked.

use crate::money::Amount;
use std::str::FromStr;

const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

/// Strips leading and trailing spaces, tabs, newlines and carriage returns.
pub fn trim(s: &str) -> &str {
    s.trim_matches(WHITESPACE)
}

/// Returns `true` if `s` holds exactly one numeric literal.
///
/// Surrounding whitespace is tolerated; any other suffix is not.
pub fn is_number(s: &str) -> bool {
    Amount::from_str(s).is_ok()
}

/// Returns `true` if `s` looks like `YYYY-MM-DD` with in-range fields.
///
/// Year must be 1900..=2100, month 1..=12 and day 1..=31 regardless of month.
pub fn validate_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 4 && *i != 7)
        .all(|(_, b)| b.is_ascii_digit());
    if !digits_ok {
        return false;
    }

    // All-ASCII at this point, so byte slicing is on char boundaries.
    let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().ok();
    match (field(0..4), field(5..7), field(8..10)) {
        (Some(year), Some(month), Some(day)) => {
            (1900..=2100).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day)
        }
        _ => false,
    }
}

/// Returns `true` if `s` looks like `YYYY-MM`.
///
/// Only the length and the separator are checked, matching what the monthly
/// summary requires of its argument.
pub fn is_year_month(s: &str) -> bool {
    s.len() == 7 && s.as_bytes()[4] == b'-'
}
