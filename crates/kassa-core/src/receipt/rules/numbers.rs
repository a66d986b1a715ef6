//! Numeral parsing for comma-decimal receipt tokens.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::NUMERAL;
use crate::error::ParseError;

/// Suffix printed after the quantity of a weighed article.
pub const WEIGHT_SUFFIX: &str = "kg";

/// Largest magnitude accepted for any amount, weight or count.
///
/// Keeps sums over a whole store far below `Decimal::MAX`.
pub const MAX_MAGNITUDE: i64 = 1_000_000_000;

/// Whether a value is small enough to be summed safely.
pub fn within_range(value: Decimal) -> bool {
    value.abs() <= Decimal::from(MAX_MAGNITUDE)
}

/// Whether a token carries the weight suffix (`0,350kg`).
pub fn has_weight_suffix(token: &str) -> bool {
    strip_suffix_ignore_case(token.trim(), WEIGHT_SUFFIX).is_some()
}

/// Remove a known unit suffix, if present.
pub fn strip_unit_suffix(token: &str) -> &str {
    let token = token.trim();
    strip_suffix_ignore_case(token, WEIGHT_SUFFIX).unwrap_or(token)
}

fn strip_suffix_ignore_case<'a>(token: &'a str, suffix: &str) -> Option<&'a str> {
    let split = token.len().checked_sub(suffix.len())?;
    if !token.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = token.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Parse a comma-decimal numeral such as `12,34` or `0,350kg`.
///
/// The comma is the only accepted decimal separator: `12.34` is rejected,
/// as are thousands separators and multiple commas.
pub fn parse_decimal(token: &str) -> Result<Decimal, ParseError> {
    let body = strip_unit_suffix(token).trim_end();
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let invalid = || ParseError::InvalidNumber {
        token: token.to_string(),
    };

    let caps = NUMERAL.captures(body).ok_or_else(invalid)?;
    let sign = if &caps[1] == "-" { "-" } else { "" };
    let normalized = match caps.get(3) {
        Some(fraction) => format!("{}{}.{}", sign, &caps[2], fraction.as_str()),
        None => format!("{}{}", sign, &caps[2]),
    };

    let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    if !within_range(value) {
        return Err(ParseError::OutOfRange {
            token: token.to_string(),
        });
    }
    Ok(value)
}
