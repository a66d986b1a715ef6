//! Item line classification.
//!
//! An item line looks like
//!
//! ```text
//! A 52311 BANANEN CHIQUITA 0,842kg 1,99 1,68
//! A 10078 MELK HALFVOL 1L  2       1,09 2,18
//! ```
//!
//! marker, article code, free-text name, then quantity (or weight), unit price
//! and line total. Weighed and counted rows differ only in the `kg` suffix of
//! the quantity column.

use rust_decimal::Decimal;

use super::numbers::{has_weight_suffix, parse_decimal};
use crate::error::ParseError;
use crate::models::{LineItem, RowKind};

/// Marker, code, and the three trailing numerals.
pub const MIN_TOKENS: usize = 5;

/// Why a line is not an item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooFewTokens(usize),
    UnknownMarker,
    EmptyName,
    BadNumber {
        field: &'static str,
        error: ParseError,
    },
    NonPositiveQuantity,
}

impl Rejection {
    /// Line started like an item row but could not be read as one.
    pub fn is_near_miss(&self) -> bool {
        !matches!(self, Self::TooFewTokens(_) | Self::UnknownMarker)
    }
}

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Item(LineItem),
    NotAnItem(Rejection),
}

impl Classified {
    pub fn into_item(self) -> Option<LineItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::NotAnItem(_) => None,
        }
    }
}

/// Classify a whitespace-tokenised line.
///
/// The returned item has no receipt date and no discount; the receipt
/// parser applies the date once it is known.
pub fn classify_line(tokens: &[&str]) -> Classified {
    match read_item(tokens) {
        Ok(item) => Classified::Item(item),
        Err(rejection) => Classified::NotAnItem(rejection),
    }
}

/// Tokenise on whitespace and classify.
pub fn classify_text_line(line: &str) -> Classified {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    classify_line(&tokens)
}

fn read_item(tokens: &[&str]) -> Result<LineItem, Rejection> {
    let n = tokens.len();
    if n < MIN_TOKENS {
        return Err(Rejection::TooFewTokens(n));
    }

    let kind = RowKind::from_marker(tokens[0]).ok_or(Rejection::UnknownMarker)?;
    let article_code = tokens[1];

    let name = tokens[2..n - 3].join(" ");
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }

    let quantity_token = tokens[n - 3];
    let priced_by_weight = has_weight_suffix(quantity_token);

    let quantity = number("quantity", quantity_token)?;
    let unit_price = number("unit_price", tokens[n - 2])?;
    let line_total = number("line_total", tokens[n - 1])?;

    if quantity.is_zero() {
        return Err(Rejection::NonPositiveQuantity);
    }

    Ok(LineItem {
        article_code: article_code.to_string(),
        name,
        // Credit rows may print a negative count; the sign lives on the total.
        quantity: quantity.abs(),
        priced_by_weight,
        unit_price,
        line_total,
        receipt_date: None,
        discount: Decimal::ZERO,
        kind,
    })
}

fn number(field: &'static str, token: &str) -> Result<Decimal, Rejection> {
    parse_decimal(token).map_err(|error| Rejection::BadNumber { field, error })
}
