//! Receipt and line item data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row-kind marker printed in the first column of an item line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    /// Normal article (`A`).
    #[default]
    #[serde(rename = "A")]
    Article,
    /// Credit or returned article (`C`).
    #[serde(rename = "C")]
    Credit,
}

impl RowKind {
    /// Parse a row marker token.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "A" => Some(Self::Article),
            "C" => Some(Self::Credit),
            _ => None,
        }
    }

    /// The marker as printed on the receipt.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Article => "A",
            Self::Credit => "C",
        }
    }
}

/// One purchased line of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Article number as printed.
    pub article_code: String,

    /// Free-text article description.
    pub name: String,

    /// Weight in kilograms or unit count, always positive.
    pub quantity: Decimal,

    /// Whether `quantity` is a weight.
    pub priced_by_weight: bool,

    /// Price per kilogram or per unit.
    pub unit_price: Decimal,

    /// Extended price for the line. Authoritative, may differ from
    /// `quantity * unit_price`.
    pub line_total: Decimal,

    /// Date of the receipt this line belongs to.
    pub receipt_date: Option<NaiveDate>,

    /// Signed discount adjustment; a reduction is negative.
    #[serde(default)]
    pub discount: Decimal,

    /// Row-kind marker.
    #[serde(default)]
    pub kind: RowKind,
}

impl LineItem {
    /// Line total with its discount applied.
    pub fn net_total(&self) -> Decimal {
        self.line_total + self.discount
    }
}

/// A parsed receipt: one date, one identity, many lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// External identity, derived from the source file name.
    pub id: String,

    /// Date found in the header text, if any.
    pub date: Option<NaiveDate>,

    /// Line items in the order they appear.
    pub items: Vec<LineItem>,
}

impl Receipt {
    /// Build a receipt, tagging every item with the receipt date.
    pub fn new(id: impl Into<String>, date: Option<NaiveDate>, mut items: Vec<LineItem>) -> Self {
        for item in &mut items {
            item.receipt_date = date;
        }
        Self {
            id: id.into(),
            date,
            items,
        }
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.line_total).sum()
    }

    /// Number of line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(total: &str) -> LineItem {
        LineItem {
            article_code: "1001".to_string(),
            name: "Melk".to_string(),
            quantity: Decimal::ONE,
            priced_by_weight: false,
            unit_price: Decimal::from_str(total).unwrap(),
            line_total: Decimal::from_str(total).unwrap(),
            receipt_date: None,
            discount: Decimal::ZERO,
            kind: RowKind::Article,
        }
    }

    #[test]
    fn test_receipt_new_tags_all_items() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 13);
        let receipt = Receipt::new("ticket", date, vec![item("1.00"), item("2.50")]);

        assert_eq!(receipt.len(), 2);
        assert!(receipt.items.iter().all(|i| i.receipt_date == date));
        assert_eq!(receipt.total(), Decimal::from_str("3.50").unwrap());
    }

    #[test]
    fn test_row_kind_marker() {
        assert_eq!(RowKind::from_marker("A"), Some(RowKind::Article));
        assert_eq!(RowKind::from_marker("C"), Some(RowKind::Credit));
        assert_eq!(RowKind::from_marker("B"), None);
        assert_eq!(RowKind::Credit.marker(), "C");
    }

    #[test]
    fn test_missing_kind_reads_as_article() {
        assert_eq!(RowKind::default(), RowKind::Article);

        let mut value = serde_json::to_value(item("1.09")).unwrap();
        value.as_object_mut().unwrap().remove("kind");
        let line: LineItem = serde_json::from_value(value).unwrap();
        assert_eq!(line.kind, RowKind::Article);

        let credit: RowKind = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(credit, RowKind::Credit);
    }

    #[test]
    fn test_net_total_applies_signed_discount() {
        let mut line = item("5.50");
        line.discount = Decimal::from_str("-1.00").unwrap();
        assert_eq!(line.net_total(), Decimal::from_str("4.50").unwrap());
    }
}
