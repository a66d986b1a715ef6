//! Aggregated spending summaries.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a period, returning `None` for a month outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Truncate a date to its month.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // Month is validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Short human label, e.g. `Aug 2025`.
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {s:?}"))?;
        let year = year.parse().map_err(|_| format!("invalid year in {s:?}"))?;
        let month = month.parse().map_err(|_| format!("invalid month in {s:?}"))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in {s:?}"))
    }
}

impl From<YearMonth> for String {
    fn from(period: YearMonth) -> Self {
        period.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Spend totals for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub period: YearMonth,
    /// Sum of line totals.
    pub gross: Decimal,
    /// Sum of signed discount adjustments.
    pub discount: Decimal,
    /// `gross + discount`.
    pub net: Decimal,
    pub item_count: usize,
}

/// Monthly aggregates plus the items that could not be placed in a month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// One entry per month, ascending.
    pub months: Vec<MonthlyAggregate>,
    /// Items excluded because their receipt has no date.
    pub undated_items: usize,
}

impl MonthlyReport {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn gross(&self) -> Decimal {
        self.months.iter().map(|m| m.gross).sum()
    }

    pub fn net(&self) -> Decimal {
        self.months.iter().map(|m| m.net).sum()
    }
}

/// Selects the items of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "by", content = "value")]
pub enum ArticleKey {
    Name(String),
    Code(String),
}

impl ArticleKey {
    pub fn matches(&self, item: &super::receipt::LineItem) -> bool {
        match self {
            Self::Name(name) => item.name == *name,
            Self::Code(code) => item.article_code == *code,
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Code(code) => write!(f, "#{code}"),
        }
    }
}

/// Average unit price of an article in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub period: YearMonth,
    /// Unweighted mean of `unit_price`.
    pub average_price: Decimal,
    /// Number of items averaged.
    pub samples: usize,
}

/// Price trend of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePriceSeries {
    pub article: ArticleKey,
    /// One point per month, ascending.
    pub points: Vec<PricePoint>,
    /// Matching items excluded because their receipt has no date.
    pub undated_items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_ordering_and_display() {
        let aug = YearMonth::new(2025, 8).unwrap();
        let sep = YearMonth::new(2025, 9).unwrap();
        let jan = YearMonth::new(2026, 1).unwrap();

        assert!(aug < sep && sep < jan);
        assert_eq!(aug.to_string(), "2025-08");
        assert_eq!(aug.label(), "Aug 2025");
        assert_eq!(aug.first_day(), NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
    }

    #[test]
    fn test_year_month_parse() {
        assert_eq!("2025-08".parse::<YearMonth>(), Ok(YearMonth::new(2025, 8).unwrap()));
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("august".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2025, 0).is_none());
    }

    #[test]
    fn test_year_month_serializes_as_string() {
        let json = serde_json::to_string(&YearMonth::new(2025, 8).unwrap()).unwrap();
        assert_eq!(json, "\"2025-08\"");
    }
}
