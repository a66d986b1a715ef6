//! Monthly spending and per-article price aggregation.
//!
//! Everything here is recomputed from the full item set on every call.

use std::collections::{BTreeMap, BTreeSet};
use std::ops;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{
    ArticleKey, ArticlePriceSeries, LineItem, MonthlyAggregate, MonthlyReport, PricePoint,
    YearMonth,
};

#[derive(Debug, Default)]
struct MonthTotals {
    gross: Decimal,
    discount: Decimal,
    count: usize,
}

impl ops::AddAssign<&LineItem> for MonthTotals {
    fn add_assign(&mut self, item: &LineItem) {
        self.gross += item.line_total;
        self.discount += item.discount;
        self.count += 1;
    }
}

#[derive(Debug, Default)]
struct PriceTotals {
    sum: Decimal,
    count: usize,
}

impl ops::AddAssign<&LineItem> for PriceTotals {
    fn add_assign(&mut self, item: &LineItem) {
        self.sum += item.unit_price;
        self.count += 1;
    }
}

/// Spend per calendar month, ascending.
///
/// Discounts are signed adjustments, so `net = gross + discount`.
/// Items without a receipt date are left out and counted in
/// [`MonthlyReport::undated_items`].
pub fn aggregate_monthly(items: &[LineItem]) -> MonthlyReport {
    let mut by_month: BTreeMap<YearMonth, MonthTotals> = BTreeMap::new();
    let mut undated_items = 0;

    for item in items {
        match item.receipt_date {
            Some(date) => *by_month.entry(YearMonth::of(date)).or_default() += item,
            None => undated_items += 1,
        }
    }

    if undated_items > 0 {
        debug!("Excluded {} undated items from monthly aggregate", undated_items);
    }

    let months = by_month
        .into_iter()
        .map(|(period, totals)| MonthlyAggregate {
            period,
            gross: totals.gross,
            discount: totals.discount,
            net: totals.gross + totals.discount,
            item_count: totals.count,
        })
        .collect();

    MonthlyReport {
        months,
        undated_items,
    }
}

/// Unweighted average unit price of one article per month, ascending.
pub fn aggregate_article_price(items: &[LineItem], article: &ArticleKey) -> ArticlePriceSeries {
    let mut by_month: BTreeMap<YearMonth, PriceTotals> = BTreeMap::new();
    let mut undated_items = 0;

    for item in items.iter().filter(|i| article.matches(i)) {
        match item.receipt_date {
            Some(date) => *by_month.entry(YearMonth::of(date)).or_default() += item,
            None => undated_items += 1,
        }
    }

    let points = by_month
        .into_iter()
        .map(|(period, totals)| PricePoint {
            period,
            // count >= 1 for every entry
            average_price: totals.sum / Decimal::from(totals.count),
            samples: totals.count,
        })
        .collect();

    ArticlePriceSeries {
        article: article.clone(),
        points,
        undated_items,
    }
}

/// Distinct article names, sorted.
pub fn article_names(items: &[LineItem]) -> Vec<String> {
    items
        .iter()
        .map(|i| i.name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Items ordered newest receipt first; undated items last.
pub fn items_newest_first(items: &[LineItem]) -> Vec<&LineItem> {
    let mut sorted: Vec<&LineItem> = items.iter().collect();
    // Option orders None first, so reversing puts undated items last.
    sorted.sort_by(|a, b| b.receipt_date.cmp(&a.receipt_date));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn item(
        name: &str,
        date: Option<(i32, u32, u32)>,
        price: &str,
        total: &str,
        discount: &str,
    ) -> LineItem {
        LineItem {
            article_code: format!("{}-code", name),
            name: name.to_string(),
            quantity: Decimal::ONE,
            priced_by_weight: false,
            unit_price: dec(price),
            line_total: dec(total),
            receipt_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            discount: dec(discount),
            kind: RowKind::Article,
        }
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate_monthly(&[]);
        assert!(report.is_empty());
        assert_eq!(report.undated_items, 0);
    }

    #[test]
    fn test_monthly_scenario() {
        let items = vec![
            item("A", Some((2025, 8, 1)), "10.00", "10.00", "0"),
            item("B", Some((2025, 8, 15)), "5.50", "5.50", "-1.00"),
            item("C", Some((2025, 9, 2)), "20.00", "20.00", "0"),
        ];

        let report = aggregate_monthly(&items);

        assert_eq!(
            report.months,
            vec![
                MonthlyAggregate {
                    period: ym(2025, 8),
                    gross: dec("15.50"),
                    discount: dec("-1.00"),
                    net: dec("14.50"),
                    item_count: 2,
                },
                MonthlyAggregate {
                    period: ym(2025, 9),
                    gross: dec("20.00"),
                    discount: dec("0"),
                    net: dec("20.00"),
                    item_count: 1,
                },
            ]
        );
        assert_eq!(report.gross(), dec("35.50"));
        assert_eq!(report.net(), dec("34.50"));
    }

    #[test]
    fn test_undated_items_are_counted() {
        let items = vec![
            item("A", None, "1", "1", "0"),
            item("A", Some((2025, 8, 1)), "2", "2", "0"),
            item("A", None, "3", "3", "0"),
        ];

        let report = aggregate_monthly(&items);
        assert_eq!(report.months.len(), 1);
        assert_eq!(report.undated_items, 2);
    }

    #[test]
    fn test_periods_are_chronological() {
        let items = vec![
            item("A", Some((2026, 1, 3)), "1", "1", "0"),
            item("A", Some((2025, 12, 30)), "1", "1", "0"),
            item("A", Some((2025, 2, 1)), "1", "1", "0"),
        ];

        let periods: Vec<_> = aggregate_monthly(&items).months.iter().map(|m| m.period).collect();
        assert_eq!(periods, vec![ym(2025, 2), ym(2025, 12), ym(2026, 1)]);
    }

    #[test]
    fn test_article_price_is_unweighted_mean() {
        let mut heavy = item("KAAS", Some((2025, 8, 2)), "10.00", "50.00", "0");
        heavy.quantity = dec("5");
        let items = vec![
            heavy,
            item("KAAS", Some((2025, 8, 20)), "12.00", "12.00", "0"),
            item("KAAS", Some((2025, 9, 1)), "11.00", "11.00", "0"),
            item("MELK", Some((2025, 9, 1)), "1.09", "1.09", "0"),
            item("KAAS", None, "99.00", "99.00", "0"),
        ];

        let series = aggregate_article_price(&items, &ArticleKey::Name("KAAS".to_string()));

        assert_eq!(
            series.points,
            vec![
                PricePoint {
                    period: ym(2025, 8),
                    average_price: dec("11.00"),
                    samples: 2,
                },
                PricePoint {
                    period: ym(2025, 9),
                    average_price: dec("11.00"),
                    samples: 1,
                },
            ]
        );
        assert_eq!(series.undated_items, 1);
    }

    #[test]
    fn test_article_by_code() {
        let items = vec![
            item("MELK", Some((2025, 8, 1)), "1.09", "1.09", "0"),
            item("KAAS", Some((2025, 8, 1)), "9.00", "9.00", "0"),
        ];

        let series = aggregate_article_price(&items, &ArticleKey::Code("MELK-code".to_string()));
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].average_price, dec("1.09"));

        let missing = aggregate_article_price(&items, &ArticleKey::Name("BROOD".to_string()));
        assert!(missing.points.is_empty());
    }

    #[test]
    fn test_article_names_and_ordering() {
        let items = vec![
            item("MELK", Some((2025, 8, 1)), "1", "1", "0"),
            item("BROOD", None, "1", "1", "0"),
            item("MELK", Some((2025, 9, 1)), "1", "1", "0"),
        ];

        assert_eq!(article_names(&items), vec!["BROOD".to_string(), "MELK".to_string()]);

        let dates: Vec<_> = items_newest_first(&items).iter().map(|i| i.receipt_date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 9, 1),
                NaiveDate::from_ymd_opt(2025, 8, 1),
                None
            ]
        );
    }
}
