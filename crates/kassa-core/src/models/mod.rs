//! Data models.

pub mod config;
pub mod receipt;
pub mod summary;

pub use receipt::{LineItem, Receipt, RowKind};
pub use summary::{
    ArticleKey, ArticlePriceSeries, MonthlyAggregate, MonthlyReport, PricePoint, YearMonth,
};
