//! Core library for supermarket receipt analysis.
//!
//! This crate provides:
//! - Page text sources (PDF via lopdf/pdf-extract, form-feed separated text)
//! - Line-item extraction from the receipt layout (locale numerals, weighed rows, dates)
//! - Monthly spend and per-article price aggregation
//! - A document store for uploaded receipts

pub mod aggregate;
pub mod error;
pub mod models;
pub mod pages;
pub mod receipt;
pub mod store;

pub use aggregate::{aggregate_article_price, aggregate_monthly, article_names, items_newest_first};
pub use error::{KassaError, Result};
pub use models::config::KassaConfig;
pub use models::{
    ArticleKey, ArticlePriceSeries, LineItem, MonthlyAggregate, MonthlyReport, PricePoint,
    Receipt, RowKind, YearMonth,
};
#[cfg(feature = "pdf")]
pub use pages::PdfExtractor;
pub use pages::{PageSource, TextPages, read_pages};
pub use receipt::{ExtractionResult, ReceiptParser, TicketParser};
pub use store::{
    DiscountConvention, JsonDirStore, LoadedItems, MemoryStore, ReceiptStore, UploadOutcome,
    load_items, receipt_id_from_path, upload_receipt,
};
