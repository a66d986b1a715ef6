//! Receipt parser: drives the date locator and the line classifier over
//! every line of every page.

use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::error::{KassaError, ReceiptError};
use crate::models::config::ExtractionConfig;
use crate::models::Receipt;
use crate::pages::read_pages;
use crate::store::receipt_id_from_path;

use super::rules::{
    dates::{DateFormat, DateLocator},
    lines::{Classified, classify_text_line},
};
use super::Result;

/// Result of receipt extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Extracted receipt.
    pub receipt: Receipt,
    /// Number of text lines scanned.
    pub line_count: usize,
    /// Lines that carried a row marker but could not be read as items.
    pub rejected_rows: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Trait for receipt parsing.
pub trait ReceiptParser {
    /// Parse a receipt from its page texts.
    fn parse(&self, receipt_id: &str, pages: &[String]) -> Result<ExtractionResult>;
}

/// Parser for the fixed till-receipt layout.
#[derive(Debug, Clone, Default)]
pub struct TicketParser {
    date_locator: DateLocator,
}

impl TicketParser {
    /// Create a parser for `DD/MM/YYYY` header dates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_date_format(config.date_format)
            .with_time_requirement(config.require_time)
    }

    /// Set the header date layout.
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_locator = DateLocator::new(format);
        self
    }

    /// Require a colon on the date line.
    pub fn with_time_requirement(mut self, require_time: bool) -> Self {
        self.date_locator = self.date_locator.with_time_requirement(require_time);
        self
    }

    /// Parse page texts, in page order, into a receipt.
    ///
    /// The date is located in a first pass over all lines so that items
    /// printed before the header line still receive it.
    pub fn parse_pages<I, S>(&self, receipt_id: &str, pages: I) -> Result<ExtractionResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = pages
            .into_iter()
            .flat_map(|page| {
                page.as_ref()
                    .lines()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut warnings = Vec::new();

        let date = self.date_locator.find_receipt_date(&lines);
        if date.is_none() {
            warn!("No receipt date found in {}", receipt_id);
            warnings.push("Could not find receipt date".to_string());
        }

        let mut items = Vec::new();
        let mut rejected_rows = 0;

        for (idx, line) in lines.iter().enumerate() {
            match classify_text_line(line) {
                Classified::Item(item) => items.push(item),
                Classified::NotAnItem(rejection) if rejection.is_near_miss() => {
                    trace!("Line {} rejected ({:?}): {}", idx + 1, rejection, line.trim());
                    rejected_rows += 1;
                }
                Classified::NotAnItem(_) => {}
            }
        }

        debug!(
            "Classified {} of {} lines as items in {} ({} rejected rows)",
            items.len(),
            lines.len(),
            receipt_id,
            rejected_rows
        );

        if items.is_empty() {
            return Err(ReceiptError::Empty {
                receipt_id: receipt_id.to_string(),
                line_count: lines.len(),
            });
        }

        if rejected_rows > 0 {
            warnings.push(format!("Skipped {} unreadable item rows", rejected_rows));
        }

        let receipt = Receipt::new(receipt_id, date, items);

        info!(
            "Parsed receipt {}: {} items, total {}, date {}",
            receipt.id,
            receipt.len(),
            receipt.total(),
            receipt
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        Ok(ExtractionResult {
            receipt,
            line_count: lines.len(),
            rejected_rows,
            warnings,
        })
    }

    /// Read and parse a receipt document; the receipt id is the file stem.
    pub fn parse_file(&self, path: &Path) -> crate::Result<ExtractionResult> {
        let receipt_id = receipt_id_from_path(path).ok_or_else(|| {
            KassaError::UnsupportedInput(format!("no receipt id in {}", path.display()))
        })?;
        let pages = read_pages(path)?;
        Ok(self.parse(&receipt_id, &pages)?)
    }

    /// Parse a single text blob as one page.
    pub fn parse_text(&self, receipt_id: &str, text: &str) -> Result<ExtractionResult> {
        self.parse_pages(receipt_id, [text])
    }
}

impl ReceiptParser for TicketParser {
    fn parse(&self, receipt_id: &str, pages: &[String]) -> Result<ExtractionResult> {
        self.parse_pages(receipt_id, pages)
    }
}
