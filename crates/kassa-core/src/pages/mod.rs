//! Page text sources.
//!
//! A receipt reaches the parser as a list of page texts. Where those come
//! from is up to the source: a PDF document, or text that was extracted
//! earlier and saved with form feeds between pages.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

use std::path::Path;

use tracing::debug;

use crate::error::{KassaError, PdfError};

/// Result type for page extraction.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page separator in plain-text receipts.
pub const FORM_FEED: char = '\x0c';

/// Trait for anything that yields receipt text page by page.
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Text of a page, 1-based.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Lazily extract pages in order.
    fn pages(&self) -> impl Iterator<Item = Result<String>> + '_
    where
        Self: Sized,
    {
        (1..=self.page_count()).map(move |page| self.page_text(page))
    }

    /// Extract every page.
    fn extract_pages(&self) -> Result<Vec<String>> {
        (1..=self.page_count())
            .map(|page| self.page_text(page))
            .collect()
    }
}

/// Plain text pages separated by form feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPages {
    pages: Vec<String>,
}

impl TextPages {
    pub fn new(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_owned).collect();
        // A trailing form feed does not open a new page.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self { pages }
    }

    /// Read a UTF-8 text file.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(&std::fs::read_to_string(path)?))
    }
}

impl PageSource for TextPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }
}

/// Page texts of a receipt document, by file extension: `.pdf` or `.txt`.
pub fn read_pages(path: &Path) -> crate::Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let pages = match extension.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => PdfExtractor::open(path)?.extract_pages()?,
        "txt" => TextPages::from_file(path)?.extract_pages()?,
        _ => {
            return Err(KassaError::UnsupportedInput(format!(
                "unsupported file format: {}",
                path.display()
            )));
        }
    };

    debug!("Read {} pages from {}", pages.len(), path.display());
    Ok(pages)
}
