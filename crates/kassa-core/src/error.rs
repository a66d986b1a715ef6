//! Error types for the kassa-core library.

use thiserror::Error;

/// Main error type for the kassa library.
#[derive(Error, Debug)]
pub enum KassaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Receipt extraction error.
    #[error("receipt error: {0}")]
    Receipt(#[from] ReceiptError),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input document that cannot be read as a receipt.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// A numeral token could not be read as a decimal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing left after trimming and unit suffix removal.
    #[error("empty numeral")]
    Empty,

    /// The token is not a comma-decimal number.
    #[error("invalid numeral: {token:?}")]
    InvalidNumber { token: String },

    /// The value is larger than any amount, weight or count on a receipt.
    #[error("numeral out of range: {token:?}")]
    OutOfRange { token: String },
}

/// Errors related to receipt extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    /// No line of the document matched the receipt layout.
    #[error("no line items found in receipt {receipt_id} ({line_count} lines scanned)")]
    Empty { receipt_id: String, line_count: usize },
}

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document is not valid JSON.
    #[error("corrupt document {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to encode a document.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// The receipt id cannot be used as a document key.
    #[error("invalid receipt id: {0:?}")]
    InvalidId(String),
}

/// A stored item record could not be turned into a line item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Required field is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Field has the wrong type or an unparseable value.
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Result type for the kassa library.
pub type Result<T> = std::result::Result<T, KassaError>;
