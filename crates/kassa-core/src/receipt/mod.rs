//! Receipt line-item extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, ReceiptParser, TicketParser};

use crate::error::ReceiptError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ReceiptError>;
