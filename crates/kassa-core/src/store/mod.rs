//! Document store for uploaded receipts.
//!
//! A store holds one document per receipt (keyed by the source file name)
//! and, under it, an `items` sub-collection with one record per line item.
//! Handles are created by the caller and passed in; nothing here keeps a
//! process-wide connection.

mod json_dir;
mod memory;
mod record;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use record::{DiscountConvention, ItemRecord, ReceiptRecord, line_item_from_fields};

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::{LineItem, Receipt};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// One item record as read back from a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub receipt_id: String,
    pub item_id: String,
    pub fields: Map<String, Value>,
}

/// Lazy stream over every item of every stored receipt.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<StoredRecord>> + 'a>;

/// Trait for receipt document stores.
pub trait ReceiptStore {
    /// Whether a receipt has been fully uploaded.
    fn contains(&self, receipt_id: &str) -> Result<bool>;

    /// Append an item record to a receipt's `items` sub-collection.
    /// Returns the item's document id.
    fn add_item(&mut self, receipt_id: &str, record: &ItemRecord) -> Result<String>;

    /// Drop items left behind by an interrupted upload.
    fn clear_items(&mut self, receipt_id: &str) -> Result<()>;

    /// Write the receipt document itself, marking the upload complete.
    fn seal_receipt(&mut self, receipt_id: &str, record: &ReceiptRecord) -> Result<()>;

    /// Stream all items of all complete receipts.
    fn stream_all(&self) -> Result<RecordStream<'_>>;
}

/// Outcome of an upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Receipt written with this many items.
    Uploaded { items: usize },
    /// A receipt with the same id already exists.
    Skipped,
}

/// Upload a receipt unless one with the same id is already stored.
pub fn upload_receipt<S>(store: &mut S, receipt: &Receipt, source: &str) -> Result<UploadOutcome>
where
    S: ReceiptStore + ?Sized,
{
    if store.contains(&receipt.id)? {
        info!("Receipt '{}' already stored, skipping upload", receipt.id);
        return Ok(UploadOutcome::Skipped);
    }

    store.clear_items(&receipt.id)?;
    for item in &receipt.items {
        let item_id = store.add_item(&receipt.id, &ItemRecord::from_item(item))?;
        debug!("Stored item {}/{}", receipt.id, item_id);
    }
    store.seal_receipt(&receipt.id, &ReceiptRecord::from_receipt(receipt, source))?;

    info!("Uploaded receipt '{}' with {} items", receipt.id, receipt.len());
    Ok(UploadOutcome::Uploaded {
        items: receipt.len(),
    })
}

/// Items read back from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedItems {
    pub items: Vec<LineItem>,
    /// Records that could not be read as line items.
    pub skipped: usize,
    /// Number of distinct receipts the items came from.
    pub receipts: usize,
}

/// Read every stored item as a [`LineItem`].
///
/// A record that is corrupt or fails field coercion is logged and skipped;
/// I/O failures abort the load.
pub fn load_items<S>(store: &S, convention: DiscountConvention) -> Result<LoadedItems>
where
    S: ReceiptStore + ?Sized,
{
    let mut loaded = LoadedItems::default();
    let mut receipts = BTreeSet::new();

    for record in store.stream_all()? {
        let record = match record {
            Ok(record) => record,
            Err(StoreError::Corrupt { path, source }) => {
                warn!("Skipping corrupt record {}: {}", path, source);
                loaded.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match line_item_from_fields(&record.fields, convention) {
            Ok(item) => {
                receipts.insert(record.receipt_id);
                loaded.items.push(item);
            }
            Err(e) => {
                warn!(
                    "Skipping record {}/{}: {}",
                    record.receipt_id, record.item_id, e
                );
                loaded.skipped += 1;
            }
        }
    }

    loaded.receipts = receipts.len();
    debug!(
        "Loaded {} items from {} receipts ({} skipped)",
        loaded.items.len(),
        loaded.receipts,
        loaded.skipped
    );
    Ok(loaded)
}

/// Receipt id for a source document: its file name without extension.
pub fn receipt_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .filter(|s| !s.is_empty())
}

pub(crate) fn validate_id(receipt_id: &str) -> Result<()> {
    let invalid = receipt_id.is_empty()
        || receipt_id == "."
        || receipt_id == ".."
        || receipt_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidId(receipt_id.to_string()));
    }
    Ok(())
}
