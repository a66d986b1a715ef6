//! Receipt store backed by a directory of JSON documents.
//!
//! ```text
//! <root>/<collection>/<receipt_id>/receipt.json
//! <root>/<collection>/<receipt_id>/items/000000.json
//! <root>/<collection>/<receipt_id>/items/000001.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{
    ItemRecord, ReceiptRecord, ReceiptStore, RecordStream, Result, StoredRecord, validate_id,
};
use crate::error::StoreError;
use crate::models::config::StoreConfig;

const RECEIPT_DOCUMENT: &str = "receipt.json";
const ITEMS: &str = "items";

/// JSON document store rooted at a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    collection_dir: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a collection under `root`.
    pub fn open(root: impl AsRef<Path>, collection: &str) -> Result<Self> {
        validate_id(collection)?;
        let collection_dir = root.as_ref().join(collection);
        fs::create_dir_all(&collection_dir)?;
        debug!("Opened receipt store at {}", collection_dir.display());
        Ok(Self { collection_dir })
    }

    /// Open the store described by configuration.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open(&config.root, &config.collection)
    }

    /// Directory holding the receipt documents.
    pub fn path(&self) -> &Path {
        &self.collection_dir
    }

    fn receipt_dir(&self, receipt_id: &str) -> Result<PathBuf> {
        validate_id(receipt_id)?;
        Ok(self.collection_dir.join(receipt_id))
    }

    /// Ids of complete receipts, sorted.
    pub fn receipt_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.collection_dir)? {
            let entry = entry?;
            if !entry.path().join(RECEIPT_DOCUMENT).is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl ReceiptStore for JsonDirStore {
    fn contains(&self, receipt_id: &str) -> Result<bool> {
        Ok(self.receipt_dir(receipt_id)?.join(RECEIPT_DOCUMENT).is_file())
    }

    fn add_item(&mut self, receipt_id: &str, record: &ItemRecord) -> Result<String> {
        let items_dir = self.receipt_dir(receipt_id)?.join(ITEMS);
        fs::create_dir_all(&items_dir)?;

        let item_id = format!("{:06}", json_files(&items_dir)?.len());
        let path = items_dir.join(format!("{item_id}.json"));
        fs::write(&path, serde_json::to_vec_pretty(record)?)?;
        trace!("Wrote {}", path.display());

        Ok(item_id)
    }

    fn clear_items(&mut self, receipt_id: &str) -> Result<()> {
        let items_dir = self.receipt_dir(receipt_id)?.join(ITEMS);
        if items_dir.is_dir() {
            debug!("Removing partial upload in {}", items_dir.display());
            fs::remove_dir_all(&items_dir)?;
        }
        Ok(())
    }

    fn seal_receipt(&mut self, receipt_id: &str, record: &ReceiptRecord) -> Result<()> {
        let dir = self.receipt_dir(receipt_id)?;
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(RECEIPT_DOCUMENT), serde_json::to_vec_pretty(record)?)?;
        Ok(())
    }

    fn stream_all(&self) -> Result<RecordStream<'_>> {
        let receipts = self.receipt_ids()?;
        let collection_dir = self.collection_dir.clone();

        let records = receipts.into_iter().flat_map(move |receipt_id| -> RecordStream<'static> {
            let items_dir = collection_dir.join(&receipt_id).join(ITEMS);
            match json_files(&items_dir) {
                Ok(files) => Box::new(
                    files
                        .into_iter()
                        .map(move |path| read_record(&receipt_id, &path)),
                ),
                Err(e) => Box::new(std::iter::once(Err(e))),
            }
        });

        Ok(Box::new(records))
    }
}

/// `*.json` files in a directory, sorted; empty when the directory is absent.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_record(receipt_id: &str, path: &Path) -> Result<StoredRecord> {
    let content = fs::read_to_string(path)?;
    let fields: Map<String, Value> =
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;

    Ok(StoredRecord {
        receipt_id: receipt_id.to_string(),
        item_id: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowKind;
    use crate::store::{DiscountConvention, load_items};
    use rust_decimal::Decimal;

    fn record() -> ItemRecord {
        ItemRecord {
            datum: chrono::NaiveDate::from_ymd_opt(2025, 8, 13),
            artikelnummer: "10078".to_string(),
            artikel: "MELK".to_string(),
            aantal_of_gewicht: Decimal::TWO,
            prijs: Decimal::new(109, 2),
            totaal: Decimal::new(218, 2),
            korting: Decimal::ZERO,
            gewogen: false,
            soort: RowKind::Article,
        }
    }

    fn document() -> ReceiptRecord {
        ReceiptRecord {
            datum: None,
            aantal_items: 1,
            totaal: Decimal::new(218, 2),
            bron: "ticket.pdf".to_string(),
        }
    }

    #[test]
    fn test_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path(), "kastickets_raw").unwrap();

        assert_eq!(store.add_item("ticket", &record()).unwrap(), "000000");
        assert_eq!(store.add_item("ticket", &record()).unwrap(), "000001");
        assert!(!store.contains("ticket").unwrap());

        store.seal_receipt("ticket", &document()).unwrap();
        assert!(store.contains("ticket").unwrap());

        let base = dir.path().join("kastickets_raw").join("ticket");
        assert!(base.join("receipt.json").is_file());
        assert!(base.join("items").join("000001.json").is_file());
        assert_eq!(store.receipt_ids().unwrap(), vec!["ticket".to_string()]);
    }

    #[test]
    fn test_corrupt_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path(), "kastickets_raw").unwrap();
        store.add_item("ticket", &record()).unwrap();
        store.seal_receipt("ticket", &document()).unwrap();

        let broken = store.path().join("ticket").join("items").join("000001.json");
        fs::write(broken, "{ not json").unwrap();

        let loaded = load_items(&store, DiscountConvention::Signed).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.skipped, 1);
    }

    #[test]
    fn test_clear_items_removes_partial_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path(), "kastickets_raw").unwrap();
        store.add_item("ticket", &record()).unwrap();

        store.clear_items("ticket").unwrap();
        assert_eq!(store.add_item("ticket", &record()).unwrap(), "000000");
    }

    #[test]
    fn test_empty_store_streams_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path(), "kastickets_raw").unwrap();
        assert_eq!(store.stream_all().unwrap().count(), 0);
        assert!(!store.contains("missing").unwrap());
    }
}
