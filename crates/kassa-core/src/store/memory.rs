//! In-memory receipt store.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::StoreError;

use super::{
    ItemRecord, ReceiptRecord, ReceiptStore, RecordStream, Result, StoredRecord, validate_id,
};

#[derive(Debug, Clone, Default)]
struct StoredReceipt {
    document: Option<Value>,
    items: Vec<Map<String, Value>>,
}

/// Receipt store held in memory, mainly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    receipts: BTreeMap<String, StoredReceipt>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw item record to a receipt and mark the receipt complete.
    pub fn insert_raw(&mut self, receipt_id: &str, fields: Map<String, Value>) {
        let receipt = self.receipts.entry(receipt_id.to_string()).or_default();
        receipt.items.push(fields);
        receipt.document.get_or_insert_with(|| Value::Object(Map::new()));
    }

    /// Number of complete receipts.
    pub fn len(&self) -> usize {
        self.receipts.values().filter(|r| r.document.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReceiptStore for MemoryStore {
    fn contains(&self, receipt_id: &str) -> Result<bool> {
        Ok(self
            .receipts
            .get(receipt_id)
            .is_some_and(|r| r.document.is_some()))
    }

    fn add_item(&mut self, receipt_id: &str, record: &ItemRecord) -> Result<String> {
        validate_id(receipt_id)?;
        let fields = match serde_json::to_value(record)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let receipt = self.receipts.entry(receipt_id.to_string()).or_default();
        receipt.items.push(fields);
        Ok(format!("{:06}", receipt.items.len() - 1))
    }

    fn clear_items(&mut self, receipt_id: &str) -> Result<()> {
        if let Some(receipt) = self.receipts.get_mut(receipt_id) {
            receipt.items.clear();
        }
        Ok(())
    }

    fn seal_receipt(&mut self, receipt_id: &str, record: &ReceiptRecord) -> Result<()> {
        validate_id(receipt_id)?;
        let document = serde_json::to_value(record)?;
        self.receipts.entry(receipt_id.to_string()).or_default().document = Some(document);
        Ok(())
    }

    fn stream_all(&self) -> Result<RecordStream<'_>> {
        let records = self
            .receipts
            .iter()
            .filter(|(_, receipt)| receipt.document.is_some())
            .flat_map(|(id, receipt)| {
                receipt.items.iter().enumerate().map(move |(idx, fields)| {
                    Ok::<_, StoreError>(StoredRecord {
                        receipt_id: id.clone(),
                        item_id: format!("{:06}", idx),
                        fields: fields.clone(),
                    })
                })
            });
        Ok(Box::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowKind;
    use rust_decimal::Decimal;

    fn record(name: &str) -> ItemRecord {
        ItemRecord {
            datum: None,
            artikelnummer: "1".to_string(),
            artikel: name.to_string(),
            aantal_of_gewicht: Decimal::ONE,
            prijs: Decimal::ONE,
            totaal: Decimal::ONE,
            korting: Decimal::ZERO,
            gewogen: false,
            soort: RowKind::Article,
        }
    }

    fn seal(store: &mut MemoryStore, id: &str) {
        let document = ReceiptRecord {
            datum: None,
            aantal_items: 0,
            totaal: Decimal::ZERO,
            bron: format!("{id}.pdf"),
        };
        store.seal_receipt(id, &document).unwrap();
    }

    #[test]
    fn test_unsealed_receipts_are_invisible() {
        let mut store = MemoryStore::new();
        store.add_item("pending", &record("MELK")).unwrap();

        assert!(!store.contains("pending").unwrap());
        assert_eq!(store.stream_all().unwrap().count(), 0);

        seal(&mut store, "pending");
        assert!(store.contains("pending").unwrap());
        assert_eq!(store.stream_all().unwrap().count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_item_ids_and_clear() {
        let mut store = MemoryStore::new();
        assert_eq!(store.add_item("r", &record("A")).unwrap(), "000000");
        assert_eq!(store.add_item("r", &record("B")).unwrap(), "000001");

        store.clear_items("r").unwrap();
        assert_eq!(store.add_item("r", &record("C")).unwrap(), "000000");
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let mut store = MemoryStore::new();
        assert!(store.add_item("../escape", &record("A")).is_err());
    }
}
