//! Configuration structures for the receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KassaError, Result};
use crate::receipt::rules::dates::DateFormat;
use crate::store::DiscountConvention;

/// Main configuration for kassa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KassaConfig {
    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,

    /// Document store configuration.
    pub store: StoreConfig,

    /// Report rendering configuration.
    pub report: ReportConfig,
}

/// Receipt extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Format of the date printed in the receipt header.
    pub date_format: DateFormat,

    /// Only accept a date on a line that also carries a time (a colon).
    pub require_time: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            require_time: true,
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the JSON document store.
    pub root: PathBuf,

    /// Collection holding one document per receipt.
    pub collection: String,

    /// How `korting` values in stored records are signed.
    pub discount_convention: DiscountConvention,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("kassa-data"),
            collection: "kastickets_raw".to_string(),
            discount_convention: DiscountConvention::default(),
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Width of the longest bar in terminal charts.
    pub bar_width: usize,

    /// Symbol printed before amounts.
    pub currency_symbol: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bar_width: 40,
            currency_symbol: "€".to_string(),
        }
    }
}

impl KassaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| KassaError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| KassaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: KassaConfig =
            serde_json::from_str(r#"{ "store": { "collection": "tickets" } }"#).unwrap();

        assert_eq!(config.store.collection, "tickets");
        assert_eq!(config.store.discount_convention, DiscountConvention::Signed);
        assert_eq!(config.extraction.date_format, DateFormat::DayMonthYearSlash);
        assert!(config.extraction.require_time);
        assert_eq!(config.report.bar_width, 40);
    }

    #[test]
    fn test_malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ \"store\": 3 }").unwrap();

        assert!(matches!(KassaConfig::from_file(&path), Err(KassaError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = KassaConfig::default();
        config.extraction.date_format = DateFormat::Iso;
        config.store.discount_convention = DiscountConvention::Magnitude;
        config.save(&path).unwrap();

        let loaded = KassaConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.date_format, DateFormat::Iso);
        assert_eq!(loaded.store.discount_convention, DiscountConvention::Magnitude);
    }
}
