//! Stored record schema and field coercion.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::models::{LineItem, Receipt, RowKind};
use crate::receipt::rules::numbers::{parse_decimal, within_range};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How `korting` values are signed in stored records.
///
/// Line items always carry a signed adjustment (a reduction is negative);
/// the convention only decides how a stored value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountConvention {
    /// Stored values are signed adjustments and are taken as-is.
    #[default]
    Signed,
    /// Stored values are reduction magnitudes and are negated.
    Magnitude,
}

impl DiscountConvention {
    /// Convert a stored value into a signed adjustment.
    pub fn to_adjustment(self, stored: Decimal) -> Decimal {
        match self {
            Self::Signed => stored,
            Self::Magnitude => -stored.abs(),
        }
    }
}

/// Item record as written to the `items` sub-collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRecord {
    /// Receipt date, `YYYY-MM-DD`, `null` when unknown.
    pub datum: Option<NaiveDate>,
    pub artikelnummer: String,
    pub artikel: String,
    #[serde(with = "as_number")]
    pub aantal_of_gewicht: Decimal,
    #[serde(with = "as_number")]
    pub prijs: Decimal,
    #[serde(with = "as_number")]
    pub totaal: Decimal,
    /// Signed discount adjustment.
    #[serde(with = "as_number")]
    pub korting: Decimal,
    pub gewogen: bool,
    pub soort: RowKind,
}

impl ItemRecord {
    pub fn from_item(item: &LineItem) -> Self {
        Self {
            datum: item.receipt_date,
            artikelnummer: item.article_code.clone(),
            artikel: item.name.clone(),
            aantal_of_gewicht: item.quantity,
            prijs: item.unit_price,
            totaal: item.line_total,
            korting: item.discount,
            gewogen: item.priced_by_weight,
            soort: item.kind,
        }
    }
}

/// The receipt document, written once all its items are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub datum: Option<NaiveDate>,
    pub aantal_items: usize,
    #[serde(with = "as_number")]
    pub totaal: Decimal,
    /// Source file name.
    pub bron: String,
}

impl ReceiptRecord {
    pub fn from_receipt(receipt: &Receipt, source: &str) -> Self {
        Self {
            datum: receipt.date,
            aantal_items: receipt.len(),
            totaal: receipt.total(),
            bron: source.to_string(),
        }
    }
}

/// Coerce a stored record into a line item.
///
/// Numeric fields accept JSON numbers and numeric strings. `korting`,
/// `gewogen` and `soort` are optional. A `null` date reads as an undated
/// item; a missing one is an error.
pub fn line_item_from_fields(
    fields: &Map<String, Value>,
    convention: DiscountConvention,
) -> Result<LineItem, RecordError> {
    let receipt_date = date_field(fields, "datum")?;
    let article_code = text_field(fields, "artikelnummer")?;
    let name = text_field(fields, "artikel")?;
    let quantity = decimal_field(fields, "aantal_of_gewicht")?;
    let unit_price = decimal_field(fields, "prijs")?;
    let line_total = decimal_field(fields, "totaal")?;

    let discount = match fields.get("korting") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(value) => convention.to_adjustment(to_decimal("korting", value)?),
    };

    let priced_by_weight = match fields.get("gewogen") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => return Err(invalid("gewogen", other)),
    };

    let kind = match fields.get("soort") {
        None | Some(Value::Null) => RowKind::Article,
        Some(Value::String(s)) => RowKind::from_marker(s).ok_or_else(|| invalid_str("soort", s))?,
        Some(other) => return Err(invalid("soort", other)),
    };

    Ok(LineItem {
        article_code,
        name,
        quantity,
        priced_by_weight,
        unit_price,
        line_total,
        receipt_date,
        discount,
        kind,
    })
}

fn required<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, RecordError> {
    fields.get(field).ok_or(RecordError::MissingField(field))
}

fn date_field(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<NaiveDate>, RecordError> {
    match required(fields, field)? {
        Value::Null => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid_str(field, s)),
        other => Err(invalid(field, other)),
    }
}

fn text_field(fields: &Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    let text = match required(fields, field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(invalid(field, other)),
    };
    if text.is_empty() {
        return Err(RecordError::InvalidField {
            field,
            value: String::new(),
        });
    }
    Ok(text)
}

fn decimal_field(fields: &Map<String, Value>, field: &'static str) -> Result<Decimal, RecordError> {
    to_decimal(field, required(fields, field)?)
}

fn to_decimal(field: &'static str, value: &Value) -> Result<Decimal, RecordError> {
    let decimal = match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .map_err(|_| invalid_str(field, &repr))
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| parse_decimal(s))
                .map_err(|_| invalid_str(field, s))
        }
        other => Err(invalid(field, other)),
    }?;

    if !within_range(decimal) {
        return Err(invalid(field, value));
    }
    Ok(decimal)
}

fn invalid(field: &'static str, value: &Value) -> RecordError {
    RecordError::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn invalid_str(field: &'static str, value: &str) -> RecordError {
    RecordError::InvalidField {
        field,
        value: value.to_string(),
    }
}

/// Decimals as plain JSON numbers.
///
/// Goes through the decimal text so the written float is the one nearest
/// to the exact value and prints back as the same digits.
mod as_number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let float = f64::from_str(&value.to_string()).map_err(ser::Error::custom)?;
        serializer.serialize_f64(float)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let float = f64::deserialize(deserializer)?;
        let repr = float.to_string();
        Decimal::from_str(&repr)
            .or_else(|_| Decimal::from_scientific(&repr))
            .map_err(de::Error::custom)
    }
}
