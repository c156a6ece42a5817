//! # Canonical Label Items
//!
//! Imported spreadsheets arrive with whatever column names the user's
//! inventory tool produced (`REFERENCE` or `REF`, `CODEBAR` or `EAN`, ...).
//! The [`normalize`] function resolves every canonical field once, through a
//! fixed alias table, and the rest of the crate only ever sees [`LabelItem`].
//!
//! ## Alias table
//!
//! | Field | Accepted columns (case-insensitive, first present wins) |
//! |-------|----------------------------------------------------------|
//! | `reference` | `REFERENCE`, `REF` |
//! | `barcode` | `CODEBAR`, `EAN` |
//! | `title` | `DESIGNATION`, `TITLE` |
//! | `price` | `PRIX`, `PRICE` |
//! | `image_ref` | `IMAGE_PATH`, `IMAGE` (after the image lookup) |
//! | `qr_payload` | `QRURL`, `QR_URL`, `QR_CODE` |
//! | *(dropped)* | `QTE`, `QTY` |
//!
//! ## Example
//!
//! ```
//! use planche::item::{normalize, RawRecord};
//! use serde_json::json;
//!
//! let record: RawRecord = serde_json::from_value(json!({
//!     "REF": "A1", "EAN": "123", "DESIGNATION": "Widget", "QTE": "5"
//! })).unwrap();
//!
//! let item = normalize(&record, None);
//! assert_eq!(item.reference, "A1");
//! assert_eq!(item.barcode, "123");
//! assert_eq!(item.title, "Widget");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::images::ImageLookup;

/// A loosely-typed imported row: column name → cell value.
pub type RawRecord = serde_json::Map<String, Value>;

pub const REFERENCE_ALIASES: &[&str] = &["REFERENCE", "REF"];
pub const BARCODE_ALIASES: &[&str] = &["CODEBAR", "EAN"];
pub const TITLE_ALIASES: &[&str] = &["DESIGNATION", "TITLE"];
pub const PRICE_ALIASES: &[&str] = &["PRIX", "PRICE"];
pub const IMAGE_ALIASES: &[&str] = &["IMAGE_PATH", "IMAGE"];
pub const QR_ALIASES: &[&str] = &["QRURL", "QR_URL", "QR_CODE"];

/// Quantity columns are recognized so they can be dropped on purpose.
/// A label carries no quantity.
pub const QUANTITY_ALIASES: &[&str] = &["QTE", "QTY"];

/// A price as it came out of the spreadsheet.
///
/// Formatting is deferred to [`crate::format::fmt_price`] so that edits and
/// exports keep the user's original value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    pub fn is_empty(&self) -> bool {
        matches!(self, Price::Text(s) if s.trim().is_empty())
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(String::new())
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::Number(value)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Price::Text(value.to_string())
    }
}

/// The normalized unit of data printed on one label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    /// Product reference, also the join key for images.
    pub reference: String,
    /// Numeric-ish code drawn as a linear barcode.
    pub barcode: String,
    /// Display title.
    pub title: String,
    pub price: Price,
    /// Inline data URI or external path. Catalog rows keep the value of the
    /// image column here; uploads are applied with [`LabelItem::with_image`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// URL or text encoded into a QR symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_payload: Option<String>,
}

impl LabelItem {
    /// Whether a QR zone should be drawn for this item.
    pub fn has_qr(&self) -> bool {
        self.qr_payload
            .as_deref()
            .is_some_and(|payload| !payload.trim().is_empty())
    }

    pub fn has_barcode(&self) -> bool {
        !self.barcode.trim().is_empty()
    }

    /// Copy with the image resolved against `images`: the uploaded image for
    /// this reference when there is one, the row's own image otherwise.
    pub fn with_image(&self, images: &ImageLookup) -> LabelItem {
        let mut item = self.clone();
        if let Some(uri) = images.get(&self.reference) {
            item.image_ref = Some(uri.to_string());
        }
        item
    }
}

/// Normalize one imported record into a [`LabelItem`].
///
/// Never fails: every missing or misnamed field degrades to an empty value.
/// Quantity columns are ignored.
pub fn normalize(record: &RawRecord, images: Option<&ImageLookup>) -> LabelItem {
    let reference = resolve_text(record, REFERENCE_ALIASES).unwrap_or_default();

    let image_ref = images
        .and_then(|lookup| lookup.get(&reference))
        .map(str::to_string)
        .or_else(|| resolve_text(record, IMAGE_ALIASES))
        .filter(|s| !s.is_empty());

    LabelItem {
        barcode: resolve_text(record, BARCODE_ALIASES).unwrap_or_default(),
        title: resolve_text(record, TITLE_ALIASES).unwrap_or_default(),
        price: resolve(record, PRICE_ALIASES)
            .map(price_from_value)
            .unwrap_or_default(),
        image_ref,
        qr_payload: resolve_text(record, QR_ALIASES).filter(|s| !s.is_empty()),
        reference,
    }
}

/// Normalize a whole batch, preserving order.
pub fn normalize_all(records: &[RawRecord], images: Option<&ImageLookup>) -> Vec<LabelItem> {
    records.iter().map(|r| normalize(r, images)).collect()
}

/// Find the first alias present in the record. Null cells count as absent.
fn resolve<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| {
        record
            .iter()
            .find(|(column, value)| {
                column.trim().eq_ignore_ascii_case(alias) && !value.is_null()
            })
            .map(|(_, value)| value)
    })
}

fn resolve_text(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    resolve(record, aliases).map(value_text)
}

/// Render a cell as text. Whole floats lose their `.0` so barcodes imported
/// as numbers keep their digits intact.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e17 => {
                format!("{:.0}", f)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn price_from_value(value: &Value) -> Price {
    match value {
        Value::Number(n) => n.as_f64().map(Price::Number).unwrap_or_default(),
        other => Price::Text(value_text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_short_aliases() {
        let item = normalize(
            &record(json!({"REF": "A1", "EAN": "123", "DESIGNATION": "Widget", "QTE": "5"})),
            None,
        );
        assert_eq!(item.reference, "A1");
        assert_eq!(item.barcode, "123");
        assert_eq!(item.title, "Widget");
        assert_eq!(item.price, Price::Text(String::new()));

        let serialized = serde_json::to_value(&item).unwrap();
        assert!(serialized.get("qty").is_none());
        assert!(!serialized.to_string().contains('5'));
    }

    #[test]
    fn test_first_alias_wins() {
        let item = normalize(
            &record(json!({"REF": "short", "REFERENCE": "long", "EAN": "1", "CODEBAR": "2"})),
            None,
        );
        assert_eq!(item.reference, "long");
        assert_eq!(item.barcode, "2");
    }

    #[test]
    fn test_column_names_are_case_insensitive() {
        let item = normalize(&record(json!({" reference ": "X9", "Prix": 4.5})), None);
        assert_eq!(item.reference, "X9");
        assert_eq!(item.price, Price::Number(4.5));
    }

    #[test]
    fn test_missing_fields_degrade_to_empty() {
        let item = normalize(&record(json!({"UNRELATED": "x"})), None);
        assert_eq!(item, LabelItem::default());
    }

    #[test]
    fn test_null_cell_falls_through_to_next_alias() {
        let item = normalize(&record(json!({"REFERENCE": null, "REF": "B2"})), None);
        assert_eq!(item.reference, "B2");
    }

    #[test]
    fn test_numeric_barcode_keeps_digits() {
        let item = normalize(&record(json!({"EAN": 3760001234567u64})), None);
        assert_eq!(item.barcode, "3760001234567");

        let item = normalize(&record(json!({"EAN": 3760001234567.0})), None);
        assert_eq!(item.barcode, "3760001234567");
    }

    #[test]
    fn test_qr_aliases() {
        let item = normalize(&record(json!({"QR_CODE": "https://example.com"})), None);
        assert_eq!(item.qr_payload.as_deref(), Some("https://example.com"));
        assert!(item.has_qr());

        let item = normalize(&record(json!({"QRURL": ""})), None);
        assert_eq!(item.qr_payload, None);
        assert!(!item.has_qr());
    }

    #[test]
    fn test_image_lookup_takes_precedence() {
        let mut lookup = ImageLookup::new();
        lookup.insert("a1", "data:image/png;base64,AAAA");

        let item = normalize(
            &record(json!({"REF": "A1", "IMAGE": "fallback.png"})),
            Some(&lookup),
        );
        assert_eq!(item.image_ref.as_deref(), Some("data:image/png;base64,AAAA"));

        let item = normalize(&record(json!({"REF": "B1", "IMAGE_PATH": "b1.png"})), Some(&lookup));
        assert_eq!(item.image_ref.as_deref(), Some("b1.png"));
    }

    #[test]
    fn test_with_image_falls_back_to_row_value() {
        let row = normalize(&record(json!({"REF": "A1", "IMAGE": "fallback.png"})), None);

        let mut first = ImageLookup::new();
        first.insert("A1", "data:image/png;base64,OLD=");
        assert_eq!(
            row.with_image(&first).image_ref.as_deref(),
            Some("data:image/png;base64,OLD=")
        );

        let second = ImageLookup::new();
        assert_eq!(row.with_image(&second).image_ref.as_deref(), Some("fallback.png"));
        assert_eq!(row.image_ref.as_deref(), Some("fallback.png"));
    }

    #[test]
    fn test_blank_qr_payload_is_not_drawn() {
        let item = LabelItem {
            qr_payload: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!item.has_qr());
    }
}
