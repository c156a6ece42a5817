//! # Record Import
//!
//! Turns an uploaded spreadsheet export into ordered [`RawRecord`]s for the
//! row normalizer.
//!
//! Three formats are accepted:
//!
//! - **CSV**: first line is the header. The delimiter (`,` or `;`) is detected
//!   from the header line. Quoted fields may contain delimiters, doubled
//!   quotes and line breaks. Empty cells are left out of the record, so the
//!   normalizer falls through to the next alias. Blank lines are skipped.
//! - **JSON**: an array of objects, as produced by most spreadsheet-to-JSON
//!   converters. Cell types (numbers, strings) are kept.
//! - **XLSX**: the first worksheet of a workbook, read with `calamine`. The
//!   first row is the header; numbers and booleans keep their type and empty
//!   cells are left out, as for CSV.

use calamine::{Data, Reader, Xlsx};
use serde_json::Value;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::item::RawRecord;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is empty")]
    Empty,

    #[error("unsupported file type '{0}' (expected .csv, .json or .xlsx)")]
    UnsupportedFormat(String),

    #[error("unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON input must be an array of objects (entry {0} is not an object)")]
    NotAnObject(usize),

    #[error("invalid workbook: {0}")]
    Xlsx(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input format of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Xlsx,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("csv") | Some("txt") => Ok(Format::Csv),
            Some("json") => Ok(Format::Json),
            Some("xlsx") => Ok(Format::Xlsx),
            Some(ext) => Err(ImportError::UnsupportedFormat(ext.to_string())),
            None => Err(ImportError::UnsupportedFormat(String::new())),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Some(Format::Csv),
            "json" => Some(Format::Json),
            "xlsx" => Some(Format::Xlsx),
            _ => None,
        }
    }
}

/// Read and parse a file, choosing the format from its extension.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, ImportError> {
    let format = Format::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let records = parse_records(&bytes, format)?;
    tracing::info!(path = %path.display(), records = records.len(), "imported records");
    Ok(records)
}

/// Parse raw bytes in the given format.
pub fn parse_records(bytes: &[u8], format: Format) -> Result<Vec<RawRecord>, ImportError> {
    match format {
        Format::Csv => parse_csv(&decode_text(bytes)?),
        Format::Json => parse_json(&decode_text(bytes)?),
        Format::Xlsx => parse_xlsx(bytes),
    }
}

/// UTF-8 text without a byte order mark. Invalid sequences are replaced.
fn decode_text(bytes: &[u8]) -> Result<String, ImportError> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => std::borrow::Cow::Borrowed(text),
        Err(_) => {
            tracing::warn!("input is not valid UTF-8, replacing invalid sequences");
            String::from_utf8_lossy(bytes)
        }
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(text.to_string())
}

fn parse_json(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let rows: Vec<Value> = serde_json::from_str(text)?;
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| match row {
            Value::Object(map) => Ok(map),
            _ => Err(ImportError::NotAnObject(idx)),
        })
        .collect()
}

fn parse_csv(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut rows = split_rows(text, delimiter)?.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(ImportError::Empty),
    };

    let records = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            header
                .iter()
                .zip(row)
                .filter(|(name, cell)| !name.is_empty() && !cell.is_empty())
                .map(|(name, cell)| (name.clone(), Value::String(cell)))
                .collect::<RawRecord>()
        })
        .collect();

    Ok(records)
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<RawRecord>, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ImportError::Xlsx(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)?
        .map_err(|e| ImportError::Xlsx(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell.to_string().trim().to_string()).collect(),
        None => return Err(ImportError::Empty),
    };

    let records = rows
        .map(|row| {
            header
                .iter()
                .zip(row)
                .filter(|(name, _)| !name.is_empty())
                .filter_map(|(name, cell)| cell_value(cell).map(|value| (name.clone(), value)))
                .collect::<RawRecord>()
        })
        .filter(|record| !record.is_empty())
        .collect();

    Ok(records)
}

/// JSON value of a worksheet cell. `None` for empty and error cells.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}

/// `;` wins when it splits the header into more columns than `,` does.
/// Spreadsheet exports in comma-decimal locales use it.
fn detect_delimiter(header: &str) -> char {
    let count = |d: char| split_line(header, d).len();
    if count(';') > count(',') { ';' } else { ',' }
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    split_rows(line, delimiter)
        .ok()
        .and_then(|rows| rows.into_iter().next())
        .unwrap_or_default()
}

/// Split CSV text into rows of fields, honouring quotes.
fn split_rows(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, ImportError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '\n' if !in_quotes => {
                line += 1;
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\r' if !in_quotes => {}
            c if c == delimiter && !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            c => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(ImportError::UnterminatedQuote(quote_line));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::normalize;
    use pretty_assertions::assert_eq;

    fn csv(text: &str) -> Vec<RawRecord> {
        parse_records(text.as_bytes(), Format::Csv).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let records = csv("REF,EAN,DESIGNATION,PRIX\nA1,123,Widget,3.5\nA2,456,Gadget,4\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["REF"], Value::String("A1".into()));
        assert_eq!(records[1]["PRIX"], Value::String("4".into()));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let records = csv("REFERENCE;PRIX;DESIGNATION\nA1;12,50;Chaise, pliante\n");
        assert_eq!(records[0]["PRIX"], Value::String("12,50".into()));
        assert_eq!(records[0]["DESIGNATION"], Value::String("Chaise, pliante".into()));
    }

    #[test]
    fn test_quoted_fields() {
        let records = csv("REF,DESIGNATION\nA1,\"Lamp, \"\"big\"\"\nwhite\"\r\nA2,plain\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0]["DESIGNATION"],
            Value::String("Lamp, \"big\"\nwhite".into())
        );
        assert_eq!(records[1]["REF"], Value::String("A2".into()));
    }

    #[test]
    fn test_empty_cells_are_absent() {
        let records = csv("REFERENCE,REF\n,B2\n");
        assert!(!records[0].contains_key("REFERENCE"));
        assert_eq!(normalize(&records[0], None).reference, "B2");
    }

    #[test]
    fn test_blank_lines_and_bom() {
        let records = csv("\u{feff}REF\nA1\n\n,\nA2");
        assert_eq!(records.len(), 2);
        assert!(records[0].contains_key("REF"));
    }

    #[test]
    fn test_short_rows() {
        let records = csv("REF,EAN,DESIGNATION\nA1\n");
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_records(b"REF\n\"A1", Format::Csv).unwrap_err();
        assert!(matches!(err, ImportError::UnterminatedQuote(2)));
    }

    #[test]
    fn test_json_records_keep_types() {
        let records = parse_records(
            br#"[{"REF": "A1", "PRIX": 3.5}, {"REF": "A2", "QTE": 4}]"#,
            Format::Json,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0]["PRIX"].is_f64());
    }

    #[test]
    fn test_json_rejects_non_objects() {
        let err = parse_records(br#"[{"REF": "A1"}, 3]"#, Format::Json).unwrap_err();
        assert!(matches!(err, ImportError::NotAnObject(1)));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_records(b"  \n", Format::Csv), Err(ImportError::Empty)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("a.XLSX")).unwrap(), Format::Xlsx);
        assert!(Format::from_path(Path::new("a.ods")).is_err());
        assert_eq!(Format::parse("xlsx"), Some(Format::Xlsx));
    }

    const WORKBOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/catalog.xlsx");

    #[test]
    fn test_xlsx_first_sheet_with_header_keys() {
        let records = load_records(Path::new(WORKBOOK)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["REF"], Value::String("X1".into()));
        assert!(records[0]["PRIX"].is_f64());
        assert_eq!(records[1]["PRIX"], Value::String("3,00".into()));
        assert!(!records[1].contains_key("IMAGE"));

        let item = normalize(&records[0], None);
        assert_eq!(item.barcode, "3760001234567");
        assert_eq!(item.title, "Chaise pliante");
        assert_eq!(item.image_ref.as_deref(), Some("x1.jpg"));
    }

    #[test]
    fn test_xlsx_rejects_other_bytes() {
        let err = parse_records(b"REF;PRIX\nA1;2\n", Format::Xlsx).unwrap_err();
        assert!(matches!(err, ImportError::Xlsx(_)));
        assert!(matches!(parse_records(b"", Format::Xlsx), Err(ImportError::Empty)));
    }
}
