//! Decodes uploaded file bytes into a [`RawTable`].
//!
//! CSV is decoded lossily as UTF-8 and read with headers; XLSX is read from
//! an in-memory cursor, first worksheet only, first row as header. Cells keep
//! their file-level type (string or number); no coercion happens here.

use std::collections::HashMap;
use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use calamine::{Data, Reader, Xlsx};
use serde_json::Value;

use models::RawTable;

/// Accepted upload formats, decided by filename extension before any byte
/// is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
}

impl FileKind {
    /// Returns the kind for a supported extension, `None` for anything else.
    pub fn from_filename(name: &str) -> Option<FileKind> {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            Some(FileKind::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(FileKind::Xlsx)
        } else {
            None
        }
    }
}

/// Reads raw upload bytes into a table according to the declared kind.
pub fn read_table(bytes: &[u8], kind: FileKind) -> Result<RawTable> {
    match kind {
        FileKind::Csv => read_csv(bytes),
        FileKind::Xlsx => read_xlsx(bytes),
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    // Lossy decode: a stray invalid byte must not reject the whole file.
    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = rdr
        .headers()
        .context("Reading CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            // Skip unreadable lines, keep the rest of the file usable.
            Err(_) => continue,
        };
        let mut row = HashMap::new();
        for (i, field) in record.iter().enumerate() {
            if let Some(col) = header.get(i) {
                row.insert(col.clone(), Value::String(field.to_string()));
            }
        }
        rows.push(row);
    }

    Ok(RawTable { header, rows })
}

fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).context("Opening XLSX workbook")?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))?
        .context("Reading first worksheet")?;

    let mut rows_iter = range.rows();
    let header: Vec<String> = match rows_iter.next() {
        Some(first) => first
            .iter()
            .map(|c| match c {
                Data::Empty => String::new(),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let mut rows = Vec::new();
    for raw_row in rows_iter {
        let mut row = HashMap::new();
        for (i, cell) in raw_row.iter().enumerate() {
            let Some(col) = header.get(i) else { continue };
            if let Some(value) = cell_to_value(cell) {
                row.insert(col.clone(), value);
            }
        }
        rows.push(row);
    }

    Ok(RawTable { header, rows })
}

/// Maps a spreadsheet cell to a JSON value, or `None` for empty/error cells.
///
/// Date cells are surfaced as their Excel serial number; the coercion layer
/// knows how to turn serials back into calendar dates.
fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::Error(_) => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) => Some(Value::String(s.clone())),
        Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_filename() {
        assert_eq!(FileKind::from_filename("sales.csv"), Some(FileKind::Csv));
        assert_eq!(FileKind::from_filename("REPORT.XLSX"), Some(FileKind::Xlsx));
        assert_eq!(FileKind::from_filename("data.xls"), None);
        assert_eq!(FileKind::from_filename("notes.txt"), None);
    }

    #[test]
    fn test_read_csv_basic() {
        let bytes = b"date,amount\n2024-01-01,100\n2024-01-03,50\n";
        let table = read_table(bytes, FileKind::Csv).unwrap();
        assert_eq!(table.header, vec!["date", "amount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("amount"),
            Some(&Value::String("100".to_string()))
        );
    }

    #[test]
    fn test_read_csv_short_row_leaves_columns_absent() {
        let bytes = b"date,amount,note\n2024-01-01,100\n";
        let table = read_table(bytes, FileKind::Csv).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].contains_key("amount"));
        assert!(!table.rows[0].contains_key("note"));
    }

    #[test]
    fn test_read_csv_empty_input() {
        let table = read_table(b"", FileKind::Csv).unwrap();
        assert!(table.header.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_read_csv_header_only() {
        let table = read_table(b"date,amount\n", FileKind::Csv).unwrap();
        assert_eq!(table.header.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_cell_to_value_types() {
        assert_eq!(cell_to_value(&Data::Empty), None);
        assert_eq!(
            cell_to_value(&Data::String("abc".to_string())),
            Some(Value::String("abc".to_string()))
        );
        assert_eq!(
            cell_to_value(&Data::Int(7)),
            Some(Value::Number(7.into()))
        );
        let float = cell_to_value(&Data::Float(12.5)).unwrap();
        assert_eq!(float.as_f64(), Some(12.5));
    }

    #[test]
    fn test_read_xlsx_rejects_garbage_bytes() {
        assert!(read_table(b"not a zip archive", FileKind::Xlsx).is_err());
    }
}
