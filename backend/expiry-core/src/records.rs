// src/records.rs
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

use expiry_core::DateInput;

use crate::error::AppError;

/// One row of a snapshot, keyed by column / property name.
pub type Record = Map<String, Value>;

/// Reads a record snapshot from `.json` (array of objects) or `.csv` (header row).
pub fn load_records(path: &Path) -> Result<Vec<Record>, AppError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => return Err(AppError::UnsupportedFormat(path.to_path_buf())),
    };
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn load_json(path: &Path) -> Result<Vec<Record>, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(fields),
                _ => Err(AppError::NotAnObjectArray),
            })
            .collect(),
        _ => Err(AppError::NotAnObjectArray),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Record>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(header, cell)| {
                let cell = cell.trim();
                // Empty cells are missing values, not empty strings.
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (header.trim().to_string(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Date input for `field` of a loaded record.
///
/// Strings go to the date parser as text; null or missing is absent. Other
/// JSON types can't hold a date and are logged and treated as absent.
pub fn date_field<'a>(record: &'a Record, field: &str) -> DateInput<'a> {
    match record.get(field) {
        None | Some(Value::Null) => DateInput::Absent,
        Some(Value::String(text)) => DateInput::Text(text),
        Some(other) => {
            warn!("Field '{}' holds {} instead of a date; treating as absent", field, other);
            DateInput::Absent
        }
    }
}

/// True when at least one record carries `field` (possibly null).
pub fn has_field(records: &[Record], field: &str) -> bool {
    records.iter().any(|record| record.contains_key(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_json_array_of_objects() {
        let file = temp_file(
            ".json",
            r#"[{"nama": "Budi", "kontrak_akhir": "2025-01-10"}, {"nama": "Citra", "kontrak_akhir": null}]"#,
        );

        let records = load_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["nama"], "Budi");
        assert_eq!(date_field(&records[0], "kontrak_akhir"), DateInput::Text("2025-01-10"));
        assert_eq!(date_field(&records[1], "kontrak_akhir"), DateInput::Absent);
    }

    #[test]
    fn rejects_json_that_is_not_an_object_array() {
        let file = temp_file(".json", r#"{"nama": "Budi"}"#);
        assert!(matches!(load_records(file.path()), Err(AppError::NotAnObjectArray)));

        let file = temp_file(".json", r#"[{"nama": "Budi"}, 3]"#);
        assert!(matches!(load_records(file.path()), Err(AppError::NotAnObjectArray)));
    }

    #[test]
    fn loads_csv_with_blank_cells_as_null() {
        let file = temp_file(
            ".CSV",
            "nama,akhir_mcu,akhir_siml\nBudi,05/03/2025,\nCitra, 2025-04-01 ,2026-01-01\n",
        );

        let records = load_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["akhir_siml"], Value::Null);
        assert_eq!(date_field(&records[0], "akhir_mcu"), DateInput::Text("05/03/2025"));
        assert_eq!(date_field(&records[1], "akhir_mcu"), DateInput::Text("2025-04-01"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let file = temp_file(".xlsx", "");
        assert!(matches!(
            load_records(file.path()),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn non_string_dates_are_absent() {
        let record: Record = json!({"akhir_mcu": 20250101, "flag": true})
            .as_object()
            .unwrap()
            .clone();
        assert_eq!(date_field(&record, "akhir_mcu"), DateInput::Absent);
        assert_eq!(date_field(&record, "missing"), DateInput::Absent);
        assert!(has_field(&[record], "flag"));
    }
}
