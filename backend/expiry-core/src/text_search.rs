// src/text_search.rs
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// True if any field of `record` contains `term`, ignoring case.
///
/// The record is viewed through its serde representation: each top-level
/// field of a struct or map is checked, null fields are skipped, strings are
/// compared as written, other scalars by their printed form and nested values
/// as compact JSON. The term is matched as given, surrounding spaces
/// included. An empty term matches everything.
pub fn record_matches_text<T: Serialize + ?Sized>(record: &T, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    matches_lowercase_needle(record, &needle)
}

pub(crate) fn matches_lowercase_needle<T: Serialize + ?Sized>(record: &T, needle: &str) -> bool {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => fields.values().any(|value| value_contains(value, needle)),
        Ok(other) => value_contains(&other, needle),
        Err(e) => {
            debug!("Record could not be viewed as fields for text search: {}", e);
            false
        }
    }
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string().to_lowercase().contains(needle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Employee {
        nama: String,
        nik: u32,
        jabatan: Option<String>,
        aktif: bool,
    }

    fn budi() -> Employee {
        Employee {
            nama: "Budi Santoso".to_string(),
            nik: 10423,
            jabatan: None,
            aktif: true,
        }
    }

    #[test]
    fn matches_any_field_ignoring_case() {
        let employee = budi();
        assert!(record_matches_text(&employee, "budi"));
        assert!(record_matches_text(&employee, "SANTOSO"));
        assert!(record_matches_text(&employee, "1042"));
        assert!(record_matches_text(&employee, "true"));
        assert!(!record_matches_text(&employee, "operator"));
    }

    #[test]
    fn null_fields_and_field_names_never_match() {
        let employee = budi();
        assert!(!record_matches_text(&employee, "null"));
        assert!(!record_matches_text(&employee, "jabatan"));
    }

    #[test]
    fn empty_term_matches_everything() {
        assert!(record_matches_text(&budi(), ""));
        assert!(record_matches_text(&Option::<String>::None, ""));
    }

    #[test]
    fn spaces_in_the_term_are_part_of_the_substring() {
        assert!(record_matches_text(&budi(), " santoso"));
        assert!(record_matches_text(&budi(), " "));
        assert!(!record_matches_text("Santoso Jaya", " santoso"));
        assert!(!record_matches_text("Budi", " "));
        assert!(!record_matches_text("Budi", "budi "));
    }

    #[test]
    fn nested_values_are_searched() {
        let record = json!({ "dokumen": { "jenis": "Paspor HSE" }, "tags": ["site-A"] });
        assert!(record_matches_text(&record, "paspor"));
        assert!(record_matches_text(&record, "SITE-a"));
    }

    #[test]
    fn scalar_records_match_their_own_value() {
        assert!(record_matches_text("Budi", "bud"));
        assert!(!record_matches_text(&Option::<String>::None, "x"));
    }
}
