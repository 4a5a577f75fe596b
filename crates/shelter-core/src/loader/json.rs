// crates/shelter-core/src/loader/json.rs
use super::RawTable;
use crate::error::Result;
use serde_json::{Map, Value};

/// Parses a JSON array of flat objects. Columns are the union of all keys in
/// first-seen order; scalars are rendered as text, `null` as an absent cell.
pub(crate) fn parse(bytes: &[u8]) -> Result<RawTable> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(bytes)?;

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| record.get(col).and_then(cell_text))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_scalars_as_text() {
        let json = br#"[
            {"id": 7, "name": "Hall", "lat": 33.81},
            {"id": "8", "name": null, "extra": true}
        ]"#;
        let table = parse(json).unwrap();

        assert_eq!(table.columns(), ["id", "name", "lat", "extra"]);
        assert_eq!(table.cell(0, 0), Some("7"));
        assert_eq!(table.cell(0, 2), Some("33.81"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), None);
        assert_eq!(table.cell(1, 3), Some("true"));
    }

    #[test]
    fn rejects_non_array_payload() {
        assert!(parse(br#"{"id": 1}"#).is_err());
    }
}
