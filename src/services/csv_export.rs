//! CSV rendering of merged stock rows.
//!
//! The header is the union of keys across all records in first-appearance
//! order, so partially populated rows widen the sheet rather than being
//! truncated. Quoting is delegated to the `csv` writer.

use crate::error::{AppError, Result};
use crate::models::StockRow;
use serde_json::Value;
use std::collections::HashSet;

/// Render rows as CSV. Each row serializes through its JSON shape, so
/// absent optional fields simply contribute no column until some row
/// carries them.
pub fn csv_from_rows(rows: &[StockRow]) -> Result<String> {
    let records: Vec<Value> = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| AppError::Other(format!("serialize rows for export: {e}")))?;
    csv_from_records(&records)
}

/// Render JSON object records as CSV.
pub fn csv_from_records(records: &[Value]) -> Result<String> {
    let mut headers: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for record in records {
        let Some(object) = record.as_object() else {
            return Err(AppError::InvalidInput(
                "CSV export requires object records".to_string(),
            ));
        };
        for key in object.keys() {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for record in records {
        let object = record.as_object();
        let fields: Vec<String> = headers
            .iter()
            .map(|header| match object.and_then(|o| o.get(header)) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                Some(other) => other.to_string(),
            })
            .collect();
        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(format!("flush CSV writer: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Other(format!("CSV is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_is_union_in_first_appearance_order() {
        let records = vec![
            json!({"symbol": "A", "close": 10.0}),
            json!({"symbol": "B", "rsi_14": 55.0}),
        ];
        let csv = csv_from_records(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("symbol,close,rsi_14"));
        assert_eq!(lines.next(), Some("A,10.0,"));
        assert_eq!(lines.next(), Some("B,,55.0"));
    }

    #[test]
    fn special_characters_are_quoted() {
        let records = vec![json!({"name": "Acme, \"Inc\""})];
        let csv = csv_from_records(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name"));
        assert_eq!(lines.next(), Some("\"Acme, \"\"Inc\"\"\""));
    }

    #[test]
    fn nulls_render_as_empty_fields() {
        let records = vec![json!({"a": null, "b": 1})];
        let csv = csv_from_records(&records).unwrap();
        assert_eq!(csv, "a,b\n,1\n");
    }

    #[test]
    fn stock_rows_export_without_empty_optional_columns() {
        let mut row = StockRow::new("AAPL");
        row.close = Some(190.0);
        row.market_stage = Some("Stage 2".to_string());

        let csv = csv_from_rows(&[row]).unwrap();
        let header = csv.lines().next().unwrap();
        assert!(header.contains("symbol"));
        assert!(header.contains("close"));
        assert!(header.contains("market_stage"));
        assert!(!header.contains("rsi_14"));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = csv_from_records(&[json!([1, 2, 3])]).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
