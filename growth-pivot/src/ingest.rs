//! Boundary between exported register data and the engine.

use growth_core::{GrowthError, MeasurementRecord};
use serde::Deserialize;
use serde_json::Value;

const WRAPPER_KEYS: [&str; 2] = ["records", "data"];

/// Read records from a JSON export.
pub fn records_from_json_str(json: &str) -> Result<Vec<MeasurementRecord>, GrowthError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| GrowthError::Parse(err.to_string()))?;
    records_from_json_value(&value)
}

/// Accepts a bare array of row objects or an object wrapping one under
/// `records` or `data`. Rows that are not objects are ignored.
pub fn records_from_json_value(value: &Value) -> Result<Vec<MeasurementRecord>, GrowthError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(Value::as_array)
            .ok_or(GrowthError::MissingData)?,
        other => {
            return Err(GrowthError::Parse(format!(
                "expected an array of records, received {}",
                json_kind(other)
            )))
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if !row.is_object() {
            tracing::trace!(index, kind = json_kind(row), "ignoring non-object row");
            continue;
        }
        let record = MeasurementRecord::deserialize(row)
            .map_err(|err| GrowthError::Parse(format!("row {index}: {err}")))?;
        records.push(record);
    }

    tracing::debug!(
        rows = rows.len(),
        records = records.len(),
        "loaded measurement records"
    );
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_bare_array() {
        let records = records_from_json_str(
            r#"[{"name": "Ani", "village": "A"}, 42, {"Nama": "Budi", "Berat": 10}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].village, "A");
        assert_eq!(records[1].name, "Budi");
        assert_eq!(records[1].weight_kg, "10");
    }

    #[test]
    fn reads_wrapped_array() {
        let records = records_from_json_str(r#"{"data": [{"name": "Ani"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn rejects_unusable_input() {
        assert!(matches!(
            records_from_json_str(r#"{"rows": []}"#),
            Err(GrowthError::MissingData)
        ));
        assert!(matches!(
            records_from_json_str(r#""Ani""#),
            Err(GrowthError::Parse(_))
        ));
        assert!(matches!(
            records_from_json_str("[{"),
            Err(GrowthError::Parse(_))
        ));
        assert!(matches!(
            records_from_json_str(r#"[{"name": {"first": "Ani"}}]"#),
            Err(GrowthError::Parse(message)) if message.starts_with("row 0")
        ));
    }
}
