use std::fs;

use growth_core::{DashboardQuery, Month, PivotConfig};
use growth_pivot::{build_dashboard, records_from_json_str};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn posyandu_export_matches_golden() {
    let export = fs::read_to_string(fixture_path("posyandu_export.json"))
        .expect("sample export should be readable");
    let records = records_from_json_str(&export).expect("sample export should parse");
    assert_eq!(records.len(), 8);

    let query = DashboardQuery {
        year: Some("2024".into()),
        month: Some(Month::April),
        village: Some("Sukamaju".into()),
    };
    let snapshot = build_dashboard(&records, &query, &PivotConfig::default());

    let mut actual = serde_json::to_value(snapshot).expect("snapshot should serialize");
    normalize_dynamic_fields(&mut actual);

    let expected = fs::read_to_string(fixture_path("posyandu_dashboard_snapshot.json"))
        .expect("golden snapshot should be readable");
    let mut expected_value: Value =
        serde_json::from_str(&expected).expect("golden snapshot should be valid JSON");
    normalize_dynamic_fields(&mut expected_value);

    assert_eq!(actual, expected_value);
}

fn normalize_dynamic_fields(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if obj.contains_key("generated_at") {
            obj.insert(
                "generated_at".to_string(),
                Value::String("__DYNAMIC_TIMESTAMP__".to_string()),
            );
        }
    }
}
