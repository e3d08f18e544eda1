use std::collections::HashSet;

use growth_core::MeasurementRecord;

/// First record of each distinct name, in first-seen order.
pub fn deduplicate_by_name(records: &[MeasurementRecord]) -> Vec<MeasurementRecord> {
    deduplicate_by(records, |record| record.name.as_str())
}

pub fn deduplicate_by<F>(records: &[MeasurementRecord], key: F) -> Vec<MeasurementRecord>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| seen.insert(key(record)))
        .cloned()
        .collect()
}
