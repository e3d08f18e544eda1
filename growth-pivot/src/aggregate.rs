//! Unique-child pivots. Every cell is the size of a set of identity keys,
//! never a row count.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use growth_core::{MeasurementRecord, Month, StatusPosyanduRow, MonthStatusRow, VillageCount};

use crate::dedup::deduplicate_by;
use crate::filter::{filter_by_posyandu, filter_by_status};

/// Distinct children in the whole set.
pub fn count_total_unique(records: &[MeasurementRecord]) -> usize {
    count_total_unique_by(records, |record| record.name.as_str())
}

pub fn count_total_unique_by<F>(records: &[MeasurementRecord], key: F) -> usize
where
    F: Fn(&MeasurementRecord) -> &str,
{
    records
        .iter()
        .map(|record| key(record))
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct children per village, sorted by village.
pub fn count_by_village(records: &[MeasurementRecord]) -> Vec<VillageCount> {
    count_by_village_by(records, |record| record.name.as_str())
}

pub fn count_by_village_by<F>(records: &[MeasurementRecord], key: F) -> Vec<VillageCount>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let mut villages: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for record in records {
        let id = key(record);
        if record.village.is_empty() || id.is_empty() {
            continue;
        }
        villages.entry(&record.village).or_default().insert(id);
    }

    villages
        .into_iter()
        .map(|(village, children)| VillageCount {
            village: village.to_string(),
            count: children.len(),
        })
        .collect()
}

/// Month x status pivot. Rows follow the calendar, months without data are
/// omitted and each row only carries the statuses seen that month.
///
/// Month names outside the canonical sequence cannot be placed and are skipped.
pub fn status_by_month(records: &[MeasurementRecord]) -> Vec<MonthStatusRow> {
    status_by_month_by(records, |record| record.name.as_str())
}

pub fn status_by_month_by<F>(records: &[MeasurementRecord], key: F) -> Vec<MonthStatusRow>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let mut months: BTreeMap<Month, BTreeMap<&str, HashSet<&str>>> = BTreeMap::new();
    for record in records {
        let id = key(record);
        let status = record.weight_for_height_status.as_str();
        if id.is_empty() || status.is_empty() {
            continue;
        }
        let Some(month) = Month::from_name(&record.measurement_month_name) else {
            continue;
        };
        months
            .entry(month)
            .or_default()
            .entry(status)
            .or_default()
            .insert(id);
    }

    months
        .into_iter()
        .map(|(month, statuses)| MonthStatusRow {
            month,
            counts: statuses
                .into_iter()
                .map(|(status, children)| (status.to_string(), children.len()))
                .collect(),
        })
        .collect()
}

/// Status x posyandu pivot. Every row lists every posyandu of the input,
/// zero-filled; rows are sorted by status.
pub fn status_by_posyandu(records: &[MeasurementRecord]) -> Vec<StatusPosyanduRow> {
    status_by_posyandu_by(records, |record| record.name.as_str())
}

pub fn status_by_posyandu_by<F>(records: &[MeasurementRecord], key: F) -> Vec<StatusPosyanduRow>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let universe: BTreeSet<&str> = records
        .iter()
        .map(|record| record.posyandu.as_str())
        .filter(|posyandu| !posyandu.is_empty())
        .collect();

    let mut statuses: BTreeMap<&str, BTreeMap<&str, HashSet<&str>>> = BTreeMap::new();
    for record in records {
        let id = key(record);
        let status = record.weight_for_height_status.as_str();
        let posyandu = record.posyandu.as_str();
        if id.is_empty() || status.is_empty() || posyandu.is_empty() {
            continue;
        }
        statuses
            .entry(status)
            .or_default()
            .entry(posyandu)
            .or_default()
            .insert(id);
    }

    statuses
        .into_iter()
        .map(|(status, cells)| StatusPosyanduRow {
            status: status.to_string(),
            counts: universe
                .iter()
                .map(|posyandu| {
                    let count = cells.get(posyandu).map_or(0, HashSet::len);
                    (posyandu.to_string(), count)
                })
                .collect(),
        })
        .collect()
}

/// Children behind one status x posyandu cell, one row each.
pub fn posyandu_detail(
    records: &[MeasurementRecord],
    status: &str,
    posyandu: &str,
) -> Vec<MeasurementRecord> {
    posyandu_detail_by(records, status, posyandu, |record| record.name.as_str())
}

pub fn posyandu_detail_by<F>(
    records: &[MeasurementRecord],
    status: &str,
    posyandu: &str,
    key: F,
) -> Vec<MeasurementRecord>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    deduplicate_by(&filter_by_posyandu(&filter_by_status(records, status), posyandu), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, village: &str, month: &str, status: &str, posyandu: &str) -> MeasurementRecord {
        MeasurementRecord {
            name: name.into(),
            village: village.into(),
            measurement_month_name: month.into(),
            weight_for_height_status: status.into(),
            posyandu: posyandu.into(),
            ..MeasurementRecord::default()
        }
    }

    #[test]
    fn village_counts_are_unique_children() {
        let records = vec![
            record("Ani", "Sukamaju", "Maret", "", ""),
            record("Ani", "Sukamaju", "April", "", ""),
            record("Budi", "Sukamaju", "April", "", ""),
            record("Citra", "Cibodas", "April", "", ""),
            record("", "Cibodas", "April", "", ""),
            record("Dedi", "", "April", "", ""),
        ];
        let counts = count_by_village(&records);
        assert_eq!(
            counts,
            vec![
                VillageCount { village: "Cibodas".into(), count: 1 },
                VillageCount { village: "Sukamaju".into(), count: 2 },
            ]
        );
        assert_eq!(count_total_unique(&records), 4);
    }

    #[test]
    fn month_pivot_is_sparse_and_calendar_ordered() {
        let records = vec![
            record("Ani", "", "Mei", "Gizi Baik", ""),
            record("Budi", "", "Januari", "Gizi Kurang", ""),
            record("Ani", "", "Januari", "Gizi Baik", ""),
            record("Ani", "", "Januari", "Gizi Baik", ""),
            record("Citra", "", "Januari", "", ""),
            record("Dedi", "", "", "Gizi Buruk", ""),
        ];
        let rows = status_by_month(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, Month::Januari);
        assert_eq!(
            rows[0].counts,
            BTreeMap::from([("Gizi Baik".to_string(), 1), ("Gizi Kurang".to_string(), 1)])
        );
        assert_eq!(rows[1].month, Month::Mei);
        assert!(!rows[1].counts.contains_key("Gizi Kurang"));
    }

    #[test]
    fn posyandu_pivot_zero_fills_every_column() {
        let records = vec![
            record("Ani", "", "", "Gizi Baik", "Melati"),
            record("Ani", "", "", "Gizi Baik", "Melati"),
            record("Budi", "", "", "Gizi Kurang", "Mawar"),
            record("Citra", "", "", "Gizi Baik", "Mawar"),
            record("Dedi", "", "", "", "Anggrek"),
        ];
        let rows = status_by_posyandu(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, "Gizi Baik");
        assert_eq!(
            rows[0].counts,
            BTreeMap::from([
                ("Anggrek".to_string(), 0),
                ("Mawar".to_string(), 1),
                ("Melati".to_string(), 1),
            ])
        );
        assert_eq!(rows[1].status, "Gizi Kurang");
        assert_eq!(rows[1].counts.get("Melati"), Some(&0));
        assert_eq!(rows[1].counts.get("Mawar"), Some(&1));
    }

    #[test]
    fn key_selector_changes_identity() {
        let mut a = record("Ani", "Sukamaju", "", "", "");
        a.national_id = "1".into();
        let mut b = record("Ani", "Sukamaju", "", "", "");
        b.national_id = "2".into();
        let records = vec![a, b];

        assert_eq!(count_by_village(&records)[0].count, 1);
        assert_eq!(
            count_by_village_by(&records, |record| record.national_id.as_str())[0].count,
            2
        );
    }

    #[test]
    fn detail_lists_each_child_once() {
        let records = vec![
            record("Ani", "", "Maret", "Gizi Kurang", "Melati"),
            record("Ani", "", "April", "Gizi Kurang", "Melati"),
            record("Budi", "", "April", "Gizi Kurang", "Mawar"),
            record("Citra", "", "April", "Gizi Baik", "Melati"),
        ];
        let detail = posyandu_detail(&records, "Gizi Kurang", "Melati");
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0].measurement_month_name, "Maret");
    }

    #[test]
    fn detail_dedup_follows_key_selector() {
        let mut first = record("Ani", "", "Maret", "Gizi Kurang", "Melati");
        first.national_id = "1".into();
        let mut namesake = record("Ani", "", "April", "Gizi Kurang", "Melati");
        namesake.national_id = "2".into();
        let records = vec![first, namesake];

        assert_eq!(posyandu_detail(&records, "Gizi Kurang", "Melati").len(), 1);
        let by_id = posyandu_detail_by(&records, "Gizi Kurang", "Melati", |record| {
            record.national_id.as_str()
        });
        assert_eq!(by_id.len(), 2);
    }

    #[test]
    fn month_pivot_matches_stored_name_exactly() {
        let records = vec![
            record("Ani", "", "April ", "Gizi Baik", ""),
            record("Budi", "", "april", "Gizi Baik", ""),
            record("Citra", "", "April", "Gizi Kurang", ""),
        ];
        let rows = status_by_month(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].counts,
            BTreeMap::from([("Gizi Kurang".to_string(), 1)])
        );
        assert_eq!(crate::filter::filter_by_month(&records, "April").len(), 1);
    }
}
