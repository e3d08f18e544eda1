//! Record selection: age eligibility, year, month, village and drill-down
//! filters, plus the option lists that feed the selection controls.

use std::collections::BTreeSet;

use growth_core::{MeasurementRecord, Month, RecordField};

use crate::normalize::extract_years;

/// A single composable predicate over records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Age in whole years strictly below the bound. Unreadable ages never match.
    UnderAge(u32),
    /// Third part of a `DD/MM/YYYY` date, compared as text.
    Year(String),
    Month(String),
    Village(String),
    Posyandu(String),
    Status(String),
}

impl RecordFilter {
    pub fn matches(&self, record: &MeasurementRecord) -> bool {
        match self {
            RecordFilter::UnderAge(max_years) => extract_years(&record.age_at_measurement)
                .is_some_and(|years| years < *max_years),
            RecordFilter::Year(year) => {
                let parts: Vec<&str> = record.measurement_date.split('/').collect();
                parts.len() == 3 && parts[2] == year
            }
            RecordFilter::Month(month) => record.measurement_month_name == *month,
            RecordFilter::Village(village) => record.village == *village,
            RecordFilter::Posyandu(posyandu) => record.posyandu == *posyandu,
            RecordFilter::Status(status) => record.weight_for_height_status == *status,
        }
    }
}

/// Keep records matching every filter, in input order.
pub fn apply_filters(
    records: &[MeasurementRecord],
    filters: &[RecordFilter],
) -> Vec<MeasurementRecord> {
    records
        .iter()
        .filter(|record| filters.iter().all(|filter| filter.matches(record)))
        .cloned()
        .collect()
}

fn retain(records: &[MeasurementRecord], filter: RecordFilter) -> Vec<MeasurementRecord> {
    apply_filters(records, std::slice::from_ref(&filter))
}

pub fn filter_under_age(records: &[MeasurementRecord], max_years: u32) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::UnderAge(max_years))
}

pub fn filter_under_five_years(records: &[MeasurementRecord]) -> Vec<MeasurementRecord> {
    filter_under_age(records, 5)
}

/// Only `DD/MM/YYYY` dates take part; other date shapes never match.
pub fn filter_by_year(records: &[MeasurementRecord], year: &str) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::Year(year.to_string()))
}

pub fn filter_by_month(records: &[MeasurementRecord], month_name: &str) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::Month(month_name.to_string()))
}

pub fn filter_by_village(records: &[MeasurementRecord], village: &str) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::Village(village.to_string()))
}

pub fn filter_by_posyandu(records: &[MeasurementRecord], posyandu: &str) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::Posyandu(posyandu.to_string()))
}

pub fn filter_by_status(records: &[MeasurementRecord], status: &str) -> Vec<MeasurementRecord> {
    retain(records, RecordFilter::Status(status.to_string()))
}

/// Distinct measurement years, newest first. Non-numeric years sort last.
pub fn unique_years(records: &[MeasurementRecord]) -> Vec<String> {
    let years: BTreeSet<&str> = records
        .iter()
        .filter_map(|record| {
            let parts: Vec<&str> = record.measurement_date.split('/').collect();
            (parts.len() == 3).then(|| parts[2])
        })
        .filter(|year| !year.is_empty())
        .collect();

    let mut years: Vec<String> = years.into_iter().map(str::to_string).collect();
    years.sort_by(|a, b| match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    years
}

/// Distinct non-empty values of one field, ascending.
pub fn unique_values(records: &[MeasurementRecord], field: RecordField) -> Vec<String> {
    records
        .iter()
        .map(|record| field.get(record))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Months present in the records, in calendar order.
pub fn unique_months(records: &[MeasurementRecord]) -> Vec<Month> {
    records
        .iter()
        .filter_map(|record| Month::from_name(&record.measurement_month_name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
