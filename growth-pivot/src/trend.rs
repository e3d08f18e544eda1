//! "Tidak Naik BB" detection: a child is flagged when their latest weight in
//! the selected month is not above their latest weight in the month before.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use growth_core::{MeasurementRecord, Month, WeightTrend};
use serde::Serialize;

use crate::normalize::{parse_date, parse_weight, try_format_date};

/// Why a child took no part in the comparison.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoCurrentMonth,
    NoPreviousMonth,
    UnparseableWeight,
    MissingPosyandu,
}

/// Per-child bookkeeping of one detector run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct TrendAudit {
    pub compared: usize,
    pub stagnant: usize,
    /// Stagnant children counted but left out of `flagged` because their
    /// measurement date could not be read.
    pub unformattable_dates: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

enum Outcome<'a> {
    Gained,
    Stagnant(&'a MeasurementRecord),
    Skipped(SkipReason),
}

pub fn detect_weight_stagnation(
    records: &[MeasurementRecord],
    village: &str,
    selected_month: &str,
) -> WeightTrend {
    detect_weight_stagnation_by(records, village, selected_month, |record| {
        record.name.as_str()
    })
}

pub fn detect_weight_stagnation_by<F>(
    records: &[MeasurementRecord],
    village: &str,
    selected_month: &str,
    key: F,
) -> WeightTrend
where
    F: Fn(&MeasurementRecord) -> &str,
{
    detect_weight_stagnation_audited(records, village, selected_month, key).0
}

/// Runs the detector and also reports how every child was classified.
///
/// `records` should be scoped to a year but not to a month: both the selected
/// and the previous month are read from it.
pub fn detect_weight_stagnation_audited<F>(
    records: &[MeasurementRecord],
    village: &str,
    selected_month: &str,
    key: F,
) -> (WeightTrend, TrendAudit)
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let in_village: Vec<&MeasurementRecord> = records
        .iter()
        .filter(|record| record.village == village)
        .collect();

    let mut trend = WeightTrend {
        counts: in_village
            .iter()
            .filter(|record| !record.posyandu.is_empty())
            .map(|record| (record.posyandu.clone(), 0))
            .collect(),
        flagged: Vec::new(),
    };
    let mut audit = TrendAudit::default();

    let Some((current, previous)) =
        Month::from_name(selected_month).and_then(|month| Some((month, month.previous()?)))
    else {
        return (trend, audit);
    };

    for (_, history) in group_by_child(&in_village, &key) {
        match compare_child(&history, current, previous) {
            Outcome::Gained => audit.compared += 1,
            Outcome::Stagnant(latest) => {
                audit.compared += 1;
                audit.stagnant += 1;
                *trend.counts.entry(latest.posyandu.clone()).or_insert(0) += 1;
                match try_format_date(&latest.measurement_date) {
                    Some(date) => trend.flagged.push(MeasurementRecord {
                        measurement_date: date,
                        ..latest.clone()
                    }),
                    None => audit.unformattable_dates += 1,
                }
            }
            Outcome::Skipped(reason) => *audit.skipped.entry(reason).or_insert(0) += 1,
        }
    }

    tracing::debug!(
        village,
        month = %current,
        compared = audit.compared,
        stagnant = audit.stagnant,
        "weight trend evaluated"
    );

    (trend, audit)
}

/// Children in first-seen order. Records without an identity are ignored.
fn group_by_child<'a, F>(
    records: &[&'a MeasurementRecord],
    key: &F,
) -> Vec<(&'a str, Vec<&'a MeasurementRecord>)>
where
    F: Fn(&MeasurementRecord) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&MeasurementRecord>)> = Vec::new();
    for &record in records {
        let id = key(record);
        if id.is_empty() {
            continue;
        }
        let slot = *index.entry(id).or_insert_with(|| {
            groups.push((id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }
    groups
}

fn compare_child<'a>(
    history: &[&'a MeasurementRecord],
    current: Month,
    previous: Month,
) -> Outcome<'a> {
    let Some(latest_current) = latest_in_month(history, current) else {
        return Outcome::Skipped(SkipReason::NoCurrentMonth);
    };
    let Some(latest_previous) = latest_in_month(history, previous) else {
        return Outcome::Skipped(SkipReason::NoPreviousMonth);
    };

    let (Some(current_weight), Some(previous_weight)) = (
        parse_weight(&latest_current.weight_kg),
        parse_weight(&latest_previous.weight_kg),
    ) else {
        return Outcome::Skipped(SkipReason::UnparseableWeight);
    };

    if current_weight > previous_weight {
        Outcome::Gained
    } else if latest_current.posyandu.is_empty() {
        Outcome::Skipped(SkipReason::MissingPosyandu)
    } else {
        Outcome::Stagnant(latest_current)
    }
}

/// Latest record of a month; the first one wins ties and unreadable dates
/// only win when nothing else is readable.
fn latest_in_month<'a>(
    history: &[&'a MeasurementRecord],
    month: Month,
) -> Option<&'a MeasurementRecord> {
    let mut latest: Option<(&MeasurementRecord, Option<NaiveDate>)> = None;
    for &record in history
        .iter()
        .filter(|record| record.measurement_month_name == month.name())
    {
        let date = parse_date(&record.measurement_date);
        if latest.map_or(true, |(_, best)| is_more_recent(date, best)) {
            latest = Some((record, date));
        }
    }
    latest.map(|(record, _)| record)
}

fn is_more_recent(candidate: Option<NaiveDate>, current: Option<NaiveDate>) -> bool {
    match (candidate, current) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        _ => false,
    }
}
