//! One-shot assembly of every dashboard view for a filter selection.

use chrono::Utc;
use growth_core::{
    DashboardQuery, DashboardSnapshot, FilterOptions, MeasurementRecord, PivotConfig, RecordField,
};

use crate::aggregate::{
    count_by_village_by, count_total_unique_by, status_by_month_by, status_by_posyandu_by,
};
use crate::filter::{
    filter_by_month, filter_by_village, filter_by_year, filter_under_age, unique_months,
    unique_values, unique_years,
};
use crate::trend::{detect_weight_stagnation_audited, TrendAudit};

/// Build the dashboard from the full record set.
///
/// Scopes, from wide to narrow:
/// * eligible: age filter only, feeds the selection controls;
/// * year: eligible + year, feeds the weight trend;
/// * chart scopes: the year scope narrowed by everything except the chart's
///   own axis (villages are compared across the month, months across the
///   village);
/// * view: year + month + village, feeds the headline and posyandu pivot.
pub fn build_dashboard(
    records: &[MeasurementRecord],
    query: &DashboardQuery,
    config: &PivotConfig,
) -> DashboardSnapshot {
    build_dashboard_audited(records, query, config).0
}

/// [`build_dashboard`] plus the classification tally of the weight trend run,
/// present whenever the snapshot carries a weight trend.
pub fn build_dashboard_audited(
    records: &[MeasurementRecord],
    query: &DashboardQuery,
    config: &PivotConfig,
) -> (DashboardSnapshot, Option<TrendAudit>) {
    let identity = config.identity;
    let eligible = filter_under_age(records, config.max_age_years);

    let year_scope = match &query.year {
        Some(year) => filter_by_year(&eligible, year),
        None => eligible.clone(),
    };
    let month_scope = match query.month {
        Some(month) => filter_by_month(&year_scope, month.name()),
        None => year_scope.clone(),
    };
    let village_scope = match &query.village {
        Some(village) => filter_by_village(&year_scope, village),
        None => year_scope.clone(),
    };
    let view_scope = match &query.village {
        Some(village) => filter_by_village(&month_scope, village),
        None => month_scope.clone(),
    };

    let (weight_trend, audit) = match (&query.village, query.month) {
        (Some(village), Some(month)) => {
            let (trend, audit) = detect_weight_stagnation_audited(
                &year_scope,
                village,
                month.name(),
                |record| identity.key(record),
            );
            (Some(trend), Some(audit))
        }
        _ => (None, None),
    };

    let snapshot = DashboardSnapshot {
        generated_at: Utc::now(),
        query: query.clone(),
        total_children: count_total_unique_by(&view_scope, |record| identity.key(record)),
        by_village: count_by_village_by(&month_scope, |record| identity.key(record)),
        status_by_month: status_by_month_by(&village_scope, |record| identity.key(record)),
        status_by_posyandu: status_by_posyandu_by(&view_scope, |record| identity.key(record)),
        weight_trend,
        filter_options: FilterOptions {
            years: unique_years(&eligible),
            villages: unique_values(&eligible, RecordField::Village),
            months: unique_months(&eligible),
        },
    };
    (snapshot, audit)
}
