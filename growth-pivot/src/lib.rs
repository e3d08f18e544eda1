//! Aggregation engine turning raw growth measurements into monitoring views:
//! unique children per village, status pivots by month and by posyandu, and
//! the month-over-month weight stagnation check.
//!
//! Every function is pure and recomputes from the records it is given.

pub mod aggregate;
pub mod dashboard;
pub mod dedup;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod trend;

pub use aggregate::{
    count_by_village, count_by_village_by, count_total_unique, count_total_unique_by,
    posyandu_detail, posyandu_detail_by, status_by_month, status_by_month_by, status_by_posyandu,
    status_by_posyandu_by,
};
pub use dashboard::{build_dashboard, build_dashboard_audited};
pub use dedup::{deduplicate_by, deduplicate_by_name};
pub use filter::{
    apply_filters, filter_by_month, filter_by_posyandu, filter_by_status, filter_by_village,
    filter_by_year, filter_under_age, filter_under_five_years, unique_months, unique_values,
    unique_years, RecordFilter,
};
pub use ingest::{records_from_json_str, records_from_json_value};
pub use normalize::{extract_years, format_date, parse_date, parse_weight, try_format_date};
pub use trend::{
    detect_weight_stagnation, detect_weight_stagnation_audited, detect_weight_stagnation_by,
    SkipReason, TrendAudit,
};
