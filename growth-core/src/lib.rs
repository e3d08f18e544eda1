//! Shared model for child growth monitoring: measurement records, the canonical
//! month sequence, pivot shapes and configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Tunables applied by the pivot engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PivotConfig {
    /// Exclusive upper bound (in whole years) for the age-eligibility filter.
    pub max_age_years: u32,
    /// Which field identifies one child when counting unique individuals.
    pub identity: IdentityPolicy,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            max_age_years: 5,
            identity: IdentityPolicy::Name,
        }
    }
}

/// Key selector used for unique-individual counting.
///
/// `Name` is what the field registers have always used. Two different
/// children registered under the same name collapse into one individual.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    #[default]
    Name,
    NationalId,
}

impl IdentityPolicy {
    pub fn key<'a>(&self, record: &'a MeasurementRecord) -> &'a str {
        match self {
            IdentityPolicy::Name => &record.name,
            IdentityPolicy::NationalId => &record.national_id,
        }
    }
}

impl FromStr for IdentityPolicy {
    type Err = GrowthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" | "nama" => Ok(IdentityPolicy::Name),
            "national_id" | "national-id" | "nik" => Ok(IdentityPolicy::NationalId),
            other => Err(GrowthError::InvalidConfig(format!(
                "unknown identity policy `{other}`"
            ))),
        }
    }
}

/// Calendar months in the order the registers use them.
///
/// This is the only place the month sequence is defined; `previous` never
/// wraps from Januari back to Desember.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Januari,
    Februari,
    Maret,
    April,
    Mei,
    Juni,
    Juli,
    Agustus,
    September,
    Oktober,
    November,
    Desember,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Januari,
        Month::Februari,
        Month::Maret,
        Month::April,
        Month::Mei,
        Month::Juni,
        Month::Juli,
        Month::Agustus,
        Month::September,
        Month::Oktober,
        Month::November,
        Month::Desember,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::Januari => "Januari",
            Month::Februari => "Februari",
            Month::Maret => "Maret",
            Month::April => "April",
            Month::Mei => "Mei",
            Month::Juni => "Juni",
            Month::Juli => "Juli",
            Month::Agustus => "Agustus",
            Month::September => "September",
            Month::Oktober => "Oktober",
            Month::November => "November",
            Month::Desember => "Desember",
        }
    }

    /// 1-based position in the calendar.
    pub fn ordinal(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Month> {
        let index = usize::try_from(ordinal.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Exact match on the register spelling. Stored month names are compared
    /// verbatim everywhere, so `"April "` is not April.
    pub fn from_name(name: &str) -> Option<Month> {
        Self::ALL.into_iter().find(|month| month.name() == name)
    }

    pub fn previous(self) -> Option<Month> {
        self.ordinal().checked_sub(1).and_then(Self::from_ordinal)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = GrowthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Month::from_name(value.trim()).ok_or_else(|| GrowthError::UnknownMonth(value.to_string()))
    }
}

/// One weighing/measuring of one child on one date.
///
/// Every field is a plain string; an absent value is the empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementRecord {
    #[serde(alias = "Nama", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(alias = "NIK", deserialize_with = "lenient_string")]
    pub national_id: String,
    /// `DD/MM/YYYY` or an ISO-like date.
    #[serde(alias = "Tanggal Pengukuran", deserialize_with = "lenient_string")]
    pub measurement_date: String,
    /// Stored independently of `measurement_date`; the two may disagree.
    #[serde(alias = "Bulan", deserialize_with = "lenient_string")]
    pub measurement_month_name: String,
    /// Free text such as `4 Tahun - 3 Bulan - 0 Hari`.
    #[serde(alias = "Usia Saat Ukur", deserialize_with = "lenient_string")]
    pub age_at_measurement: String,
    #[serde(alias = "Desa/Kel", deserialize_with = "lenient_string")]
    pub village: String,
    #[serde(alias = "Posyandu", deserialize_with = "lenient_string")]
    pub posyandu: String,
    #[serde(alias = "Berat", deserialize_with = "lenient_string")]
    pub weight_kg: String,
    #[serde(alias = "Tinggi", deserialize_with = "lenient_string")]
    pub height_cm: String,
    #[serde(alias = "BB/TB", deserialize_with = "lenient_string")]
    pub weight_for_height_status: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Integer(value)) => value.to_string(),
        Some(Scalar::Float(value)) => value.to_string(),
        Some(Scalar::Flag(value)) => value.to_string(),
        None => String::new(),
    })
}

/// Addressable record columns, used for filter option lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Name,
    NationalId,
    MeasurementDate,
    MeasurementMonthName,
    AgeAtMeasurement,
    Village,
    Posyandu,
    WeightKg,
    HeightCm,
    WeightForHeightStatus,
}

impl RecordField {
    pub fn get<'a>(&self, record: &'a MeasurementRecord) -> &'a str {
        match self {
            RecordField::Name => &record.name,
            RecordField::NationalId => &record.national_id,
            RecordField::MeasurementDate => &record.measurement_date,
            RecordField::MeasurementMonthName => &record.measurement_month_name,
            RecordField::AgeAtMeasurement => &record.age_at_measurement,
            RecordField::Village => &record.village,
            RecordField::Posyandu => &record.posyandu,
            RecordField::WeightKg => &record.weight_kg,
            RecordField::HeightCm => &record.height_cm,
            RecordField::WeightForHeightStatus => &record.weight_for_height_status,
        }
    }
}

/// Unique children per village.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VillageCount {
    pub village: String,
    pub count: usize,
}

/// One month of the status-by-month pivot. Only statuses observed in that
/// month appear in `counts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthStatusRow {
    pub month: Month,
    #[serde(flatten)]
    pub counts: BTreeMap<String, usize>,
}

/// One status of the status-by-posyandu pivot. `counts` holds every posyandu
/// of the input, zero where nobody matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusPosyanduRow {
    pub status: String,
    #[serde(flatten)]
    pub counts: BTreeMap<String, usize>,
}

/// Children whose weight did not increase since the previous month ("Tidak
/// Naik BB"), tallied per posyandu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WeightTrend {
    pub counts: BTreeMap<String, usize>,
    /// Latest current-month record of each flagged child, date as `DD/MM/YYYY`.
    pub flagged: Vec<MeasurementRecord>,
}

impl WeightTrend {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn flagged_for<'a>(
        &'a self,
        posyandu: &'a str,
    ) -> impl Iterator<Item = &'a MeasurementRecord> + 'a {
        self.flagged
            .iter()
            .filter(move |record| record.posyandu == posyandu)
    }
}

/// Filter selection of one dashboard query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DashboardQuery {
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub month: Option<Month>,
    #[serde(default)]
    pub village: Option<String>,
}

/// Values the selection controls can offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub years: Vec<String>,
    pub villages: Vec<String>,
    pub months: Vec<Month>,
}

/// Every view of the dashboard, computed in one pass over the records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub query: DashboardQuery,
    pub total_children: usize,
    pub by_village: Vec<VillageCount>,
    pub status_by_month: Vec<MonthStatusRow>,
    pub status_by_posyandu: Vec<StatusPosyanduRow>,
    /// Present only when both a month and a village are selected.
    pub weight_trend: Option<WeightTrend>,
    pub filter_options: FilterOptions,
}

/// Errors raised at the boundaries of the engine (ingestion, configuration).
#[derive(Debug, thiserror::Error)]
pub enum GrowthError {
    #[error("input is missing the record list")]
    MissingData,
    #[error("could not read input: {0}")]
    Parse(String),
    #[error("unknown month name `{0}`")]
    UnknownMonth(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
