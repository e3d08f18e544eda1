//! Lenient parsing of register dates, ages and weights.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use growth_core::Month;
use regex::Regex;

static YEARS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*tahun").unwrap());

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d %B %Y", "%B %d, %Y", "%d-%b-%Y", "%Y.%m.%d"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse either `DD/MM/YYYY` or a generic date string.
///
/// `None` is the invalid sentinel: it orders below every real date, so it
/// never wins a latest-measurement comparison.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some([day, month, year]) = slash_parts(value) {
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
    }
    parse_generic_date(value)
}

/// Canonicalize to `DD/MM/YYYY`, returning the input unchanged when it is
/// already slash-shaped or cannot be parsed.
pub fn format_date(value: &str) -> String {
    try_format_date(value).unwrap_or_else(|| value.to_string())
}

/// Like [`format_date`] but reports a parse failure instead of echoing input.
pub fn try_format_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if slash_parts(trimmed).is_some() {
        return Some(trimmed.to_string());
    }
    parse_date(value).map(|date| date.format("%d/%m/%Y").to_string())
}

/// Whole years from free-text ages like `4 Tahun - 3 Bulan - 0 Hari`.
pub fn extract_years(age_text: &str) -> Option<u32> {
    YEARS_PATTERN
        .captures(age_text)
        .and_then(|captures| captures.get(1))
        .and_then(|years| years.as_str().parse().ok())
}

/// Numeric weight from a register cell. Accepts a comma decimal separator
/// and ignores a trailing unit (`"8,8 kg"`).
pub fn parse_weight(value: &str) -> Option<f64> {
    let normalized = value.trim().replace(',', ".");
    let cleaned: String = normalized
        .chars()
        .enumerate()
        .take_while(|(index, c)| c.is_ascii_digit() || *c == '.' || (*index == 0 && *c == '-'))
        .map(|(_, c)| c)
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|weight| weight.is_finite())
}

/// Three `/`-separated, non-empty, all-digit groups.
pub(crate) fn slash_parts(value: &str) -> Option<[&str; 3]> {
    let mut parts = value.split('/');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    (numeric(day) && numeric(month) && numeric(year)).then_some([day, month, year])
}

fn parse_generic_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Some(date) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(date.date());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date);
    }
    parse_indonesian_long_date(value)
}

/// `1 Maret 2024`
fn parse_indonesian_long_date(value: &str) -> Option<NaiveDate> {
    let mut tokens = value.split_whitespace();
    let day = tokens.next()?.parse().ok()?;
    let month = Month::from_name(tokens.next()?)?;
    let year = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month.ordinal(), day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    #[test]
    fn slash_dates_are_day_first() {
        assert_eq!(parse_date("02/04/2024"), ymd(2024, 4, 2));
        assert_eq!(parse_date("2/4/2024"), ymd(2024, 4, 2));
        assert_eq!(parse_date("31/02/2024"), None);
    }

    #[test]
    fn generic_dates_fall_back_to_known_formats() {
        assert_eq!(parse_date("2024-03-01"), ymd(2024, 3, 1));
        assert_eq!(parse_date("2024-03-01T08:30:00Z"), ymd(2024, 3, 1));
        assert_eq!(parse_date("2024-03-01T08:30:00.000"), ymd(2024, 3, 1));
        assert_eq!(parse_date("1 March 2024"), ymd(2024, 3, 1));
        assert_eq!(parse_date("1 Maret 2024"), ymd(2024, 3, 1));
        assert_eq!(parse_date("kemarin"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn invalid_sentinel_loses_to_any_date() {
        assert!(parse_date("bukan tanggal") < parse_date("01/01/1900"));
    }

    #[test]
    fn format_keeps_slash_shape_verbatim() {
        assert_eq!(format_date("2/4/2024"), "2/4/2024");
        assert_eq!(try_format_date(" 02/04/2024 ").as_deref(), Some("02/04/2024"));
        assert_eq!(format_date("2024-04-02"), "02/04/2024");
        assert_eq!(format_date("2024-04-02T10:00:00+07:00"), "02/04/2024");
    }

    #[test]
    fn format_returns_original_on_failure() {
        assert_eq!(format_date("tidak diketahui"), "tidak diketahui");
        assert_eq!(try_format_date("tidak diketahui"), None);
    }

    #[test]
    fn years_are_read_from_age_text() {
        assert_eq!(extract_years("4 Tahun - 3 Bulan - 0 Hari"), Some(4));
        assert_eq!(extract_years("0 tahun - 11 bulan"), Some(0));
        assert_eq!(extract_years("12TAHUN"), Some(12));
        assert_eq!(extract_years("Bulan 3"), None);
        assert_eq!(extract_years(""), None);
    }

    #[test]
    fn weights_accept_local_notation() {
        assert_eq!(parse_weight("9.0"), Some(9.0));
        assert_eq!(parse_weight(" 8,8 "), Some(8.8));
        assert_eq!(parse_weight("10.2 kg"), Some(10.2));
        assert_eq!(parse_weight(""), None);
        assert_eq!(parse_weight("tidak ditimbang"), None);
    }
}
