//! Calendar-date helpers shared by the streak engine and repositories.
//!
//! # Responsibility
//! - Canonical `YYYY-MM-DD` formatting and strict parsing.
//! - Weekday indexing and calendar-day distance used by scheduling/streaks.
//!
//! # Invariants
//! - All arithmetic is pure calendar-day math on `NaiveDate`; no
//!   time-of-day or timezone component ever enters a day-gap computation.
//! - `parse_date(format_date(d)) == d` for every representable date.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Error for date strings that are not canonical `YYYY-MM-DD` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError(pub String);

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid calendar date `{}`; expected YYYY-MM-DD", self.0)
    }
}

impl Error for DateParseError {}

/// Formats a calendar date as zero-padded `YYYY-MM-DD`.
///
/// Uses the date's own calendar fields; no UTC normalization is applied.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Parses a strict `YYYY-MM-DD` string into a calendar date.
///
/// # Errors
/// Returns [`DateParseError`] for non-canonical shapes (missing padding,
/// extra text) and for impossible dates such as `2024-02-30`.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateParseError> {
    if !DATE_RE.is_match(value) {
        return Err(DateParseError(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DateParseError(value.to_string()))
}

/// Returns the weekday index of a date, 0=Sunday .. 6=Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Exact calendar-day distance from `earlier` to `later`.
///
/// Negative when `later` precedes `earlier`.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}

/// The current calendar day in the user's local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{day_of_week, days_between, format_date, parse_date};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn format_is_zero_padded() {
        assert_eq!(format_date(date(2024, 3, 7)), "2024-03-07");
        assert_eq!(format_date(date(987, 12, 31)), "0987-12-31");
    }

    #[test]
    fn parse_round_trips_formatted_dates() {
        for raw in ["2024-01-01", "2023-12-31", "2000-02-29"] {
            let parsed = parse_date(raw).expect("canonical date should parse");
            assert_eq!(format_date(parsed), raw);
        }
    }

    #[test]
    fn parse_rejects_non_canonical_shapes() {
        for raw in ["2024-1-2", "24-01-02", "2024/01/02", "2024-01-02T00:00", ""] {
            assert!(parse_date(raw).is_err(), "`{raw}` should be rejected");
        }
    }

    #[test]
    fn parse_rejects_impossible_dates() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn day_of_week_is_sunday_based() {
        // 2024-01-07 was a Sunday.
        assert_eq!(day_of_week(date(2024, 1, 7)), 0);
        assert_eq!(day_of_week(date(2024, 1, 8)), 1);
        assert_eq!(day_of_week(date(2024, 1, 13)), 6);
    }

    #[test]
    fn days_between_is_signed_calendar_distance() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 1, 2)), 1);
        assert_eq!(days_between(date(2024, 1, 2), date(2024, 1, 1)), -1);
        // Across a DST boundary in most locales; pure calendar math stays exact.
        assert_eq!(days_between(date(2024, 3, 30), date(2024, 3, 31)), 1);
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
    }
}
