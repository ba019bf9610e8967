//! Calendar-day arithmetic.
//!
//! All engine dates are `NaiveDate`: no time of day and no zone. Instants
//! coming from storage or the clock are reduced to their UTC calendar day
//! before they reach any of these helpers.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};

const ISO_DATE: &str = "%Y-%m-%d";

/// Earliest year accepted from users or storage
pub const MIN_YEAR: i32 = 1900;
/// Latest year accepted from users or storage
pub const MAX_YEAR: i32 = 9999;

/// Shift `date` by `n` calendar days (`n` may be negative).
///
/// Unchecked: engine entry points bound their dates and day counts first.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// Like [`add_days`], but `None` instead of leaving chrono's date range
pub fn checked_add_days(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    Duration::try_days(n).and_then(|delta| date.checked_add_signed(delta))
}

/// Whole calendar days from `a` to `b`; negative when `b` precedes `a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Format as `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Format as an RFC 3339 instant at midnight UTC, e.g. `2024-03-23T00:00:00.000Z`.
pub fn to_iso_datetime(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar day of an instant, in UTC.
pub fn calendar_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Reject dates outside `MIN_YEAR..=MAX_YEAR`
pub fn check_supported(date: NaiveDate) -> Result<NaiveDate> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(Error::validation(format!(
            "Date {} is outside the supported years {}..={}",
            date, MIN_YEAR, MAX_YEAR
        )))
    }
}

/// Parse either a plain `YYYY-MM-DD` date or an RFC 3339 datetime.
///
/// Datetimes are converted to UTC and truncated to the calendar day.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();

    let date = match NaiveDate::parse_from_str(trimmed, ISO_DATE) {
        Ok(date) => date,
        Err(_) => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| calendar_day(dt.with_timezone(&Utc)))
            .map_err(|e| Error::validation(format!("Invalid date '{}': {}", input, e)))?,
    };

    check_supported(date)
}
