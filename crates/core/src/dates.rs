//! Calendar-date keys for the completion log.
//!
//! A completion is keyed by the plain calendar day it counts toward
//! (`YYYY-MM-DD`), never by the wall-clock instant it was recorded. All
//! "today" calculations use the UTC calendar.

use std::sync::LazyLock;

use chrono::{Duration, NaiveTime, Utc};
use regex::Regex;
use validator::ValidationError;

use crate::error::CoreError;
use crate::types::{CalendarDate, Timestamp};

/// `chrono` format string for a date key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// `chrono` format string for a month bucket key.
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

static DATE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date key regex is valid")
});

/// Parse a strict `YYYY-MM-DD` key that names a real calendar day.
///
/// `2024-02-30`, `2024-1-05` and `2024-01-05T00:00:00Z` are all rejected.
pub fn parse_date_key(value: &str) -> Result<CalendarDate, CoreError> {
    if !DATE_KEY_RE.is_match(value) {
        return Err(CoreError::Validation(
            "Date must be in YYYY-MM-DD format".to_string(),
        ));
    }
    CalendarDate::parse_from_str(value, DATE_KEY_FORMAT)
        .map_err(|_| CoreError::Validation(format!("{value} is not a valid calendar date")))
}

/// `validator` hook for request fields that carry a date key.
pub fn validate_date_key(value: &str) -> Result<(), ValidationError> {
    parse_date_key(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("date_key");
        err.message = Some("Date must be a real calendar date in YYYY-MM-DD format".into());
        err
    })
}

pub fn format_date_key(date: CalendarDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn month_key(date: CalendarDate) -> String {
    date.format(MONTH_KEY_FORMAT).to_string()
}

/// The current UTC calendar day.
pub fn today_utc() -> CalendarDate {
    Utc::now().date_naive()
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: CalendarDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Whole days elapsed from `from` to `now`, rounding any partial day up.
///
/// Negative when `from` lies in the future.
pub fn days_between_ceil(from: Timestamp, now: Timestamp) -> i64 {
    let millis = (now - from).num_milliseconds();
    let whole = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        whole + 1
    } else {
        whole
    }
}

/// The day before `date`, or `None` at the bottom of chrono's range.
pub fn previous_day(date: CalendarDate) -> Option<CalendarDate> {
    date.pred_opt()
}

/// `true` when `later` falls exactly one calendar day after `earlier`.
pub fn is_next_day(earlier: CalendarDate, later: CalendarDate) -> bool {
    later - earlier == Duration::days(1)
}
