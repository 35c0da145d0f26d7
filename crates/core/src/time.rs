use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::{DigestError, Result};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y, %I:%M:%S%.f %p",
    "%m/%d/%Y %I:%M:%S%.f %p",
    "%m/%d/%Y %H:%M:%S%.f",
];

/// Parses a log timestamp without normalizing its zone: an RFC 3339 value
/// keeps the wall clock of the offset it was written in.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

pub fn hour_of_day(input: &str) -> Option<usize> {
    parse_timestamp(input).map(|ts| ts.hour() as usize)
}

pub fn day_stamp(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| DigestError::Config(format!("expected YYYY-MM-DD date, got {input}: {e}")))
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
