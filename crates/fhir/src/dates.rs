//! Date and date-time parsing.
//!
//! Each scalar gets exactly one parse attempt. The accepted forms are an RFC 3339 timestamp,
//! a timestamp without offset (read as UTC) and a bare date (midnight UTC). Anything else,
//! including partial dates such as `2024-03`, leaves the field absent.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::value::ValueExt;

pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Calendar date of a date or date-time string.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date_naive()))
}

/// Parse the string at `path`, logging unparseable values at trace level.
pub fn datetime_at(value: &Value, path: &str) -> Option<DateTime<FixedOffset>> {
    let raw = value.str_at(path)?;
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        tracing::trace!(path, raw, "unparseable date-time left absent");
    }
    parsed
}

pub fn date_at(value: &Value, path: &str) -> Option<NaiveDate> {
    let raw = value.str_at(path)?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        tracing::trace!(path, raw, "unparseable date left absent");
    }
    parsed
}

/// Current calendar year, used for age banding.
pub fn current_year() -> i32 {
    use chrono::Datelike;
    Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_offsets_naive_times_and_dates() {
        let with_offset = parse_datetime("2024-05-01T08:30:00-05:00").expect("rfc3339");
        assert_eq!(with_offset.offset().local_minus_utc(), -5 * 3600);

        let zulu = parse_datetime("2024-05-01T08:30:00Z").expect("zulu");
        assert_eq!(zulu.hour(), 8);

        let naive = parse_datetime("2024-05-01T08:30:00.250").expect("naive");
        assert_eq!(naive.minute(), 30);

        let date = parse_datetime("2024-05-01").expect("date");
        assert_eq!((date.year(), date.hour()), (2024, 0));
    }

    #[test]
    fn rejects_partial_and_garbage_values() {
        assert_eq!(parse_datetime("2024-05"), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn parse_date_accepts_timestamps() {
        let date = parse_date("1980-02-29T12:00:00Z").expect("date");
        assert_eq!((date.year(), date.month(), date.day()), (1980, 2, 29));
    }
}
