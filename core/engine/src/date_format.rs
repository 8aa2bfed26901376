//! FILENAME: core/engine/src/date_format.rs
//! PURPOSE: Parsing and fixed-locale formatting of date cells.
//! CONTEXT: Date columns render in the he-IL convention (day.month.year).
//! Hebrew calendar conversion is not done here; callers inject a
//! `HebrewDateFormatter` and the engine only routes values to it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt::Debug;

const DATE_FORMAT: &str = "%d.%m.%Y";
const DATETIME_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Parse a row value into a date-time.
/// Accepts RFC 3339 strings, naive ISO date-times, plain ISO dates and epoch milliseconds.
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format as a he-IL short date ("18.10.2026").
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format(DATE_FORMAT).to_string()
}

/// Format as a he-IL date and time ("18.10.2026, 14:30:00").
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Renders dates in the Hebrew calendar.
/// Implementations wrap a calendar library; the table only calls these two methods.
pub trait HebrewDateFormatter: Send + Sync + Debug {
    fn format_date(&self, date: NaiveDate) -> String;

    fn format_datetime(&self, dt: NaiveDateTime) -> String {
        format!("{} {}", self.format_date(dt.date()), dt.format("%H:%M"))
    }
}

/// Used when no Hebrew calendar is wired in: renders the Gregorian date instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct GregorianFallback;

impl HebrewDateFormatter for GregorianFallback {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_iso_date() {
        let dt = parse_date_value(&json!("2024-03-05")).unwrap();
        assert_eq!(format_date(&dt), "05.03.2024");
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let dt = parse_date_value(&json!("2024-03-05T14:30:00+02:00")).unwrap();
        assert_eq!(format_datetime(&dt), "05.03.2024, 14:30:00");
    }

    #[test]
    fn test_parse_epoch_millis() {
        let dt = parse_date_value(&json!(0)).unwrap();
        assert_eq!(format_date(&dt), "01.01.1970");
    }

    #[test]
    fn test_unparseable_values() {
        assert!(parse_date_value(&json!("not a date")).is_none());
        assert!(parse_date_value(&json!(true)).is_none());
        assert!(parse_date_value(&json!("")).is_none());
    }

    #[test]
    fn test_fallback_formatter() {
        let dt = parse_date_value(&json!("2024-03-05T09:15:00")).unwrap();
        assert_eq!(GregorianFallback.format_datetime(dt), "05.03.2024 09:15");
    }
}
