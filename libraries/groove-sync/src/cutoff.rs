//! Permissive parsing of user-supplied cutoff times
//!
//! The cutoff is typed by hand on the command line, so several common
//! formats are accepted. Naive inputs (no offset) are interpreted in the
//! local timezone; date-only inputs mean local midnight.

use crate::{Result, SyncError};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Formats tried for date+time inputs without an offset
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Formats tried for date-only inputs
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a cutoff string into an instant
///
/// RFC 3339 inputs carry their own offset and win outright. Everything
/// else is matched against the format tables above.
pub fn parse_cutoff(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(SyncError::InvalidCutoff("empty cutoff string".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return local_to_utc(naive);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return local_to_utc(date.and_time(NaiveTime::MIN));
        }
    }

    Err(SyncError::InvalidCutoff(format!(
        "could not parse {trimmed:?}; expected RFC 3339 or e.g. \"2024-05-01 13:30:00\""
    )))
}

/// Resolve a naive local time to UTC, taking the earliest mapping on DST folds
fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(SyncError::InvalidCutoff(format!(
            "{naive} does not exist in the local timezone"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_cutoff("2024-05-01T13:30:00Z").unwrap();
        assert_eq!(dt.hour(), 13);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_cutoff("2024-05-01T13:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 11);
    }

    #[test]
    fn test_parse_naive_datetime() {
        let dt = parse_cutoff("2024-05-01 13:30:00").unwrap();
        assert_eq!(dt.with_timezone(&Local).hour(), 13);
    }

    #[test]
    fn test_parse_minute_precision() {
        let dt = parse_cutoff("2024-05-01 13:30").unwrap();
        assert_eq!(dt.with_timezone(&Local).minute(), 30);
    }

    #[test]
    fn test_parse_date_only_is_local_midnight() {
        let dt = parse_cutoff("2024-05-01").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.day(), 1);
    }

    #[test]
    fn test_parse_us_date() {
        let dt = parse_cutoff("05/01/2024").unwrap();
        assert_eq!(dt.with_timezone(&Local).month(), 5);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_cutoff("  2024-05-01  ").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_cutoff("not a date"),
            Err(SyncError::InvalidCutoff(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_cutoff("   ").is_err());
    }
}
