//! Timestamp helpers shared by every repository.
//!
//! All timestamps are persisted as RFC 3339 UTC strings truncated to whole
//! seconds, which keeps lexical and chronological ordering identical inside
//! SQL comparisons.

use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let late = early + Duration::seconds(1);

        let a = format_timestamp(early);
        let b = format_timestamp(late);

        assert_eq!(a, "2024-01-09T23:59:59Z");
        assert!(a < b);
    }

    #[test]
    fn parse_round_trips_and_rejects_garbage() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(at)), Some(at));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
