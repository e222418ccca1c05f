use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted from HTML date/time inputs; interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 (`2025-01-01T20:00:00+01:00`, `...Z`), naive
/// date-times as produced by `datetime-local` inputs (`2025-01-01T20:00`)
/// and bare dates (midnight). Values without an offset are taken as UTC.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Treat missing and blank strings alike
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_datetime_local_input() {
        assert_eq!(
            parse_datetime("2025-01-01T20:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2025-01-02 02:00:30"),
            Some(Utc.with_ymd_and_hms(2025, 1, 2, 2, 0, 30).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_datetime("2025-01-01T20:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 18, 0, 0).unwrap())
        );
        assert_eq!(
            parse_datetime("2025-01-01T20:00:00.000Z"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime_bare_date() {
        assert_eq!(
            parse_datetime("2025-07-14"),
            Some(Utc.with_ymd_and_hms(2025, 7, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("tomorrow"), None);
        assert_eq!(parse_datetime("2025-13-01T20:00"), None);
        assert_eq!(parse_datetime("01/02/2025"), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  Hall ".into())), Some("Hall"));
        assert_eq!(non_blank(&Some("   ".into())), None);
        assert_eq!(non_blank(&None), None);
    }
}
