//! Date parsing and formatting for the timestamps the permit dataset emits
//! (`2023-04-05T00:00:00.000`, occasionally plain `2023-04-05` or RFC 3339).

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a dataset timestamp. Returns `None` for anything unrecognised.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// `2023-04-05...` -> `04/05/2023`; unparsable input is returned unchanged.
pub fn format_short_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => parsed.format("%m/%d/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// Long form for values that start with a `YYYY-MM-DD` prefix:
/// `2023-04-05T00:00:00.000` -> `April 5, 2023`. Returns `None` when the value
/// is not date-shaped.
pub fn format_long_date(raw: &str) -> Option<String> {
    let prefix = raw.get(..10)?;
    if !is_date_shaped(prefix) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%B %-d, %Y").to_string())
}

fn is_date_shaped(prefix: &str) -> bool {
    prefix.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_dataset_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 4, 5)
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap();
        assert_eq!(parse_timestamp("2023-04-05T00:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-05T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-05"), Some(expected));
        assert_eq!(parse_timestamp("2023-04-05T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn short_dates() {
        assert_eq!(format_short_date("2023-04-05T13:45:00.000"), "04/05/2023");
        assert_eq!(format_short_date("not a date"), "not a date");
    }

    #[test]
    fn long_dates_need_a_date_prefix() {
        assert_eq!(
            format_long_date("2023-04-05T00:00:00.000"),
            Some("April 5, 2023".to_string())
        );
        assert_eq!(
            format_long_date("2021-12-31"),
            Some("December 31, 2021".to_string())
        );
        assert_eq!(format_long_date("2023-13-45"), None);
        assert_eq!(format_long_date("B00123456-I1"), None);
        assert_eq!(format_long_date("2023"), None);
    }
}
