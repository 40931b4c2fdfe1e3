//! Shared parsing utilities for storm event fields.
//!
//! Every function returns `None` for a value that cannot be interpreted;
//! the loader turns that into a skipped, counted malformed row.

use chrono::{NaiveDate, NaiveDateTime};

/// Parses a begin-date with the dataset's format string.
///
/// Falls back to a date-only parse, at midnight, when the value is a single
/// token (the NOAA export always carries a `0:00:00` time, but hand-built
/// extracts often omit it). A value with a time component that does not
/// match the format is rejected rather than truncated to its date.
#[must_use]
pub fn parse_begin_date(s: &str, format: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Some(dt);
    }
    let mut tokens = s.split_whitespace();
    let date_part = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    let date_format = format.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, date_format)
        .ok()?
        .and_hms_opt(0, 0, 0)
}

/// Parses a non-negative whole count.
///
/// Accepts integral decimals such as `"3.00"`; rejects negatives, fractions,
/// exponent notation and empty strings.
#[must_use]
pub fn parse_count(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    if !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value = s.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value as u32;
    Some(count)
}

/// Parses a non-negative, finite amount. Rejects empty strings.
#[must_use]
pub fn parse_amount(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: &str = "%m/%d/%Y %H:%M:%S";

    #[test]
    fn parses_unpadded_noaa_begin_date() {
        let dt = parse_begin_date("4/18/1950 0:00:00", FORMAT).unwrap();
        assert_eq!(dt.to_string(), "1950-04-18 00:00:00");
    }

    #[test]
    fn parses_padded_begin_date() {
        let dt = parse_begin_date("11/15/2011 14:30:00", FORMAT).unwrap();
        assert_eq!(dt.to_string(), "2011-11-15 14:30:00");
    }

    #[test]
    fn falls_back_to_date_only() {
        let dt = parse_begin_date("7/4/1993", FORMAT).unwrap();
        assert_eq!(dt.to_string(), "1993-07-04 00:00:00");
    }

    #[test]
    fn rejects_invalid_begin_date() {
        assert!(parse_begin_date("not-a-date", FORMAT).is_none());
        assert!(parse_begin_date("13/45/1993 0:00:00", FORMAT).is_none());
        assert!(parse_begin_date("", FORMAT).is_none());
    }

    #[test]
    fn rejects_malformed_time_component() {
        assert!(parse_begin_date("4/18/1950 25:61:00", FORMAT).is_none());
        assert!(parse_begin_date("4/18/1950 garbage", FORMAT).is_none());
        assert!(parse_begin_date("4/18/1950 0:00:00 extra", FORMAT).is_none());
    }

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count(" 15 "), Some(15));
        assert_eq!(parse_count("3.00"), Some(3));
    }

    #[test]
    fn rejects_bad_counts() {
        assert!(parse_count("-1").is_none());
        assert!(parse_count("2.5").is_none());
        assert!(parse_count("").is_none());
        assert!(parse_count("many").is_none());
    }

    #[test]
    fn rejects_exponent_and_special_counts() {
        assert!(parse_count("1e3").is_none());
        assert!(parse_count("1E3").is_none());
        assert!(parse_count("inf").is_none());
        assert!(parse_count("NaN").is_none());
        assert!(parse_count(".").is_none());
    }

    #[test]
    fn parses_amounts() {
        assert!((parse_amount("25.0").unwrap() - 25.0).abs() < f64::EPSILON);
        assert!((parse_amount("0").unwrap()).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(parse_amount("-3").is_none());
        assert!(parse_amount("").is_none());
        assert!(parse_amount("NaN").is_none());
        assert!(parse_amount("inf").is_none());
    }
}
