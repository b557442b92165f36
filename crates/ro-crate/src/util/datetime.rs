//! ISO 8601 date validation.
//!
//! Accepts the reduced-precision forms the metadata profile allows for
//! `datePublished` and action timestamps: a bare year (`YYYY`), a
//! year-month (`YYYY-MM`), a full date (`YYYY-MM-DD`) and a seconds
//! precision date-time with an optional `Z` or `±HH:MM` offset. A
//! leading `-` marks a negative (BCE-style) year in any form.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATETIME_RE: Regex =
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(Z|[+-]\d{2}:\d{2})?$")
            .expect("datetime pattern is valid");
}

/// Returns true when `s` is an acceptable ISO 8601 date string.
///
/// The bare-date forms use a loose day check (a two-digit day reading
/// `01`-`12` or 13-31 passes regardless of month length); the
/// date-time form range-checks the day against the month, including
/// leap-year February.
pub fn is_valid_iso8601_date(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    is_bare_date(s) || is_datetime(s)
}

fn is_bare_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    match s.len() {
        4 => is_digits(s),
        7 => bytes[4] == b'-' && is_digits(&s[..4]) && is_valid_month(&s[5..7]),
        10 => {
            bytes[4] == b'-'
                && bytes[7] == b'-'
                && is_digits(&s[..4])
                && is_valid_month(&s[5..7])
                && is_loose_day(&s[8..10])
        }
        _ => false,
    }
}

fn is_datetime(s: &str) -> bool {
    let Some(caps) = DATETIME_RE.captures(s) else {
        return false;
    };

    let year: i64 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    let hour: u32 = caps[4].parse().unwrap_or(99);
    let minute: u32 = caps[5].parse().unwrap_or(99);
    let second: u32 = caps[6].parse().unwrap_or(99);

    if !(1..=12).contains(&month) {
        return false;
    }
    if day < 1 || day > days_in_month(year, month) {
        return false;
    }
    if hour > 23 || minute > 59 || second > 59 {
        return false;
    }

    match caps.get(7).map(|m| m.as_str()) {
        None | Some("Z") => true,
        Some(offset) => {
            let hours: u32 = offset[1..3].parse().unwrap_or(99);
            let minutes: u32 = offset[4..6].parse().unwrap_or(99);
            hours <= 23 && minutes <= 59
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_month(s: &str) -> bool {
    is_digits(s) && (1..=12).contains(&s.parse::<u32>().unwrap_or(0))
}

/// Loose day check for the bare-date forms.
fn is_loose_day(s: &str) -> bool {
    is_valid_month(s) || (is_digits(s) && (13..=31).contains(&s.parse::<u32>().unwrap_or(0)))
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(!is_valid_iso8601_date(""));
        assert!(!is_valid_iso8601_date("23"));
        assert!(!is_valid_iso8601_date("asdada"));
        assert!(!is_valid_iso8601_date("2346-06,19"));
        assert!(!is_valid_iso8601_date("0000-53-02"));
    }

    #[test]
    fn test_bare_date_forms() {
        assert!(is_valid_iso8601_date("0862"));
        assert!(is_valid_iso8601_date("-2015-04"));
        assert!(is_valid_iso8601_date("0000-03-02"));
        assert!(is_valid_iso8601_date("2024-12-31"));
        assert!(!is_valid_iso8601_date("2024-13-01"));
        assert!(!is_valid_iso8601_date("2024-01-00"));
        assert!(!is_valid_iso8601_date("2024-01-32"));
    }

    #[test]
    fn test_datetime_forms() {
        assert!(is_valid_iso8601_date("2025-08-04T10:30:45Z"));
        assert!(is_valid_iso8601_date("2030-12-25T08:00:00+02:00"));
        assert!(is_valid_iso8601_date("1999-07-14T23:59:59-05:00"));
        assert!(is_valid_iso8601_date("-2024-02-29T00:00:00Z"));
        assert!(is_valid_iso8601_date("-0044-03-15T09:30:00+03:00"));
        assert!(is_valid_iso8601_date("2023-12-31T23:59:59-11:30"));
    }

    #[test]
    fn test_datetime_range_checks() {
        assert!(!is_valid_iso8601_date("2023-02-29T00:00:00Z")); // not a leap year
        assert!(is_valid_iso8601_date("2024-02-29T00:00:00Z"));
        assert!(!is_valid_iso8601_date("2024-01-01T24:00:00Z"));
        assert!(!is_valid_iso8601_date("2024-01-01T00:60:00Z"));
        assert!(!is_valid_iso8601_date("2024-01-01T00:00:00+24:00"));
        assert!(!is_valid_iso8601_date("2024-01-01T00:00:00.5Z")); // fractional seconds not allowed
    }
}
