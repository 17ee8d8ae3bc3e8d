//! Certificate date line: `"Held on 30th January, 2026"`.
//!
//! Parsing tries an ordered list of strategies. When none succeeds the raw
//! input is passed through as `"Held on <raw>"`; this never fails.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const PREFIX: &str = "Held on ";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a %b %d %Y",
    "%Y.%m.%d",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

type Strategy = fn(&str) -> Option<NaiveDate>;

/// Tried in order; the first hit wins.
const STRATEGIES: [Strategy; 2] = [parse_common_formats, parse_numeric_triple];

fn parse_common_formats(input: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.date_naive());
    }
    // `%Y` also accepts one- and two-digit years, which would read "01/02/26"
    // as year 1. Short years are left to the numeric strategy.
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
        .filter(|date| date.year() >= 1000)
}

/// Leading decimal digits of `part`, like a lenient integer parse.
fn leading_digits(part: &str) -> &str {
    let part = part.trim();
    let end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
    &part[..end]
}

fn leading_number(part: &str) -> Option<u32> {
    leading_digits(part).parse().ok()
}

/// Year of a numeric date. Two-digit years pivot at 50: 00-49 are 20xx and
/// 50-99 are 19xx.
fn full_year(part: &str) -> Option<i32> {
    let digits = leading_digits(part);
    let year: i32 = digits.parse().ok()?;
    Some(match (digits.len(), year) {
        (1..=2, 0..=49) => 2000 + year,
        (1..=2, _) => 1900 + year,
        _ => year,
    })
}

/// Three numbers split on `/` or `-`. A first number above 12 can only be a
/// day, so the order is day-month-year; otherwise month-day-year.
fn parse_numeric_triple(input: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.split(['/', '-']).collect();
    let [first, second, year] = parts.as_slice() else {
        return None;
    };
    let first = leading_number(first)?;
    let second = leading_number(second)?;
    let year = full_year(year)?;
    let (day, month) = if first > 12 { (first, second) } else { (second, first) };
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|strategy| strategy(input))
}

/// English ordinal suffix; 11, 12 and 13 always take "th".
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Renders `raw` for the certificate. Empty input gives an empty string, which
/// tells the composer to leave the date region untouched.
pub fn format_for_certificate(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    match parse_date(raw) {
        Some(date) => format!(
            "{PREFIX}{}{} {}, {}",
            date.day(),
            ordinal_suffix(date.day()),
            MONTHS[date.month0() as usize],
            date.year()
        ),
        None => format!("{PREFIX}{raw}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_dates() {
        assert_eq!(format_for_certificate("2026-01-30"), "Held on 30th January, 2026");
        assert_eq!(format_for_certificate("2025-12-09T00:00:00"), "Held on 9th December, 2025");
    }

    #[test]
    fn day_first_when_first_part_exceeds_twelve() {
        assert_eq!(format_for_certificate("13/01/2026"), "Held on 13th January, 2026");
        assert_eq!(format_for_certificate("31-12-2025"), "Held on 31st December, 2025");
    }

    #[test]
    fn month_first_otherwise() {
        assert_eq!(format_for_certificate("01/02/2026"), "Held on 2nd January, 2026");
        assert_eq!(format_for_certificate("3-4-2026"), "Held on 4th March, 2026");
    }

    #[test]
    fn two_digit_years_are_not_read_year_first() {
        assert_eq!(format_for_certificate("01/02/26"), "Held on 2nd January, 2026");
        assert_eq!(format_for_certificate("30-01-26"), "Held on 30th January, 2026");
        assert_eq!(format_for_certificate("12/31/99"), "Held on 31st December, 1999");
        assert_eq!(format_for_certificate("2026/02/01"), "Held on 1st February, 2026");
    }

    #[test]
    fn written_month_names() {
        assert_eq!(format_for_certificate("January 21, 2026"), "Held on 21st January, 2026");
        assert_eq!(format_for_certificate("23 Feb 2026"), "Held on 23rd February, 2026");
    }

    #[test]
    fn unparsable_input_passes_through() {
        assert_eq!(format_for_certificate("not-a-date"), "Held on not-a-date");
        assert_eq!(format_for_certificate("9th - 11th Dec"), "Held on 9th - 11th Dec");
        assert_eq!(format_for_certificate("45/45/2026"), "Held on 45/45/2026");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(format_for_certificate(""), "");
        assert_eq!(format_for_certificate("   "), "");
    }

    #[test]
    fn ordinal_table() {
        let expected = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in expected {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn total_over_odd_input() {
        for raw in ["/", "--", "1/2", "2026-02-30", "\u{0}", "99999999999/1/1", "１２/01/2026"] {
            let out = format_for_certificate(raw);
            assert!(out.starts_with(PREFIX));
        }
    }
}
