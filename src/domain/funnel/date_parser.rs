//! Strict DD/MM/YYYY birth date parsing.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("date pattern is valid")
});

/// Parses `DD/MM/YYYY` into a calendar date.
///
/// Input is not trimmed. Returns `None` when the shape does not match or the
/// components do not form a real date (`31/04/2000`, `29/02/2023`).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_valid_date() {
        assert_eq!(parse_date("15/03/1990"), Some(date(1990, 3, 15)));
        assert_eq!(parse_date("29/02/2020"), Some(date(2020, 2, 29)));
    }

    #[test]
    fn rejects_calendar_invalid_dates() {
        assert_eq!(parse_date("31/04/2000"), None);
        assert_eq!(parse_date("31/02/2020"), None);
        assert_eq!(parse_date("29/02/2023"), None);
        assert_eq!(parse_date("00/01/2000"), None);
        assert_eq!(parse_date("10/13/2000"), None);
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert_eq!(parse_date("1/3/1990"), None);
        assert_eq!(parse_date("15-03-1990"), None);
        assert_eq!(parse_date("15/03/90"), None);
        assert_eq!(parse_date("1990/03/15"), None);
        assert_eq!(parse_date("aa/bb/cccc"), None);
        assert_eq!(parse_date(" 15/03/1990"), None);
        assert_eq!(parse_date("15/03/1990\n"), None);
        assert_eq!(parse_date("nasci em 15/03/1990"), None);
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert_eq!(parse_date("١٥/٠٣/١٩٩٠"), None);
    }

    proptest! {
        #[test]
        fn formatted_valid_dates_parse_back_exactly(days in 0i64..(365 * 200)) {
            let original = date(1900, 1, 1) + chrono::Duration::days(days);
            let text = format!("{:02}/{:02}/{:04}", original.day(), original.month(), original.year());
            prop_assert_eq!(parse_date(&text), Some(original));
        }

        #[test]
        fn other_separators_never_parse(
            d in 1u32..=28,
            m in 1u32..=12,
            y in 1900i32..2100,
            sep in "[-. ]",
        ) {
            let text = format!("{:02}{sep}{:02}{sep}{:04}", d, m, y);
            prop_assert_eq!(parse_date(&text), None);
        }

        #[test]
        fn impossible_days_never_parse(d in 32u32..=99, m in 1u32..=12, y in 1900i32..2100) {
            let text = format!("{:02}/{:02}/{:04}", d, m, y);
            prop_assert_eq!(parse_date(&text), None);
        }
    }
}
