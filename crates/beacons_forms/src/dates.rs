#![forbid(unsafe_code)]

use chrono::NaiveDate;

/// Composes `YYYY-MM-01` from separate year/month inputs.
///
/// Both parts empty gives `""`. Anything else is composed as typed (month zero-padded when
/// numeric), so malformed input stays malformed and is caught by the date rules.
pub fn iso_date_string(year: &str, month: &str) -> String {
    let year = year.trim();
    let month = month.trim();
    if year.is_empty() && month.is_empty() {
        return String::new();
    }
    format!("{}-{}-01", year, pad_number_with_leading_zeros(month, 2))
}

/// Left-pads a purely numeric value with zeros. Non-numeric or empty input is returned trimmed.
pub fn pad_number_with_leading_zeros(value: &str, width: usize) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.to_string();
    }
    format!("{trimmed:0>width$}")
}

/// Strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_dates_01_composes_month_year() {
        assert_eq!(iso_date_string("2009", "11"), "2009-11-01");
        assert_eq!(iso_date_string("2009", "1"), "2009-01-01");
        assert_eq!(iso_date_string(" 2021 ", " 3 "), "2021-03-01");
    }

    #[test]
    fn at_dates_02_both_empty_is_empty() {
        assert_eq!(iso_date_string("", ""), "");
        assert_eq!(iso_date_string("  ", ""), "");
    }

    #[test]
    fn at_dates_03_partial_input_stays_invalid() {
        let composed = iso_date_string("", "11");
        assert_eq!(composed, "-11-01");
        assert!(parse_iso_date(&composed).is_none());
        assert!(parse_iso_date(&iso_date_string("2009", "13")).is_none());
        assert!(parse_iso_date(&iso_date_string("09", "11")).is_none());
    }

    #[test]
    fn at_dates_04_padding_only_touches_numbers() {
        assert_eq!(pad_number_with_leading_zeros("7", 2), "07");
        assert_eq!(pad_number_with_leading_zeros("12", 2), "12");
        assert_eq!(pad_number_with_leading_zeros("99", 4), "0099");
        assert_eq!(pad_number_with_leading_zeros("", 2), "");
        assert_eq!(pad_number_with_leading_zeros("ab", 2), "ab");
    }

    #[test]
    fn at_dates_05_parse_rejects_non_calendar_dates() {
        assert_eq!(
            parse_iso_date("2020-02-29"),
            NaiveDate::from_ymd_opt(2020, 2, 29)
        );
        assert!(parse_iso_date("2021-02-29").is_none());
        assert!(parse_iso_date("2021-2-1").is_none());
        assert!(parse_iso_date("").is_none());
    }
}
