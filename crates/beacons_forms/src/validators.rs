#![forbid(unsafe_code)]

//! Reusable rule catalogue. `required`, `is_length`, `hexadecimal_string` and
//! `is_valid_date` fire on an empty value; the other rules let it through.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use crate::dates::parse_iso_date;
use crate::validation::ValidationRule;

static HEXADECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]+$").expect("invalid hexadecimal pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
        .expect("invalid email pattern")
});

// Optional leading '+', 10..=15 digits, single spaces between digits.
static PHONE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?([0-9] ?){9,14}[0-9]$").expect("invalid phone number pattern")
});

pub fn required(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| value.is_empty())
}

pub fn max_length(message: impl Into<String>, max: usize) -> ValidationRule {
    ValidationRule::on_value(message, move |value| value.chars().count() > max)
}

pub fn is_length(message: impl Into<String>, length: usize) -> ValidationRule {
    ValidationRule::on_value(message, move |value| value.chars().count() != length)
}

pub fn hexadecimal_string(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| !HEXADECIMAL.is_match(value))
}

pub fn email(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| {
        !value.is_empty() && !EMAIL.is_match(value)
    })
}

pub fn phone_number(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| {
        !value.is_empty() && !PHONE_NUMBER.is_match(value.trim())
    })
}

pub fn is_valid_date(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| parse_iso_date(value).is_none())
}

pub fn min_date_year(message: impl Into<String>, min_year: i32) -> ValidationRule {
    ValidationRule::on_value(message, move |value| {
        parse_iso_date(value).is_some_and(|date| date.year() < min_year)
    })
}

pub fn is_in_the_past(message: impl Into<String>) -> ValidationRule {
    ValidationRule::on_value(message, |value| {
        let today = Local::now().date_naive();
        is_after(value, today)
    })
}

/// `is_in_the_past` against a fixed day instead of the clock.
pub fn is_not_after(message: impl Into<String>, latest: NaiveDate) -> ValidationRule {
    ValidationRule::on_value(message, move |value| is_after(value, latest))
}

fn is_after(value: &str, latest: NaiveDate) -> bool {
    parse_iso_date(value).is_some_and(|date| date > latest)
}
