use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::FormatError;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Comma-groups the leading run of integer digits: `1234567.891` becomes
/// `1,234,567.891`. Anything after the integer part is left alone.
pub fn format_number(value: impl Display) -> String {
    let s = value.to_string();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s.as_str()),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (int, tail) = rest.split_at(end);

    let mut out = String::with_capacity(s.len() + int.len() / 3);
    out.push_str(sign);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str(tail);
    out
}

/// Escapes text for insertion into markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YearStyle {
    #[default]
    Numeric,
    TwoDigit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthStyle {
    Numeric,
    TwoDigit,
    #[default]
    Short,
    Long,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayStyle {
    #[default]
    Numeric,
    TwoDigit,
}

/// en-US date rendering options. The default renders `Jan 5, 2024`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DateFormat {
    pub year: YearStyle,
    pub month: MonthStyle,
    pub day: DayStyle,
}

impl DateFormat {
    fn pattern(&self) -> String {
        let year = match self.year {
            YearStyle::Numeric => "%Y",
            YearStyle::TwoDigit => "%y",
        };
        let day = match self.day {
            DayStyle::Numeric => "%-d",
            DayStyle::TwoDigit => "%d",
        };
        match self.month {
            MonthStyle::Short => format!("%b {day}, {year}"),
            MonthStyle::Long => format!("%B {day}, {year}"),
            MonthStyle::Numeric => format!("%-m/{day}/{year}"),
            MonthStyle::TwoDigit => format!("%m/{day}/{year}"),
        }
    }

    pub fn render(&self, date: NaiveDate) -> String {
        date.format(&self.pattern()).to_string()
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
/// Timestamps keep their own calendar date; no time-zone shifting happens.
pub fn parse_date(input: &str) -> Result<NaiveDate, FormatError> {
    let s = input.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|d| d.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|d| d.date()))
        .map_err(|_| FormatError::InvalidDate(input.to_string()))
}

pub fn format_date(input: &str, format: DateFormat) -> Result<String, FormatError> {
    Ok(format.render(parse_date(input)?))
}
