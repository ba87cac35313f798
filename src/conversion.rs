//! Loose string → number and date/time coercion for vendor values.
//!
//! Pure functions, no I/O. Every function returns `None` instead of failing
//! on malformed input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

lazy_static! {
    // "3", "1,5", "-12.30"
    static ref NUMBER_PATTERN: Regex = Regex::new(r"-?\d+(?:[.,]\d+)*").unwrap();

    // Also accepts space-grouped thousands: "1 234,50"
    static ref AMOUNT_PATTERN: Regex =
        Regex::new(r"-?\d+(?:[.,]\d+|[ \x{a0}]\d{3}\b)*").unwrap();
}

/// First match of `pattern` in `text`. A `-` glued to a word (`"Item-2"`)
/// is a hyphen, not a sign.
fn first_token<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    let m = pattern.find(text)?;
    let token = m.as_str();
    let hyphen = token.starts_with('-')
        && text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
    Some(if hyphen { &token[1..] } else { token })
}

/// A numeric kind a loose string can be coerced into.
pub trait NumericKind: Sized {
    fn from_f64(value: f64) -> Option<Self>;
}

impl NumericKind for f64 {
    fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(value)
    }
}

impl NumericKind for i64 {
    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(value.trunc() as i64)
    }
}

/// Parse `value` as the requested numeric kind.
///
/// Only the first numeric token is read, so currency symbols and trailing
/// notes are ignored (`"10.00 (VAT 20%)"` is 10). When both `,` and `.`
/// appear the rightmost one is the decimal separator; a lone `,` is decimal
/// only when followed by one or two digits.
pub fn convert_string_to_number<T: NumericKind>(value: Option<&str>) -> Option<T> {
    let token = first_token(&AMOUNT_PATTERN, value?)?;
    let cleaned: String = token.chars().filter(|c| !c.is_whitespace()).collect();

    let normalized = normalize_separators(&cleaned)?;
    let number: f64 = normalized.parse().ok()?;
    T::from_f64(number)
}

/// Coerce a vendor JSON value, which may already be a number.
pub fn value_to_number<T: NumericKind>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.as_f64().and_then(T::from_f64),
        Value::String(s) => convert_string_to_number(Some(s.as_str())),
        _ => None,
    }
}

fn normalize_separators(s: &str) -> Option<String> {
    // Only a leading minus sign is meaningful.
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if body.contains('-') {
        return None;
    }

    let last_dot = body.rfind('.');
    let last_comma = body.rfind(',');
    let mut out = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => body.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => body.replace(',', ""),
        (None, Some(comma)) => {
            let decimals = body.len() - comma - 1;
            if body.matches(',').count() == 1 && (1..=2).contains(&decimals) {
                body.replace(',', ".")
            } else {
                body.replace(',', "")
            }
        }
        (Some(_), None) => {
            // "1.234.567" uses dots as thousands separators.
            if body.matches('.').count() > 1 {
                body.replace('.', "")
            } else {
                body.to_string()
            }
        }
        (None, None) => body.to_string(),
    };

    if negative {
        out.insert(0, '-');
    }
    Some(out)
}

/// Extract the first contiguous numeric substring, e.g. `"3 units"` → `"3"`.
pub fn retrieve_first_number_from_string(value: Option<&str>) -> Option<String> {
    first_token(&NUMBER_PATTERN, value?).map(str::to_string)
}

/// Merge a separately reported date and time into one timestamp.
///
/// Returns `None` when the date is absent, the date unchanged when the time
/// is absent, and `YYYY-MM-DDTHH:MM:SS` when both parse. If either part fails
/// to parse the date is returned alone.
pub fn combine_date_with_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = date.map(str::trim).filter(|d| !d.is_empty())?;
    let Some(time) = time.map(str::trim).filter(|t| !t.is_empty()) else {
        return Some(date.to_string());
    };

    match (parse_date(date), parse_time(time)) {
        (Some(d), Some(t)) => Some(
            NaiveDateTime::new(d, t)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
        ),
        _ => Some(date.to_string()),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}
