//! Field coercion primitives
//!
//! Small string → value conversions shared by every record schema. Each returns the cleaned
//! value or the message to attach to the field.

use crate::model::ValueFormat;
use chrono::NaiveDate;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MISSING_VALUE: &str = "Missing value";
pub const UNEXPECTED_ITEM: &str = "Unexpected item";
pub const DUPLICATE_ITEM: &str = "Duplicate item";
pub const INVALID_DATE: &str = "Value must be a date in ISO 8601 format";
pub const INVALID_FLOAT: &str = "Value must be a float";
pub const INVALID_INTEGER: &str = "Value must be an integer";

/// Trims and collapses inner whitespace; empty input yields `None`.
pub fn cleanup_line(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Trims every line and the whole text, keeping line breaks; empty input yields `None`.
pub fn cleanup_text(raw: &str) -> Option<String> {
    let cleaned = raw
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Folds to ASCII, lower-cases and joins alphanumeric runs with `-`.
///
/// Accents are dropped through compatibility decomposition (`é` → `e`, `ﬁ` → `fi`) and the
/// common ligatures without one are spelled out (`œ` → `oe`). Any other non-ASCII character
/// separates words.
pub fn input_to_slug(raw: &str) -> Option<String> {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.nfkd().filter(|ch| !is_combining_mark(*ch)) {
        match ch {
            'œ' | 'Œ' => folded.push_str("oe"),
            'æ' | 'Æ' => folded.push_str("ae"),
            'ß' => folded.push_str("ss"),
            _ => folded.push(ch),
        }
    }

    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    (!slug.is_empty()).then_some(slug)
}

/// Checks `slug` belongs to `allowed`.
pub fn test_in(slug: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&slug) {
        Ok(())
    } else {
        Err(format!("Value must be one of: {}", allowed.join(", ")))
    }
}

pub fn iso8601_to_date(raw: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| INVALID_DATE)
}

pub fn to_float(raw: &str) -> Result<f64, &'static str> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(INVALID_FLOAT)
}

pub fn to_strict_int(raw: &str) -> Result<i64, &'static str> {
    raw.trim().parse::<i64>().map_err(|_| INVALID_INTEGER)
}

/// Checks a value's raw text against `format` and returns the cleaned text.
pub fn check_value_text(raw: &str, format: ValueFormat) -> Result<String, String> {
    let cleaned = cleanup_line(raw).ok_or_else(|| MISSING_VALUE.to_string())?;
    match format {
        ValueFormat::Boolean => test_in(&cleaned, &["0", "1"])?,
        ValueFormat::Float | ValueFormat::Percent => {
            to_float(&cleaned).map_err(str::to_string)?;
        }
        ValueFormat::Integer => {
            to_strict_int(&cleaned).map_err(str::to_string)?;
        }
    }
    Ok(cleaned)
}
