//! Internal helpers for input cleaning and normalization.
//!
//! These utilities are **not** part of the public API, except
//! [`parse_calendar_date`] which the server uses on write paths.

use chrono::{DateTime, NaiveDate, Utc};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim raw input and treat empty or whitespace-only values as absent.
pub(crate) fn clean_input(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Comparison key for category names: case, accents and punctuation folded.
pub(crate) fn normalize_category_key(value: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }

    let normalized = out.trim();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must contain a letter or digit".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps contribute their UTC date.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_drops_blank_values() {
        assert_eq!(clean_input(None), None);
        assert_eq!(clean_input(Some("")), None);
        assert_eq!(clean_input(Some("   \t")), None);
        assert_eq!(clean_input(Some("  lunch ")).as_deref(), Some("lunch"));
    }

    #[test]
    fn category_key_folds_case_and_accents() {
        assert_eq!(normalize_category_key("  Café  Bar ").unwrap(), "cafe bar");
        assert_eq!(normalize_category_key("FOOD & drinks").unwrap(), "food drinks");
        assert!(normalize_category_key("!!!").is_err());
    }

    #[test]
    fn calendar_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_calendar_date("2024-01-02"), Some(expected));
        assert_eq!(parse_calendar_date(" 2024-01-02 "), Some(expected));
        assert_eq!(parse_calendar_date("2024-01-02T10:30:00Z"), Some(expected));
        assert_eq!(
            parse_calendar_date("2024-01-03T01:00:00+02:00"),
            Some(expected)
        );
    }

    #[test]
    fn calendar_date_rejects_garbage() {
        assert_eq!(parse_calendar_date("not-a-date"), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
        assert_eq!(parse_calendar_date(""), None);
    }
}
