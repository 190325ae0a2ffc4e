//! Shared utilities for the merge pipeline.
//!
//! Coercion helpers used by both the statistics and the cross-tabulation
//! stages, so that a value counts as "numeric" or "a date" the same way
//! everywhere.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Try to parse a string as a finite numeric value.
///
/// Surrounding whitespace is ignored. Anything else that is not a plain
/// number (units, markers like "unknown", empty strings) yields `None`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a number the way it appears in the exported table.
///
/// Integral values are written without a fractional part (`72`, not `72.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Date Utilities
// =============================================================================

/// Date-only formats accepted for assessment dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Date-time formats accepted for assessment dates.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Try to parse a string as a calendar date.
///
/// Accepts plain dates, naive date-times and RFC 3339 timestamps; the time
/// part is discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    None
}

// =============================================================================
// Tests
// =============================================================================
