//! Date literal normalisation
//!
//! Dates are indexed as `yyyyMMddHHmmss` strings in UTC, so every date
//! literal is brought to that form before it lands in a range clause.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{FilterParserError, FilterResult};

/// Index representation of a date
pub const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Normalise a date or date-time literal to [`COMPACT_FORMAT`]
///
/// Offsets are converted to UTC; values without an offset are taken as-is.
pub fn normalize_date(value: &str) -> FilterResult<String> {
    let value = value.trim();

    if value.len() == 14 && value.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, COMPACT_FORMAT) {
            return Ok(compact(&dt));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(compact(&dt.naive_utc()));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(compact(&dt));
        }
    }

    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(compact(&dt));
    }

    Err(FilterParserError::invalid_constraint(format!(
        "unable to parse the date '{}'",
        value
    )))
}

fn compact(dt: &NaiveDateTime) -> String {
    dt.format(COMPACT_FORMAT).to_string()
}
