//! Total coercions from untrusted JSON into typed values.
//!
//! Inference services return loosely-typed payloads: numbers arrive as
//! strings, dates in whatever shape the model felt like, whitespace mangled
//! by PDF extraction. These functions never fail — anything unusable
//! becomes `None`, and calling them twice on already-normalized input
//! returns the same value.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through when finite; strings are trimmed and parsed.
/// Null, missing, non-numeric, and non-finite input (NaN/Infinity) all
/// yield `None`.
pub fn normalize_number(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    num.is_finite().then_some(num)
}

/// Accepted date shapes, most specific first. RFC 3339 is handled
/// separately so timezone offsets collapse to the UTC calendar date.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a JSON value as a calendar date, truncated to `YYYY-MM-DD`.
///
/// Time-of-day and timezone offset are discarded on purpose: downstream
/// consumers store bare invoice dates, and the truncation must stay lossy
/// for compatibility. Unparseable input yields `None`.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_utc().date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Collapse all whitespace runs to single spaces and trim the ends.
///
/// Applied to extracted document text before storage so that prompts and
/// similarity lookups see stable input regardless of PDF layout.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
