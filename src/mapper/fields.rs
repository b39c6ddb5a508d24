//! Lenient field access over raw JSON records.
//!
//! Vendors are inconsistent about quoting numbers, so numeric readers
//! accept both JSON numbers and numeric strings.

use crate::core::{BridgeError, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;

pub(crate) type Record = Map<String, Value>;

/// The record as a JSON object, or a mapping error.
pub(crate) fn as_record(value: &Value) -> Result<&Record> {
    value
        .as_object()
        .ok_or_else(|| BridgeError::mapping("record is not a JSON object"))
}

/// Scalar field rendered as text. Missing, null and structured values
/// yield `None`.
pub(crate) fn text<'a>(record: &'a Record, key: &str) -> Option<Cow<'a, str>> {
    scalar_text(record.get(key)?)
}

pub(crate) fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text field, or `default` when it is missing.
pub(crate) fn text_or<'a>(record: &'a Record, key: &str, default: &'a str) -> Cow<'a, str> {
    text(record, key).unwrap_or(Cow::Borrowed(default))
}

/// Finite float from a JSON number or a numeric string.
pub(crate) fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Signed integer from a JSON number or a numeric string; fractions are
/// truncated.
pub(crate) fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        },
        _ => None,
    }
}

/// Non-negative integer from a JSON number or a numeric string.
pub(crate) fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) if n.is_u64() => n.as_u64(),
        _ => lenient_i64(value).and_then(|v| u64::try_from(v).ok()),
    }
}
