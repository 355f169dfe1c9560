//! Field decoders for request payloads.
//!
//! A field of the wrong JSON type reads as absent, so it fails the field's own
//! validation (`Missing 'name'.`) instead of failing the whole body.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

pub fn millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_millis(&Value::deserialize(deserializer)?))
}

/// Whole milliseconds from a JSON number; fractions are truncated.
pub fn as_millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    })
}
