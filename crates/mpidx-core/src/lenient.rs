//! Tolerant `deserialize_with` helpers for scraped review payloads.
//!
//! Scraped records routinely carry the wrong JSON type for a field (`"9"`
//! instead of `9`, `{}` instead of a date). These helpers map anything they
//! cannot interpret to `None`/empty instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::analytics::{DateValue, RawReview};

/// Accepts a JSON number or a numeric string. Everything else is `None`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Accepts a JSON number or string as a raw date value.
///
/// Blank strings are kept: the field is present, just unparseable.
pub(crate) fn date_value<'de, D>(deserializer: D) -> Result<Option<DateValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().map(DateValue::Number),
        Value::String(s) => Some(DateValue::Text(s)),
        _ => None,
    })
}

/// Accepts an array of review objects, dropping entries that are not
/// objects. A non-array value yields an empty list.
pub(crate) fn reviews<'de, D>(deserializer: D) -> Result<Vec<RawReview>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
