//! Forgiving decoders for numbers read back from storage.
//!
//! Stored values may have been written by older front ends or edited by hand,
//! so numeric fields accept JSON numbers and numeric strings. Anything else
//! (null, booleans, garbage text, non-finite values) decodes to the field's
//! fallback instead of failing the whole record.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Non-negative count. Fractions truncate, negatives clamp to 0.
pub fn to_count(n: f64) -> u32 {
    if n <= 0.0 { 0 } else { n.trunc() as u32 }
}

pub fn to_signed(n: f64) -> i32 {
    n.trunc() as i32
}

pub fn to_wide(n: f64) -> i64 {
    n.trunc() as i64
}

pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(to_count).unwrap_or(0))
}

pub fn signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(to_signed).unwrap_or(0))
}

pub fn wide<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(to_wide).unwrap_or(0))
}

pub fn opt_signed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(to_signed))
}

pub fn opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(to_count))
}

/// Any scalar becomes text; null and containers become empty.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

pub fn opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// Pitch coordinate: any finite number, otherwise `None`.
pub fn opt_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value))
}
