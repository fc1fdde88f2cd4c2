//! Lenient typed lookups into an effect's JSON params object.
//!
//! Effects are tuned with compile-time defaults; a params object may override
//! any of them. Lookups never fail: a missing key, a wrong type, or a value
//! outside the accepted range falls back to the default.

use serde_json::Value;

use crate::color::Srgb;

/// Reads a finite number as `f32`, returning `default` otherwise.
pub fn param_f32(params: &Value, name: &str, default: f32) -> f32 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Like [`param_f32`] but the value must also lie in `[min, max]`.
pub fn param_f32_in(params: &Value, name: &str, default: f32, min: f32, max: f32) -> f32 {
    let v = param_f32(params, name, default);
    if (min..=max).contains(&v) {
        v
    } else {
        default
    }
}

/// Reads a non-negative integer as `usize`, returning `default` otherwise.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Reads an integer in `[min, max]`, returning `default` if missing or out of
/// range.
pub fn param_usize_in(params: &Value, name: &str, default: usize, min: usize, max: usize) -> usize {
    match params.get(name).and_then(Value::as_u64) {
        Some(v) if (min as u64..=max as u64).contains(&v) => v as usize,
        _ => default,
    }
}

/// Reads a string, returning `default` otherwise.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Reads a `"#rrggbb"` color, returning `default` if missing or unparsable.
pub fn param_color(params: &Value, name: &str, default: Srgb) -> Srgb {
    params
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| Srgb::from_hex(s).ok())
        .unwrap_or(default)
}
