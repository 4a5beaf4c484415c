//! Encode RSON values to text.
//!
//! `Rson` output is the canonical bracketed form: it only uses the subset
//! of the syntax that every RSON reader agrees on, so parsing it again gives
//! back an equal value. `Json` output is meant for other tools.
//!
//! JSON member names are strings, so non-string keys are written as their
//! RSON text. `1` and `"1"` then share a name; [`try_encode`] reports that
//! instead of writing both.

use std::collections::HashSet;

use bigdecimal::BigDecimal;
use num_bigint::Sign;

use crate::error::EncodeError;
use crate::value::{Key, Object, Value};

/// Widest run of padding zeros a decimal is written with before it
/// switches to exponent form.
const PLAIN_ZEROS: i64 = 20;

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Compact canonical RSON.
    Rson,
    /// Pretty-printed JSON.
    Json,
}

/// Encode a value to a string in the specified format.
pub fn encode(value: &Value, format: Format) -> String {
    match format {
        Format::Rson => encode_rson(value),
        Format::Json => encode_json(value, 0),
    }
}

/// Encode a value, failing where the format would lose keys.
pub fn try_encode(value: &Value, format: Format) -> Result<String, EncodeError> {
    if format == Format::Json {
        check_string_keys(value)?;
    }
    Ok(encode(value, format))
}

/// The text a key takes where keys must be strings.
pub fn string_key(key: &Key) -> String {
    match key {
        Key::String(s) => s.clone(),
        other => encode_rson_key(other),
    }
}

fn check_string_keys(value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Array(items) => items.iter().try_for_each(check_string_keys),
        Value::Object(obj) => {
            let mut seen = HashSet::new();
            for (k, v) in sorted_entries(obj) {
                let name = string_key(k);
                if seen.contains(&name) {
                    return Err(EncodeError::KeyCollision(name));
                }
                seen.insert(name);
                check_string_keys(v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Entries of an object in key order.
pub fn sorted_entries(obj: &Object) -> Vec<(&Key, &Value)> {
    let mut entries: Vec<_> = obj.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

// =============================================================================
// RSON Encoder
// =============================================================================

fn encode_rson(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => encode_float(*f),
        Value::Decimal(d) => encode_decimal(d),
        Value::String(s) => encode_string(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(encode_rson).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(obj) => {
            let items: Vec<String> = sorted_entries(obj)
                .into_iter()
                .map(|(k, v)| format!("{}: {}", encode_rson_key(k), encode_rson(v)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

/// Composite keys are written as the arrays they canonicalize from.
fn encode_rson_key(key: &Key) -> String {
    match key {
        Key::String(s) => encode_string(s),
        other => encode_rson(&Value::from(other.clone())),
    }
}

/// RSON has no literal for NaN or infinities.
fn encode_float(f: f64) -> String {
    if f.is_finite() {
        with_point(format!("{}", f))
    } else {
        "null".to_string()
    }
}

/// Exact digits: plain while the padding stays short, otherwise
/// `<digits>e<exponent>`.
fn encode_decimal(d: &BigDecimal) -> String {
    let (mantissa, scale) = d.as_bigint_and_exponent();
    let sign = if mantissa.sign() == Sign::Minus { "-" } else { "" };
    let digits = mantissa.magnitude().to_string();
    let len = digits.len() as i64;

    if (0..=len + PLAIN_ZEROS).contains(&scale) {
        let scale = scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int, frac) = padded.split_at(padded.len() - scale);
        let frac = if frac.is_empty() { "0" } else { frac };
        format!("{}{}.{}", sign, int, frac)
    } else if (-PLAIN_ZEROS..0).contains(&scale) {
        format!("{}{}{}.0", sign, digits, "0".repeat(scale.unsigned_abs() as usize))
    } else {
        format!("{}{}e{}", sign, digits, -scale)
    }
}

/// Keep a float looking like a float so it does not re-parse as an integer.
fn with_point(s: String) -> String {
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{}.0", s)
    }
}

fn encode_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value {
        Value::Null
        | Value::Bool(_)
        | Value::Integer(_)
        | Value::Float(_)
        | Value::Decimal(_)
        | Value::String(_) => encode_rson(value),
        Value::Array(arr) => {
            if arr.is_empty() {
                "[]".to_string()
            } else {
                let items: Vec<String> = arr
                    .iter()
                    .map(|v| format!("{}{}", pad1, encode_json(v, indent + 1)))
                    .collect();
                format!("[\n{}\n{}]", items.join(",\n"), pad)
            }
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                "{}".to_string()
            } else {
                let items: Vec<String> = sorted_entries(obj)
                    .into_iter()
                    .map(|(k, v)| {
                        format!(
                            "{}{}: {}",
                            pad1,
                            encode_json_key(k),
                            encode_json(v, indent + 1)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{}}}", items.join(",\n"), pad)
            }
        }
    }
}

/// JSON keys must be strings; anything else becomes its RSON text.
pub fn encode_json_key(key: &Key) -> String {
    encode_string(&string_key(key))
}
