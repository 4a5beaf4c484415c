//! CBOR output.
//!
//! Mapping from RSON to CBOR:
//!   - Value::Null    -> CBOR null (simple value 22)
//!   - Value::Bool    -> CBOR bool (simple values 20/21)
//!   - Value::Integer -> CBOR integer (smallest encoding that fits)
//!   - Value::Float   -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::Decimal -> CBOR decimal fraction, tag 4 `[exponent, mantissa]`
//!                       (mantissa as a tag 2/3 bignum when it is too wide)
//!   - Value::String  -> CBOR text string (determinate length)
//!   - Value::Array   -> CBOR array (determinate length)
//!   - Value::Object  -> CBOR map (determinate length, keys in key order)
//!
//! CBOR map keys may be any data item, so composite keys are written as
//! arrays. Integers that exceed CBOR's native integer range (-2^64 to
//! 2^64-1) produce an error rather than using bignum tags.
//!
//! Bytes are written directly rather than through ciborium's `Value`,
//! which would shrink float64 values to float16/float32 when it can.

use ciborium::value::Value as CborValue;
use librson::{sorted_entries, Key, Value};
use num_bigint::{BigInt, Sign};

/// Encode a value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Null => buf.push(0xf6),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Integer(n) => write_integer(buf, n)?,
        Value::Float(f) => write_float(buf, *f),
        Value::Decimal(d) => {
            // Tag 4: decimal fraction.
            let (mantissa, scale) = d.as_bigint_and_exponent();
            write_type_and_length(buf, 6, 4);
            write_type_and_length(buf, 4, 2);
            write_integer(buf, &BigInt::from(-scale))?;
            write_mantissa(buf, &mantissa);
        }
        Value::String(s) => write_text(buf, s),
        Value::Array(arr) => {
            write_type_and_length(buf, 4, arr.len() as u64);
            for item in arr {
                write_value(buf, item)?;
            }
        }
        Value::Object(obj) => {
            write_type_and_length(buf, 5, obj.len() as u64);
            for (k, v) in sorted_entries(obj) {
                write_key(buf, k)?;
                write_value(buf, v)?;
            }
        }
    }
    Ok(())
}

fn write_key(buf: &mut Vec<u8>, key: &Key) -> Result<(), String> {
    match key {
        Key::String(s) => {
            write_text(buf, s);
            Ok(())
        }
        other => write_value(buf, &Value::from(other.clone())),
    }
}

fn write_float(buf: &mut Vec<u8>, f: f64) {
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_be_bytes());
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_type_and_length(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Write a CBOR major type + length/value argument.
///
/// CBOR encodes the major type in the high 3 bits and uses the low 5 bits
/// plus optional following bytes for the argument:
///   0-23:    argument in the low 5 bits (1 byte total)
///   24:      1-byte argument follows
///   25:      2-byte argument follows
///   26:      4-byte argument follows
///   27:      8-byte argument follows
fn write_type_and_length(buf: &mut Vec<u8>, major: u8, val: u64) {
    let high = major << 5;
    match val {
        0..=23 => buf.push(high | val as u8),
        24..=0xff => {
            buf.push(high | 24);
            buf.push(val as u8);
        }
        0x100..=0xffff => {
            buf.push(high | 25);
            buf.extend_from_slice(&(val as u16).to_be_bytes());
        }
        0x10000..=0xffff_ffff => {
            buf.push(high | 26);
            buf.extend_from_slice(&(val as u32).to_be_bytes());
        }
        _ => {
            buf.push(high | 27);
            buf.extend_from_slice(&val.to_be_bytes());
        }
    }
}

/// Major 0 encodes n, major 1 encodes -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: &BigInt) -> Result<(), String> {
    let (major, arg) = if n.sign() == Sign::Minus {
        (1, -n - BigInt::from(1))
    } else {
        (0, n.clone())
    };
    let val = u64::try_from(&arg).map_err(|_| {
        format!(
            "integer {} exceeds CBOR's native integer range (-2^64 to 2^64-1)",
            n
        )
    })?;
    write_type_and_length(buf, major, val);
    Ok(())
}

/// Native integer when it fits, otherwise tag 2 (n) or tag 3 (-1 - n)
/// over the big-endian magnitude.
fn write_mantissa(buf: &mut Vec<u8>, n: &BigInt) {
    if write_integer(buf, n).is_ok() {
        return;
    }
    let (tag, magnitude) = if n.sign() == Sign::Minus {
        (3, -n - BigInt::from(1))
    } else {
        (2, n.clone())
    };
    let (_, bytes) = magnitude.to_bytes_be();
    write_type_and_length(buf, 6, tag);
    write_type_and_length(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(&bytes);
}

// ---------------------------------------------------------------------------
// Diagnostic Notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation.
///
/// Works from the encoded bytes, so it shows exactly what went on the wire.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor_value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &cbor_value, 0);
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, val: &CborValue, indent: usize) {
    match val {
        CborValue::Null => out.push_str("null"),
        CborValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        CborValue::Integer(i) => out.push_str(&i128::from(*i).to_string()),
        CborValue::Float(f) => diag_float(out, *f),
        CborValue::Text(s) => out.push_str(&librson::encode(
            &Value::String(s.clone()),
            librson::Format::Json,
        )),
        CborValue::Bytes(b) => {
            out.push_str("h'");
            for byte in b {
                out.push_str(&format!("{:02x}", byte));
            }
            out.push('\'');
        }
        CborValue::Array(arr) => diag_array(out, arr, indent),
        CborValue::Map(pairs) => diag_map(out, pairs, indent),
        CborValue::Tag(tag, inner) => {
            out.push_str(&format!("{}(", tag));
            diag_value(out, inner, indent);
            out.push(')');
        }
        _ => out.push_str(&format!("<?unknown {:?}>", val)),
    }
}

fn diag_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let s = format!("{}", f);
        let needs_point = !s.contains(['.', 'e', 'E']);
        out.push_str(&s);
        if needs_point {
            out.push_str(".0");
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn diag_array(out: &mut String, arr: &[CborValue], indent: usize) {
    if arr.iter().all(is_simple_value) {
        out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            diag_value(out, item, indent);
        }
        out.push(']');
        return;
    }
    out.push_str("[\n");
    for (i, item) in arr.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, item, indent + 2);
        out.push_str(if i + 1 < arr.len() { ",\n" } else { "\n" });
    }
    pad(out, indent);
    out.push(']');
}

fn diag_map(out: &mut String, pairs: &[(CborValue, CborValue)], indent: usize) {
    if pairs.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (i, (k, v)) in pairs.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, k, indent + 2);
        out.push_str(": ");
        diag_value(out, v, indent + 2);
        out.push_str(if i + 1 < pairs.len() { ",\n" } else { "\n" });
    }
    pad(out, indent);
    out.push('}');
}

fn is_simple_value(val: &CborValue) -> bool {
    matches!(
        val,
        CborValue::Null
            | CborValue::Bool(_)
            | CborValue::Integer(_)
            | CborValue::Float(_)
            | CborValue::Text(_)
            | CborValue::Bytes(_)
    )
}
