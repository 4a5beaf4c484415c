//! Scalar decoding: turning the raw text of a token into a value.
//!
//! Unquoted tokens are keywords, integers (decimal, hex, octal, binary),
//! floats, or plain strings. Quoted tokens are JSON-style strings, with
//! `"""` delimiters allowed for text that spans lines.

use std::str::{CharIndices, FromStr};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{ParseContext, ParseError, Result};
use crate::lexer::Token;
use crate::value::Value;

/// Decodes the text of a float literal, or `None` if the number type
/// cannot hold it.
pub type FloatDecoder = fn(&str) -> Option<Value>;

/// Number decoding strategy, chosen once per parse.
#[derive(Clone, Copy)]
pub struct NumberDecoder {
    float: FloatDecoder,
}

impl NumberDecoder {
    /// Floats become `f64`.
    pub fn native() -> Self {
        Self { float: decode_f64 }
    }

    /// Floats become arbitrary-precision decimals.
    pub fn decimal() -> Self {
        Self {
            float: decode_decimal,
        }
    }

    pub fn new(use_decimal: bool) -> Self {
        if use_decimal {
            Self::decimal()
        } else {
            Self::native()
        }
    }
}

impl Default for NumberDecoder {
    fn default() -> Self {
        Self::native()
    }
}

// ============================================================================
// Unquoted Scalars
// ============================================================================

/// Decode an unquoted token.
pub fn decode_unquoted(
    token: &Token<'_>,
    numbers: NumberDecoder,
    ctx: &ParseContext,
) -> Result<Value> {
    let s = token.text;

    if let Some(v) = parse_keyword(s) {
        return Ok(v);
    }
    if let Some(n) = parse_integer(s) {
        return Ok(Value::Integer(n));
    }
    if is_float_pattern(s) {
        return (numbers.float)(s)
            .ok_or_else(|| ParseError::InvalidNumber(s.to_string(), ctx.at(token)));
    }
    Ok(Value::String(s.to_string()))
}

/// Check if s is a keyword and return its value.
fn parse_keyword(s: &str) -> Option<Value> {
    match s {
        "null" => Some(Value::Null),
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

/// Parse `[+-]?digits` or a `0x`/`0o`/`0b` prefixed integer.
fn parse_integer(s: &str) -> Option<BigInt> {
    let (negative, body) = split_sign(s);
    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        _ => (10, body),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let n = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -n } else { n })
}

/// Split a float literal into sign, mantissa and optional exponent.
fn split_float(s: &str) -> (bool, &str, Option<&str>) {
    let (negative, body) = split_sign(s);
    match body.find(['e', 'E']) {
        Some(pos) => (negative, &body[..pos], Some(&body[pos + 1..])),
        None => (negative, body, None),
    }
}

/// Check if string matches `[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?` with
/// either a decimal point or an exponent.
fn is_float_pattern(s: &str) -> bool {
    let (_, mantissa, exponent) = split_float(s);

    if let Some(exp) = exponent {
        let exp = exp
            .strip_prefix('+')
            .or_else(|| exp.strip_prefix('-'))
            .unwrap_or(exp);
        if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    } else if !mantissa.contains('.') {
        return false;
    }

    let (before, after) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    (!before.is_empty() || !after.is_empty())
        && before.chars().all(|c| c.is_ascii_digit())
        && after.chars().all(|c| c.is_ascii_digit())
}

/// Default float strategy.
fn decode_f64(s: &str) -> Option<Value> {
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float)
}

/// Decimal float strategy.
fn decode_decimal(s: &str) -> Option<Value> {
    let (negative, mantissa, exponent) = split_float(s);
    let sign = if negative { "-" } else { "" };
    let (before, after) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let before = if before.is_empty() { "0" } else { before };
    let normalized = if after.is_empty() {
        format!("{}{}", sign, before)
    } else {
        format!("{}{}.{}", sign, before, after)
    };

    let d = match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix('+').unwrap_or(exp);
            BigDecimal::from_str(&format!("{}e{}", normalized, exp)).ok()?
        }
        None => BigDecimal::from_str(&normalized).ok()?,
    };
    Some(Value::Decimal(d))
}

// ============================================================================
// Quoted Strings
// ============================================================================

/// Decode a quoted token, stripping `"` or `"""` delimiters.
pub fn decode_quoted(token: &Token<'_>, ctx: &ParseContext) -> Result<Value> {
    let raw = token.text;
    let (quote_len, body) = match raw
        .strip_prefix("\"\"\"")
        .and_then(|r| r.strip_suffix("\"\"\""))
    {
        Some(body) if raw.len() >= 6 => (3, body),
        _ => (
            1,
            raw.strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .unwrap_or(""),
        ),
    };
    unescape(body, quote_len, token, ctx).map(Value::String)
}

/// Location of the character at byte `offset` of a string body.
fn body_location(
    body: &str,
    offset: usize,
    quote_len: usize,
    token: &Token<'_>,
    ctx: &ParseContext,
) -> crate::error::Location {
    let prefix = &body[..offset];
    if prefix.contains('\n') {
        ctx.at(token)
    } else {
        let col = token.col + quote_len + prefix.chars().count();
        ctx.location(token.line, col, token.text)
    }
}

fn read_hex4(chars: &mut CharIndices<'_>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        code = code * 16 + c.to_digit(16)?;
    }
    Some(code)
}

/// Process JSON escapes in a string body.
fn unescape(body: &str, quote_len: usize, token: &Token<'_>, ctx: &ParseContext) -> Result<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let bad_unicode =
            || ParseError::BadUnicodeEscape(body_location(body, i, quote_len, token, ctx));
        match chars.next().map(|(_, esc)| esc) {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0C'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let code = read_hex4(&mut chars).ok_or_else(bad_unicode)?;
                let code = match code {
                    0xD800..=0xDBFF => {
                        // High surrogate must be followed by an escaped low surrogate.
                        if chars.next().map(|(_, c)| c) != Some('\\')
                            || chars.next().map(|(_, c)| c) != Some('u')
                        {
                            return Err(bad_unicode());
                        }
                        let low = read_hex4(&mut chars).ok_or_else(bad_unicode)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(bad_unicode());
                        }
                        0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => return Err(bad_unicode()),
                    _ => code,
                };
                out.push(char::from_u32(code).ok_or_else(bad_unicode)?);
            }
            _ => {
                return Err(ParseError::BadEscapedChar(body_location(
                    body, i, quote_len, token, ctx,
                )))
            }
        }
    }

    Ok(out)
}
