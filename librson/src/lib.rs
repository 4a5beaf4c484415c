//! RSON (Readable Serial Object Notation) parser.
//!
//! RSON is a superset of JSON meant to be written by hand. On top of the
//! bracketed syntax it allows unquoted strings, structure expressed by
//! indentation, arrays and objects as dict keys, chained `key: key: value`
//! entries and an explicit `=` value marker.
//!
//! ```text
//! server:
//!     host: example.com
//!     ports:
//!         80
//!         443
//! [a, b]: composite key
//! ```
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: Validates the source text and provides the character
//!    cursor the lexer reads through.
//!
//! 2. **Lexer**: Pulls tokens one at a time, tagging each with the
//!    indentation and number of the line it starts on.
//!
//! 3. **Parser**: Resolves the bracketed and block grammars into values,
//!    decoding scalars and building objects through the configured hooks.

mod encode;
mod error;
mod lexer;
mod object;
mod options;
mod parser;
mod scalar;
mod scanner;
mod value;

use tracing::debug;

pub use encode::{encode, encode_json_key, sorted_entries, string_key, try_encode, Format};
pub use error::{EncodeError, ErrorCategory, Location, ParseError, Result};
pub use object::build_object;
pub use options::{ObjectHook, ObjectPairsHook, ParseOptions};
pub use parser::MAX_DEPTH;
pub use value::{Key, Object, Value};

/// Parse an RSON document from a string.
///
/// # Example
///
/// ```
/// use librson::parse;
///
/// let value = parse("a: [1, 2]").unwrap();
/// assert_eq!(value.get("a").unwrap().as_array().unwrap().len(), 2);
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse an RSON document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    parse_document(input, filename, &ParseOptions::default())
}

/// Parse an RSON document with non-default options.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    parse_document(input, None, options)
}

/// Parse an RSON document with both a filename and options.
pub fn parse_document(
    input: &str,
    filename: Option<&str>,
    options: &ParseOptions,
) -> Result<Value> {
    let ctx = error::ParseContext::new(filename);
    scanner::validate_source(input, &ctx)?;
    let value = parser::parse(input, &ctx, options)?;
    debug!("parsed {} bytes", input.len());
    Ok(value)
}
