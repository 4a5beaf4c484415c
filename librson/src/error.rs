//! Error types for RSON parsing and encoding.

use std::fmt;

use thiserror::Error;

use crate::lexer::Token;

/// Result type for RSON parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Location of an arbitrary source position.
    pub fn location(&self, line: usize, col: usize, text: &str) -> Location {
        Location {
            line,
            col,
            token: text.to_string(),
            filename: self.filename.clone(),
        }
    }

    /// Location of the offending token.
    pub fn at(&self, token: &Token<'_>) -> Location {
        self.location(token.line, token.col, token.text)
    }
}

/// Where an error happened, and the raw text of the token responsible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// One-based line number.
    pub line: usize,
    /// One-based column number.
    pub col: usize,
    /// Raw source text of the offending token (empty at end of input).
    pub token: String,
    pub filename: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(name) => write!(f, " at {}:{} of <{}>", self.line, self.col, name),
            None => write!(f, " at {}:{}", self.line, self.col),
        }
    }
}

/// Broad classes of parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed characters, strings, or numbers.
    Lexical,
    /// Unmatched brackets and missing separators.
    Structural,
    /// A token that cannot appear where it was found.
    Grammar,
    /// Block indentation that does not line up.
    Indentation,
    /// Input rejected by a parse option.
    Policy,
    /// Data left over after the top-level value.
    TrailingData,
    /// Input nested deeper than the parser allows.
    Limit,
}

/// Error type for RSON parsing.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    /// Illegal BOM at start of file.
    #[error("Illegal BOM{0}")]
    IllegalBom(Location),

    /// Forbidden control character.
    #[error("Forbidden code point U+{0:04X}{1}")]
    ForbiddenCodePoint(u32, Location),

    /// Tab character found in indentation.
    #[error("Tab not allowed in indentation (use spaces){0}")]
    TabNotAllowed(Location),

    /// Unterminated string.
    #[error("Unterminated string{0}")]
    UnterminatedString(Location),

    /// Bad escaped character.
    #[error("Bad escaped character{0}")]
    BadEscapedChar(Location),

    /// Bad Unicode escape.
    #[error("Bad Unicode escape{0}")]
    BadUnicodeEscape(Location),

    /// Number that cannot be represented by the selected number type.
    #[error("Invalid number {0:?}{1}")]
    InvalidNumber(String, Location),

    /// `[` without a matching `]`.
    #[error("Unterminated list (no matching \"]\"){0}")]
    UnterminatedArray(Location),

    /// `{` without a matching `}`.
    #[error("Unterminated dict (no matching \"}}\"){0}")]
    UnterminatedDict(Location),

    /// Array element followed by something other than `,` or `]`.
    #[error("Expected \",\" or \"]\"{0}")]
    ExpectedCommaOrBracket(Location),

    /// Dict value followed by something other than `,` or `}`.
    #[error("Expected \",\" or \"}}\"{0}")]
    ExpectedCommaOrBrace(Location),

    /// Dict key not followed by `:`.
    #[error("Expected \":\" after dict key {0}{1}")]
    ExpectedColon(String, Location),

    /// Token that cannot start an array element.
    #[error("Expected array element{0}")]
    ExpectedArrayElement(Location),

    /// Token that cannot start a dict key.
    #[error("Expected dictionary key{0}")]
    ExpectedDictKey(Location),

    /// Token that cannot start a dict value.
    #[error("Expected dictionary value{0}")]
    ExpectedDictValue(Location),

    /// Token that cannot start a value at block level.
    #[error("Expected start of object{0}")]
    ExpectedStartOfObject(Location),

    /// `=` not followed by a value on the same line.
    #[error("Expected value after \"=\"{0}")]
    ExpectedExplicitValue(Location),

    /// Key/value syntax found among block array elements.
    #[error("Cannot mix list elements with dict (key/value) elements{0}")]
    MixedListAndDict(Location),

    /// `:` at the end of a line without an indented block below.
    #[error("Expected indented line after \":\"{0}")]
    ExpectedIndentedLine(Location),

    /// Block dict key without a separator or an indented value.
    #[error("Expected \":\" or \"=\", or indented line{0}")]
    ExpectedSeparatorOrIndent(Location),

    /// Dedent to a level that no enclosing block uses.
    #[error("Unindent does not match any outer indentation level{0}")]
    UnindentMismatch(Location),

    /// Indentation that does not open a block.
    #[error("Unexpected indentation{0}")]
    UnexpectedIndent(Location),

    /// Two block array elements on one line.
    #[error("Array elements must either be on separate lines or enclosed in []{0}")]
    ElementsOnSameLine(Location),

    /// Two block dict keys on one line.
    #[error("Dict keys must either be on separate lines or enclosed in {{}}{0}")]
    KeysOnSameLine(Location),

    /// Trailing comma while trailing commas are disabled.
    #[error("Unexpected trailing comma{0}")]
    TrailingComma(Location),

    /// Unexpected extra content after value.
    #[error("Unexpected additional data{0}")]
    ExtraContent(Location),

    /// Input nested deeper than the parser supports.
    #[error("Nesting too deep (limit {0}){1}")]
    NestingTooDeep(usize, Location),
}

impl ParseError {
    /// The class of failure this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        use ParseError::*;
        match self {
            IllegalBom(_)
            | ForbiddenCodePoint(..)
            | TabNotAllowed(_)
            | UnterminatedString(_)
            | BadEscapedChar(_)
            | BadUnicodeEscape(_)
            | InvalidNumber(..) => ErrorCategory::Lexical,
            UnterminatedArray(_)
            | UnterminatedDict(_)
            | ExpectedCommaOrBracket(_)
            | ExpectedCommaOrBrace(_)
            | ExpectedColon(..) => ErrorCategory::Structural,
            ExpectedArrayElement(_)
            | ExpectedDictKey(_)
            | ExpectedDictValue(_)
            | ExpectedStartOfObject(_)
            | ExpectedExplicitValue(_)
            | MixedListAndDict(_)
            | ExpectedIndentedLine(_)
            | ExpectedSeparatorOrIndent(_) => ErrorCategory::Grammar,
            UnindentMismatch(_)
            | UnexpectedIndent(_)
            | ElementsOnSameLine(_)
            | KeysOnSameLine(_) => ErrorCategory::Indentation,
            TrailingComma(_) => ErrorCategory::Policy,
            ExtraContent(_) => ErrorCategory::TrailingData,
            NestingTooDeep(..) => ErrorCategory::Limit,
        }
    }

    /// Where the error happened.
    pub fn location(&self) -> &Location {
        use ParseError::*;
        match self {
            IllegalBom(loc)
            | ForbiddenCodePoint(_, loc)
            | TabNotAllowed(loc)
            | UnterminatedString(loc)
            | BadEscapedChar(loc)
            | BadUnicodeEscape(loc)
            | InvalidNumber(_, loc)
            | UnterminatedArray(loc)
            | UnterminatedDict(loc)
            | ExpectedCommaOrBracket(loc)
            | ExpectedCommaOrBrace(loc)
            | ExpectedColon(_, loc)
            | ExpectedArrayElement(loc)
            | ExpectedDictKey(loc)
            | ExpectedDictValue(loc)
            | ExpectedStartOfObject(loc)
            | ExpectedExplicitValue(loc)
            | MixedListAndDict(loc)
            | ExpectedIndentedLine(loc)
            | ExpectedSeparatorOrIndent(loc)
            | UnindentMismatch(loc)
            | UnexpectedIndent(loc)
            | ElementsOnSameLine(loc)
            | KeysOnSameLine(loc)
            | TrailingComma(loc)
            | ExtraContent(loc)
            | NestingTooDeep(_, loc) => loc,
        }
    }
}

/// Errors from encoding a value into a format that cannot hold it.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// Two distinct keys of one object map to the same string key.
    #[error("Keys collide as string key {0:?}")]
    KeyCollision(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_suffix() {
        let ctx = ParseContext::new(None);
        assert_eq!(ctx.location(3, 7, "x").to_string(), " at 3:7");
        let ctx = ParseContext::new(Some("config.rson"));
        assert_eq!(
            ctx.location(1, 2, "x").to_string(),
            " at 1:2 of <config.rson>"
        );
    }

    #[test]
    fn test_error_message() {
        let ctx = ParseContext::new(None);
        let err = ParseError::UnterminatedDict(ctx.location(1, 1, "{"));
        assert_eq!(err.to_string(), "Unterminated dict (no matching \"}\") at 1:1");
        assert_eq!(err.category(), ErrorCategory::Structural);
        assert_eq!(err.location().token, "{");
    }
}
