//! Source validation and the character cursor the lexer reads through.
//!
//! The scanner performs:
//! - BOM and control character validation over the whole source
//! - Position tracking (byte offset, one-based line and column)
//! - Indentation counting

use crate::error::{ParseContext, ParseError, Result};

/// Validate the raw source before tokenizing.
pub fn validate_source(source: &str, ctx: &ParseContext) -> Result<()> {
    validate_no_bom(source, ctx)?;
    validate_code_points(source, ctx)
}

/// Check that the source doesn't start with a UTF-8 BOM.
fn validate_no_bom(source: &str, ctx: &ParseContext) -> Result<()> {
    if source.starts_with('\u{FEFF}') {
        return Err(ParseError::IllegalBom(ctx.location(1, 1, "\u{FEFF}")));
    }
    Ok(())
}

/// Control characters are forbidden except for line breaks and tabs.
fn is_allowed_code_point(ch: char) -> bool {
    !ch.is_control() || matches!(ch, '\n' | '\r' | '\t')
}

/// Validate that the source contains no forbidden code points.
fn validate_code_points(source: &str, ctx: &ParseContext) -> Result<()> {
    let mut line = 1;
    let mut col = 1;
    for ch in source.chars() {
        if !is_allowed_code_point(ch) {
            return Err(ParseError::ForbiddenCodePoint(
                ch as u32,
                ctx.location(line, col, ""),
            ));
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    Ok(())
}

/// Count the number of leading spaces in a line.
pub fn count_indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// Forward-only cursor over the source text.
#[derive(Clone, Debug)]
pub struct Scanner<'src> {
    source: &'src str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current one-based line.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current one-based column.
    #[inline]
    pub fn col(&self) -> usize {
        self.col
    }

    /// The unread remainder of the source.
    #[inline]
    pub fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance by one character and return it.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Advance past `n` characters.
    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Source text between `start` and the current position.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.pos]
    }
}
