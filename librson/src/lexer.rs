//! Token source for the grammar core.
//!
//! The tokenizer pulls one token at a time from the scanner. Every token
//! remembers the indentation and number of the logical line it starts on,
//! which is all the block grammar needs to know about layout:
//! - Blank lines and `#` comment lines are skipped entirely
//! - Delimiters `[ ] { } : = ,` are single tokens
//! - Quoted strings keep their quotes; `"""` strings may span lines
//! - Everything else up to the next delimiter is one unquoted token
//! - The stream ends with an `Eof` sentinel, repeated forever

use tracing::trace;

use crate::error::{ParseContext, ParseError, Result};
use crate::scanner::{count_indent, Scanner};

/// Indentation carried by the end-of-input sentinel, below any real line.
pub const EOF_INDENT: isize = -1;

/// Token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted scalar text.
    Unquoted,
    /// Quoted string, single or triple.
    Quoted,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:` key separator.
    Colon,
    /// `=` explicit value marker.
    Equals,
    /// `,` element separator.
    Comma,
    /// End-of-input sentinel.
    Eof,
}

impl TokenKind {
    /// The one-character tag of this token kind.
    pub fn tag(self) -> char {
        match self {
            TokenKind::Unquoted => 'X',
            TokenKind::Quoted => '"',
            TokenKind::LBracket => '[',
            TokenKind::RBracket => ']',
            TokenKind::LBrace => '{',
            TokenKind::RBrace => '}',
            TokenKind::Colon => ':',
            TokenKind::Equals => '=',
            TokenKind::Comma => ',',
            TokenKind::Eof => '@',
        }
    }

    fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ':' => Some(TokenKind::Colon),
            '=' => Some(TokenKind::Equals),
            ',' => Some(TokenKind::Comma),
            _ => None,
        }
    }
}

/// A single token in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw source text; quoted strings include their quotes.
    pub text: &'a str,
    /// Indentation of the logical line, `EOF_INDENT` for the sentinel.
    pub indent: isize,
    /// One-based logical line number.
    pub line: usize,
    /// One-based column where the token starts.
    pub col: usize,
}

/// Pull-based tokenizer over RSON source text.
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    ctx: &'a ParseContext,
    at_line_start: bool,
    indent: isize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer. The source should already have passed
    /// [`crate::scanner::validate_source`].
    pub fn new(source: &'a str, ctx: &'a ParseContext) -> Self {
        Self {
            scanner: Scanner::new(source),
            ctx,
            at_line_start: true,
            indent: 0,
            line: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        loop {
            if self.at_line_start {
                self.begin_line()?;
            }
            match self.scanner.peek() {
                None => return Ok(self.eof()),
                Some('\n') => {
                    self.scanner.advance();
                    self.at_line_start = true;
                }
                Some(' ' | '\t' | '\r') => {
                    self.scanner.advance();
                }
                Some(_) => break,
            }
        }

        let start = self.scanner.position();
        let line = self.line;
        let col = self.scanner.col();
        let c = self.scanner.peek().unwrap_or('\n');

        let kind = if let Some(kind) = TokenKind::from_delimiter(c) {
            self.scanner.advance();
            kind
        } else if c == '"' {
            self.scan_quoted(line, col)?;
            TokenKind::Quoted
        } else {
            self.scan_unquoted();
            TokenKind::Unquoted
        };

        let mut text = self.scanner.slice_from(start);
        if kind == TokenKind::Unquoted {
            text = text.trim_end();
        }
        trace!("token {} {:?} at {}:{}", kind.tag(), text, line, col);
        Ok(Token {
            kind,
            text,
            indent: self.indent,
            line,
            col,
        })
    }

    /// Skip blank and comment lines, then measure the indentation of the
    /// next line with content.
    fn begin_line(&mut self) -> Result<()> {
        loop {
            let rest = self.scanner.rest();
            let line_text = &rest[..rest.find('\n').unwrap_or(rest.len())];
            let content = line_text.trim_start_matches([' ', '\t', '\r']);

            if content.is_empty() || content.starts_with('#') {
                self.scanner.advance_n(line_text.chars().count());
                if self.scanner.advance().is_none() {
                    break;
                }
                continue;
            }

            let leading = &line_text[..line_text.len() - content.len()];
            if let Some(offset) = leading.find('\t') {
                return Err(ParseError::TabNotAllowed(self.ctx.location(
                    self.scanner.line(),
                    self.scanner.col() + offset,
                    "\t",
                )));
            }

            let indent = count_indent(line_text);
            self.indent = indent as isize;
            self.line = self.scanner.line();
            self.scanner.advance_n(indent);
            break;
        }
        self.at_line_start = false;
        Ok(())
    }

    fn scan_unquoted(&mut self) {
        while let Some(c) = self.scanner.peek() {
            if c == '\n' || c == '"' || TokenKind::from_delimiter(c).is_some() {
                break;
            }
            self.scanner.advance();
        }
    }

    fn scan_quoted(&mut self, line: usize, col: usize) -> Result<()> {
        if self.scanner.starts_with("\"\"\"") {
            self.scanner.advance_n(3);
            loop {
                match self.scanner.peek() {
                    None => {
                        return Err(ParseError::UnterminatedString(
                            self.ctx.location(line, col, "\"\"\""),
                        ))
                    }
                    Some('\\') => self.scanner.advance_n(2),
                    Some('"') if self.scanner.starts_with("\"\"\"") => {
                        self.scanner.advance_n(3);
                        return Ok(());
                    }
                    Some(_) => {
                        self.scanner.advance();
                    }
                }
            }
        }

        self.scanner.advance();
        loop {
            match self.scanner.peek() {
                None | Some('\n') => {
                    return Err(ParseError::UnterminatedString(
                        self.ctx.location(line, col, "\""),
                    ))
                }
                Some('\\') => {
                    self.scanner.advance();
                    if matches!(self.scanner.peek(), Some(c) if c != '\n') {
                        self.scanner.advance();
                    }
                }
                Some('"') => {
                    self.scanner.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.scanner.advance();
                }
            }
        }
    }

    fn eof(&self) -> Token<'a> {
        Token {
            kind: TokenKind::Eof,
            text: "",
            indent: EOF_INDENT,
            line: self.scanner.line(),
            col: self.scanner.col(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<(char, String, isize, usize)> {
        let ctx = ParseContext::new(None);
        let mut tokenizer = Tokenizer::new(source, &ctx);
        let mut out = Vec::new();
        loop {
            let t = tokenizer.next_token().unwrap();
            out.push((t.kind.tag(), t.text.to_string(), t.indent, t.line));
            if t.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    fn tags(source: &str) -> String {
        tokenize(source).iter().map(|t| t.0).collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(tags("[a, {b: c}] = d"), "[X,{X:X}]=X@");
    }

    #[test]
    fn test_unquoted_keeps_inner_spaces() {
        let tokens = tokenize("  hello world  : x");
        assert_eq!(tokens[0], ('X', "hello world".to_string(), 2, 1));
        assert_eq!(tokens[1].0, ':');
    }

    #[test]
    fn test_indent_and_line_numbers() {
        let tokens = tokenize("a:\n\n  # note\n    b\n");
        assert_eq!(tokens[0], ('X', "a".to_string(), 0, 1));
        assert_eq!(tokens[2], ('X', "b".to_string(), 4, 4));
        assert_eq!(tokens[3].0, '@');
        assert_eq!(tokens[3].2, EOF_INDENT);
    }

    #[test]
    fn test_comment_only_at_line_start() {
        let tokens = tokenize("a # not a comment");
        assert_eq!(tokens[0].1, "a # not a comment");
    }

    #[test]
    fn test_quoted_strings() {
        let tokens = tokenize(r#""a:b" "c\"d""#);
        assert_eq!(tokens[0].1, r#""a:b""#);
        assert_eq!(tokens[1].1, r#""c\"d""#);
    }

    #[test]
    fn test_triple_quoted_spans_lines() {
        let tokens = tokenize("m: \"\"\"\nline\n\"\"\", x\ny");
        assert_eq!(tokens[2].1, "\"\"\"\nline\n\"\"\"");
        // The comma after the closing quotes stays on the string's logical line.
        assert_eq!(tokens[3], (',', ",".to_string(), 0, 1));
        assert_eq!(tokens[5], ('X', "y".to_string(), 0, 4));
    }

    #[test]
    fn test_crlf_lines() {
        let tokens = tokenize("a: b\r\n  c\r\n");
        assert_eq!(tokens[2].1, "b");
        assert_eq!(tokens[3], ('X', "c".to_string(), 2, 2));
    }

    #[test]
    fn test_eof_repeats() {
        let ctx = ParseContext::new(None);
        let mut tokenizer = Tokenizer::new("", &ctx);
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string() {
        let ctx = ParseContext::new(None);
        let mut tokenizer = Tokenizer::new("\"abc\nd", &ctx);
        assert!(matches!(
            tokenizer.next_token(),
            Err(ParseError::UnterminatedString(_))
        ));
    }

    #[test]
    fn test_tab_in_indentation() {
        let ctx = ParseContext::new(None);
        let mut tokenizer = Tokenizer::new("a:\n\tb", &ctx);
        tokenizer.next_token().unwrap();
        tokenizer.next_token().unwrap();
        match tokenizer.next_token() {
            Err(ParseError::TabNotAllowed(loc)) => assert_eq!((loc.line, loc.col), (2, 1)),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
