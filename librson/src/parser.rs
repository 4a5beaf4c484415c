//! Grammar core: assembles the token stream into a value tree.
//!
//! Two grammars share one token cursor:
//! - Bracketed (`[...]`, `{...}`) readers, classic recursive descent
//! - Block readers, where nesting comes from indentation
//!
//! The block readers work under a stack of frames. A frame holds the
//! indentation shared by the siblings of one block and the line of the
//! last sibling read. Frames are pushed and popped in step with the
//! recursion.
//!
//! An empty `[]` or `{}` followed by a deeper block is a placeholder: the
//! block becomes its contents.

use tracing::debug;

use crate::encode::{encode, Format};
use crate::error::{Location, ParseContext, ParseError, Result};
use crate::lexer::{Token, TokenKind, Tokenizer, EOF_INDENT};
use crate::object::ObjectFactory;
use crate::options::ParseOptions;
use crate::scalar::{decode_quoted, decode_unquoted, NumberDecoder};
use crate::value::Value;

/// Deepest combined bracket and block nesting accepted.
///
/// Each block level costs several recursive calls, so this stays well
/// inside a 2 MiB thread stack even in unoptimized builds.
pub const MAX_DEPTH: usize = 128;

/// Parse a whole document.
pub fn parse(source: &str, ctx: &ParseContext, options: &ParseOptions) -> Result<Value> {
    let mut parser = Parser::new(source, ctx, options);
    let first = parser.next()?;
    let (value, token) = parser.parse_recurse(first)?;
    if token.kind != TokenKind::Eof {
        return Err(ParseError::ExtraContent(ctx.at(&token)));
    }
    Ok(value)
}

/// An empty bracketed container that a deeper block may fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placeholder {
    Array,
    Object,
}

/// What was expected where a value could not start.
#[derive(Clone, Copy, Debug)]
enum BadValue {
    ArrayElement,
    DictKey,
    DictValue,
    TopValue,
}

impl BadValue {
    fn error(self, loc: Location) -> ParseError {
        match self {
            BadValue::ArrayElement => ParseError::ExpectedArrayElement(loc),
            BadValue::DictKey => ParseError::ExpectedDictKey(loc),
            BadValue::DictValue => ParseError::ExpectedDictValue(loc),
            BadValue::TopValue => ParseError::ExpectedStartOfObject(loc),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    indent: isize,
    /// Line of the most recent sibling in this block.
    line: Option<usize>,
}

impl Frame {
    const OUTSIDE: Frame = Frame {
        indent: EOF_INDENT,
        line: None,
    };
}

type Read = (Value, Option<Placeholder>);

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    ctx: &'a ParseContext,
    factory: ObjectFactory<'a>,
    numbers: NumberDecoder,
    allow_trailing_commas: bool,
    stack: Vec<Frame>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, ctx: &'a ParseContext, options: &'a ParseOptions) -> Self {
        Self {
            tokens: Tokenizer::new(source, ctx),
            ctx,
            factory: ObjectFactory::from_options(options),
            numbers: NumberDecoder::new(options.use_decimal),
            allow_trailing_commas: options.allow_trailing_commas,
            stack: Vec::new(),
            depth: 0,
        }
    }

    fn next(&mut self) -> Result<Token<'a>> {
        self.tokens.next_token()
    }

    fn enter(&mut self, token: &Token<'a>) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep(MAX_DEPTH, self.ctx.at(token)));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn push_frame(&mut self, token: &Token<'a>) -> Result<()> {
        self.enter(token)?;
        self.stack.push(Frame {
            indent: token.indent,
            line: None,
        });
        Ok(())
    }

    fn pop_frame(&mut self) {
        self.stack.pop();
        self.leave();
    }

    fn frame(&self) -> Frame {
        self.stack.last().copied().unwrap_or(Frame::OUTSIDE)
    }

    fn mark_line(&mut self, line: usize) {
        if let Some(frame) = self.stack.last_mut() {
            frame.line = Some(line);
        }
    }

    // ========================================================================
    // Bracketed grammar
    // ========================================================================

    /// Read one value of the bracketed grammar starting at `token`.
    fn read_flat(&mut self, token: Token<'a>, bad: BadValue) -> Result<Read> {
        match token.kind {
            TokenKind::Unquoted => Ok((decode_unquoted(&token, self.numbers, self.ctx)?, None)),
            TokenKind::Quoted => Ok((decode_quoted(&token, self.ctx)?, None)),
            TokenKind::LBracket => self.read_array(token),
            TokenKind::LBrace => self.read_dict(token),
            TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Colon
            | TokenKind::Equals
            | TokenKind::Comma
            | TokenKind::Eof => Err(bad.error(self.ctx.at(&token))),
        }
    }

    /// Read a `[...]` array; `open` is the `[` token.
    fn read_array(&mut self, open: Token<'a>) -> Result<Read> {
        self.enter(&open)?;
        let unterminated = |ctx: &ParseContext| ParseError::UnterminatedArray(ctx.at(&open));

        let mut token = self.next()?;
        if token.kind == TokenKind::RBracket {
            self.leave();
            return Ok((Value::Array(Vec::new()), Some(Placeholder::Array)));
        }

        let mut items = Vec::new();
        loop {
            if token.kind == TokenKind::Eof {
                return Err(unterminated(self.ctx));
            }
            let (item, _) = self.read_flat(token, BadValue::ArrayElement)?;
            items.push(item);

            let delim = self.next()?;
            match delim.kind {
                TokenKind::RBracket => break,
                TokenKind::Comma => {
                    token = self.next()?;
                    if token.kind == TokenKind::RBracket {
                        if !self.allow_trailing_commas {
                            return Err(ParseError::TrailingComma(self.ctx.at(&token)));
                        }
                        break;
                    }
                }
                TokenKind::Eof => return Err(unterminated(self.ctx)),
                _ => return Err(ParseError::ExpectedCommaOrBracket(self.ctx.at(&delim))),
            }
        }

        self.leave();
        Ok((Value::Array(items), None))
    }

    /// Read a `{...}` dict; `open` is the `{` token.
    fn read_dict(&mut self, open: Token<'a>) -> Result<Read> {
        self.enter(&open)?;
        let unterminated = |ctx: &ParseContext| ParseError::UnterminatedDict(ctx.at(&open));

        let mut token = self.next()?;
        if token.kind == TokenKind::RBrace {
            self.leave();
            return Ok((self.factory.build(Vec::new()), Some(Placeholder::Object)));
        }

        let mut pairs = Vec::new();
        loop {
            if token.kind == TokenKind::Eof {
                return Err(unterminated(self.ctx));
            }
            let (key, _) = self.read_flat(token, BadValue::DictKey)?;

            let colon = self.next()?;
            match colon.kind {
                TokenKind::Colon => {}
                TokenKind::Eof => return Err(unterminated(self.ctx)),
                _ => {
                    let shown = match token.kind {
                        TokenKind::LBracket | TokenKind::LBrace => encode(&key, Format::Rson),
                        _ => token.text.to_string(),
                    };
                    return Err(ParseError::ExpectedColon(shown, self.ctx.at(&colon)));
                }
            }

            let value_token = self.next()?;
            if value_token.kind == TokenKind::Eof {
                return Err(unterminated(self.ctx));
            }
            let (value, _) = self.read_flat(value_token, BadValue::DictValue)?;
            pairs.push((key, value));

            let delim = self.next()?;
            match delim.kind {
                TokenKind::RBrace => break,
                TokenKind::Comma => {
                    token = self.next()?;
                    if token.kind == TokenKind::RBrace {
                        if !self.allow_trailing_commas {
                            return Err(ParseError::TrailingComma(self.ctx.at(&token)));
                        }
                        break;
                    }
                }
                TokenKind::Eof => return Err(unterminated(self.ctx)),
                _ => return Err(ParseError::ExpectedCommaOrBrace(self.ctx.at(&delim))),
            }
        }

        self.leave();
        Ok((self.factory.build(pairs), None))
    }

    // ========================================================================
    // Block grammar
    // ========================================================================

    /// Read a block element: a bracketed value or an `=` explicit value.
    fn read_block_value(&mut self, token: Token<'a>) -> Result<Read> {
        if token.kind == TokenKind::Equals {
            return Ok((self.read_explicit(token)?, None));
        }
        self.read_flat(token, BadValue::TopValue)
    }

    /// Read the single value following `=` on the same line.
    fn read_explicit(&mut self, equals: Token<'a>) -> Result<Value> {
        let token = self.next()?;
        let starts_value = matches!(
            token.kind,
            TokenKind::Unquoted | TokenKind::Quoted | TokenKind::LBracket | TokenKind::LBrace
        );
        if !starts_value || token.line != equals.line {
            return Err(ParseError::ExpectedExplicitValue(self.ctx.at(&equals)));
        }
        let (value, _) = self.read_flat(token, BadValue::DictValue)?;
        Ok(value)
    }

    /// Resolve the scope opened by `first`: an `=` block, a single value,
    /// a block array, or a block dict.
    fn parse_recurse(&mut self, first: Token<'a>) -> Result<(Value, Token<'a>)> {
        debug!("block at {}:{} indent {}", first.line, first.col, first.indent);
        self.push_frame(&first)?;
        let result = self.resolve(first);
        self.pop_frame();
        result
    }

    fn resolve(&mut self, first: Token<'a>) -> Result<(Value, Token<'a>)> {
        if first.kind == TokenKind::Equals {
            let (mut items, token) = self.parse_block_array(first, Vec::new(), None)?;
            let value = match items.len() {
                1 => items.pop().unwrap_or(Value::Null),
                _ => Value::Array(items),
            };
            return Ok((value, token));
        }

        let (value, placeholder) = self.read_flat(first, BadValue::TopValue)?;
        self.mark_line(first.line);
        let token = self.next()?;
        match token.kind {
            TokenKind::Colon | TokenKind::Equals => {
                let (pair, token) = self.parse_one_dict_entry(first, value, token)?;
                self.parse_block_dict(token, vec![pair])
            }
            TokenKind::Eof => Ok((value, token)),
            _ => {
                let (items, token) = self.parse_block_array(token, vec![value], placeholder)?;
                Ok((Value::Array(items), token))
            }
        }
    }

    /// Fill a placeholder with the block starting at `first`.
    fn complete(&mut self, placeholder: Placeholder, first: Token<'a>) -> Result<(Value, Token<'a>)> {
        debug!("filling {:?} placeholder from line {}", placeholder, first.line);
        self.push_frame(&first)?;
        let result = match placeholder {
            Placeholder::Array => self
                .parse_block_array(first, Vec::new(), None)
                .map(|(items, token)| (Value::Array(items), token)),
            Placeholder::Object => self.parse_block_dict(first, Vec::new()),
        };
        self.pop_frame();
        result
    }

    /// Read block array siblings until the indentation drops below the
    /// frame. `pending` marks the last of `items` as a placeholder.
    fn parse_block_array(
        &mut self,
        mut token: Token<'a>,
        mut items: Vec<Value>,
        mut pending: Option<Placeholder>,
    ) -> Result<(Vec<Value>, Token<'a>)> {
        let indent = self.frame().indent;
        loop {
            if token.indent < indent {
                return Ok((items, token));
            }
            if token.indent > indent {
                let Some(placeholder) = pending.take() else {
                    return Err(ParseError::UnexpectedIndent(self.ctx.at(&token)));
                };
                let (value, next) = self.complete(placeholder, token)?;
                if let Some(last) = items.last_mut() {
                    *last = value;
                }
                token = next;
                if token.indent > indent {
                    return Err(ParseError::UnindentMismatch(self.ctx.at(&token)));
                }
                continue;
            }

            if matches!(self.frame().line, Some(line) if token.line <= line) {
                return Err(match token.kind {
                    TokenKind::Colon | TokenKind::Equals => {
                        ParseError::MixedListAndDict(self.ctx.at(&token))
                    }
                    _ => ParseError::ElementsOnSameLine(self.ctx.at(&token)),
                });
            }
            self.mark_line(token.line);
            let (value, placeholder) = self.read_block_value(token)?;
            items.push(value);
            pending = placeholder;
            token = self.next()?;
        }
    }

    /// Finish the entry whose key was read from `key_token`. `token` is the
    /// first token after the key.
    ///
    /// `key : v1 : v2` collects inline values from the key's line, then the
    /// entry's value comes from `= value` on the same line, a deeper block,
    /// or failing both the last inline value.
    fn parse_one_dict_entry(
        &mut self,
        key_token: Token<'a>,
        key: Value,
        mut token: Token<'a>,
    ) -> Result<((Value, Value), Token<'a>)> {
        let indent = self.frame().indent;
        let line = key_token.line;
        let mut chain = Vec::new();
        let mut pending = None;

        while token.kind == TokenKind::Colon {
            let next = self.next()?;
            if next.line == line && next.kind != TokenKind::Eof {
                let (value, placeholder) = self.read_flat(next, BadValue::DictValue)?;
                chain.push(value);
                pending = placeholder;
                token = self.next()?;
                continue;
            }
            if next.indent <= indent {
                return Err(ParseError::ExpectedIndentedLine(self.ctx.at(&token)));
            }
            pending = None;
            token = next;
            break;
        }

        let value = if token.kind == TokenKind::Equals && token.line == line {
            let value = self.read_explicit(token)?;
            token = self.next()?;
            if token.indent > indent {
                return Err(ParseError::UnexpectedIndent(self.ctx.at(&token)));
            }
            value
        } else if token.indent > indent {
            let (value, next) = match pending {
                Some(placeholder) => {
                    chain.pop();
                    self.complete(placeholder, token)?
                }
                None => self.parse_recurse(token)?,
            };
            token = next;
            value
        } else if let Some(last) = chain.pop() {
            last
        } else {
            return Err(ParseError::ExpectedSeparatorOrIndent(self.ctx.at(&token)));
        };

        Ok((self.factory.fold_entry(key, chain, value), token))
    }

    /// Read block dict entries until the indentation drops below the frame.
    fn parse_block_dict(
        &mut self,
        mut token: Token<'a>,
        mut pairs: Vec<(Value, Value)>,
    ) -> Result<(Value, Token<'a>)> {
        let indent = self.frame().indent;
        loop {
            if token.indent < indent {
                return Ok((self.factory.build(pairs), token));
            }
            if token.indent > indent {
                return Err(ParseError::UnindentMismatch(self.ctx.at(&token)));
            }
            if matches!(self.frame().line, Some(line) if token.line <= line) {
                return Err(ParseError::KeysOnSameLine(self.ctx.at(&token)));
            }
            self.mark_line(token.line);
            let (key, _) = self.read_flat(token, BadValue::TopValue)?;
            let next = self.next()?;
            let (pair, next) = self.parse_one_dict_entry(token, key, next)?;
            pairs.push(pair);
            token = next;
        }
    }
}
