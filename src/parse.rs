// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating a character buffer to a token stream. Atoms are not
//! converted here, only delimited: a token carries the
//! [Span](crate::pos::Span) of its raw text and the builder decides
//! what to make of it. The only tokens that denote nesting are
//! `Token::Open` and `Token::Close`. See [read](../read/index.html)
//! for assembling them into values.

use crate::pos::{Pos, Span};
use crate::value::{Parenkind, Unop};
use crate::number::radix_of;
use thiserror::Error;
use std::fmt::Write;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown character {0:?}")]
    UnknownCharacter(char),
    #[error("unexpected EOF in string starting")]
    UnterminatedString,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{err} {pos}")]
pub struct ParseErrorWithPos {
    pub err: ParseError,
    pub pos: Pos
}

impl ParseError {
    fn at(self, p: Pos) -> ParseErrorWithPos {
        ParseErrorWithPos {
            err: self,
            pos: p
        }
    }
}

pub fn maybe_open_close(c: u8) -> Option<Token> {
    match c {
        b'(' => Some(Token::Open(Parenkind::Round)),
        b'[' => Some(Token::Open(Parenkind::Square)),
        b'{' => Some(Token::Open(Parenkind::Curly)),
        b')' => Some(Token::Close(Parenkind::Round)),
        b']' => Some(Token::Close(Parenkind::Square)),
        b'}' => Some(Token::Close(Parenkind::Curly)),
        _ => None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Open(Parenkind),
    Close(Parenkind),
    Unary(Unop),
    Dot,
    Symbol,
    /// The span excludes the quotes.
    String,
    /// Holds the radix.
    Number(u32),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Token::Open(k) => f.write_char(k.opening()),
            Token::Close(k) => f.write_char(k.closing()),
            Token::Unary(op) => f.write_str(op.prefix()),
            Token::Dot => f.write_char('.'),
            Token::Symbol => f.write_str("<symbol>"),
            Token::String => f.write_str("<string>"),
            Token::Number(radix) => f.write_fmt(format_args!("<number/{}>", radix)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWithPos(pub Token, pub Span);

fn char2unop(c: u8) -> Option<Unop> {
    match c {
        b'\'' => Some(Unop::Quote),
        b'`' => Some(Unop::Quasiquote),
        b',' => Some(Unop::Unquote),
        b'#' => Some(Unop::Hash),
        // ',@' is handled by the caller, '@' alone is a symbol
        // character.
        _ => None
    }
}

fn is_whitespace_char(c: u8) -> bool {
    c.is_ascii_whitespace() || c == b'\x0B'
}

fn is_unknown_char(c: u8) -> bool {
    (c < 0x20 && !is_whitespace_char(c)) || c == 0x7F
}

// '#' and '@' are allowed inside symbols; at the start of a token
// '#' is taken as a prefix first.
fn is_symbol_or_number_char(c: u8) -> bool {
    !is_whitespace_char(c)
        && !is_unknown_char(c)
        && maybe_open_close(c).is_none()
        && !matches!(c, b'"' | b';' | b'\'' | b'`' | b',')
}

/// Classify a maximal run of symbol characters.
fn classify_atom(s: &str) -> Token {
    if s == "." {
        Token::Dot
    } else if let Some(radix) = radix_of(s) {
        Token::Number(radix)
    } else {
        Token::Symbol
    }
}

/// Iterator over the tokens of a buffer. Whitespace and `;` comments
/// are skipped. After an `Err` item the cursor is past the offending
/// input and iteration can go on.
#[derive(Debug, Clone)]
pub struct Tokenizer<'s> {
    input: &'s str,
    cursor: usize,
    pos: Pos,
}

impl<'s> Tokenizer<'s> {
    pub fn new(input: &'s str) -> Tokenizer<'s> {
        Tokenizer { input, cursor: 0, pos: Pos::default() }
    }

    /// Byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Position of the cursor.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// The raw text of a span returned by this tokenizer.
    pub fn text(&self, span: Span) -> &'s str {
        &self.input[span.start..span.end]
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.cursor).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.cursor += 1;
        if c == b'\n' {
            self.pos = Pos { line: self.pos.line + 1, col: 0 };
        } else {
            self.pos.col += 1;
        }
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break
            }
            self.bump();
        }
    }

    fn span_from(&self, start: usize, pos: Pos) -> Span {
        Span { start, end: self.cursor, pos }
    }

    // The opening quote has been consumed.
    fn read_string(&mut self, pos: Pos) -> Result<TokenWithPos, ParseErrorWithPos> {
        let start = self.cursor;
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString.at(pos)),
                Some(b'\\') => {
                    // Whatever follows is part of the string,
                    // including a quote.
                    if self.bump().is_none() {
                        return Err(ParseError::UnterminatedString.at(pos))
                    }
                }
                Some(b'"') => {
                    let span = Span { start, end: self.cursor - 1, pos };
                    return Ok(TokenWithPos(Token::String, span))
                }
                Some(_) => {}
            }
        }
    }
}

impl<'s> Iterator for Tokenizer<'s> {
    type Item = Result<TokenWithPos, ParseErrorWithPos>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let start = self.cursor;
            let pos = self.pos;
            let c = self.peek()?;
            if is_whitespace_char(c) {
                self.bump();
            } else if c == b';' {
                // line comments
                self.eat_while(|c| c != b'\n');
            } else if let Some(t) = maybe_open_close(c) {
                self.bump();
                return Some(Ok(TokenWithPos(t, self.span_from(start, pos))))
            } else if c == b',' {
                self.bump();
                let op = if self.peek() == Some(b'@') {
                    self.bump();
                    Unop::UnquoteSplicing
                } else {
                    Unop::Unquote
                };
                return Some(Ok(TokenWithPos(Token::Unary(op),
                                            self.span_from(start, pos))))
            } else if let Some(op) = char2unop(c) {
                self.bump();
                return Some(Ok(TokenWithPos(Token::Unary(op),
                                            self.span_from(start, pos))))
            } else if c == b'"' {
                self.bump();
                return Some(self.read_string(pos))
            } else if is_symbol_or_number_char(c) {
                // Numbers, symbols, Dot
                self.eat_while(is_symbol_or_number_char);
                let span = self.span_from(start, pos);
                return Some(Ok(TokenWithPos(classify_atom(self.text(span)), span)))
            } else {
                self.bump();
                return Some(Err(ParseError::UnknownCharacter(char::from(c)).at(pos)))
            }
        }
    }
}
