// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Assembling tokens into values. The values themselves are made by a
//! [Builder](Builder) supplied by the caller; [ParseState](ParseState)
//! only keeps them on a bounded value stack and tracks open lists on a
//! bounded control stack, so deeply nested input fails with
//! `StackCapacityExceeded` instead of exhausting the native stack.

use crate::pos::{Pos, Span};
use crate::context::{Context, NamedContext};
use crate::parse::{Token, TokenWithPos, Tokenizer,
                   ParseError, ParseErrorWithPos};
use crate::settings::{Settings, ErrorPolicy, STRICT_SETTINGS};
use crate::number::{parse_integer, R5RSNumber};
use crate::value::{Value, Atom, Parenkind, Unop};
use std::fmt::{Formatter, Display};
use std::io::Write;
use std::sync::Arc;
use kstring::KString;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Control,
    Value,
    Prefix,
}

impl Display for StackKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(match self {
            StackKind::Control => "control",
            StackKind::Value => "value",
            StackKind::Prefix => "prefix",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DotError {
    #[error("'.' outside of list context")]
    OutsideList,
    #[error("'.' without preceding item")]
    NoPrecedingItem,
    #[error("'.' already appeared {0}, again")]
    AlreadyAppeared(Pos),
    #[error("missing item after '.'")]
    MissingItemAfterDot,
    #[error("expecting one item after '.', got {0}")]
    ExpectingOneItemAfterDot(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("{0}")]
    PE(ParseError),
    #[error("'{}' {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    DelimiterMismatch(Parenkind, Pos, Parenkind),
    #[error("unexpected closing character '{}'", .0.closing())]
    UnbalancedClose(Parenkind),
    #[error("premature EOF while expecting closing character '{}' for '{}' {1}",
            .0.closing(), .0.opening())]
    UnterminatedList(Parenkind, Pos),
    #[error("prefix '{0}' without a value following it")]
    DanglingPrefix(Unop),
    #[error("{0}")]
    MalformedDottedPair(DotError),
    #[error("{0} stack capacity of {1} exceeded")]
    StackCapacityExceeded(StackKind, usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{err} {pos}")]
pub struct ReadErrorWithPos {
    pub err: ReadError,
    pub pos: Pos
}

impl ReadError {
    fn at(self, p: Pos) -> ReadErrorWithPos {
        ReadErrorWithPos {
            err: self,
            pos: p
        }
    }
}

impl From<ParseErrorWithPos> for ReadErrorWithPos {
    fn from(ep: ParseErrorWithPos) -> ReadErrorWithPos {
        let ParseErrorWithPos { err, pos } = ep;
        ReadErrorWithPos {
            err: ReadError::PE(err),
            pos
        }
    }
}

#[derive(Error, Debug, Clone)]
pub struct ReadErrorWithPosContext {
    pub err_with_pos: ReadErrorWithPos,
    pub container: Arc<dyn Context>
}

impl Display for ReadErrorWithPosContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{} ", self.err_with_pos.err))?;
        self.container.format_with_pos(self.err_with_pos.pos, f)?;
        Ok(())
    }
}

/// A scan ended early. `code` is -1 under `ErrorPolicy::Abort`, or
/// what `Builder::error` returned under `ErrorPolicy::Delegate`.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct ScanAbort {
    pub code: i32,
    pub error: ReadErrorWithPosContext,
}

impl ScanAbort {
    pub fn err(&self) -> &ReadError {
        &self.error.err_with_pos.err
    }
}


/// The construction callbacks. `Value` is an opaque handle to the
/// scanner: it is only stored, moved and handed back.
pub trait Builder {
    type Value;

    /// `text` is the raw symbol.
    fn symbol(&mut self, text: &str, span: Span) -> Self::Value;
    /// `text` is the raw content between the quotes; escapes, if
    /// any, are the builder's business.
    fn string(&mut self, text: &str, span: Span) -> Self::Value;
    /// `text` is the whole atom, including the sign and the radix
    /// prefix (`0x`, `0o`, `0b`), not just its digits. Use
    /// `number::digits` to get the digits alone, or
    /// `number::parse_integer` for the value.
    fn number(&mut self, text: &str, span: Span, radix: u32) -> Self::Value;
    fn unary(&mut self, op: Unop, v: Self::Value) -> Self::Value;
    fn list(&mut self, kind: Parenkind, items: Vec<Self::Value>) -> Self::Value;
    /// `( items . tail )`, `items` is never empty.
    fn cons(&mut self, kind: Parenkind, items: Vec<Self::Value>, tail: Self::Value)
            -> Self::Value;
    /// Called for every error under `ErrorPolicy::Delegate`. Return 0
    /// to skip the offending token and continue, anything else to end
    /// the scan with that code.
    fn error(&mut self, _source: &str, _pos: Pos, _err: &ReadError) -> i32 {
        -1
    }
}


/// One open list. The sentinel at the bottom of the control stack
/// has no delimiter and depth -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub open: Option<(Parenkind, Pos)>,
    /// Index into the value stack where this list's elements begin.
    pub base: usize,
    /// Prefixes `wrap_start..wrap_end` on the prefix stack wrap this
    /// list once it is closed; prefixes above `wrap_end` are pending
    /// for the next value inside it.
    pub wrap_start: usize,
    pub wrap_end: usize,
    pub depth: i32,
    /// Position of a '.' and the value stack length when it was seen.
    pub dot: Option<(Pos, usize)>,
}

impl Frame {
    fn sentinel() -> Frame {
        Frame {
            open: None,
            base: 0,
            wrap_start: 0,
            wrap_end: 0,
            depth: -1,
            dot: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.open.is_none()
    }

    /// Whether the list is the operand of a prefix.
    pub fn pending_unary(&self) -> bool {
        self.wrap_start < self.wrap_end
    }
}

/// All state of a scan. Values from earlier scans on the same state
/// stay below the ones of later scans; use `reset` to start afresh.
#[derive(Debug)]
pub struct ParseState<V> {
    settings: Settings,
    container: Arc<dyn Context>,
    pos: Pos,
    cursor: usize,
    frames: Vec<Frame>,
    values: Vec<V>,
    prefixes: Vec<(Unop, Pos)>,
}

impl<V> ParseState<V> {
    pub fn new(container: Arc<dyn Context>, settings: Settings) -> ParseState<V> {
        let mut frames = Vec::with_capacity(settings.max_depth + 1);
        frames.push(Frame::sentinel());
        ParseState {
            container,
            pos: Pos::default(),
            cursor: 0,
            frames,
            values: Vec::new(),
            prefixes: Vec::new(),
            settings,
        }
    }

    /// For buffers without a file behind them.
    pub fn named(name: &str, settings: Settings) -> ParseState<V> {
        ParseState::new(Arc::new(NamedContext::new(name)), settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The value stack. After a successful scan these are the
    /// top-level values; after an aborted one, whatever was completed
    /// up to the error.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    /// The control stack, sentinel first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether only the sentinel frame is left and no prefix is
    /// pending.
    pub fn is_balanced(&self) -> bool {
        self.frames.len() == 1 && self.prefixes.is_empty()
    }

    /// Position of the last token (or error) seen.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Byte offset up to which the last scan got.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Back to the freshly created state, dropping all values.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(Frame::sentinel());
        self.values.clear();
        self.prefixes.clear();
        self.pos = Pos::default();
        self.cursor = 0;
    }

    // Count of completed top-level values: everything below the
    // outermost open list.
    fn completed(&self) -> usize {
        match self.frames.get(1) {
            Some(frame) => frame.base,
            None => self.values.len()
        }
    }

    /// Route an error through the policy. `Ok(())` means skip the
    /// offending token and continue.
    fn fail<B: Builder<Value = V>>(
        &self,
        builder: &mut B,
        err_with_pos: ReadErrorWithPos,
    ) -> Result<(), ScanAbort> {
        let located = ReadErrorWithPosContext {
            err_with_pos,
            container: self.container.clone(),
        };
        match self.settings.on_error {
            ErrorPolicy::Ignore => Ok(()),
            ErrorPolicy::Warn => {
                log::warn!("{}", located);
                Ok(())
            }
            ErrorPolicy::Abort => {
                log::error!("{}", located);
                Err(ScanAbort { code: -1, error: located })
            }
            ErrorPolicy::Exit => {
                eprintln!("error: {}", located);
                std::process::exit(1)
            }
            ErrorPolicy::Delegate => {
                let ReadErrorWithPos { err, pos } = &located.err_with_pos;
                let code = builder.error(&self.container.source_name(), *pos, err);
                if code == 0 {
                    Ok(())
                } else {
                    log::debug!("handler aborted scan with code {}: {}", code, located);
                    Err(ScanAbort { code, error: located })
                }
            }
        }
    }

    // Ok(false) if the value stack is full and the error was ignored.
    fn check_room<B: Builder<Value = V>>(
        &self,
        builder: &mut B,
        pos: Pos,
    ) -> Result<bool, ScanAbort> {
        if self.values.len() < self.settings.max_items {
            return Ok(true)
        }
        let max = self.settings.max_items;
        self.fail(builder, ReadError::StackCapacityExceeded(StackKind::Value, max).at(pos))?;
        Ok(false)
    }

    fn top(&self) -> &Frame {
        // The sentinel is never popped.
        &self.frames[self.frames.len() - 1]
    }

    // Report the innermost prefix above `mark` as dangling and drop
    // the prefixes above `mark`.
    fn drop_dangling<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        mark: usize,
    ) -> Result<(), ScanAbort> {
        if let Some(&(op, pos)) = self.prefixes.last() {
            if self.prefixes.len() > mark {
                self.fail(builder, ReadError::DanglingPrefix(op).at(pos))?;
                self.prefixes.truncate(mark);
            }
        }
        Ok(())
    }

    // Apply prefixes from `mark` up, innermost (last read) first.
    fn wrap<B: Builder<Value = V>>(&mut self, builder: &mut B, mark: usize, v: V) -> V {
        let mut v = v;
        for (op, _) in self.prefixes.drain(mark..).rev() {
            v = builder.unary(op, v);
        }
        v
    }

    fn open<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        kind: Parenkind,
        pos: Pos,
    ) -> Result<(), ScanAbort> {
        let max = self.settings.max_depth;
        if self.frames.len() > max {
            self.fail(
                builder, ReadError::StackCapacityExceeded(StackKind::Control, max).at(pos))?;
            // The prefixes belonged to the dropped list.
            let mark = self.top().wrap_end;
            self.prefixes.truncate(mark);
            return Ok(())
        }
        let top = self.top();
        let frame = Frame {
            open: Some((kind, pos)),
            base: self.values.len(),
            wrap_start: top.wrap_end,
            wrap_end: self.prefixes.len(),
            depth: top.depth + 1,
            dot: None,
        };
        log::trace!("open '{}' depth {} {}", kind.opening(), frame.depth, pos);
        self.frames.push(frame);
        Ok(())
    }

    fn close<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        kind: Parenkind,
        pos: Pos,
    ) -> Result<(), ScanAbort> {
        let top = self.top().clone();
        let (opened, opened_pos) = match top.open {
            None => return self.fail(builder, ReadError::UnbalancedClose(kind).at(pos)),
            Some(o) => o
        };
        if opened != kind {
            return self.fail(
                builder, ReadError::DelimiterMismatch(opened, opened_pos, kind).at(pos))
        }
        self.drop_dangling(builder, top.wrap_end)?;
        if self.values.len() == top.base && !self.check_room(builder, pos)? {
            // No room for the empty list: drop it with its prefixes.
            self.frames.pop();
            self.prefixes.truncate(top.wrap_start);
            return Ok(())
        }

        let mut dotted = false;
        if let Some((dotpos, i)) = top.dot {
            let n_items_after_dot = self.values.len() - i;
            match n_items_after_dot {
                1 => dotted = true,
                0 => self.fail(builder, ReadError::MalformedDottedPair(
                    DotError::MissingItemAfterDot).at(dotpos))?,
                n => self.fail(builder, ReadError::MalformedDottedPair(
                    DotError::ExpectingOneItemAfterDot(n)).at(dotpos))?,
            }
        }

        // Nothing can fail from here on.
        let frame = self.frames.pop().unwrap_or_else(Frame::sentinel);
        let mut items = self.values.split_off(frame.base);
        let tail = if dotted { items.pop() } else { None };
        let v = match tail {
            Some(tail) => builder.cons(kind, items, tail),
            None => builder.list(kind, items)
        };
        let v = self.wrap(builder, frame.wrap_start, v);
        log::trace!("close '{}' depth {} {}", kind.closing(), frame.depth, pos);
        self.values.push(v);
        Ok(())
    }

    fn dot<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        pos: Pos,
    ) -> Result<(), ScanAbort> {
        let top = self.top().clone();
        if top.is_sentinel() {
            return self.fail(builder, ReadError::MalformedDottedPair(
                DotError::OutsideList).at(pos))
        }
        self.drop_dangling(builder, top.wrap_end)?;
        if let Some((oldpos, _)) = top.dot {
            return self.fail(builder, ReadError::MalformedDottedPair(
                DotError::AlreadyAppeared(oldpos)).at(pos))
        }
        if self.values.len() == top.base {
            return self.fail(builder, ReadError::MalformedDottedPair(
                DotError::NoPrecedingItem).at(pos))
        }
        let n = self.values.len();
        if let Some(frame) = self.frames.last_mut() {
            frame.dot = Some((pos, n));
        }
        Ok(())
    }

    fn prefix<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        op: Unop,
        pos: Pos,
    ) -> Result<(), ScanAbort> {
        let max = self.settings.max_items;
        if self.prefixes.len() >= max {
            return self.fail(
                builder, ReadError::StackCapacityExceeded(StackKind::Prefix, max).at(pos))
        }
        self.prefixes.push((op, pos));
        Ok(())
    }

    fn atom<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
        token: Token,
        text: &str,
        span: Span,
    ) -> Result<(), ScanAbort> {
        let mark = self.top().wrap_end;
        if !self.check_room(builder, span.pos)? {
            // The prefixes belonged to the dropped atom.
            self.prefixes.truncate(mark);
            return Ok(())
        }
        let v = match token {
            Token::Symbol => builder.symbol(text, span),
            Token::String => builder.string(text, span),
            Token::Number(radix) => builder.number(text, span, radix),
            _ => return Ok(())
        };
        let v = self.wrap(builder, mark, v);
        self.values.push(v);
        Ok(())
    }

    fn finish<B: Builder<Value = V>>(
        &mut self,
        builder: &mut B,
    ) -> Result<usize, ScanAbort> {
        let open = self.top().open;
        if let Some((kind, opened_pos)) = open {
            // Only the innermost open list is reported; its elements
            // and those of the lists around it stay on the value
            // stack above the returned count.
            self.fail(builder, ReadError::UnterminatedList(kind, opened_pos).at(self.pos))?;
        } else {
            self.drop_dangling(builder, 0)?;
        }
        Ok(self.completed())
    }

    /// Scan all of `input`, building values with `builder`. Returns
    /// the number of top-level values now on the value stack.
    pub fn scan<B: Builder<Value = V>>(
        &mut self,
        input: &str,
        builder: &mut B,
    ) -> Result<usize, ScanAbort> {
        log::debug!("scanning {} bytes from {}", input.len(), self.container.source_name());
        let mut ts = Tokenizer::new(input);
        while let Some(r) = ts.next() {
            self.cursor = ts.offset();
            match r {
                Err(e) => {
                    self.pos = e.pos;
                    self.fail(builder, e.into())?;
                }
                Ok(TokenWithPos(token, span)) => {
                    self.pos = span.pos;
                    match token {
                        Token::Open(kind) => self.open(builder, kind, span.pos)?,
                        Token::Close(kind) => self.close(builder, kind, span.pos)?,
                        Token::Unary(op) => self.prefix(builder, op, span.pos)?,
                        Token::Dot => self.dot(builder, span.pos)?,
                        Token::Symbol | Token::String | Token::Number(_) =>
                            self.atom(builder, token, ts.text(span), span)?,
                    }
                }
            }
        }
        self.cursor = ts.offset();
        self.pos = ts.pos();
        let n = self.finish(builder)?;
        log::debug!("scanned {} top-level values", n);
        Ok(n)
    }
}


/// Builds [Value](crate::value::Value) trees.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl Builder for TreeBuilder {
    type Value = Value;

    fn symbol(&mut self, text: &str, _span: Span) -> Value {
        Value::Atom(Atom::Symbol(KString::from_ref(text)))
    }
    fn string(&mut self, text: &str, _span: Span) -> Value {
        Value::Atom(Atom::String(KString::from_ref(text)))
    }
    fn number(&mut self, text: &str, _span: Span, radix: u32) -> Value {
        match parse_integer(text, radix) {
            Some(n) => Value::Atom(Atom::Number(R5RSNumber::Integer(n))),
            // Only reachable with a radix the tokenizer did not give.
            None => Value::Atom(Atom::Symbol(KString::from_ref(text)))
        }
    }
    fn unary(&mut self, op: Unop, v: Value) -> Value {
        Value::Unary(op, Box::new(v))
    }
    fn list(&mut self, kind: Parenkind, items: Vec<Value>) -> Value {
        Value::List(kind, items)
    }
    fn cons(&mut self, kind: Parenkind, items: Vec<Value>, tail: Value) -> Value {
        Value::Cons(kind, items, Box::new(tail))
    }
}

/// Read all values from `input`, stopping at the first error.
pub fn read_all(input: &str) -> Result<Vec<Value>, ScanAbort> {
    let mut ps = ParseState::named("string", STRICT_SETTINGS);
    ps.scan(input, &mut TreeBuilder)?;
    Ok(ps.into_values())
}

pub fn write_all<'t>(
    out: impl Write,
    vals: impl IntoIterator<Item = &'t Value>
) -> Result<(), std::io::Error> {
    let mut out = out; // for `File`
    let mut seen_item = false;
    for v in vals.into_iter() {
        write!(out, "{}{}\n", if seen_item {"\n"} else {""}, v)?;
        seen_item = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DEFAULT_SETTINGS, MAX_DEPTH};
    use crate::value::{symbol, list};
    use test_log::test;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Symbol(String),
        String(String),
        Number(String, u32),
        Unary(char, usize),
        List(char, Vec<usize>),
        Cons(char, Vec<usize>, usize),
    }

    /// Records every construction; a handle is the index of the event
    /// that made it.
    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<Event>,
        errors: Vec<(String, Pos, ReadError)>,
        answer: i32,
    }

    impl Recorder {
        fn push(&mut self, e: Event) -> usize {
            self.events.push(e);
            self.events.len() - 1
        }
    }

    impl Builder for Recorder {
        type Value = usize;
        fn symbol(&mut self, text: &str, _span: Span) -> usize {
            self.push(Event::Symbol(text.into()))
        }
        fn string(&mut self, text: &str, _span: Span) -> usize {
            self.push(Event::String(text.into()))
        }
        fn number(&mut self, text: &str, _span: Span, radix: u32) -> usize {
            self.push(Event::Number(text.into(), radix))
        }
        fn unary(&mut self, op: Unop, v: usize) -> usize {
            self.push(Event::Unary(op.to_char(), v))
        }
        fn list(&mut self, kind: Parenkind, items: Vec<usize>) -> usize {
            self.push(Event::List(kind.opening(), items))
        }
        fn cons(&mut self, kind: Parenkind, items: Vec<usize>, tail: usize) -> usize {
            self.push(Event::Cons(kind.opening(), items, tail))
        }
        fn error(&mut self, source: &str, pos: Pos, err: &ReadError) -> i32 {
            self.errors.push((source.into(), pos, err.clone()));
            self.answer
        }
    }

    fn sym(s: &str) -> Event {
        Event::Symbol(s.into())
    }

    fn record(s: &str) -> (usize, Vec<Event>) {
        let mut ps = ParseState::named("test", STRICT_SETTINGS);
        let mut r = Recorder::default();
        let n = ps.scan(s, &mut r).unwrap();
        assert!(ps.is_balanced());
        assert_eq!(ps.values().len(), n);
        (n, r.events)
    }

    fn strict_err(s: &str) -> (ReadErrorWithPos, Vec<Value>) {
        let mut ps = ParseState::named("test", STRICT_SETTINGS);
        let e = ps.scan(s, &mut TreeBuilder).unwrap_err();
        assert_eq!(e.code, -1);
        (e.error.err_with_pos, ps.into_values())
    }

    fn scan_with(s: &str, on_error: ErrorPolicy) -> (usize, Vec<Value>) {
        let mut ps = ParseState::named("test", DEFAULT_SETTINGS.with_policy(on_error));
        let n = ps.scan(s, &mut TreeBuilder).unwrap();
        (n, ps.into_values())
    }

    #[test]
    fn list_elements_in_source_order() {
        assert_eq!(record("(a b c)"), (1, vec![
            sym("a"), sym("b"), sym("c"),
            Event::List('(', vec![0, 1, 2]),
        ]));
    }

    #[test]
    fn dotted_pairs() {
        assert_eq!(record("(a . b)").1, vec![
            sym("a"), sym("b"), Event::Cons('(', vec![0], 1),
        ]);
        assert_eq!(record("[a b . c]").1, vec![
            sym("a"), sym("b"), sym("c"), Event::Cons('[', vec![0, 1], 2),
        ]);
        assert_eq!(record("(a . (b))").1, vec![
            sym("a"), sym("b"), Event::List('(', vec![1]),
            Event::Cons('(', vec![0], 2),
        ]);
    }

    #[test]
    fn quote_wraps_built_list() {
        assert_eq!(record("'(a b)").1, vec![
            sym("a"), sym("b"),
            Event::List('(', vec![0, 1]),
            Event::Unary('\'', 2),
        ]);
    }

    #[test]
    fn prefixes_nest_innermost_first() {
        assert_eq!(record("`,a").1, vec![
            sym("a"), Event::Unary(',', 0), Event::Unary('`', 1),
        ]);
        assert_eq!(record("(x ,@(y) #{z})").1, vec![
            sym("x"),
            sym("y"), Event::List('(', vec![1]), Event::Unary('@', 2),
            sym("z"), Event::List('{', vec![4]), Event::Unary('#', 5),
            Event::List('(', vec![0, 3, 6]),
        ]);
        assert_eq!(record("'('a)").1, vec![
            sym("a"), Event::Unary('\'', 0),
            Event::List('(', vec![1]), Event::Unary('\'', 2),
        ]);
    }

    #[test]
    fn atoms_and_counts() {
        let (n, events) = record("foo \"bar baz\" -0x1f 12 ; done\n()");
        assert_eq!(n, 5);
        assert_eq!(events, vec![
            sym("foo"),
            Event::String("bar baz".into()),
            Event::Number("-0x1f".into(), 16),
            Event::Number("12".into(), 10),
            Event::List('(', vec![]),
        ]);
        assert_eq!(record("").0, 0);
        assert_eq!(record(" ; nothing").0, 0);
    }

    #[test]
    fn frames_track_nesting() {
        let mut ps: ParseState<Value> = ParseState::named("test", DEFAULT_SETTINGS);
        assert_eq!(ps.scan("'(a [b", &mut TreeBuilder).unwrap(), 0);
        let frames = ps.frames();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_sentinel());
        assert_eq!(frames[0].depth, -1);
        assert_eq!((frames[1].depth, frames[1].base, frames[1].pending_unary()),
                   (0, 0, true));
        assert_eq!((frames[2].depth, frames[2].base, frames[2].pending_unary()),
                   (1, 1, false));
        assert_eq!(ps.values().len(), 2);
        ps.reset();
        assert!(ps.is_balanced());
        assert!(ps.values().is_empty());
    }

    #[test]
    fn unterminated_list_aborts_with_partial_results() {
        let (e, vals) = strict_err("x (a");
        assert_eq!(e.err, ReadError::UnterminatedList(Parenkind::Round, Pos { line: 0, col: 2 }));
        assert_eq!(vals, vec![symbol("x"), symbol("a")]);
    }

    #[test]
    fn unterminated_list_reported_once() {
        let mut ps = ParseState::named("test", DEFAULT_SETTINGS.with_policy(ErrorPolicy::Delegate));
        let mut r = Recorder::default();
        assert_eq!(ps.scan("b ((a", &mut r).unwrap(), 1);
        assert_eq!(r.errors, vec![(
            "(test)".to_string(),
            Pos { line: 0, col: 5 },
            ReadError::UnterminatedList(Parenkind::Round, Pos { line: 0, col: 3 }),
        )]);
        assert_eq!(ps.values().len(), 2);
    }

    #[test]
    fn delegate_code_is_returned() {
        let mut ps = ParseState::named("test", DEFAULT_SETTINGS.with_policy(ErrorPolicy::Delegate));
        let mut r = Recorder { answer: -7, ..Recorder::default() };
        let e = ps.scan("(a]", &mut r).unwrap_err();
        assert_eq!(e.code, -7);
        assert_eq!(e.err(), &ReadError::DelimiterMismatch(
            Parenkind::Round, Pos { line: 0, col: 0 }, Parenkind::Square));
        assert_eq!(e.to_string(), "'(' @1.0 expects ')', got ']' from (test)@1.2");
    }

    #[test]
    fn control_stack_capacity() {
        let settings = Settings { max_items: 16, max_depth: 3, on_error: ErrorPolicy::Abort };
        let mut ps = ParseState::named("test", settings.clone());
        assert_eq!(ps.scan("(((a)))", &mut TreeBuilder).unwrap(), 1);
        let mut ps = ParseState::named("test", settings);
        let e = ps.scan("((((a))))", &mut TreeBuilder).unwrap_err();
        assert_eq!(e.error.err_with_pos,
                   ReadError::StackCapacityExceeded(StackKind::Control, 3)
                   .at(Pos { line: 0, col: 3 }));
    }

    #[test]
    fn deep_nesting_fails_without_recursion() {
        let input = "(".repeat(1_000_000);
        let mut ps = ParseState::named("test", STRICT_SETTINGS);
        let e = ps.scan(&input, &mut TreeBuilder).unwrap_err();
        assert_eq!(e.err(), &ReadError::StackCapacityExceeded(StackKind::Control, MAX_DEPTH));
        assert_eq!(ps.frames().len(), MAX_DEPTH + 1);
    }

    #[test]
    fn value_stack_capacity() {
        let settings = Settings { max_items: 2, max_depth: 8, on_error: ErrorPolicy::Abort };
        let mut ps = ParseState::named("test", settings.clone());
        let e = ps.scan("a b c", &mut TreeBuilder).unwrap_err();
        assert_eq!(e.err(), &ReadError::StackCapacityExceeded(StackKind::Value, 2));
        assert_eq!(ps.values(), &[symbol("a"), symbol("b")]);

        let mut ps = ParseState::named("test", settings.with_policy(ErrorPolicy::Ignore));
        assert_eq!(ps.scan("a b 'c d", &mut TreeBuilder).unwrap(), 2);
        assert!(ps.is_balanced());
    }

    #[test]
    fn dropped_list_takes_its_prefixes() {
        let settings = Settings { max_items: 64, max_depth: 1, on_error: ErrorPolicy::Ignore };
        let mut ps = ParseState::named("test", settings);
        assert_eq!(ps.scan("('(b) c)", &mut TreeBuilder).unwrap(), 2);
        assert_eq!(ps.values(), &[list(vec![symbol("b")]), symbol("c")]);
        assert!(ps.is_balanced());
    }

    #[test]
    fn empty_list_without_room_is_dropped() {
        let settings = Settings { max_items: 1, max_depth: 8, on_error: ErrorPolicy::Ignore };
        let mut ps = ParseState::named("test", settings.clone());
        assert_eq!(ps.scan("a '()", &mut TreeBuilder).unwrap(), 1);
        assert_eq!(ps.values(), &[symbol("a")]);
        assert!(ps.is_balanced());

        let mut ps = ParseState::named("test", settings.with_policy(ErrorPolicy::Abort));
        let e = ps.scan("a ()", &mut TreeBuilder).unwrap_err();
        assert_eq!(e.error.err_with_pos,
                   ReadError::StackCapacityExceeded(StackKind::Value, 1)
                   .at(Pos { line: 0, col: 3 }));
    }

    #[test]
    fn prefix_stack_capacity() {
        let settings = Settings { max_items: 2, max_depth: 8, on_error: ErrorPolicy::Abort };
        let mut ps = ParseState::named("test", settings.clone());
        let e = ps.scan("'''a", &mut TreeBuilder).unwrap_err();
        assert_eq!(e.error.err_with_pos,
                   ReadError::StackCapacityExceeded(StackKind::Prefix, 2)
                   .at(Pos { line: 0, col: 2 }));

        let mut ps = ParseState::named("test", settings.with_policy(ErrorPolicy::Ignore));
        assert_eq!(ps.scan("'''a", &mut TreeBuilder).unwrap(), 1);
        assert_eq!(ps.values()[0].to_string(), "''a");
    }

    #[test]
    fn number_text_keeps_prefix() {
        let (_, events) = record("-0x1f");
        assert_eq!(events, vec![Event::Number("-0x1f".into(), 16)]);
        assert_eq!(crate::number::digits("-0x1f"), "1f");
    }

    #[test]
    fn closing_errors() {
        let (e, _) = strict_err("(a]");
        assert_eq!(e.err, ReadError::DelimiterMismatch(
            Parenkind::Round, Pos { line: 0, col: 0 }, Parenkind::Square));
        let (e, vals) = strict_err("a )");
        assert_eq!(e, ReadError::UnbalancedClose(Parenkind::Round).at(Pos { line: 0, col: 2 }));
        assert_eq!(vals, vec![symbol("a")]);
    }

    #[test]
    fn dangling_prefixes() {
        let (e, _) = strict_err("a '");
        assert_eq!(e, ReadError::DanglingPrefix(Unop::Quote).at(Pos { line: 0, col: 2 }));
        let (e, _) = strict_err("(a ,@)");
        assert_eq!(e, ReadError::DanglingPrefix(Unop::UnquoteSplicing)
                   .at(Pos { line: 0, col: 3 }));
        let (e, _) = strict_err("(a ' . b)");
        assert_eq!(e.err, ReadError::DanglingPrefix(Unop::Quote));
    }

    #[test]
    fn malformed_dotted_pairs() {
        let dot = |s| strict_err(s).0;
        assert_eq!(dot(". a"), ReadError::MalformedDottedPair(DotError::OutsideList)
                   .at(Pos { line: 0, col: 0 }));
        assert_eq!(dot("(. a)"), ReadError::MalformedDottedPair(DotError::NoPrecedingItem)
                   .at(Pos { line: 0, col: 1 }));
        assert_eq!(dot("(a .)"), ReadError::MalformedDottedPair(DotError::MissingItemAfterDot)
                   .at(Pos { line: 0, col: 3 }));
        assert_eq!(dot("(a . b c)"), ReadError::MalformedDottedPair(
            DotError::ExpectingOneItemAfterDot(2)).at(Pos { line: 0, col: 3 }));
        assert_eq!(dot("(a . b . c)"), ReadError::MalformedDottedPair(
            DotError::AlreadyAppeared(Pos { line: 0, col: 3 })).at(Pos { line: 0, col: 7 }));
    }

    #[test]
    fn ignoring_skips_the_offending_token() {
        assert_eq!(scan_with("(a]) b", ErrorPolicy::Ignore),
                   (2, vec![list(vec![symbol("a")]), symbol("b")]));
        assert_eq!(scan_with("(a . b c)", ErrorPolicy::Ignore),
                   (1, vec![list(vec![symbol("a"), symbol("b"), symbol("c")])]));
        assert_eq!(scan_with("a \x01 b", ErrorPolicy::Ignore),
                   (2, vec![symbol("a"), symbol("b")]));
        assert_eq!(scan_with("(a ') '", ErrorPolicy::Ignore),
                   (1, vec![list(vec![symbol("a")])]));
    }

    #[test]
    fn warnings_continue() {
        assert_eq!(scan_with(") a \"b", ErrorPolicy::Warn),
                   (1, vec![symbol("a")]));
    }

    #[test]
    fn unknown_character_aborts() {
        let (e, _) = strict_err("a\x02");
        assert_eq!(e.err, ReadError::PE(ParseError::UnknownCharacter('\x02')));
    }

    #[test]
    fn read_and_write() {
        let vals = read_all("(define (f x) '(x . ,x))\n[1 \"two\" 0x3]").unwrap();
        let mut out = Vec::<u8>::new();
        write_all(&mut out, &vals).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(),
                   "(define (f x) '(x . ,x))\n\n[1 \"two\" 3]\n");
    }
}
