// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The syntactic kinds the scanner reports ([Parenkind](Parenkind),
//! [Unop](Unop)), and a plain tree representation of
//! S-expression values ([Value](Value)) as one possible thing to
//! build with them.

//! [Value](Value) is just a collaborator: the scanner itself only
//! knows the `read::Builder` trait, and embedders are expected to
//! bring their own representation.

use crate::number::R5RSNumber;
use std::fmt::{Display, Write};
use kstring::KString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parenkind {
    Round,
    Square,
    Curly
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{'
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}'
        }
    }
}

/// Unary prefix operators. Each wraps the next complete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unop {
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    Hash,
}

impl Unop {
    /// The character identifying the operator; `,@` is identified
    /// by `@`.
    pub fn to_char(self) -> char {
        match self {
            Unop::Quote => '\'',
            Unop::Quasiquote => '`',
            Unop::Unquote => ',',
            Unop::UnquoteSplicing => '@',
            Unop::Hash => '#',
        }
    }

    /// How the operator is written in source.
    pub fn prefix(self) -> &'static str {
        match self {
            Unop::Quote => "'",
            Unop::Quasiquote => "`",
            Unop::Unquote => ",",
            Unop::UnquoteSplicing => ",@",
            Unop::Hash => "#",
        }
    }
}

impl TryFrom<char> for Unop {
    type Error = ();
    fn try_from(c: char) -> Result<Unop, Self::Error> {
        match c {
            '\'' => Ok(Unop::Quote),
            '`' => Ok(Unop::Quasiquote),
            ',' => Ok(Unop::Unquote),
            '@' => Ok(Unop::UnquoteSplicing),
            '#' => Ok(Unop::Hash),
            _ => Err(())
        }
    }
}

impl std::fmt::Display for Unop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_str(self.prefix())
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// The raw text between the quotes, escapes are not processed.
    String(KString),
    Symbol(KString),
    Number(R5RSNumber),
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Atom::String(s) => {
                f.write_char('"')?;
                f.write_str(s)?;
                f.write_char('"')
            }
            Atom::Symbol(s) => f.write_str(s),
            Atom::Number(n) => n.fmt(f),
        }
    }
}

/// Tree of values. Proper lists are vectors; a list written with a
/// dot keeps its tail separately.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Atom(Atom),
    Unary(Unop, Box<Value>),
    List(Parenkind, Vec<Value>),
    Cons(Parenkind, Vec<Value>, Box<Value>),
}

fn fmt_items(f: &mut std::fmt::Formatter<'_>, vals: &[Value])
             -> Result<(), std::fmt::Error> {
    for (i, item) in vals.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        item.fmt(f)?;
    }
    Ok(())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Value::Atom(a) => a.fmt(f),
            Value::Unary(op, v) => {
                f.write_str(op.prefix())?;
                // `,@a` would read back as splicing
                if let (Unop::Unquote, Value::Atom(Atom::Symbol(s))) = (op, &**v) {
                    if s.starts_with('@') {
                        f.write_char(' ')?;
                    }
                }
                v.fmt(f)
            }
            Value::List(pk, vals) => {
                f.write_char(pk.opening())?;
                fmt_items(f, vals)?;
                f.write_char(pk.closing())
            }
            Value::Cons(pk, vals, tail) => {
                f.write_char(pk.opening())?;
                fmt_items(f, vals)?;
                f.write_str(" . ")?;
                tail.fmt(f)?;
                f.write_char(pk.closing())
            }
        }
    }
}

/// Easily create a symbol
pub fn symbol(s: &str) -> Value {
    Value::Atom(Atom::Symbol(KString::from_ref(s)))
}

/// Easily create a string
pub fn string(s: &str) -> Value {
    Value::Atom(Atom::String(KString::from_ref(s)))
}

/// Easily create a round list
pub fn list(vals: Vec<Value>) -> Value {
    Value::List(Parenkind::Round, vals)
}
