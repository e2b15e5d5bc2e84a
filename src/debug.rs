// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Utilities for debugging: spell out the structure of a value so
//! that what the scanner built can be seen (and compared) without
//! relying on the printer's syntax.

use kstring::KString;

use crate::value::{Value, Atom, Parenkind, symbol, string};

fn tagged(tag: &str, pk: Parenkind, vals: impl Iterator<Item = Value>) -> Value {
    let mut vals2 : Vec<Value> = Vec::new();
    vals2.push(symbol(tag));
    vals2.extend(vals);
    Value::List(pk, vals2)
}

fn list2(tag: &str, a: Value) -> Value {
    Value::List(Parenkind::Round, vec![symbol(tag), a])
}

impl Value {
    /// `a` becomes `(symbol "a")`, `'(1 . x)` becomes
    /// `(unary "'" (improper-list (number 1) (symbol "x")))`, and so
    /// on. The delimiter kind of lists is kept.
    pub fn dump(&self) -> Value {
        match self {
            Value::Atom(a) => match a {
                Atom::String(s) => list2("string", string(s)),
                Atom::Symbol(s) => list2("symbol", string(s)),
                Atom::Number(_) => list2("number", self.clone()),
            }
            Value::Unary(op, v) => tagged(
                "unary",
                Parenkind::Round,
                [Value::Atom(Atom::String(KString::from_static(op.prefix()))),
                 v.dump()].into_iter()),
            Value::List(pk, vals) => tagged("list", *pk, vals.iter().map(|v| v.dump())),
            Value::Cons(pk, vals, tail) => tagged(
                "improper-list", *pk,
                vals.iter().map(|v| v.dump()).chain(std::iter::once(tail.dump()))),
        }
    }
}
