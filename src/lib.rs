// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This is an S-Expression scanner meant to be embedded in
//! interpreters, config loaders and the like that already have their
//! own value representation:
//!
//! * The scanner does not own or interpret values. It calls a
//!   `read::Builder` supplied by the caller for every atom, prefix
//!   form, list and dotted list, and keeps the resulting handles on
//!   its value stack.
//!
//! * Resource use is bounded: open lists live on a fixed-capacity
//!   control stack (no recursion), values on a fixed-capacity value
//!   stack, both configured via `settings::Settings`. Too deeply
//!   nested input is an error, not a stack overflow.
//!
//! * One error policy per `read::ParseState` decides for every kind
//!   of malformed input whether to skip it silently, warn (via the
//!   `log` crate), abort the scan, exit the process, or ask the
//!   builder.
//!
//! Supported syntax: `()`, `[]` and `{}` lists, dotted lists, the
//! prefixes `'`, `` ` ``, `,`, `,@` and `#`, `"strings"` (raw, escapes
//! are left to the builder), integers with optional `-` and
//! `0x`/`0o`/`0b` radix prefixes, symbols, and `;` line comments.
//!
//! `value::Value` with `read::TreeBuilder` is a ready-made tree
//! representation, used by `read::read_all`.

pub mod context;
pub mod debug;
pub mod number;
pub mod parse;
pub mod pos;
pub mod read;
pub mod settings;
pub mod value;
