// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where the scanned buffer came from, for diagnostics only. The
//! scanner never opens anything itself; the embedding code describes
//! the buffer it hands over.

use crate::pos::Pos;
use std::{path::PathBuf, fmt::{Formatter, Debug, Display}};

pub trait Context : Debug + Send + Sync {
    /// Format location to be put *after* the error reason and a
    /// space, includes "in" or "from".
    fn format_with_pos(&self, p: Pos, f: &mut Formatter<'_>)
                       -> Result<(), std::fmt::Error>;
    /// Format location to be put *before* a colon and the error
    /// reason. Does not include the colon. This is also the source
    /// name handed to `Builder::error`.
    fn format_without_pos(&self, f: &mut Formatter<'_>)
                          -> Result<(), std::fmt::Error>;
    /// Same as `format_without_pos` but as a string.
    fn source_name(&self) -> String {
        format!("{}", &Helper(self))
    }
}

// Formatter::new is not public, go through Display instead.
struct Helper<'t, T: Context + ?Sized>(&'t T);
impl<'t, T: Context + ?Sized> Display for Helper<'t, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.format_without_pos(f)
    }
}


/// The buffer holds the contents of a file.
#[derive(Debug)]
pub struct FileContext {
    pub path: PathBuf
}

impl Context for FileContext {
    fn format_with_pos(&self, pos: Pos, f: &mut Formatter<'_>)
                       -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("in {:?}{}", &self.path, pos))
    }
    fn format_without_pos(&self, f: &mut Formatter<'_>)
                          -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{:?}", &self.path))
    }
}

/// The buffer came from somewhere without a path, like a REPL line,
/// a config blob or a string literal in a test.
#[derive(Debug)]
pub struct NamedContext {
    name: String
}

impl NamedContext {
    pub fn new(name: impl Into<String>) -> NamedContext {
        NamedContext { name: name.into() }
    }
}

impl Context for NamedContext {
    fn format_with_pos(&self, pos: Pos, f: &mut Formatter<'_>)
                       -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("from ({}){}", &self.name, pos))
    }
    fn format_without_pos(&self, f: &mut Formatter<'_>)
                       -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("({})", &self.name))
    }
}
