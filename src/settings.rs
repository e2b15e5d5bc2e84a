// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for scanning: the fixed capacities of the stacks and
//! what to do about malformed input. These are chosen when a
//! `ParseState` is created and hold for all of its scans.

/// Default limit on the number of values held at once, i.e. the
/// elements of all currently open lists plus the completed top-level
/// values.
pub const MAX_ITEMS: usize = 1024;

/// Default limit on the number of simultaneously open lists.
pub const MAX_DEPTH: usize = 256;

/// What happens when the scanner hits malformed input. The numbering
/// (`TryFrom<u8>`) is the one used by the classic C `SP_ERROR` knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Skip the offending token and go on, say nothing.
    Ignore,
    /// Log a warning, skip the offending token and go on.
    Warn,
    /// Log an error and end the scan with code -1.
    Abort,
    /// Print an error and exit the process with status 1.
    Exit,
    /// Ask `Builder::error`; 0 continues like `Ignore`, anything else
    /// ends the scan with that code.
    Delegate,
}

impl TryFrom<&str> for ErrorPolicy {
    type Error = ();
    fn try_from(s: &str) -> Result<ErrorPolicy, Self::Error> {
        match s {
            "ignore" => Ok(ErrorPolicy::Ignore),
            "warn" => Ok(ErrorPolicy::Warn),
            "abort" => Ok(ErrorPolicy::Abort),
            "exit" => Ok(ErrorPolicy::Exit),
            "delegate" => Ok(ErrorPolicy::Delegate),
            _ => Err(())
        }
    }
}

impl TryFrom<u8> for ErrorPolicy {
    type Error = ();
    fn try_from(n: u8) -> Result<ErrorPolicy, Self::Error> {
        match n {
            0 => Ok(ErrorPolicy::Ignore),
            1 => Ok(ErrorPolicy::Warn),
            2 => Ok(ErrorPolicy::Abort),
            3 => Ok(ErrorPolicy::Exit),
            4 => Ok(ErrorPolicy::Delegate),
            _ => Err(())
        }
    }
}

pub fn errorpolicy_to_str(p: ErrorPolicy) -> &'static str {
    match p {
        ErrorPolicy::Ignore => "ignore",
        ErrorPolicy::Warn => "warn",
        ErrorPolicy::Abort => "abort",
        ErrorPolicy::Exit => "exit",
        ErrorPolicy::Delegate => "delegate",
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub max_items: usize,
    pub max_depth: usize,
    pub on_error: ErrorPolicy,
}

impl Settings {
    pub fn with_policy(self, on_error: ErrorPolicy) -> Settings {
        Settings { on_error, ..self }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        DEFAULT_SETTINGS
    }
}

pub const DEFAULT_SETTINGS : Settings = Settings {
    max_items: MAX_ITEMS,
    max_depth: MAX_DEPTH,
    on_error: ErrorPolicy::Warn,
};

pub const STRICT_SETTINGS : Settings = Settings {
    max_items: MAX_ITEMS,
    max_depth: MAX_DEPTH,
    on_error: ErrorPolicy::Abort,
};
