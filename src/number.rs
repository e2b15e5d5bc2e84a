// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integer atoms: an optional `-`, an optional radix prefix (`0x`,
//! `0o`, `0b`, any case) and at least one digit valid in that radix.

use num::BigInt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum R5RSNumber {
    // Real and Rational are not read by this scanner.
    Integer(BigInt)
}

impl std::fmt::Display for R5RSNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            R5RSNumber::Integer(n) => f.write_fmt(format_args!("{}", n)),
        }
    }
}

// Returns (is_neg, radix, digits).
fn split_number(s: &str) -> (bool, u32, &str) {
    let (is_neg, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s)
    };
    match body.get(0..2) {
        Some("0x") | Some("0X") => (is_neg, 16, &body[2..]),
        Some("0o") | Some("0O") => (is_neg, 8, &body[2..]),
        Some("0b") | Some("0B") => (is_neg, 2, &body[2..]),
        _ => (is_neg, 10, body)
    }
}

/// The digits of the raw atom `s`, without sign and radix prefix.
/// This is the part to accumulate `n * radix + digit` over.
pub fn digits(s: &str) -> &str {
    split_number(s).2
}

/// The radix of `s` if the whole of `s` is an integer atom.
pub fn radix_of(s: &str) -> Option<u32> {
    let (_, radix, digits) = split_number(s);
    if !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)) {
        Some(radix)
    } else {
        None
    }
}

/// Accumulate the digits of the raw atom `s` as `n * radix + digit`,
/// negating at the end. `None` if `s` is not an integer atom in
/// `radix`.
pub fn parse_integer(s: &str, radix: u32) -> Option<BigInt> {
    let (is_neg, r, digits) = split_number(s);
    if r != radix || digits.is_empty() {
        return None
    }
    let mut n: BigInt = 0.into();
    for c in digits.chars() {
        n = n * radix + c.to_digit(radix)?;
    }
    Some(if is_neg { -n } else { n })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radix_detection() {
        assert_eq!(radix_of("42"), Some(10));
        assert_eq!(radix_of("-7"), Some(10));
        assert_eq!(radix_of("0x1F"), Some(16));
        assert_eq!(radix_of("-0o17"), Some(8));
        assert_eq!(radix_of("0b101"), Some(2));
        assert_eq!(radix_of("0"), Some(10));
        assert_eq!(radix_of("-"), None);
        assert_eq!(radix_of("0x"), None);
        assert_eq!(radix_of("0b12"), None);
        assert_eq!(radix_of("12a"), None);
        assert_eq!(radix_of("+3"), None);
    }

    #[test]
    fn digits_without_prefix() {
        assert_eq!(digits("-0x1f"), "1f");
        assert_eq!(digits("0B101"), "101");
        assert_eq!(digits("-12"), "12");
        assert_eq!(digits("7"), "7");
    }

    #[test]
    fn accumulation() {
        assert_eq!(parse_integer("1234", 10), Some(BigInt::from(1234)));
        assert_eq!(parse_integer("-0xff", 16), Some(BigInt::from(-255)));
        assert_eq!(parse_integer("0o777", 8), Some(BigInt::from(511)));
        assert_eq!(parse_integer("-0", 10), Some(BigInt::from(0)));
        assert_eq!(parse_integer("0x10", 10), None);
        let big = parse_integer("123456789012345678901234567890", 10).unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567890");
    }
}
