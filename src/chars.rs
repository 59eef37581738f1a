// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Which characters are structurally significant, and the fixed
//! tables for quote operators and string escapes.

pub const OPEN_PAREN: char = '(';
pub const CLOSE_PAREN: char = ')';
pub const STRING_DELIMITER: char = '"';
pub const ESCAPE: char = '\\';
pub const COMMENT_START: char = ';';

/// Decides which characters end an atom unless escaped.
pub trait CharClassifier: Send + Sync {
    /// Whether `c` is significant to the grammar and therefore needs
    /// a preceding escape character to be part of an atom.
    fn is_reserved(&self, c: char) -> bool;
}

/// The reserved set of the standard notation: `;`, `"`, `'`, `` ` ``,
/// `,`, backslash, parens and whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClassifier;

impl CharClassifier for StandardClassifier {
    fn is_reserved(&self, c: char) -> bool {
        is_reserved_char(c)
    }
}

/// Any predicate works as a classifier, handy for dialects.
impl<F> CharClassifier for F
    where F: Fn(char) -> bool + Send + Sync
{
    fn is_reserved(&self, c: char) -> bool {
        self(c)
    }
}

pub fn is_reserved_char(c: char) -> bool {
    c.is_whitespace()
        || quote_operator_char(c)
        || matches!(c,
                    OPEN_PAREN | CLOSE_PAREN | STRING_DELIMITER
                    | ESCAPE | COMMENT_START)
}

fn quote_operator_char(c: char) -> bool {
    matches!(c, '\'' | '`' | ',')
}

/// The quote operator at the start of `s`, as (operator length in
/// bytes, canonical symbol name). `,@` is tried before `,`.
pub fn quote_operator(s: &str) -> Option<(usize, &'static str)> {
    if s.starts_with(",@") {
        return Some((2, "unquote-splicing"))
    }
    match s.chars().next()? {
        '\'' => Some((1, "quote")),
        '`' => Some((1, "quasiquote")),
        ',' => Some((1, "unquote")),
        _ => None
    }
}

/// The character represented by `\c` inside a string literal.
pub fn string_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        'b' => Some('\x08'), // backspace
        'f' => Some('\x0C'), // form feed
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0B'), // vertical tab
        '0' => Some('\0'),
        _ => None
    }
}

/// Inverse of `string_escape`, for writing.
pub fn string_escape_letter(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '\x08' => Some('b'),
        '\x0C' => Some('f'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        '\x0B' => Some('v'),
        '\0' => Some('0'),
        _ => None
    }
}
