// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The result type shared by all grammar rules, and the errors a
//! parse can end with.
//!
//! A rule is a function from a position in the source buffer to a
//! [Reply]. Besides success or failure, every reply carries the
//! furthest position at which some alternative failed, together with
//! what would have been accepted there ([Expected]); that is what
//! ends up in the error message when the parse as a whole fails.

use crate::pos::Pos;
use std::collections::BTreeSet;
use kstring::KString;
use thiserror::Error;

// Expectation descriptions used by the built-in rules.
pub const ATOM: &str = "atom";
pub const STRING_LITERAL: &str = "string literal";
pub const STRING_CONTENT: &str = "string content";
pub const STRING_TERMINATOR: &str = "string terminator";
pub const OPENING_PAREN: &str = "opening paren";
pub const CLOSING_PAREN: &str = "closing paren";
pub const QUOTE: &str = "quote";
pub const END_OF_INPUT: &str = "end of input";

/// What would have been accepted at the furthest failure position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expected {
    pub offset: usize,
    pub items: BTreeSet<KString>,
}

impl Expected {
    /// No failure recorded.
    pub fn none() -> Expected {
        Expected::default()
    }

    pub fn at(offset: usize, what: &'static str) -> Expected {
        Expected::describe(offset, KString::from_static(what))
    }

    pub fn describe(offset: usize, what: KString) -> Expected {
        let mut items = BTreeSet::new();
        items.insert(what);
        Expected { offset, items }
    }

    pub fn is_none(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, what: &str) -> bool {
        self.items.iter().any(|i| i.as_str() == what)
    }

    /// Keep whichever of the two got further; on a tie, the union.
    pub fn merge(self, other: Expected) -> Expected {
        if other.is_none() {
            return self
        }
        if self.is_none() {
            return other
        }
        if self.offset > other.offset {
            self
        } else if other.offset > self.offset {
            other
        } else {
            let mut items = self.items;
            items.extend(other.items);
            Expected { offset: self.offset, items }
        }
    }
}

/// A failure that must not be backtracked over, e.g. an invalid
/// escape inside a string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Abort {
    pub err: ParseError,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// `next` is the offset right after the consumed text.
    Ok { value: T, next: usize, expected: Expected },
    Err(Expected),
    Abort(Abort),
}

impl<T> Reply<T> {
    pub fn ok(value: T, next: usize) -> Reply<T> {
        Reply::Ok { value, next, expected: Expected::none() }
    }

    pub fn fail(offset: usize, what: &'static str) -> Reply<T> {
        Reply::Err(Expected::at(offset, what))
    }

    pub fn abort(err: ParseError, offset: usize) -> Reply<T> {
        Reply::Abort(Abort { err, offset })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Ok { value, next, expected } =>
                Reply::Ok { value: f(value), next, expected },
            Reply::Err(e) => Reply::Err(e),
            Reply::Abort(a) => Reply::Abort(a),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {}", .expected.join(" or "))]
    Unexpected { expected: Vec<String> },
    #[error("unexpected input")]
    UnexpectedInput,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid escaped character '{0}' in string literal")]
    InvalidEscapedChar(char),
    #[error("nesting too deep")]
    NestingTooDeep,
}

impl ParseError {
    /// The error for a rule failure; an unterminated string wins over
    /// the list of expectations since it is the more useful diagnosis.
    pub fn from_expected(expected: &Expected) -> ParseError {
        if expected.contains(STRING_TERMINATOR) {
            ParseError::UnterminatedString
        } else if expected.is_none() {
            ParseError::UnexpectedInput
        } else {
            ParseError::Unexpected {
                expected: expected.items.iter().map(|i| i.to_string()).collect()
            }
        }
    }

    pub fn at(self, source: &str, offset: usize) -> ParseErrorWithPos {
        ParseErrorWithPos {
            err: self,
            pos: Pos::of_offset(source, offset),
            offset,
        }
    }
}

/// A syntax error located in the source buffer.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{err} {pos}")]
pub struct ParseErrorWithPos {
    pub err: ParseError,
    pub pos: Pos,
    pub offset: usize,
}

impl ParseErrorWithPos {
    pub fn message(&self) -> String {
        self.err.to_string()
    }

    pub fn line(&self) -> u32 {
        self.pos.line
    }

    /// 1-based, in characters: on a line with non-ASCII text this is
    /// less than the byte distance from the line start that
    /// `offset()` implies.
    pub fn column(&self) -> u32 {
        self.pos.col
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Abort {
    pub fn at(self, source: &str) -> ParseErrorWithPos {
        self.err.at(source, self.offset)
    }
}
