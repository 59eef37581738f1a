// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The built-in rules. Each constructor returns a [Rule] to put into
//! a [Grammar](crate::grammar::Grammar) slot; rules that depend on
//! other rules take the handles of the slots to call.
//!
//! Node rules only consume their own text: skipping trivia after a
//! token (making it a "lexeme") is done by whoever calls the rule,
//! so that spans cover exactly the recognized text.

use crate::chars::{CharClassifier, quote_operator, string_escape,
                   ESCAPE, COMMENT_START, OPEN_PAREN, CLOSE_PAREN,
                   STRING_DELIMITER};
use crate::grammar::{Cursor, NodeHandle, Rule, SkipHandle};
use crate::parse::{self, Expected, ParseError, Reply};
use crate::pos::Span;
use crate::value::{list2, Node, NodeWithSpan};
use kstring::KString;

// Placeholders for slots that are declared but not filled in yet.
pub(crate) fn undefined_node(_: &Cursor<'_>, _: usize) -> Reply<NodeWithSpan> {
    Reply::Err(Expected::none())
}

pub(crate) fn undefined_skip(_: &Cursor<'_>, _: usize) -> Reply<()> {
    Reply::Err(Expected::none())
}

/// Run a skip rule, giving the offset after it; a failure means
/// nothing was skipped. Only aborts are passed on.
pub fn skip_optional(cur: &Cursor<'_>, h: SkipHandle, at: usize)
                     -> Result<usize, parse::Abort> {
    match cur.skip(h, at) {
        Reply::Ok { next, .. } => Ok(next),
        Reply::Err(_) => Ok(at),
        Reply::Abort(a) => Err(a),
    }
}

/// One or more whitespace characters.
pub fn whitespace() -> Rule {
    Rule::skip(|cur, at| {
        let rest = cur.rest(at);
        let len = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        if len == 0 {
            Reply::fail(at, "whitespace")
        } else {
            Reply::ok((), at + len)
        }
    })
}

/// `;` up to the end of the line. The newline, if any, belongs to
/// the comment.
pub fn comment() -> Rule {
    Rule::skip(|cur, at| {
        let rest = cur.rest(at);
        if !rest.starts_with(COMMENT_START) {
            return Reply::fail(at, "comment")
        }
        match rest.find('\n') {
            Some(i) => Reply::ok((), at + i + 1),
            None => Reply::ok((), at + rest.len()),
        }
    })
}

/// Any mix of the given skip rules, repeated until none of them
/// makes progress. Never fails, and records no expectations: trivia
/// is not something an error message should ask for.
pub fn trivia(parts: Vec<SkipHandle>) -> Rule {
    Rule::skip(move |cur, at| {
        let mut pos = at;
        loop {
            let start = pos;
            for h in &parts {
                match skip_optional(cur, *h, pos) {
                    Ok(next) => pos = next,
                    Err(a) => return Reply::Abort(a),
                }
            }
            if pos == start {
                return Reply::ok((), pos)
            }
        }
    })
}

/// `#!` up to and including the end of the line. The reader only
/// tries this at the very start of the buffer.
pub fn shebang() -> Rule {
    Rule::skip(|cur, at| {
        let rest = cur.rest(at);
        if !rest.starts_with("#!") {
            return Reply::fail(at, "shebang")
        }
        match rest.find('\n') {
            Some(i) => Reply::ok((), at + i + 1),
            None => Reply::ok((), at + rest.len()),
        }
    })
}

/// A maximal, non-empty run of characters that are either not
/// reserved by `classifier`, or reserved and preceded by a
/// backslash. The escape is dropped from the content, the character
/// kept as is.
pub fn atom_with(classifier: impl CharClassifier + 'static) -> Rule {
    Rule::node(move |cur, at| {
        let rest = cur.rest(at);
        let mut content = String::new();
        let mut cs = rest.char_indices().peekable();
        let mut end = 0;
        while let Some((i, c)) = cs.next() {
            if c == ESCAPE {
                match cs.peek() {
                    Some(&(j, e)) if classifier.is_reserved(e) => {
                        content.push(e);
                        end = j + e.len_utf8();
                        cs.next();
                    }
                    _ => break
                }
            } else if classifier.is_reserved(c) {
                break
            } else {
                content.push(c);
                end = i + c.len_utf8();
            }
        }
        if end == 0 {
            Reply::fail(at, parse::ATOM)
        } else {
            Reply::ok(Node::Atom(KString::from_string(content))
                      .at(Span::new(at, at + end)),
                      at + end)
        }
    })
}

/// A `"`-delimited string with backslash escapes resolved. A missing
/// terminator is reported as expecting a "string terminator", which
/// the reader turns into an unterminated string error; an unknown
/// escape aborts the parse.
pub fn string() -> Rule {
    Rule::node(|cur, at| {
        let rest = cur.rest(at);
        if !rest.starts_with(STRING_DELIMITER) {
            return Reply::fail(at, parse::STRING_LITERAL)
        }
        let mut content = String::new();
        let mut cs = rest.char_indices().skip(1);
        while let Some((i, c)) = cs.next() {
            if c == STRING_DELIMITER {
                let end = at + i + 1;
                return Reply::ok(Node::String(KString::from_string(content))
                                 .at(Span::new(at, end)),
                                 end)
            } else if c == ESCAPE {
                match cs.next() {
                    Some((j, e)) => match string_escape(e) {
                        Some(r) => content.push(r),
                        None => return Reply::abort(
                            ParseError::InvalidEscapedChar(e), at + j),
                    },
                    None => return unterminated(at + rest.len()),
                }
            } else {
                content.push(c);
            }
        }
        unterminated(at + rest.len())
    })
}

fn unterminated<T>(end: usize) -> Reply<T> {
    Reply::Err(Expected::at(end, parse::STRING_CONTENT)
               .merge(Expected::at(end, parse::STRING_TERMINATOR)))
}

/// `(`, trivia, any number of `expression`s, `)`.
pub fn list(expression: NodeHandle, trivia: SkipHandle) -> Rule {
    Rule::node(move |cur, at| {
        if !cur.rest(at).starts_with(OPEN_PAREN) {
            return Reply::fail(at, parse::OPENING_PAREN)
        }
        let inner = match cur.nested() {
            Some(inner) => inner,
            None => return Reply::abort(ParseError::NestingTooDeep, at),
        };
        let mut pos = match skip_optional(cur, trivia, at + 1) {
            Ok(pos) => pos,
            Err(a) => return Reply::Abort(a),
        };
        let mut items = Vec::new();
        let mut expected = Expected::none();
        loop {
            match inner.node(expression, pos) {
                Reply::Ok { value, next, expected: e } => {
                    items.push(value);
                    expected = expected.merge(e);
                    if next == pos {
                        // a replaced expression rule that consumes
                        // nothing would loop forever
                        break
                    }
                    pos = next;
                }
                Reply::Err(e) => {
                    expected = expected.merge(e);
                    break
                }
                Reply::Abort(a) => return Reply::Abort(a),
            }
        }
        if cur.rest(pos).starts_with(CLOSE_PAREN) {
            let end = pos + 1;
            Reply::Ok {
                value: Node::List(items).at(Span::new(at, end)),
                next: end,
                expected,
            }
        } else {
            Reply::Err(expected.merge(Expected::at(pos, parse::CLOSING_PAREN)))
        }
    })
}

/// A quote operator, trivia, and one `expression`, read as the list
/// `(quote expression)` (or `quasiquote`, `unquote`,
/// `unquote-splicing`). The synthesized atom spans the operator.
pub fn quote(expression: NodeHandle, trivia: SkipHandle) -> Rule {
    Rule::node(move |cur, at| {
        let (oplen, name) = match quote_operator(cur.rest(at)) {
            Some(op) => op,
            None => return Reply::fail(at, parse::QUOTE),
        };
        let inner = match cur.nested() {
            Some(inner) => inner,
            None => return Reply::abort(ParseError::NestingTooDeep, at),
        };
        let op_end = at + oplen;
        let pos = match skip_optional(cur, trivia, op_end) {
            Ok(pos) => pos,
            Err(a) => return Reply::Abort(a),
        };
        inner.node(expression, pos).map(|quoted| {
            let end = quoted.1.end;
            let op = Node::Atom(KString::from_static(name)).at(Span::new(at, op_end));
            list2(op, quoted).at(Span::new(at, end))
        })
    })
}

/// The first of `alternatives` that matches, followed by trivia.
/// When all fail, the expectations of all of them are reported.
pub fn alternation(alternatives: Vec<NodeHandle>, trivia: SkipHandle) -> Rule {
    Rule::node(move |cur, at| {
        let mut expected = Expected::none();
        for h in &alternatives {
            match cur.node(*h, at) {
                Reply::Ok { value, next, expected: e } => {
                    return match skip_optional(cur, trivia, next) {
                        Ok(next) => Reply::Ok {
                            value,
                            next,
                            expected: expected.merge(e),
                        },
                        Err(a) => Reply::Abort(a),
                    }
                }
                Reply::Err(e) => expected = expected.merge(e),
                Reply::Abort(a) => return Reply::Abort(a),
            }
        }
        Reply::Err(expected)
    })
}
