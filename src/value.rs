// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The syntax tree produced by the reader.

//! There are only three kinds of nodes; quote sugar is represented
//! as an ordinary two element [List](Node::List). Every node in a
//! tree carries the [Span] it was recognized from, see
//! [NodeWithSpan].

use crate::chars::{is_reserved_char, string_escape_letter};
use crate::pos::Span;
use std::fmt::Write;
use kstring::KString;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Never empty. Escaped characters are included without their
    /// escape.
    Atom(KString),
    /// Escapes are resolved.
    String(KString),
    List(Vec<NodeWithSpan>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeWithSpan(pub Node, pub Span);

impl Node {
    pub fn at(self, span: Span) -> NodeWithSpan {
        NodeWithSpan(self, span)
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Node::Atom(s) => Some(s.as_str()),
            _ => None
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s.as_str()),
            _ => None
        }
    }

    pub fn as_list(&self) -> Option<&[NodeWithSpan]> {
        match self {
            Node::List(v) => Some(v.as_slice()),
            _ => None
        }
    }

    /// Structural equality ignoring spans.
    pub fn content_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Atom(a), Node::Atom(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::List(a), Node::List(b)) =>
                a.len() == b.len()
                && a.iter().zip(b).all(|(x, y)| x.0.content_eq(&y.0)),
            _ => false
        }
    }
}

impl NodeWithSpan {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn span(&self) -> Span {
        self.1
    }

    pub fn content_eq(&self, other: &NodeWithSpan) -> bool {
        self.0.content_eq(&other.0)
    }
}

/// Easily create an atom
pub fn atom(s: &str) -> Node {
    Node::Atom(KString::from_ref(s))
}

/// Easily create a string literal node
pub fn string(s: &str) -> Node {
    Node::String(KString::from_ref(s))
}

/// Easily create a list with two entries
pub fn list2(a: NodeWithSpan, b: NodeWithSpan) -> Node {
    Node::List(vec![a, b])
}

fn fmt_atom(f: &mut std::fmt::Formatter<'_>, s: &str)
            -> Result<(), std::fmt::Error> {
    for c in s.chars() {
        if is_reserved_char(c) {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

fn fmt_string(f: &mut std::fmt::Formatter<'_>, s: &str)
              -> Result<(), std::fmt::Error> {
    f.write_char('"')?;
    for c in s.chars() {
        if let Some(letter) = string_escape_letter(c) {
            f.write_char('\\')?;
            f.write_char(letter)?;
        } else {
            f.write_char(c)?;
        }
    }
    f.write_char('"')
}

/// Writes text that reads back to the same content. The exception is
/// an atom starting with `#!` at the very start of a buffer, which
/// the reader takes for a shebang line; `write_all` takes care of
/// that case.
impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Node::Atom(s) => fmt_atom(f, s),
            Node::String(s) => fmt_string(f, s),
            Node::List(v) => {
                f.write_char('(')?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    item.fmt(f)?;
                }
                f.write_char(')')
            }
        }
    }
}

impl std::fmt::Display for NodeWithSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}
