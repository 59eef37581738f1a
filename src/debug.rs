// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Utilities for debugging the reader: show a tree as an outline,
//! one node per line, with its kind, span and source text.

use crate::value::{Node, NodeWithSpan};
use std::fmt::Write;

fn dump_into(out: &mut String, node: &NodeWithSpan, source: &str, depth: usize) {
    let NodeWithSpan(val, span) = node;
    for _ in 0..depth {
        out.push_str("  ");
    }
    let text = span.slice(source).unwrap_or("?");
    // (writing to a String can't fail)
    let _ = match val {
        Node::Atom(s) => writeln!(out, "atom {} {:?} {:?}", span, s.as_str(), text),
        Node::String(s) => writeln!(out, "string {} {:?} {:?}", span, s.as_str(), text),
        Node::List(v) => writeln!(out, "list {} ({} items)", span, v.len()),
    };
    if let Node::List(v) = val {
        for item in v {
            dump_into(out, item, source, depth + 1);
        }
    }
}

impl NodeWithSpan {
    /// `source` must be the buffer this node was read from.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        dump_into(&mut out, self, source, 0);
        out
    }
}

pub fn dump_all<'t>(forms: impl IntoIterator<Item = &'t NodeWithSpan>,
                    source: &str) -> String {
    let mut out = String::new();
    for form in forms {
        dump_into(&mut out, form, source, 0);
    }
    out
}
