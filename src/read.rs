// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The top-level reader: an optional shebang line, trivia, then
//! expressions up to the end of the buffer. Either everything is
//! consumed, or the result is a single located error.

use crate::context::{Context, FileContext, NamedContext};
use crate::decode::{decode_all, DecodeError};
use crate::grammar::{Cursor, Grammar, GrammarError};
use crate::parse::{self, Expected, ParseError, ParseErrorWithPos, Reply};
use crate::rules::skip_optional;
use crate::value::NodeWithSpan;
use crate::pos::Span;
use std::fmt::{Formatter, Display};
use std::io::{Read, Write};
use std::path::Path;
use std::fs::File;
use genawaiter::rc::Gen;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{0}")]
    PE(ParseErrorWithPos),
    #[error("{0}")]
    IO(std::io::Error),
    #[error("{0}")]
    Decode(DecodeError),
    #[error("{0}")]
    Grammar(GrammarError),
}

impl From<ParseErrorWithPos> for ReadError {
    fn from(e: ParseErrorWithPos) -> ReadError {
        ReadError::PE(e)
    }
}

impl From<DecodeError> for ReadError {
    fn from(e: DecodeError) -> ReadError {
        match e {
            DecodeError::IO(e) => ReadError::IO(e),
            e => ReadError::Decode(e),
        }
    }
}

/// A `ReadError` together with where the buffer came from.
#[derive(Error, Debug)]
pub struct ReadErrorWithLocation {
    pub err: ReadError,
    pub container: Box<dyn Context>,
}

impl Display for ReadErrorWithLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match &self.err {
            ReadError::PE(e) => {
                f.write_fmt(format_args!("{} ", e.err))?;
                self.container.describe_at(e.pos, f)
            }
            ReadError::Decode(DecodeError::InvalidUtf8 { bytes, pos, .. }) => {
                f.write_fmt(format_args!("invalid UTF-8 byte sequence {:x?} ",
                                         bytes))?;
                self.container.describe_at(*pos, f)
            }
            e => {
                self.container.describe(f)?;
                f.write_fmt(format_args!(": {}", e))
            }
        }
    }
}

/// A decoded source buffer and the forms read from it; the spans of
/// the forms refer to `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source: String,
    pub forms: Vec<NodeWithSpan>,
}

impl Document {
    /// The text a span was recognized from.
    pub fn text(&self, span: Span) -> &str {
        span.slice(&self.source).unwrap_or("")
    }
}

impl<'a> Cursor<'a> {
    fn fail(&self, expected: &Expected) -> ParseErrorWithPos {
        ParseError::from_expected(expected).at(self.source(), expected.offset)
    }
}

fn start(cur: &Cursor<'_>) -> Result<usize, ParseErrorWithPos> {
    let g = cur.grammar();
    let mut pos = 0;
    if g.settings().allow_shebang {
        pos = skip_optional(cur, g.builtins().shebang, pos)
            .map_err(|a| a.at(cur.source()))?;
    }
    skip_optional(cur, g.builtins().trivia, pos)
        .map_err(|a| a.at(cur.source()))
}

/// The next top-level form at `pos`, or `None` at the end of the
/// buffer. The expectations gathered so far are folded into the
/// error, if any.
fn next_form(
    cur: &Cursor<'_>,
    pos: usize,
    expected: &mut Expected,
) -> Result<Option<(NodeWithSpan, usize)>, ParseErrorWithPos> {
    let expression = cur.grammar().builtins().expression;
    match cur.node(expression, pos) {
        Reply::Ok { value, next, expected: e } => {
            *expected = std::mem::take(expected).merge(e);
            if next == pos {
                // nothing consumed, we would never get anywhere
                let e = std::mem::take(expected)
                    .merge(Expected::at(pos, parse::END_OF_INPUT));
                return Err(cur.fail(&e))
            }
            Ok(Some((value, next)))
        }
        Reply::Err(e) => {
            if pos == cur.source().len() {
                return Ok(None)
            }
            let e = std::mem::take(expected)
                .merge(e)
                .merge(Expected::at(pos, parse::END_OF_INPUT));
            Err(cur.fail(&e))
        }
        Reply::Abort(a) => Err(a.at(cur.source())),
    }
}

fn read_forms(
    cur: &Cursor<'_>,
    forms: &mut Vec<NodeWithSpan>,
) -> Result<(), ParseErrorWithPos> {
    let mut pos = start(cur)?;
    let mut expected = Expected::none();
    while let Some((form, next)) = next_form(cur, pos, &mut expected)? {
        forms.push(form);
        pos = next;
    }
    Ok(())
}

impl Grammar {
    /// Read all forms in `source`.
    pub fn read(&self, source: &str) -> Result<Vec<NodeWithSpan>, ParseErrorWithPos> {
        tracing::debug!(len = source.len(), "reading");
        let cur = self.cursor(source);
        let mut forms = Vec::new();
        match read_forms(&cur, &mut forms) {
            Ok(()) => {
                tracing::debug!(forms = forms.len(), "read");
                Ok(forms)
            }
            Err(e) => {
                tracing::debug!(error = %e, offset = e.offset, "read failed");
                Err(e)
            }
        }
    }

    /// Read the forms in `source` one at a time. The iterator ends
    /// after the last form, or after yielding an error.
    pub fn forms<'s>(
        &'s self,
        source: &'s str,
    ) -> impl Iterator<Item = Result<NodeWithSpan, ParseErrorWithPos>> + 's
    {
        Gen::new(|co| async move {
            let cur = self.cursor(source);
            let mut pos = match start(&cur) {
                Ok(pos) => pos,
                Err(e) => {
                    co.yield_(Err(e)).await;
                    return;
                }
            };
            let mut expected = Expected::none();
            loop {
                match next_form(&cur, pos, &mut expected) {
                    Ok(Some((form, next))) => {
                        co.yield_(Ok(form)).await;
                        pos = next;
                    }
                    Ok(None) => return,
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                }
            }
        }).into_iter()
    }

    /// Read a single `slot` rule over the whole of `source`, e.g. to
    /// check what a (replaced) atom rule accepts. Leading and
    /// trailing trivia are allowed.
    pub fn parse_slot(&self, slot: &str, source: &str)
                      -> Result<NodeWithSpan, ReadError> {
        let h = self.node_handle(slot).map_err(ReadError::Grammar)?;
        let cur = self.cursor(source);
        let trivia = self.builtins().trivia;
        let pos = skip_optional(&cur, trivia, 0).map_err(|a| a.at(source))?;
        match cur.node(h, pos) {
            Reply::Ok { value, next, expected } => {
                let end = skip_optional(&cur, trivia, next)
                    .map_err(|a| a.at(source))?;
                if end == source.len() {
                    Ok(value)
                } else {
                    Err(cur.fail(&expected.merge(
                        Expected::at(end, parse::END_OF_INPUT))).into())
                }
            }
            Reply::Err(e) => Err(cur.fail(&e).into()),
            Reply::Abort(a) => Err(a.at(source).into()),
        }
    }
}

/// Read all forms in `source` with a fresh standard grammar.
pub fn read_str(source: &str) -> Result<Vec<NodeWithSpan>, ParseErrorWithPos> {
    Grammar::new().read(source)
}

pub fn read_all(fh: impl Read) -> Result<Document, ReadError> {
    read_all_with(&Grammar::new(), fh)
}

pub fn read_all_with(grammar: &Grammar, fh: impl Read) -> Result<Document, ReadError> {
    let source = decode_all(fh)?;
    let forms = grammar.read(&source)?;
    Ok(Document { source, forms })
}

pub fn read_file(path: &Path) -> Result<Document, ReadErrorWithLocation> {
    let add_file = |err| ReadErrorWithLocation {
        err,
        container: Box::new(FileContext { path: path.to_path_buf() }),
    };
    let fh = File::open(path).map_err(|e| add_file(ReadError::IO(e)))?;
    read_all(fh).map_err(add_file)
}

/// `read_all` for a buffer that isn't a file, e.g. stdin; `name`
/// appears in error messages.
pub fn read_named(name: &str, fh: impl Read) -> Result<Document, ReadErrorWithLocation> {
    read_all(fh).map_err(|err| ReadErrorWithLocation {
        err,
        container: Box::new(NamedContext { name: name.to_string() }),
    })
}

/// Write `forms` one per line, such that reading the output gives
/// them back.
pub fn write_all<'t>(
    out: impl Write,
    forms: impl IntoIterator<Item = &'t NodeWithSpan>
) -> Result<(), std::io::Error> {
    let mut out = out; // for `File`
    for (i, form) in forms.into_iter().enumerate() {
        let text = form.to_string();
        if i == 0 && text.starts_with("#!") {
            // would be taken for a shebang line
            out.write_all(b" ")?;
        }
        writeln!(out, "{}", text)?;
    }
    Ok(())
}

pub fn write_file<'t>(path: &Path, forms: impl IntoIterator<Item = &'t NodeWithSpan>)
                      -> Result<(), std::io::Error> {
    write_all(File::create(path)?, forms)
}
