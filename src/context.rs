// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where a source buffer came from, for error messages.

use crate::pos::Pos;
use std::{path::PathBuf, fmt::{Formatter, Debug}};

pub trait Context : Debug + Send + Sync {
    /// Name the origin, to be put before a colon and the error
    /// reason.
    fn describe(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error>;

    /// Name the origin together with a position, to be put after
    /// the error reason; includes "in" or "from".
    fn describe_at(&self, pos: Pos, f: &mut Formatter<'_>)
                   -> Result<(), std::fmt::Error>;
}

#[derive(Debug)]
pub struct FileContext {
    pub path: PathBuf
}

impl Context for FileContext {
    fn describe(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{:?}", &self.path))
    }

    fn describe_at(&self, pos: Pos, f: &mut Formatter<'_>)
                   -> Result<(), std::fmt::Error> {
        // Emacs style `path:line:col` is the most widely understood
        f.write_fmt(format_args!("in {}:{}:{}",
                                 self.path.display(), pos.line, pos.col))
    }
}

/// A buffer that doesn't come from a file, e.g. `(stdin)` or a
/// string in a test.
#[derive(Debug)]
pub struct NamedContext {
    pub name: String
}

impl Context for NamedContext {
    fn describe(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("({})", &self.name))
    }

    fn describe_at(&self, pos: Pos, f: &mut Formatter<'_>)
                   -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("from ({}) {}", &self.name, pos))
    }
}
