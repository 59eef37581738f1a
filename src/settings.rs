// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for reading. Everything about the notation itself lives
//! in the [Grammar](crate::grammar::Grammar) slots; these are the
//! knobs of the reader around it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Skip a `#!` line at the very start of the buffer.
    pub allow_shebang: bool,
    /// How deeply lists and quote forms may nest; `None` means no
    /// limit other than the call stack.
    pub depth_fuel: Option<u32>,
}

pub const DEFAULT_SETTINGS : Settings = Settings {
    allow_shebang: true,
    depth_fuel: Some(500),
};

pub const UNLIMITED_SETTINGS : Settings = Settings {
    allow_shebang: true,
    depth_fuel: None,
};

/// For embedded snippets, where `#!` has no business.
pub const FRAGMENT_SETTINGS : Settings = Settings {
    allow_shebang: false,
    depth_fuel: Some(500),
};

impl Default for Settings {
    fn default() -> Self {
        DEFAULT_SETTINGS
    }
}
