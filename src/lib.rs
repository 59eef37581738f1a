// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This is a reader for a Lisp style S-Expression notation:
//! parenthesized lists, atoms, double-quoted strings with escapes,
//! `;` line comments, an optional `#!` first line, and the quote
//! sugar `'x`, `` `x ``, `,x` and `,@x`, which is read as
//! `(quote x)`, `(quasiquote x)`, `(unquote x)` and
//! `(unquote-splicing x)`.
//!
//! * The result is a tree of only three kinds of nodes (see
//!   [value](value/index.html)), every one of them carrying the byte
//!   span of the text it was read from. Atoms are not interpreted:
//!   `42` is an atom just like `foo`.
//!
//! * A failed read gives one error with a message, line, column and
//!   offset; an unterminated string literal is reported as such.
//!
//! * The grammar is a registry of named rules (see
//!   [grammar](grammar/index.html)) that can be replaced one at a
//!   time, e.g. to change which characters make up an atom, without
//!   rebuilding the rest.
//!
//! ```
//! use sexpr_plus::read::read_str;
//!
//! let forms = read_str("(define x 'y) ; comment").unwrap();
//! assert_eq!(forms.len(), 1);
//! assert_eq!(forms[0].to_string(), "(define x (quote y))");
//! ```

pub mod chars;
pub mod context;
pub mod debug;
pub mod decode;
pub mod grammar;
pub mod parse;
pub mod pos;
pub mod read;
pub mod rules;
pub mod settings;
pub mod value;
