// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The grammar as a registry of named, replaceable rules.
//!
//! Rules never hold each other directly. They hold handles, which are
//! looked up in the [Grammar] every time a rule runs; thus
//! [Grammar::replace] changes the behavior of every rule that refers
//! to the replaced slot, while [Grammar::clone_rule] takes a snapshot
//! that later replacements don't affect. The mutual recursion of
//! list, quote and expression is set up by declaring the slots first
//! and filling them in afterwards.

use crate::chars::StandardClassifier;
use crate::parse::{Expected, Reply};
use crate::rules;
use crate::settings::{Settings, DEFAULT_SETTINGS};
use crate::value::NodeWithSpan;
use std::collections::HashMap;
use std::sync::Arc;
use kstring::KString;
use thiserror::Error;

// Names of the built-in slots.
pub const WHITESPACE: &str = "whitespace";
pub const COMMENT: &str = "comment";
pub const TRIVIA: &str = "trivia";
pub const SHEBANG: &str = "shebang";
pub const ATOM: &str = "atom";
pub const STRING: &str = "string";
pub const LIST: &str = "list";
pub const QUOTE: &str = "quote";
pub const EXPRESSION: &str = "expression";

pub type NodeFn = dyn Fn(&Cursor<'_>, usize) -> Reply<NodeWithSpan> + Send + Sync;
pub type SkipFn = dyn Fn(&Cursor<'_>, usize) -> Reply<()> + Send + Sync;

/// A grammar rule: either one that produces a node, or one that
/// recognizes text to be skipped (whitespace, comments).
#[derive(Clone)]
pub enum Rule {
    Node(Arc<NodeFn>),
    Skip(Arc<SkipFn>),
}

impl Rule {
    pub fn node(f: impl Fn(&Cursor<'_>, usize) -> Reply<NodeWithSpan>
                + Send + Sync + 'static) -> Rule {
        Rule::Node(Arc::new(f))
    }

    pub fn skip(f: impl Fn(&Cursor<'_>, usize) -> Reply<()>
                + Send + Sync + 'static) -> Rule {
        Rule::Skip(Arc::new(f))
    }

    fn kind(&self) -> SlotKind {
        match self {
            Rule::Node(_) => SlotKind::Node,
            Rule::Skip(_) => SlotKind::Skip,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Rule::Node(_) => f.write_str("Rule::Node(..)"),
            Rule::Skip(_) => f.write_str("Rule::Skip(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Node,
    Skip,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_str(match self {
            SlotKind::Node => "node",
            SlotKind::Skip => "skip",
        })
    }
}

/// Refers to a slot holding a node rule. Only valid for the grammar
/// that issued it (or clones of that grammar); in any other grammar
/// it runs some unrelated rule, or one that always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// Refers to a slot holding a skip rule; like [NodeHandle], only
/// valid for the grammar that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkipHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Node(NodeHandle),
    Skip(SkipHandle),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("no rule named '{0}'")]
    UnknownSlot(KString),
    #[error("a rule named '{0}' already exists")]
    DuplicateSlot(KString),
    #[error("rule '{name}': expected a {expected} rule, got a {got} rule")]
    KindMismatch { name: KString, expected: SlotKind, got: SlotKind },
}

/// The slots of the built-in rules, for the reader and for rules
/// referring to each other.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub whitespace: SkipHandle,
    pub comment: SkipHandle,
    pub trivia: SkipHandle,
    pub shebang: SkipHandle,
    pub atom: NodeHandle,
    pub string: NodeHandle,
    pub list: NodeHandle,
    pub quote: NodeHandle,
    pub expression: NodeHandle,
}

/// A self-contained set of rule slots. Every `Grammar::new()` is
/// independent of all others, and so is a `clone()` of one.
#[derive(Clone)]
pub struct Grammar {
    node_rules: Vec<Arc<NodeFn>>,
    skip_rules: Vec<Arc<SkipFn>>,
    names: HashMap<KString, Slot>,
    builtins: Builtins,
    settings: Settings,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        let mut names: Vec<&str> = self.names.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("Grammar")
            .field("slots", &names)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new()
    }
}

impl Grammar {
    pub fn new() -> Grammar {
        Grammar::with_settings(DEFAULT_SETTINGS)
    }

    pub fn with_settings(settings: Settings) -> Grammar {
        let mut node_rules: Vec<Arc<NodeFn>> = Vec::new();
        let mut skip_rules: Vec<Arc<SkipFn>> = Vec::new();
        let mut names = HashMap::new();
        let mut declare_skip = |name: &'static str| {
            let h = SkipHandle(skip_rules.len());
            skip_rules.push(Arc::new(rules::undefined_skip));
            names.insert(KString::from_static(name), Slot::Skip(h));
            h
        };
        let whitespace = declare_skip(WHITESPACE);
        let comment = declare_skip(COMMENT);
        let trivia = declare_skip(TRIVIA);
        let shebang = declare_skip(SHEBANG);
        let mut declare_node = |name: &'static str| {
            let h = NodeHandle(node_rules.len());
            node_rules.push(Arc::new(rules::undefined_node));
            names.insert(KString::from_static(name), Slot::Node(h));
            h
        };
        let atom = declare_node(ATOM);
        let string = declare_node(STRING);
        let list = declare_node(LIST);
        let quote = declare_node(QUOTE);
        let expression = declare_node(EXPRESSION);

        let builtins = Builtins {
            whitespace, comment, trivia, shebang,
            atom, string, list, quote, expression
        };
        let mut g = Grammar { node_rules, skip_rules, names, builtins, settings };
        g.set_skip(whitespace, rules::whitespace());
        g.set_skip(comment, rules::comment());
        g.set_skip(trivia, rules::trivia(vec![comment, whitespace]));
        g.set_skip(shebang, rules::shebang());
        g.set_node(atom, rules::atom_with(StandardClassifier));
        g.set_node(string, rules::string());
        g.set_node(list, rules::list(expression, trivia));
        g.set_node(quote, rules::quote(expression, trivia));
        g.set_node(expression, rules::alternation(vec![list, atom, string, quote],
                                                  trivia));
        g
    }

    fn set_node(&mut self, h: NodeHandle, rule: Rule) {
        if let Rule::Node(f) = rule {
            self.node_rules[h.0] = f;
        }
    }

    fn set_skip(&mut self, h: SkipHandle, rule: Rule) {
        if let Rule::Skip(f) = rule {
            self.skip_rules[h.0] = f;
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    fn slot(&self, name: &str) -> Result<Slot, GrammarError> {
        self.names.get(name).copied()
            .ok_or_else(|| GrammarError::UnknownSlot(KString::from_ref(name)))
    }

    pub fn node_handle(&self, name: &str) -> Result<NodeHandle, GrammarError> {
        match self.slot(name)? {
            Slot::Node(h) => Ok(h),
            Slot::Skip(_) => Err(GrammarError::KindMismatch {
                name: KString::from_ref(name),
                expected: SlotKind::Node,
                got: SlotKind::Skip,
            }),
        }
    }

    pub fn skip_handle(&self, name: &str) -> Result<SkipHandle, GrammarError> {
        match self.slot(name)? {
            Slot::Skip(h) => Ok(h),
            Slot::Node(_) => Err(GrammarError::KindMismatch {
                name: KString::from_ref(name),
                expected: SlotKind::Skip,
                got: SlotKind::Node,
            }),
        }
    }

    /// The names of all slots, sorted.
    pub fn slot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Put `rule` into the existing slot `name`. Every rule referring
    /// to that slot sees the new behavior from now on.
    pub fn replace(&mut self, name: &str, rule: Rule) -> Result<(), GrammarError> {
        let slot = self.slot(name)?;
        tracing::trace!(name, kind = %rule.kind(), "replacing rule");
        match (slot, rule) {
            (Slot::Node(h), Rule::Node(f)) => self.node_rules[h.0] = f,
            (Slot::Skip(h), Rule::Skip(f)) => self.skip_rules[h.0] = f,
            (slot, rule) => return Err(GrammarError::KindMismatch {
                name: KString::from_ref(name),
                expected: match slot {
                    Slot::Node(_) => SlotKind::Node,
                    Slot::Skip(_) => SlotKind::Skip,
                },
                got: rule.kind(),
            }),
        }
        Ok(())
    }

    /// A rule behaving like the current content of slot `name`, but
    /// independent of later `replace` calls on that slot.
    pub fn clone_rule(&self, name: &str) -> Result<Rule, GrammarError> {
        Ok(match self.slot(name)? {
            Slot::Node(h) => Rule::Node(Arc::clone(&self.node_rules[h.0])),
            Slot::Skip(h) => Rule::Skip(Arc::clone(&self.skip_rules[h.0])),
        })
    }

    /// Add a new slot, e.g. for a token kind of a dialect, to be used
    /// in a replacement `expression` rule.
    pub fn define(&mut self, name: &str, rule: Rule) -> Result<(), GrammarError> {
        if self.names.contains_key(name) {
            return Err(GrammarError::DuplicateSlot(KString::from_ref(name)))
        }
        tracing::trace!(name, kind = %rule.kind(), "defining rule");
        let slot = match rule {
            Rule::Node(f) => {
                self.node_rules.push(f);
                Slot::Node(NodeHandle(self.node_rules.len() - 1))
            }
            Rule::Skip(f) => {
                self.skip_rules.push(f);
                Slot::Skip(SkipHandle(self.skip_rules.len() - 1))
            }
        };
        self.names.insert(KString::from_ref(name), slot);
        Ok(())
    }

    /// A cursor at nesting depth zero over `source`.
    pub fn cursor<'a>(&'a self, source: &'a str) -> Cursor<'a> {
        Cursor {
            grammar: self,
            source,
            depth_fuel: self.settings.depth_fuel,
        }
    }
}

/// What a rule sees while running: the grammar, the source buffer,
/// and how much deeper it may nest.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    grammar: &'a Grammar,
    source: &'a str,
    depth_fuel: Option<u32>,
}

impl<'a> Cursor<'a> {
    pub fn grammar(&self) -> &'a Grammar {
        self.grammar
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The source from `at` on; empty if `at` is out of range.
    pub fn rest(&self, at: usize) -> &'a str {
        self.source.get(at..).unwrap_or("")
    }

    /// Run the node rule currently in slot `h`.
    pub fn node(&self, h: NodeHandle, at: usize) -> Reply<NodeWithSpan> {
        match self.grammar.node_rules.get(h.0) {
            Some(f) => f(self, at),
            None => Reply::Err(Expected::none()),
        }
    }

    /// Run the skip rule currently in slot `h`.
    pub fn skip(&self, h: SkipHandle, at: usize) -> Reply<()> {
        match self.grammar.skip_rules.get(h.0) {
            Some(f) => f(self, at),
            None => Reply::Err(Expected::none()),
        }
    }

    /// A cursor one nesting level deeper, or `None` if the depth
    /// limit is reached.
    pub fn nested(&self) -> Option<Cursor<'a>> {
        let depth_fuel = match self.depth_fuel {
            Some(0) => return None,
            Some(n) => Some(n - 1),
            None => None,
        };
        Some(Cursor { depth_fuel, ..*self })
    }
}
