// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The node arena: a single contiguous allocation holding every node, set
//! and literal-string byte of a compiled pattern.
//!
//! All inter-node links (`a`, `b`, `parent`, the dotstar/dotplus literal
//! hint) are indices into `Arena::nodes` rather than pointers. This removes
//! lifetime coupling entirely: the arena owns every node, and the walker
//! only ever borrows it.

use std::cell::Cell;

use charset::CharSet;

/// Index of a node within an `Arena`. `NodeRef::NONE` is the sentinel used
/// wherever the C original used a null pointer (`NOTUSED`): an empty `b`
/// leg, an absent parent, or an unset dotstar/dotplus hint.
pub type NodeRef = u32;

/// Sentinel for "no node here". Kept distinct from any real index because
/// `Arena` never allocates `u32::MAX` nodes.
pub const NONE: NodeRef = u32::MAX;

/// Operator tag. Ordered roughly by expected frequency, matching the
/// original C `enum` comment ("Order in terms of likelihood").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Concat,
    Match,
    MatchStr,
    MatchSet,
    MatchGrp,
    Plus,
    Star,
    DotStar,
    DotPlus,
    Question,
    Mult,
    Group,
    Alternate,
    Anchor,
    Crlf,
    Done,
}

/// The single-byte character classes a `MATCH` node can test in place of a
/// literal byte. `\d \D \w \W \s \S` are the pattern-visible ones; `Dot`
/// backs `.` itself when it isn't fused into DOTSTAR/DOTPLUS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassCode {
    Dot,
    Digit,
    NotDigit,
    Word,
    NotWord,
    Space,
    NotSpace,
}

impl ClassCode {
    /// Test a single input byte against this class. `newline_dot` controls
    /// whether `Dot` matches `\n` (it never does when multi-line `newline`
    /// mode is on; it always does otherwise, since this engine has no
    /// single-line/multi-line split beyond the `newline` flag itself).
    pub fn matches(self, b: u8, dot_matches_newline: bool) -> bool {
        match self {
            ClassCode::Dot => dot_matches_newline || b != b'\n',
            ClassCode::Digit => b.is_ascii_digit(),
            ClassCode::NotDigit => !b.is_ascii_digit(),
            ClassCode::Word => is_word_byte(b),
            ClassCode::NotWord => !is_word_byte(b),
            ClassCode::Space => is_space_byte(b),
            ClassCode::NotSpace => !is_space_byte(b),
        }
    }
}

/// `\b`/`\B` and `^`/`$`/`\A`/`\Z` word/line classification shared by the
/// anchor walker and the set builder's `\w`/`\W`.
pub fn is_word_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

pub fn is_space_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorKind {
    StartOfInput,
    EndOfInput,
    StartOfLine,
    EndOfLine,
    WordBoundary,
    NotWordBoundary,
}

/// Operator-specific payload. A tagged sum replacing the anonymous unions
/// the C original uses to alias `ch1`/`ch2`/`min`/`max` over the same
/// storage; see DESIGN.md.
#[derive(Debug)]
pub enum Payload {
    None,
    /// Exactly one of `ch1`/`ch2` is `Some`; see `Node` invariant 6.
    Match { ch1: Option<u8>, ch2: Option<ClassCode> },
    MatchStr { offset: u32, len: u32 },
    /// Index into `Arena::sets`.
    MatchSet { set: u32 },
    MatchGrp { group: u8 },
    /// `None` marks a non-capturing group (`(?:...)`).
    Group { index: Option<u8> },
    Mult { min: u16, max: Option<u16>, lazy: bool },
    /// Shared by PLUS/STAR/QUESTION/DOTSTAR/DOTPLUS. `next_literal` is only
    /// ever populated on DOTSTAR/DOTPLUS, by the optimizer.
    Quant { lazy: bool, next_literal: Cell<NodeRef> },
    Anchor(AnchorKind),
}

/// One node in the compiled tree.
///
/// Nodes are immutable once built, with one exception: `Quant`'s
/// `next_literal` cell, filled in by the optimizer after the build pass.
/// Zero-length-iteration detection (which positions entered a quantifier
/// and how many times) lives on `Task`, not here — a cloned task walking
/// the same node must not see another task's counters.
#[derive(Debug)]
pub struct Node {
    pub op: Op,
    pub a: NodeRef,
    pub b: NodeRef,
    pub parent: NodeRef,
    pub payload: Payload,
}

impl Node {
    fn new(op: Op, parent: NodeRef, payload: Payload) -> Node {
        Node { op, a: NONE, b: NONE, parent, payload }
    }
}

/// Contiguous storage for nodes, sets and literal-string bytes, sized
/// exactly by the measuring pass (see `compile::measure`).
#[derive(Debug)]
pub struct Arena {
    pub nodes: Vec<Node>,
    pub sets: Vec<CharSet>,
    pub strings: Vec<u8>,
}

impl Arena {
    pub fn with_capacity(nodes: usize, sets: usize, string_bytes: usize) -> Arena {
        Arena {
            nodes: Vec::with_capacity(nodes),
            sets: Vec::with_capacity(sets),
            strings: Vec::with_capacity(string_bytes),
        }
    }

    /// Push a new node, returning its `NodeRef`. Panics (an `Internal`
    /// compile error in practice, caught by the caller before it can fire)
    /// if this would exceed the capacity reserved by the measuring pass.
    pub fn push(&mut self, op: Op, parent: NodeRef, payload: Payload) -> NodeRef {
        debug_assert!(
            self.nodes.len() < self.nodes.capacity(),
            "build pass exceeded measuring pass's node count"
        );
        let idx = self.nodes.len() as NodeRef;
        self.nodes.push(Node::new(op, parent, payload));
        idx
    }

    pub fn push_set(&mut self, set: CharSet) -> u32 {
        debug_assert!(self.sets.len() < self.sets.capacity());
        let idx = self.sets.len() as u32;
        self.sets.push(set);
        idx
    }

    pub fn push_string(&mut self, bytes: &[u8]) -> (u32, u32) {
        debug_assert!(self.strings.len() + bytes.len() <= self.strings.capacity());
        let offset = self.strings.len() as u32;
        self.strings.extend_from_slice(bytes);
        (offset, bytes.len() as u32)
    }

    #[inline]
    pub fn node(&self, r: NodeRef) -> &Node {
        &self.nodes[r as usize]
    }

    pub fn string(&self, offset: u32, len: u32) -> &[u8] {
        &self.strings[offset as usize..(offset + len) as usize]
    }

    pub fn set(&self, idx: u32) -> &CharSet {
        &self.sets[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
