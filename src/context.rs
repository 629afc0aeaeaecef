// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The public entry point: a compiled pattern plus everything the walker
//! needs to run it, bundled so a caller never has to juggle the arena,
//! the fast-start hint, and a task pool separately.

use std::cell::{Ref, RefCell};

use captures::Captures;
use compile::{build, measure};
use error::Error;
use flags::{CompileFlags, MatchFlags};
use node::{Arena, NodeRef};
use optimize::{annotate_dotstar_hints, check_group_references, check_quantifier_depth,
               compute_fast_start, FastStart};
use task::TaskPool;
use walk;

/// A compiled pattern, ready to search text with.
///
/// Compiling builds the node arena once (`compile::measure` then
/// `compile::build`), runs the optimizer, and validates the two
/// invariants the build pass can't check on its own (quantifier nesting
/// depth, backreferences to real groups). Searching reuses that arena and
/// a pooled set of `Task`s across calls.
///
/// [`Regex::matches`]/[`Regex::group`]/[`Regex::groups`] follow the
/// `regcomp`/`regexec` shape: the last match's offsets live on `self`,
/// read back separately from the boolean result. [`Regex::find`] is a
/// thinner, more idiomatic alternative for callers who'd rather get a
/// [`Captures`] back directly and never touch the stored state.
pub struct Regex {
    original: String,
    arena: Arena,
    root: NodeRef,
    ngroups: u8,
    flags: CompileFlags,
    fast_start: FastStart,
    pool: RefCell<TaskPool>,
    last: RefCell<Vec<Option<(usize, usize)>>>,
}

impl Regex {
    /// Compile `pattern` with default flags.
    pub fn compile(pattern: &str) -> Result<Regex, Error> {
        Regex::compile_with_flags(pattern, CompileFlags::empty())
    }

    pub fn compile_with_flags(pattern: &str, flags: CompileFlags) -> Result<Regex, Error> {
        let bytes = pattern.as_bytes();
        let counts = measure(bytes, flags)?;
        log::debug!(
            "measured {:?}: {} nodes, {} sets, {} string bytes",
            pattern,
            counts.nodes,
            counts.sets,
            counts.string_bytes
        );
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (root, ngroups) = build(bytes, flags, &mut arena)?;
        check_quantifier_depth(&arena, root)?;
        check_group_references(&arena, ngroups)?;
        annotate_dotstar_hints(&arena);
        let fast_start = if flags.contains(CompileFlags::NO_FAST_START) {
            FastStart::None
        } else {
            compute_fast_start(&arena, root)
        };
        log::trace!("fast-start for {:?}: {:?}", pattern, fast_start);
        Ok(Regex {
            original: pattern.to_owned(),
            arena,
            root,
            ngroups,
            flags,
            fast_start,
            pool: RefCell::new(TaskPool::new()),
            last: RefCell::new(Vec::new()),
        })
    }

    /// The original pattern text this `Regex` was compiled from.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Number of groups, including the implicit whole-match group 0.
    pub fn capture_len(&self) -> usize {
        self.ngroups as usize
    }

    fn run(&self, bytes: &[u8], flags: MatchFlags) -> Option<Vec<(i32, i32)>> {
        // Caseless mode folds pattern literals once at compile time
        // (`compile::scan_one_literal_byte`); the input side of that same
        // design note is folded here, once per byte, rather than inside
        // every comparison the walker makes. Capture offsets still index
        // into the caller's original bytes, so matched text keeps its
        // original case even though the match itself is case-insensitive.
        let folded;
        let bytes = if self.flags.contains(CompileFlags::CASELESS) {
            folded = bytes.iter().map(u8::to_ascii_lowercase).collect::<Vec<u8>>();
            &folded
        } else {
            bytes
        };
        let mut pool = self.pool.borrow_mut();
        let result = walk::find_leftmost(
            &self.arena,
            self.root,
            self.ngroups as usize,
            bytes,
            0,
            self.flags,
            &self.fast_start,
            &mut pool,
        );
        if !flags.contains(MatchFlags::KEEP_TASKS) {
            pool.clear();
        }
        result
    }

    /// Search `text` for a match, recording it as the "last match" read
    /// back through [`Regex::group`] and [`Regex::groups`].
    ///
    /// Mirrors POSIX `regexec`: the result lives on `self`, not on the
    /// return value, so repeated calls can reuse storage instead of
    /// handing back a fresh allocation each time.
    pub fn matches(&self, text: &[u8], flags: MatchFlags) -> bool {
        let offsets = self.run(text, flags);
        let found = offsets.is_some();
        *self.last.borrow_mut() = match offsets {
            Some(offsets) => offsets
                .into_iter()
                .map(|(start, end)| {
                    if start < 0 || end < 0 {
                        None
                    } else {
                        Some((start as usize, end as usize))
                    }
                })
                .collect(),
            None => Vec::new(),
        };
        found
    }

    /// Byte offsets of group `i` from the most recent [`Regex::matches`]
    /// call, or `None` if that group didn't participate (or there was no
    /// match at all).
    pub fn group(&self, i: usize) -> Option<(usize, usize)> {
        self.last.borrow().get(i).copied().flatten()
    }

    /// All group offsets from the most recent [`Regex::matches`] call,
    /// index 0 being the whole match. Empty if there was no match yet.
    pub fn groups(&self) -> Ref<[Option<(usize, usize)>]> {
        Ref::map(self.last.borrow(), |v| v.as_slice())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Find the leftmost match in `text`, starting the scan at byte 0.
    ///
    /// Convenience wrapper over [`Regex::matches`] that also borrows
    /// `text` to hand back a [`Captures`] slicing it directly, for
    /// callers who want the matched bytes without a second round trip
    /// through `group`/`groups`.
    pub fn find<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.find_with_flags(text, MatchFlags::empty())
    }

    pub fn find_with_flags<'t>(&self, text: &'t str, flags: MatchFlags) -> Option<Captures<'t>> {
        let bytes = text.as_bytes();
        let offsets = self.run(bytes, flags)?;
        Some(Captures::new(bytes, offsets))
    }

    #[cfg(feature = "dot")]
    pub fn write_dot(&self) -> String {
        crate::dot::render(&self.arena, self.root)
    }
}

impl Drop for Regex {
    fn drop(&mut self) {
        log::trace!("dropping compiled pattern ({} nodes)", self.arena.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_matches() {
        let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
        let caps = re.find("id 42-foo here").unwrap();
        assert_eq!(caps.whole(), b"42-foo");
        assert_eq!(caps.get(1), Some(&b"42"[..]));
        assert_eq!(caps.get(2), Some(&b"foo"[..]));
    }

    #[test]
    fn is_match_short_circuits() {
        let re = Regex::compile("abc").unwrap();
        assert!(re.is_match("xxabcyy"));
        assert!(!re.is_match("xyz"));
    }

    #[test]
    fn rejects_malformed_pattern() {
        assert!(Regex::compile("a**").is_err());
    }

    #[test]
    fn rejects_deeply_nested_quantifiers() {
        assert!(Regex::compile("(((a+)+)+)+").is_err());
    }

    #[test]
    fn keep_tasks_flag_leaves_pool_populated() {
        let re = Regex::compile("a+b").unwrap();
        assert!(re.pool.borrow().is_empty());
        re.find_with_flags("aaab", MatchFlags::KEEP_TASKS).unwrap();
        assert!(!re.pool.borrow().is_empty());
        re.find_with_flags("aaab", MatchFlags::empty()).unwrap();
        assert!(re.pool.borrow().is_empty());
    }

    #[test]
    fn repeated_calls_reuse_the_pool() {
        let re = Regex::compile("a+b").unwrap();
        for _ in 0..50 {
            assert!(re.is_match("aaab"));
        }
    }

    #[test]
    fn matches_records_last_match_state() {
        let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
        assert!(re.matches(b"id 42-foo here", MatchFlags::empty()));
        assert_eq!(re.group(0), Some((3, 9)));
        assert_eq!(re.group(1), Some((3, 5)));
        assert_eq!(re.group(2), Some((6, 9)));
        assert_eq!(re.groups().len(), 3);
    }

    #[test]
    fn as_str_returns_original_pattern() {
        let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
        assert_eq!(re.as_str(), r"(\d+)-(\w+)");
    }

    #[test]
    fn failed_match_clears_last_match_state() {
        let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
        assert!(re.matches(b"id 42-foo here", MatchFlags::empty()));
        assert!(!re.matches(b"no digits here", MatchFlags::empty()));
        assert_eq!(re.group(0), None);
        assert!(re.groups().is_empty());
    }
}
