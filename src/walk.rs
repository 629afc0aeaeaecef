// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The iterative tree walker.
//!
//! Each live `Task` is a hypothesis about how the pattern matches from a
//! given starting position. The run list is kept priority-sorted at all
//! times: index 0 is always the highest-priority task, and advancing it
//! (`advance`) either kills it, finishes it, or walks it through any
//! number of ghost (non-consuming) transitions and byte-consuming steps,
//! inserting any spawned alternatives directly behind it so they inherit
//! the next-lowest priority. Because of that invariant, the first task to
//! reach DONE while sitting at index 0 is unconditionally the best
//! available result — there is no higher-priority task left that could
//! still produce a preferable match — so the walk for that starting
//! position ends immediately.
//!
//! Task dedup is implemented as a `(node, direction, cursor)` visited set:
//! a task that would revisit a triple already seen from this starting
//! position can never find a result preferable to the one already in
//! flight, so it is dropped instead of explored, keyed by tree position
//! rather than instruction offset.

use std::collections::HashSet;

use flags::CompileFlags;
use node::{is_word_byte, Arena, AnchorKind, ClassCode, NodeRef, Op, Payload, NONE};
use optimize::FastStart;
use task::{Dir, Task, TaskPool};

enum StepResult {
    Dead,
    Done,
}

/// Find the leftmost match starting at or after `from`, returning the
/// capture offsets of group 0 and every explicit group.
pub fn find_leftmost(
    arena: &Arena,
    root: NodeRef,
    ngroups: usize,
    text: &[u8],
    from: usize,
    flags: CompileFlags,
    fast_start: &FastStart,
    pool: &mut TaskPool,
) -> Option<Vec<(i32, i32)>> {
    if !flags.contains(CompileFlags::NO_FAST_START) {
        if let FastStart::DotScan = fast_start {
            return if from > text.len() {
                None
            } else {
                run_from(arena, root, ngroups, text, from, flags, pool)
            };
        }
    }

    let mut start = from;
    loop {
        let candidate = if flags.contains(CompileFlags::NO_FAST_START) {
            if start > text.len() {
                None
            } else {
                Some(start)
            }
        } else {
            next_fast_start_candidate(arena, text, start, fast_start, flags)
        };
        let candidate = candidate?;
        if let Some(caps) = run_from(arena, root, ngroups, text, candidate, flags, pool) {
            return Some(caps);
        }
        if candidate >= text.len() {
            return None;
        }
        start = candidate + 1;
    }
}

fn next_fast_start_candidate(
    arena: &Arena,
    text: &[u8],
    from: usize,
    fast_start: &FastStart,
    flags: CompileFlags,
) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    match *fast_start {
        FastStart::None => Some(from),
        FastStart::Byte(b) => memchr::memchr(b, &text[from..]).map(|i| from + i),
        FastStart::Bytes { offset, len } => {
            let needle = arena.string(offset, len);
            if needle.is_empty() {
                return Some(from);
            }
            memchr::memmem::find(&text[from..], needle).map(|i| from + i)
        }
        FastStart::Set(set_idx) => {
            let set = arena.set(set_idx);
            text[from..].iter().position(|&b| set.contains(b)).map(|i| from + i)
        }
        FastStart::Anchor(kind) => anchor_candidate(text, from, kind, flags),
        FastStart::DotScan => Some(from),
    }
}

/// Smallest position at or after `from` where `kind` can hold, or `None`
/// if no such position remains in `text`.
fn anchor_candidate(text: &[u8], from: usize, kind: AnchorKind, flags: CompileFlags) -> Option<usize> {
    let multiline = flags.contains(CompileFlags::NEWLINE);
    match kind {
        AnchorKind::StartOfInput => {
            if from == 0 {
                Some(0)
            } else {
                None
            }
        }
        AnchorKind::EndOfInput => {
            if from <= text.len() {
                Some(text.len())
            } else {
                None
            }
        }
        AnchorKind::StartOfLine => {
            if from == 0 {
                return Some(0);
            }
            if !multiline {
                return None;
            }
            memchr::memchr(b'\n', &text[from - 1..]).map(|i| from - 1 + i + 1)
        }
        AnchorKind::EndOfLine => {
            if !multiline {
                return if from <= text.len() { Some(text.len()) } else { None };
            }
            match memchr::memchr(b'\n', &text[from.min(text.len())..]) {
                Some(i) => Some(from + i),
                None if from <= text.len() => Some(text.len()),
                None => None,
            }
        }
        AnchorKind::WordBoundary | AnchorKind::NotWordBoundary => {
            unreachable!("word-boundary anchors never become a FastStart")
        }
    }
}

/// Run every live task to a fixed point starting from `start`, returning
/// the capture offsets of whichever task wins.
fn run_from(
    arena: &Arena,
    root: NodeRef,
    ngroups: usize,
    text: &[u8],
    start: usize,
    flags: CompileFlags,
    pool: &mut TaskPool,
) -> Option<Vec<(i32, i32)>> {
    let mut run: Vec<Task> = vec![pool.alloc(root, start, ngroups)];
    let mut visited: HashSet<(NodeRef, Dir, usize)> = HashSet::new();

    loop {
        if run.is_empty() {
            return None;
        }
        let mut spawned: Vec<Task> = Vec::new();
        let outcome = advance(arena, text, &mut run[0], &mut spawned, &mut visited, flags);
        let nspawned = spawned.len();
        for (k, t) in spawned.into_iter().enumerate() {
            run.insert(1 + k, t);
        }
        match outcome {
            StepResult::Dead => {
                let dead = run.remove(0);
                pool.release(dead);
            }
            StepResult::Done => {
                let done = run.remove(0);
                let caps = done.caps.clone();
                pool.release(done);
                for remaining in run.drain(..) {
                    pool.release(remaining);
                }
                let _ = nspawned;
                return Some(caps);
            }
        }
    }
}

fn ascend(arena: &Arena, task: &mut Task, from: NodeRef) {
    let parent = arena.node(from).parent;
    debug_assert_ne!(parent, NONE, "walked off the root without reaching DONE");
    task.dir = if arena.node(parent).a == from { Dir::FromA } else { Dir::FromB };
    task.node = parent;
}

fn dot_matches(b: u8, flags: CompileFlags) -> bool {
    ClassCode::Dot.matches(b, !flags.contains(CompileFlags::NEWLINE))
}

fn can_consume_dot(task: &Task, text: &[u8], flags: CompileFlags) -> bool {
    text.get(task.cursor).map_or(false, |&b| dot_matches(b, flags))
}

/// Shared by PLUS's "already did >=1 iteration" return and STAR/MULT's
/// "may or may not loop again" decision: either this iteration was
/// zero-length (stop unconditionally) or the caller lets greedy/lazy
/// priority decide whether to loop again now or try stopping first,
/// spawning the road not taken as a lower-priority alternative.
fn loop_again_or_stop(
    arena: &Arena,
    task: &mut Task,
    spawned: &mut Vec<Task>,
    body: NodeRef,
    lazy: bool,
    zero_length: bool,
) {
    if zero_length {
        task.pop_frame();
        let me = task.node;
        ascend(arena, task, me);
        return;
    }
    if lazy {
        let mut sib = task.clone();
        sib.top_frame_mut().entry_cursor = task.cursor as i32;
        sib.node = body;
        sib.dir = Dir::FromParent;
        spawned.push(sib);
        task.pop_frame();
        let me = task.node;
        ascend(arena, task, me);
    } else {
        let mut sib = task.clone();
        sib.pop_frame();
        let me = sib.node;
        ascend(arena, &mut sib, me);
        spawned.push(sib);
        task.top_frame_mut().entry_cursor = task.cursor as i32;
        task.node = body;
        task.dir = Dir::FromParent;
    }
}

fn dotstar_step(
    arena: &Arena,
    text: &[u8],
    task: &mut Task,
    spawned: &mut Vec<Task>,
    lazy: bool,
    flags: CompileFlags,
) {
    if lazy {
        if can_consume_dot(task, text, flags) {
            let mut sib = task.clone();
            sib.cursor += 1;
            spawned.push(sib);
        }
        let me = task.node;
        ascend(arena, task, me);
    } else if can_consume_dot(task, text, flags) {
        let mut sib = task.clone();
        let me = sib.node;
        ascend(arena, &mut sib, me);
        spawned.push(sib);
        task.cursor += 1;
    } else {
        let me = task.node;
        ascend(arena, task, me);
    }
}

fn next_hint_occurrence(arena: &Arena, text: &[u8], from: usize, hint: NodeRef) -> Option<usize> {
    if from > text.len() {
        return None;
    }
    let n = arena.node(hint);
    match n.op {
        Op::Match => match n.payload {
            Payload::Match { ch1: Some(b), .. } => memchr::memchr(b, &text[from..]).map(|i| from + i),
            _ => None,
        },
        Op::MatchStr => match n.payload {
            Payload::MatchStr { offset, len } => {
                let needle = arena.string(offset, len);
                memchr::memmem::find(&text[from..], needle).map(|i| from + i)
            }
            _ => None,
        },
        Op::MatchSet => match n.payload {
            Payload::MatchSet { set } => {
                let s = arena.set(set);
                text[from..].iter().position(|&b| s.contains(b)).map(|i| from + i)
            }
            _ => None,
        },
        _ => None,
    }
}

fn all_hint_occurrences(arena: &Arena, text: &[u8], from: usize, hint: NodeRef) -> Vec<usize> {
    let mut out = Vec::new();
    let mut pos = from;
    while let Some(p) = next_hint_occurrence(arena, text, pos, hint) {
        out.push(p);
        pos = p + 1;
        if pos > text.len() {
            break;
        }
    }
    out
}

/// DOTSTAR/DOTPLUS with a known following literal: locate every position
/// the literal could start at, order them by greedy/lazy preference
/// (farthest-first for greedy, nearest-first for lazy) and spawn all but
/// the most-preferred one as successively lower-priority fallbacks. This
/// reaches the same accepted match as the plain byte-at-a-time walk while
/// visiting candidate positions directly instead of growing the dot one
/// byte at a time.
fn dotplus_with_hint(
    arena: &Arena,
    text: &[u8],
    task: &mut Task,
    spawned: &mut Vec<Task>,
    lazy: bool,
    hint: NodeRef,
    mandatory_first: bool,
    flags: CompileFlags,
) -> bool {
    if mandatory_first {
        match text.get(task.cursor) {
            Some(&b) if dot_matches(b, flags) => task.cursor += 1,
            _ => return false,
        }
    }
    let mut occurrences = all_hint_occurrences(arena, text, task.cursor, hint);
    if occurrences.is_empty() {
        return false;
    }
    if !lazy {
        occurrences.reverse();
    }
    for &pos in &occurrences[1..] {
        let mut sib = task.clone();
        sib.cursor = pos;
        sib.node = hint;
        sib.dir = Dir::FromParent;
        spawned.push(sib);
    }
    task.cursor = occurrences[0];
    task.node = hint;
    task.dir = Dir::FromParent;
    true
}

/// Drive one task through as many ghost transitions and consuming steps
/// as it can take without needing outside input, returning only once it
/// dies or reaches DONE. `spawned` collects any alternative-path siblings
/// created along the way, highest priority first.
fn advance(
    arena: &Arena,
    text: &[u8],
    task: &mut Task,
    spawned: &mut Vec<Task>,
    visited: &mut HashSet<(NodeRef, Dir, usize)>,
    flags: CompileFlags,
) -> StepResult {
    loop {
        if !visited.insert((task.node, task.dir, task.cursor)) {
            return StepResult::Dead;
        }
        let node = task.node;
        let n = arena.node(node);
        match n.op {
            Op::Done => return StepResult::Done,

            Op::Group => match task.dir {
                Dir::FromParent => {
                    if let Payload::Group { index: Some(g) } = n.payload {
                        task.caps[g as usize].0 = task.cursor as i32;
                    }
                    if n.b == NONE {
                        if let Payload::Group { index: Some(g) } = n.payload {
                            task.caps[g as usize].1 = task.cursor as i32;
                        }
                        ascend(arena, task, node);
                    } else {
                        task.node = n.b;
                        task.dir = Dir::FromParent;
                    }
                }
                Dir::FromB => {
                    if let Payload::Group { index: Some(g) } = n.payload {
                        task.caps[g as usize].1 = task.cursor as i32;
                    }
                    ascend(arena, task, node);
                }
                Dir::FromA => unreachable!("GROUP has no 'a' leg"),
            },

            Op::Concat => match task.dir {
                Dir::FromParent => {
                    task.node = n.a;
                    task.dir = Dir::FromParent;
                }
                Dir::FromA => {
                    task.node = n.b;
                    task.dir = Dir::FromParent;
                }
                Dir::FromB => ascend(arena, task, node),
            },

            Op::Match => match n.payload {
                Payload::Match { ch1: Some(b), .. } => {
                    if text.get(task.cursor) == Some(&b) {
                        task.cursor += 1;
                        ascend(arena, task, node);
                    } else {
                        return StepResult::Dead;
                    }
                }
                Payload::Match { ch2: Some(cls), .. } => match text.get(task.cursor) {
                    Some(&b) if cls.matches(b, !flags.contains(CompileFlags::NEWLINE)) => {
                        task.cursor += 1;
                        ascend(arena, task, node);
                    }
                    _ => return StepResult::Dead,
                },
                _ => unreachable!("MATCH payload always sets ch1 xor ch2"),
            },

            Op::MatchStr => {
                if let Payload::MatchStr { offset, len } = n.payload {
                    let lit = arena.string(offset, len);
                    let end = task.cursor + lit.len();
                    if end <= text.len() && &text[task.cursor..end] == lit {
                        task.cursor = end;
                        ascend(arena, task, node);
                    } else {
                        return StepResult::Dead;
                    }
                }
            }

            Op::MatchSet => {
                if let Payload::MatchSet { set } = n.payload {
                    match text.get(task.cursor) {
                        Some(&b) if arena.set(set).contains(b) => {
                            task.cursor += 1;
                            ascend(arena, task, node);
                        }
                        _ => return StepResult::Dead,
                    }
                }
            }

            Op::MatchGrp => {
                if let Payload::MatchGrp { group } = n.payload {
                    let (so, eo) = task.caps[group as usize];
                    if so < 0 || eo < 0 || so == eo {
                        ascend(arena, task, node);
                    } else {
                        let (so, eo) = (so as usize, eo as usize);
                        let glen = eo - so;
                        let end = task.cursor + glen;
                        if end <= text.len() && text[task.cursor..end] == text[so..eo] {
                            task.cursor = end;
                            ascend(arena, task, node);
                        } else {
                            return StepResult::Dead;
                        }
                    }
                }
            }

            Op::Anchor => {
                if let Payload::Anchor(kind) = n.payload {
                    let ok = match kind {
                        AnchorKind::StartOfInput => task.cursor == 0,
                        AnchorKind::EndOfInput => task.cursor == text.len(),
                        AnchorKind::StartOfLine => {
                            task.cursor == 0
                                || (flags.contains(CompileFlags::NEWLINE)
                                    && text.get(task.cursor - 1) == Some(&b'\n'))
                        }
                        AnchorKind::EndOfLine => {
                            task.cursor == text.len()
                                || (flags.contains(CompileFlags::NEWLINE)
                                    && text.get(task.cursor) == Some(&b'\n'))
                        }
                        AnchorKind::WordBoundary | AnchorKind::NotWordBoundary => {
                            let before = task.cursor > 0 && is_word_byte(text[task.cursor - 1]);
                            let after =
                                task.cursor < text.len() && is_word_byte(text[task.cursor]);
                            let at_boundary = before != after;
                            if kind == AnchorKind::WordBoundary {
                                at_boundary
                            } else {
                                !at_boundary
                            }
                        }
                    };
                    if ok {
                        ascend(arena, task, node);
                    } else {
                        return StepResult::Dead;
                    }
                }
            }

            Op::Crlf => match text.get(task.cursor) {
                Some(b'\r') => {
                    task.cursor += 1;
                    if text.get(task.cursor) == Some(&b'\n') {
                        task.cursor += 1;
                    }
                    ascend(arena, task, node);
                }
                Some(b'\n') => {
                    task.cursor += 1;
                    ascend(arena, task, node);
                }
                _ => return StepResult::Dead,
            },

            Op::Alternate => match task.dir {
                Dir::FromParent => {
                    let mut sib = task.clone();
                    sib.node = n.b;
                    sib.dir = Dir::FromParent;
                    spawned.push(sib);
                    task.node = n.a;
                    task.dir = Dir::FromParent;
                }
                Dir::FromA | Dir::FromB => ascend(arena, task, node),
            },

            Op::Question => {
                if let Payload::Quant { lazy, .. } = n.payload {
                    match task.dir {
                        Dir::FromParent => {
                            if lazy {
                                let mut sib = task.clone();
                                sib.node = n.b;
                                sib.dir = Dir::FromParent;
                                spawned.push(sib);
                                ascend(arena, task, node);
                            } else {
                                let mut sib = task.clone();
                                ascend(arena, &mut sib, node);
                                spawned.push(sib);
                                task.node = n.b;
                                task.dir = Dir::FromParent;
                            }
                        }
                        Dir::FromB => ascend(arena, task, node),
                        Dir::FromA => unreachable!("QUESTION has no 'a' leg"),
                    }
                }
            }

            Op::Plus => {
                if let Payload::Quant { lazy, .. } = n.payload {
                    match task.dir {
                        Dir::FromParent => {
                            if task.push_frame(task.cursor).is_err() {
                                return StepResult::Dead;
                            }
                            task.node = n.b;
                            task.dir = Dir::FromParent;
                        }
                        Dir::FromB => {
                            let zero_length = task.top_frame().entry_cursor == task.cursor as i32;
                            loop_again_or_stop(arena, task, spawned, n.b, lazy, zero_length);
                        }
                        Dir::FromA => unreachable!("PLUS has no 'a' leg"),
                    }
                }
            }

            Op::Star => {
                if let Payload::Quant { lazy, .. } = n.payload {
                    match task.dir {
                        Dir::FromParent => {
                            if task.push_frame(task.cursor).is_err() {
                                return StepResult::Dead;
                            }
                            loop_again_or_stop(arena, task, spawned, n.b, lazy, false);
                        }
                        Dir::FromB => {
                            let zero_length = task.top_frame().entry_cursor == task.cursor as i32;
                            loop_again_or_stop(arena, task, spawned, n.b, lazy, zero_length);
                        }
                        Dir::FromA => unreachable!("STAR has no 'a' leg"),
                    }
                }
            }

            Op::Mult => {
                if let Payload::Mult { min, max, lazy } = n.payload {
                    match task.dir {
                        Dir::FromParent => {
                            if task.push_frame(task.cursor).is_err() {
                                return StepResult::Dead;
                            }
                            if min > 0 {
                                task.node = n.b;
                                task.dir = Dir::FromParent;
                            } else if max == Some(0) {
                                task.pop_frame();
                                ascend(arena, task, node);
                            } else {
                                loop_again_or_stop(arena, task, spawned, n.b, lazy, false);
                            }
                        }
                        Dir::FromB => {
                            let zero_length = task.top_frame().entry_cursor == task.cursor as i32;
                            task.top_frame_mut().count += 1;
                            let count = task.top_frame().count;
                            if zero_length {
                                if count >= min {
                                    task.pop_frame();
                                    ascend(arena, task, node);
                                } else {
                                    return StepResult::Dead;
                                }
                            } else if count < min {
                                task.top_frame_mut().entry_cursor = task.cursor as i32;
                                task.node = n.b;
                                task.dir = Dir::FromParent;
                            } else if max.map_or(true, |m| count < m) {
                                loop_again_or_stop(arena, task, spawned, n.b, lazy, false);
                            } else {
                                task.pop_frame();
                                ascend(arena, task, node);
                            }
                        }
                        Dir::FromA => unreachable!("MULT has no 'a' leg"),
                    }
                }
            }

            Op::DotPlus => {
                if let Payload::Quant { lazy, ref next_literal } = n.payload {
                    let hint = next_literal.get();
                    if hint != NONE && !flags.contains(CompileFlags::NO_FAST_START) {
                        if !dotplus_with_hint(arena, text, task, spawned, lazy, hint, true, flags) {
                            return StepResult::Dead;
                        }
                    } else {
                        match text.get(task.cursor) {
                            Some(&b) if dot_matches(b, flags) => task.cursor += 1,
                            _ => return StepResult::Dead,
                        }
                        dotstar_step(arena, text, task, spawned, lazy, flags);
                    }
                }
            }

            Op::DotStar => {
                if let Payload::Quant { lazy, ref next_literal } = n.payload {
                    let hint = next_literal.get();
                    if hint != NONE && !flags.contains(CompileFlags::NO_FAST_START) {
                        if !dotplus_with_hint(arena, text, task, spawned, lazy, hint, false, flags) {
                            return StepResult::Dead;
                        }
                    } else {
                        dotstar_step(arena, text, task, spawned, lazy, flags);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compile::{build, measure};
    use flags::CompileFlags;
    use node::Arena;
    use optimize::{annotate_dotstar_hints, compute_fast_start};
    use task::TaskPool;

    fn compile(pattern: &str) -> (Arena, NodeRef, usize) {
        let bytes = pattern.as_bytes();
        let counts = measure(bytes, CompileFlags::empty()).unwrap();
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (root, groups) = build(bytes, CompileFlags::empty(), &mut arena).unwrap();
        annotate_dotstar_hints(&arena);
        (arena, root, groups as usize)
    }

    fn run(pattern: &str, text: &str) -> Option<Vec<(i32, i32)>> {
        let (arena, root, ngroups) = compile(pattern);
        let fast_start = compute_fast_start(&arena, root);
        let mut pool = TaskPool::new();
        find_leftmost(
            &arena,
            root,
            ngroups,
            text.as_bytes(),
            0,
            CompileFlags::empty(),
            &fast_start,
            &mut pool,
        )
    }

    #[test]
    fn literal_match() {
        let caps = run("abc", "xxabcyy").unwrap();
        assert_eq!(caps[0], (2, 5));
    }

    #[test]
    fn greedy_star_is_maximal() {
        let caps = run("a*", "aaab").unwrap();
        assert_eq!(caps[0], (0, 3));
    }

    #[test]
    fn lazy_star_is_minimal() {
        let caps = run("a*?b", "aaab").unwrap();
        assert_eq!(caps[0], (0, 4));
    }

    #[test]
    fn alternation_prefers_first_branch() {
        let caps = run("(cat|car|cart)", "cart").unwrap();
        // first branch wins: "car" matches before "cart" is ever tried
        assert_eq!(caps[1], (0, 3));
    }

    #[test]
    fn simple_alternation_matches_either_branch() {
        assert_eq!(run("a|b", "a").unwrap()[0], (0, 1));
        assert_eq!(run("a|b", "b").unwrap()[0], (0, 1));
    }

    #[test]
    fn alternation_followed_by_more_pattern_still_matches() {
        let caps = run("(a)|(b)", "a").unwrap();
        assert_eq!(caps[0], (0, 1));
        assert_eq!(caps[1], (0, 1));
        assert_eq!(caps[2], (-1, -1));
    }

    #[test]
    fn capture_groups_are_recorded() {
        let caps = run(r"(\d+)-(\w+)", "42-foo").unwrap();
        assert_eq!(caps[0], (0, 6));
        assert_eq!(caps[1], (0, 2));
        assert_eq!(caps[2], (3, 6));
    }

    #[test]
    fn backreference_matches_prior_capture() {
        assert!(run(r"(\w+)-\1", "ab-ab").is_some());
        assert!(run(r"(\w+)-\1", "ab-cd").is_none());
    }

    #[test]
    fn word_boundary_anchors() {
        assert!(run(r"\bfoo\b", "a foo b").is_some());
        assert!(run(r"\bfoo\b", "afoob").is_none());
    }

    #[test]
    fn dotstar_with_and_without_fast_start_agree() {
        let (arena, root, ngroups) = compile(".*foo");
        let fast_start = compute_fast_start(&arena, root);
        let text = b"xxxfooxxxfoo";
        let mut pool = TaskPool::new();
        let with_hint = find_leftmost(
            &arena,
            root,
            ngroups,
            text,
            0,
            CompileFlags::empty(),
            &fast_start,
            &mut pool,
        );
        let without_hint = find_leftmost(
            &arena,
            root,
            ngroups,
            text,
            0,
            CompileFlags::NO_FAST_START,
            &fast_start,
            &mut pool,
        );
        assert_eq!(with_hint, without_hint);
        assert_eq!(with_hint.unwrap()[0], (0, 12));
    }

    #[test]
    fn caret_dollar_are_input_anchored_without_newline_flag() {
        // Without CompileFlags::NEWLINE, ^ and $ bind to the whole input,
        // not to embedded line boundaries.
        assert!(run("^b", "a\nb").is_none());
        assert!(run("a$", "a\nb").is_none());
    }

    #[test]
    fn mult_bounds_are_respected() {
        assert!(run("a{2,3}", "a").is_none());
        let caps = run("a{2,3}", "aaaa").unwrap();
        assert_eq!(caps[0], (0, 3));
    }
}
