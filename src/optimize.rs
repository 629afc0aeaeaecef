// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Two optimizations computed once, right after the build pass, and
//! consulted (never relied on for correctness) by the walker:
//!
//! - fast-start: a byte/string/set/anchor that must appear at the start
//!   of any match, letting `matches()` skip ahead with `memchr` instead of
//!   spawning a task at every position; or, for a pattern that opens with
//!   DOTSTAR/DOTPLUS, trying only the original start position at all.
//! - dotstar/dotplus literal hints: for a `.*X` / `.+X` where `X` begins
//!   with a fixed literal, the byte offset of the next node lets the
//!   walker jump straight to candidate positions instead of growing the
//!   dot by one byte at a time.
//!
//! Both are pure speed-ups. Disabling fast-start (`CompileFlags::
//! NO_FAST_START`) must never change which match is reported; `walk.rs`
//! exercises both paths to hold that invariant.

use error::Error;
use node::{Arena, AnchorKind, NodeRef, Op, Payload, NONE};
use task::TASK_STACK_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FastStart {
    None,
    Byte(u8),
    Bytes { offset: u32, len: u32 },
    Set(u32),
    /// An anchor whose kind pins every possible match to a small, directly
    /// computable set of positions (start/end of input or of line).
    Anchor(AnchorKind),
    /// A DOTSTAR/DOTPLUS sitting at the very front of the pattern: its own
    /// quantifier already explores every later position a retry would try,
    /// so the walker tries `from` once instead of per-position scanning.
    DotScan,
}

/// Descend the left spine of the tree through operators that cannot erase
/// the progress already made (GROUP, CONCAT's left leg, PLUS, MULT with a
/// nonzero minimum), stopping at the first operator that either matches a
/// fixed byte/string/set/anchor or that could erase progress (STAR,
/// QUESTION, MULT with a zero minimum, ALTERNATE) — at which point no
/// anchor can be guaranteed. A DOTSTAR/DOTPLUS reached this way (it has no
/// further child to descend into) is accepted as a fast-start of its own.
pub fn compute_fast_start(arena: &Arena, root: NodeRef) -> FastStart {
    let mut node = root;
    loop {
        if node == NONE {
            return FastStart::None;
        }
        let n = arena.node(node);
        match n.op {
            Op::Group => node = n.b,
            Op::Concat => node = n.a,
            Op::Plus => node = n.b,
            Op::Mult => match &n.payload {
                Payload::Mult { min, .. } if *min > 0 => node = n.b,
                _ => return FastStart::None,
            },
            Op::Match => {
                return match &n.payload {
                    Payload::Match { ch1: Some(b), .. } => FastStart::Byte(*b),
                    _ => FastStart::None,
                };
            }
            Op::MatchStr => {
                return match n.payload {
                    Payload::MatchStr { offset, len } => FastStart::Bytes { offset, len },
                    _ => FastStart::None,
                };
            }
            Op::MatchSet => {
                return match n.payload {
                    Payload::MatchSet { set } => FastStart::Set(set),
                    _ => FastStart::None,
                };
            }
            Op::Anchor => {
                return match n.payload {
                    Payload::Anchor(AnchorKind::EndOfInput) => {
                        FastStart::Anchor(AnchorKind::EndOfInput)
                    }
                    Payload::Anchor(AnchorKind::StartOfLine) => {
                        FastStart::Anchor(AnchorKind::StartOfLine)
                    }
                    Payload::Anchor(AnchorKind::EndOfLine) => {
                        FastStart::Anchor(AnchorKind::EndOfLine)
                    }
                    _ => FastStart::None,
                };
            }
            Op::DotStar | Op::DotPlus => return FastStart::DotScan,
            _ => return FastStart::None,
        }
    }
}

/// Find the node the walker would execute immediately after `node`
/// finishes, without actually running the walker: ascend following the
/// same CONCAT/GROUP routing, then descend the left spine of whatever is
/// found. Returns `NONE` if the follow set is ambiguous (the parent is a
/// quantifier or alternation, where more than one thing could come next).
fn find_next_literal(arena: &Arena, node: NodeRef) -> NodeRef {
    let mut child = node;
    loop {
        let n = arena.node(child);
        let parent = n.parent;
        if parent == NONE {
            return NONE;
        }
        let p = arena.node(parent);
        match p.op {
            Op::Concat if p.a == child => return descend_left(arena, p.b),
            Op::Concat => {
                child = parent;
            }
            Op::Group => {
                child = parent;
            }
            _ => return NONE,
        }
    }
}

fn descend_left(arena: &Arena, mut node: NodeRef) -> NodeRef {
    loop {
        if node == NONE {
            return NONE;
        }
        let n = arena.node(node);
        match n.op {
            Op::Match | Op::MatchStr | Op::MatchSet => return node,
            Op::Concat => node = n.a,
            Op::Group => node = n.b,
            _ => return NONE,
        }
    }
}

/// Walk every node once and, for each DOTSTAR/DOTPLUS, stash the node
/// that unambiguously follows it (if any) in its `next_literal` cell.
/// Only needs a shared reference: the cell is the one piece of tree state
/// designed to be filled in after the build pass.
pub fn annotate_dotstar_hints(arena: &Arena) {
    for (idx, n) in arena.nodes.iter().enumerate() {
        if matches!(n.op, Op::DotStar | Op::DotPlus) {
            if let Payload::Quant { next_literal, .. } = &n.payload {
                next_literal.set(find_next_literal(arena, idx as NodeRef));
            }
        }
    }
}

/// Reject patterns whose nested-quantifier depth on some root-to-leaf path
/// would overrun the walker's fixed per-task counter stack. Real patterns
/// almost never approach this; it exists so the walker can use a fixed-size
/// array instead of a growable stack.
pub fn check_quantifier_depth(arena: &Arena, root: NodeRef) -> Result<(), Error> {
    fn walk(arena: &Arena, node: NodeRef, depth: usize) -> Result<(), Error> {
        if node == NONE {
            return Ok(());
        }
        let n = arena.node(node);
        let is_quant = matches!(
            n.op,
            Op::Plus | Op::Star | Op::Question | Op::Mult | Op::DotStar | Op::DotPlus
        );
        let next_depth = if is_quant { depth + 1 } else { depth };
        if next_depth > TASK_STACK_SIZE {
            return Err(Error::MalformedQuantifier {
                pos: 0,
                reason: "quantifiers nested too deeply for the engine's fixed recursion budget",
            });
        }
        walk(arena, n.a, next_depth)?;
        walk(arena, n.b, next_depth)?;
        Ok(())
    }
    walk(arena, root, 0)
}

/// Reject a backreference to a group number that was never declared.
/// `parse_backref` can't check this itself: the total group count isn't
/// known until the whole pattern has been walked.
pub fn check_group_references(arena: &Arena, ngroups: u8) -> Result<(), Error> {
    for n in &arena.nodes {
        if let Payload::MatchGrp { group } = n.payload {
            if group >= ngroups {
                return Err(Error::BadGroupReference {
                    pos: 0,
                    reason: "backreference to a group that was never declared",
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use compile::{build, measure};
    use flags::CompileFlags;
    use node::Arena;

    fn compile(pattern: &str) -> (Arena, NodeRef) {
        let bytes = pattern.as_bytes();
        let counts = measure(bytes, CompileFlags::empty()).unwrap();
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (root, _) = build(bytes, CompileFlags::empty(), &mut arena).unwrap();
        (arena, root)
    }

    #[test]
    fn fast_start_finds_leading_literal() {
        let (arena, root) = compile("abc");
        match compute_fast_start(&arena, root) {
            FastStart::Bytes { offset, len } => assert_eq!(arena.string(offset, len), b"abc"),
            other => panic!("expected Bytes fast-start, got {:?}", other),
        }
    }

    #[test]
    fn fast_start_gives_up_on_leading_star() {
        let (arena, root) = compile("a*bc");
        assert_eq!(compute_fast_start(&arena, root), FastStart::None);
    }

    #[test]
    fn fast_start_descends_through_mandatory_plus() {
        let (arena, root) = compile("a+bc");
        match compute_fast_start(&arena, root) {
            FastStart::Byte(b'a') => {}
            other => panic!("expected Byte('a'), got {:?}", other),
        }
    }

    #[test]
    fn fast_start_accepts_leading_dotstar() {
        let (arena, root) = compile(".*needle");
        assert_eq!(compute_fast_start(&arena, root), FastStart::DotScan);
    }

    #[test]
    fn fast_start_accepts_leading_dotplus() {
        let (arena, root) = compile(".+needle");
        assert_eq!(compute_fast_start(&arena, root), FastStart::DotScan);
    }

    #[test]
    fn fast_start_accepts_fast_placeable_anchors() {
        let (arena, root) = compile("^foo");
        assert_eq!(compute_fast_start(&arena, root), FastStart::Anchor(AnchorKind::StartOfLine));

        let (arena, root) = compile(r"\Zfoo");
        assert_eq!(compute_fast_start(&arena, root), FastStart::Anchor(AnchorKind::EndOfInput));
    }

    #[test]
    fn fast_start_does_not_fast_place_word_boundary() {
        let (arena, root) = compile(r"\bfoo");
        assert_eq!(compute_fast_start(&arena, root), FastStart::None);
    }

    #[test]
    fn dotstar_hint_points_at_following_literal() {
        let (arena, root) = compile(".*abc");
        annotate_dotstar_hints(&arena);
        let dotstar = arena.nodes.iter().position(|n| n.op == Op::DotStar).unwrap() as NodeRef;
        if let Payload::Quant { next_literal, .. } = &arena.node(dotstar).payload {
            let hint = next_literal.get();
            assert_ne!(hint, NONE);
            assert_eq!(arena.node(hint).op, Op::MatchStr);
        } else {
            panic!("expected Quant payload");
        }
        let _ = root;
    }

    #[test]
    fn shallow_nesting_is_accepted() {
        let (arena, root) = compile("((a+)+)+");
        assert!(check_quantifier_depth(&arena, root).is_ok());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let (arena, root) = compile("(((a+)+)+)+");
        assert!(check_quantifier_depth(&arena, root).is_err());
    }

    #[test]
    fn undeclared_group_reference_is_rejected() {
        let bytes = b"(a)\\2";
        let counts = measure(bytes, CompileFlags::empty()).unwrap();
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (_, groups) = build(bytes, CompileFlags::empty(), &mut arena).unwrap();
        assert!(check_group_references(&arena, groups).is_err());
    }
}
