// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The two-pass compiler: a measuring pass that computes exact arena
//! capacity without building any structure, and a build pass that
//! allocates that capacity once and populates the tree.
//!
//! Both passes share one grammar walk (`parse`), generic over a `Sink`
//! trait that either counts nodes or actually writes them. This keeps the
//! tricky part — `place_here`/`wrap_above`/alternation rebasing — written
//! exactly once, so the two passes cannot disagree about tree shape.

use charset::{CharSet, SetBuilder};
use error::Error;
use flags::CompileFlags;
use node::{AnchorKind, Arena, ClassCode, NodeRef, Op, Payload, NONE};

/// Exact upper bounds for a compiled pattern, computed by `measure` and
/// used to pre-size the `Arena` before `build` ever runs.
#[derive(Debug, Clone, Copy)]
pub struct Counts {
    pub nodes: usize,
    pub sets: usize,
    pub string_bytes: usize,
    pub groups: u8,
}

/// Every place the grammar walk creates a node, a set or a literal string.
/// `Counter` only ever tallies; `Arena` (see `node.rs`) actually stores.
trait Sink {
    fn alloc(&mut self, op: Op, parent: NodeRef, payload: Payload) -> NodeRef;
    fn get_a(&self, n: NodeRef) -> NodeRef;
    fn get_b(&self, n: NodeRef) -> NodeRef;
    fn get_parent(&self, n: NodeRef) -> NodeRef;
    fn get_op(&self, n: NodeRef) -> Op;
    fn set_a(&mut self, n: NodeRef, a: NodeRef);
    fn set_b(&mut self, n: NodeRef, b: NodeRef);
    fn set_parent(&mut self, n: NodeRef, p: NodeRef);
    fn push_set(&mut self, set: CharSet) -> u32;
    fn push_string(&mut self, bytes: &[u8]) -> (u32, u32);
}

impl Sink for Arena {
    fn alloc(&mut self, op: Op, parent: NodeRef, payload: Payload) -> NodeRef {
        self.push(op, parent, payload)
    }
    fn get_a(&self, n: NodeRef) -> NodeRef {
        self.node(n).a
    }
    fn get_b(&self, n: NodeRef) -> NodeRef {
        self.node(n).b
    }
    fn get_parent(&self, n: NodeRef) -> NodeRef {
        self.node(n).parent
    }
    fn get_op(&self, n: NodeRef) -> Op {
        self.node(n).op
    }
    fn set_a(&mut self, n: NodeRef, a: NodeRef) {
        self.nodes[n as usize].a = a;
    }
    fn set_b(&mut self, n: NodeRef, b: NodeRef) {
        self.nodes[n as usize].b = b;
    }
    fn set_parent(&mut self, n: NodeRef, p: NodeRef) {
        self.nodes[n as usize].parent = p;
    }
    fn push_set(&mut self, set: CharSet) -> u32 {
        Arena::push_set(self, set)
    }
    fn push_string(&mut self, bytes: &[u8]) -> (u32, u32) {
        Arena::push_string(self, bytes)
    }
}

/// A minimal shadow arena used only to replay the exact same tree-shape
/// decisions the real build pass will make, without storing payloads or
/// literal bytes. This is what lets `measure` be an honest upper bound:
/// it walks precisely the same grammar and the same place-here/wrap-above
/// logic, just without the bytes.
struct Counter {
    shadow: Vec<(NodeRef, NodeRef, NodeRef, Op)>, // (a, b, parent, op)
    sets: usize,
    string_bytes: usize,
}

impl Counter {
    fn new() -> Counter {
        Counter { shadow: Vec::new(), sets: 0, string_bytes: 0 }
    }

    fn counts(&self, groups: u8) -> Counts {
        Counts {
            nodes: self.shadow.len(),
            sets: self.sets,
            string_bytes: self.string_bytes,
            groups,
        }
    }
}

impl Sink for Counter {
    fn alloc(&mut self, op: Op, parent: NodeRef, _payload: Payload) -> NodeRef {
        let idx = self.shadow.len() as NodeRef;
        self.shadow.push((NONE, NONE, parent, op));
        idx
    }
    fn get_a(&self, n: NodeRef) -> NodeRef {
        self.shadow[n as usize].0
    }
    fn get_b(&self, n: NodeRef) -> NodeRef {
        self.shadow[n as usize].1
    }
    fn get_parent(&self, n: NodeRef) -> NodeRef {
        self.shadow[n as usize].2
    }
    fn get_op(&self, n: NodeRef) -> Op {
        self.shadow[n as usize].3
    }
    fn set_a(&mut self, n: NodeRef, a: NodeRef) {
        self.shadow[n as usize].0 = a;
    }
    fn set_b(&mut self, n: NodeRef, b: NodeRef) {
        self.shadow[n as usize].1 = b;
    }
    fn set_parent(&mut self, n: NodeRef, p: NodeRef) {
        self.shadow[n as usize].2 = p;
    }
    fn push_set(&mut self, _set: CharSet) -> u32 {
        self.sets += 1;
        (self.sets - 1) as u32
    }
    fn push_string(&mut self, bytes: &[u8]) -> (u32, u32) {
        let offset = self.string_bytes as u32;
        self.string_bytes += bytes.len();
        (offset, bytes.len() as u32)
    }
}

/// Only GROUP and ALTERNATE are created with a deliberately-empty `b` leg
/// that the *next* emission is meant to fill in. Every other op either has
/// no structural `b` (leaves) or has its `b` filled atomically at creation
/// time (quantifiers, via `wrap_above`).
fn is_open_container(op: Op) -> bool {
    matches!(op, Op::Group | Op::Alternate)
}

/// Attach `new_node` to the tree at the current cursor `last`, per spec
/// §4.2: root if empty, direct attach if `last`'s structural slot is still
/// open, otherwise a CONCAT splice.
fn place_here<S: Sink>(sink: &mut S, last: NodeRef, new_node: NodeRef) -> NodeRef {
    if last == NONE {
        return new_node;
    }
    if sink.get_b(last) == NONE && is_open_container(sink.get_op(last)) {
        sink.set_b(last, new_node);
        sink.set_parent(new_node, last);
        return new_node;
    }
    let old_parent = sink.get_parent(last);
    let concat = sink.alloc(Op::Concat, old_parent, Payload::None);
    reparent_child(sink, old_parent, last, concat);
    sink.set_parent(concat, old_parent);
    sink.set_a(concat, last);
    sink.set_parent(last, concat);
    sink.set_b(concat, new_node);
    sink.set_parent(new_node, concat);
    concat
}

/// Insert `new_node` between `last` and its parent, with `last` becoming
/// `new_node`'s right child. Used for `+ * ? {m,n}`, which bind to the atom
/// that was just emitted rather than starting a new sibling.
fn wrap_above<S: Sink>(sink: &mut S, last: NodeRef, op: Op, payload: Payload) -> NodeRef {
    let old_parent = sink.get_parent(last);
    let new_node = sink.alloc(op, old_parent, payload);
    reparent_child(sink, old_parent, last, new_node);
    sink.set_parent(new_node, old_parent);
    sink.set_b(new_node, last);
    sink.set_parent(last, new_node);
    new_node
}

fn reparent_child<S: Sink>(sink: &mut S, parent: NodeRef, old_child: NodeRef, new_child: NodeRef) {
    if parent == NONE {
        return;
    }
    if sink.get_a(parent) == old_child {
        sink.set_a(parent, new_child);
    } else {
        sink.set_b(parent, new_child);
    }
}

/// `|` rebases the chain built so far in the current scope under a new
/// ALTERNATE node: walk up from `last` past any CONCAT links to find the
/// scope's content root, then splice an ALTERNATE in its place with that
/// root as the left branch.
fn rebase_as_alternate<S: Sink>(sink: &mut S, last: NodeRef) -> NodeRef {
    let mut r = last;
    loop {
        let p = sink.get_parent(r);
        if p == NONE || sink.get_op(p) != Op::Concat {
            break;
        }
        r = p;
    }
    let old_parent = sink.get_parent(r);
    let alt = sink.alloc(Op::Alternate, old_parent, Payload::None);
    reparent_child(sink, old_parent, r, alt);
    sink.set_parent(alt, old_parent);
    sink.set_a(alt, r);
    sink.set_parent(r, alt);
    alt
}

/// Shared cursor over the pattern bytes.
struct Cursor<'p> {
    pat: &'p [u8],
    pos: usize,
}

impl<'p> Cursor<'p> {
    fn new(pat: &'p [u8]) -> Cursor<'p> {
        Cursor { pat, pos: 0 }
    }
    fn eof(&self) -> bool {
        self.pos >= self.pat.len()
    }
    fn peek(&self) -> Option<u8> {
        self.pat.get(self.pos).copied()
    }
    fn peek_at(&self, off: usize) -> Option<u8> {
        self.pat.get(self.pos + off).copied()
    }
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }
    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

fn is_quantifier_start(b: u8) -> bool {
    matches!(b, b'?' | b'+' | b'*' | b'{')
}

/// True for the bytes that end a literal run: they start some other
/// construct that the grammar handles on its own.
fn starts_special(c: &Cursor) -> bool {
    match c.peek() {
        None => true,
        Some(b'(') | Some(b'[') | Some(b'.') | Some(b'^') | Some(b'$')
        | Some(b'|') | Some(b')') => true,
        Some(b'\\') => match c.peek_at(1) {
            Some(b) => matches!(
                b,
                b'd' | b'D' | b'w' | b'W' | b's' | b'S' | b'A' | b'Z' | b'b' | b'B' | b'R' | b'g'
            ) || b.is_ascii_digit(),
            None => false, // trailing lone backslash: handled as an error by the literal scanner
        },
        _ => false,
    }
}

/// Consume one literal-producing unit at the cursor (a plain byte, a
/// recognized escape, or one byte of a `\Q...\E` block) and push its byte
/// onto `buf`, folding case if `caseless`. Returns `false` if nothing
/// literal starts here.
fn scan_one_literal_byte(c: &mut Cursor, flags: CompileFlags, buf: &mut Vec<u8>) -> Result<bool, Error> {
    if starts_special(c) {
        return Ok(false);
    }
    let caseless = flags.contains(CompileFlags::CASELESS);
    let b = match c.bump().unwrap() {
        b'\\' => {
            let e = c.bump().ok_or_else(|| Error::Syntax {
                pos: c.pos,
                reason: "incomplete escape sequence",
            })?;
            match e {
                b'n' => b'\n',
                b't' => b'\t',
                b'r' => b'\r',
                b'x' => parse_hex_escape(c)?,
                b'.' | b'\\' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'|' | b'^' | b'$'
                | b'?' | b'+' | b'*' => e,
                _ => {
                    return Err(Error::Syntax {
                        pos: c.pos - 1,
                        reason: "unsupported escape sequence",
                    })
                }
            }
        }
        b => b,
    };
    let b = if caseless { b.to_ascii_lowercase() } else { b };
    buf.push(b);
    Ok(true)
}

fn parse_hex_escape(c: &mut Cursor) -> Result<u8, Error> {
    if !c.eat(b'{') {
        return Err(Error::Syntax { pos: c.pos, reason: "expected '{' after \\x" });
    }
    let start = c.pos;
    while c.peek().map_or(false, |b| b.is_ascii_hexdigit()) {
        c.pos += 1;
    }
    if c.pos == start {
        return Err(Error::Syntax { pos: c.pos, reason: "\\x{} needs at least one hex digit" });
    }
    let text = std::str::from_utf8(&c.pat[start..c.pos]).unwrap();
    let value = u32::from_str_radix(text, 16)
        .map_err(|_| Error::Syntax { pos: start, reason: "invalid hex escape" })?;
    if !c.eat(b'}') {
        return Err(Error::Syntax { pos: c.pos, reason: "unterminated \\x{...}" });
    }
    if value > 0xff {
        return Err(Error::Syntax { pos: start, reason: "\\x{...} out of 8-bit range" });
    }
    Ok(value as u8)
}

/// Scan a maximal run of literal bytes starting at the cursor, fusing them
/// into one buffer for a MATCHSTR leaf. Stops one byte short if the byte
/// right after the run would otherwise have a quantifier bind to the
/// whole run instead of to its last byte.
fn scan_literal_run(c: &mut Cursor, flags: CompileFlags) -> Result<Option<Vec<u8>>, Error> {
    if c.peek() == Some(b'\\') && c.peek_at(1) == Some(b'Q') {
        c.pos += 2;
        let caseless = flags.contains(CompileFlags::CASELESS);
        let mut buf = Vec::new();
        loop {
            if c.eof() {
                break;
            }
            if c.peek() == Some(b'\\') && c.peek_at(1) == Some(b'E') {
                c.pos += 2;
                break;
            }
            let b = c.bump().unwrap();
            buf.push(if caseless { b.to_ascii_lowercase() } else { b });
        }
        if c.peek().map_or(false, is_quantifier_start) && !buf.is_empty() {
            buf.pop();
            c.pos -= 1;
        }
        return Ok(Some(buf));
    }

    let mut buf = Vec::new();
    loop {
        let before = c.pos;
        if !scan_one_literal_byte(c, flags, &mut buf)? {
            break;
        }
        if c.peek().map_or(false, is_quantifier_start) {
            // The byte we just consumed must instead stand alone so the
            // quantifier binds to it, not to the whole fused run.
            if buf.len() > 1 {
                buf.pop();
                c.pos = before;
            }
            break;
        }
    }
    if buf.is_empty() {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

fn parse_number(c: &mut Cursor) -> Result<Option<u32>, Error> {
    let start = c.pos;
    while c.peek().map_or(false, |b| b.is_ascii_digit()) {
        c.pos += 1;
    }
    if c.pos == start {
        return Ok(None);
    }
    let text = std::str::from_utf8(&c.pat[start..c.pos]).unwrap();
    if text.len() > 1 && text.starts_with('0') {
        return Err(Error::MalformedQuantifier { pos: start, reason: "leading zero" });
    }
    let value: u32 = text
        .parse()
        .map_err(|_| Error::MalformedQuantifier { pos: start, reason: "number too large" })?;
    Ok(Some(value))
}

/// `{m}`, `{m,}` or `{m,n}`, with bounds `<= 1000`.
fn parse_brace_range(c: &mut Cursor) -> Result<(u16, Option<u16>), Error> {
    let start = c.pos;
    debug_assert_eq!(c.peek(), Some(b'{'));
    c.pos += 1;
    let min = parse_number(c)?.ok_or(Error::MalformedQuantifier {
        pos: c.pos,
        reason: "missing minimum in {m,n}",
    })?;
    let max = if c.eat(b',') {
        parse_number(c)?
    } else {
        Some(min)
    };
    if !c.eat(b'}') {
        return Err(Error::MalformedQuantifier { pos: c.pos, reason: "unterminated {m,n}" });
    }
    if min > 1000 || max.map_or(false, |m| m > 1000) {
        return Err(Error::MalformedQuantifier { pos: start, reason: "bound exceeds 1000" });
    }
    if let Some(max) = max {
        if min > max {
            return Err(Error::MalformedQuantifier { pos: start, reason: "min exceeds max" });
        }
    }
    Ok((min as u16, max.map(|m| m as u16)))
}

fn parse_lazy(c: &mut Cursor) -> bool {
    c.eat(b'?')
}

/// After any atom is emitted, check for (and apply) a trailing quantifier.
fn maybe_quantifier<S: Sink>(c: &mut Cursor, sink: &mut S, last: &mut NodeRef) -> Result<(), Error> {
    match c.peek() {
        Some(b'?') => {
            c.pos += 1;
            let lazy = parse_lazy(c);
            *last = wrap_above(sink, *last, Op::Question, quant_payload(lazy));
        }
        Some(b'+') => {
            c.pos += 1;
            let lazy = parse_lazy(c);
            *last = wrap_above(sink, *last, Op::Plus, quant_payload(lazy));
        }
        Some(b'*') => {
            c.pos += 1;
            let lazy = parse_lazy(c);
            *last = wrap_above(sink, *last, Op::Star, quant_payload(lazy));
        }
        Some(b'{') => {
            // Disambiguate a literal `{` (e.g. `a{` with no valid range)
            // from a real bound: only consume it as a quantifier if it
            // parses as one.
            let save = c.pos;
            match parse_brace_range(c) {
                Ok((min, max)) => {
                    let lazy = parse_lazy(c);
                    *last = wrap_above(
                        sink,
                        *last,
                        Op::Mult,
                        Payload::Mult { min, max, lazy },
                    );
                }
                Err(_) => {
                    c.pos = save;
                }
            }
        }
        _ => {}
    }
    // A second quantifier character directly following the first (other
    // than the lazy `?` already consumed above) has nothing left to bind
    // to.
    if let Some(b) = c.peek() {
        if is_quantifier_start(b) {
            return Err(Error::Syntax { pos: c.pos, reason: "double quantifier" });
        }
    }
    Ok(())
}

fn quant_payload(lazy: bool) -> Payload {
    Payload::Quant { lazy, next_literal: std::cell::Cell::new(NONE) }
}

fn parse_set<S: Sink>(c: &mut Cursor, flags: CompileFlags, sink: &mut S, last: NodeRef) -> Result<NodeRef, Error> {
    debug_assert_eq!(c.peek(), Some(b'['));
    let start = c.pos;
    c.pos += 1;
    let caseless = flags.contains(CompileFlags::CASELESS);
    let mut builder = SetBuilder::new();
    if c.eat(b'^') {
        builder.negate();
    }
    let mut first = true;
    loop {
        match c.peek() {
            None => return Err(Error::MalformedSet { pos: start, reason: "unterminated '['" }),
            Some(b']') if !first => {
                c.pos += 1;
                break;
            }
            _ => {}
        }
        first = false;
        if c.peek() == Some(b'\\') {
            match c.peek_at(1) {
                Some(cls @ (b'd' | b'D' | b'w' | b'W' | b's' | b'S' | b't')) => {
                    c.pos += 2;
                    builder.add_class(cls);
                    continue;
                }
                _ => {}
            }
        }
        let lo = set_member_byte(c)?;
        if c.peek() == Some(b'-') && c.peek_at(1).map_or(false, |b| b != b']') {
            c.pos += 1;
            let hi = set_member_byte(c)?;
            builder.add_range(lo, hi, caseless)?;
        } else {
            builder.add_byte(lo, caseless);
        }
    }
    let set = builder.finish();
    let idx = sink.push_set(set);
    let node = sink.alloc(Op::MatchSet, NONE, Payload::MatchSet { set: idx });
    Ok(place_here(sink, last, node))
}

fn set_member_byte(c: &mut Cursor) -> Result<u8, Error> {
    match c.bump() {
        None => Err(Error::MalformedSet { pos: c.pos, reason: "unterminated '['" }),
        Some(b'\\') => match c.bump() {
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'r') => Ok(b'\r'),
            Some(b'x') => parse_hex_escape(c),
            Some(b) => Ok(b),
            None => Err(Error::MalformedSet { pos: c.pos, reason: "incomplete escape in set" }),
        },
        Some(b) => Ok(b),
    }
}

fn parse_backref<S: Sink>(c: &mut Cursor, sink: &mut S, last: NodeRef) -> Result<NodeRef, Error> {
    debug_assert_eq!(c.peek(), Some(b'\\'));
    let start = c.pos;
    c.pos += 1;
    let group = if c.eat(b'g') {
        if c.eat(b'{') {
            let n = parse_number(c)
                .map_err(|_| Error::BadGroupReference { pos: start, reason: "malformed \\g{...}" })?
                .ok_or(Error::BadGroupReference { pos: start, reason: "malformed \\g{...}" })?;
            if !c.eat(b'}') {
                return Err(Error::BadGroupReference { pos: start, reason: "unterminated \\g{...}" });
            }
            n
        } else {
            parse_number(c)?.ok_or(Error::BadGroupReference {
                pos: start,
                reason: "malformed \\gN",
            })?
        }
    } else if c.peek() == Some(b'{') {
        c.pos += 1;
        let n = parse_number(c)?.ok_or(Error::BadGroupReference {
            pos: start,
            reason: "malformed \\{N}",
        })?;
        if !c.eat(b'}') {
            return Err(Error::BadGroupReference { pos: start, reason: "unterminated \\{N}" });
        }
        n
    } else {
        parse_number(c)?.ok_or(Error::BadGroupReference {
            pos: start,
            reason: "malformed backreference",
        })?
    };
    if group == 0 || group > 255 {
        return Err(Error::BadGroupReference { pos: start, reason: "group out of range" });
    }
    let node = sink.alloc(Op::MatchGrp, NONE, Payload::MatchGrp { group: group as u8 });
    Ok(place_here(sink, last, node))
}

/// Parses one atom (and, via `maybe_quantifier`, any quantifier suffix),
/// updating `last` in place. Recurses for `(...)`.
fn parse_atom<S: Sink>(
    c: &mut Cursor,
    flags: CompileFlags,
    sink: &mut S,
    last: &mut NodeRef,
    group_count: &mut u8,
) -> Result<(), Error> {
    match c.peek().unwrap() {
        b'(' => {
            *last = parse_group(c, flags, sink, *last, group_count)?;
        }
        b'[' => {
            *last = parse_set(c, flags, sink, *last)?;
        }
        b'.' => {
            c.pos += 1;
            match c.peek() {
                Some(b'+') => {
                    c.pos += 1;
                    let lazy = parse_lazy(c);
                    let node = sink.alloc(Op::DotPlus, NONE, quant_payload(lazy));
                    *last = place_here(sink, *last, node);
                    return Ok(());
                }
                Some(b'*') => {
                    c.pos += 1;
                    let lazy = parse_lazy(c);
                    let node = sink.alloc(Op::DotStar, NONE, quant_payload(lazy));
                    *last = place_here(sink, *last, node);
                    return Ok(());
                }
                _ => {
                    let node = sink.alloc(
                        Op::Match,
                        NONE,
                        Payload::Match { ch1: None, ch2: Some(ClassCode::Dot) },
                    );
                    *last = place_here(sink, *last, node);
                }
            }
        }
        b'^' => {
            c.pos += 1;
            let node = sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::StartOfLine));
            *last = place_here(sink, *last, node);
        }
        b'$' => {
            c.pos += 1;
            let node = sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::EndOfLine));
            *last = place_here(sink, *last, node);
        }
        b'\\' => match c.peek_at(1) {
            Some(b'd') => *last = emit_class(c, sink, *last, 2, ClassCode::Digit),
            Some(b'D') => *last = emit_class(c, sink, *last, 2, ClassCode::NotDigit),
            Some(b'w') => *last = emit_class(c, sink, *last, 2, ClassCode::Word),
            Some(b'W') => *last = emit_class(c, sink, *last, 2, ClassCode::NotWord),
            Some(b's') => *last = emit_class(c, sink, *last, 2, ClassCode::Space),
            Some(b'S') => *last = emit_class(c, sink, *last, 2, ClassCode::NotSpace),
            Some(b'A') => {
                c.pos += 2;
                let node = sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::StartOfInput));
                *last = place_here(sink, *last, node);
            }
            Some(b'Z') => {
                c.pos += 2;
                let node = sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::EndOfInput));
                *last = place_here(sink, *last, node);
            }
            Some(b'b') => {
                c.pos += 2;
                let node = sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::WordBoundary));
                *last = place_here(sink, *last, node);
            }
            Some(b'B') => {
                c.pos += 2;
                let node =
                    sink.alloc(Op::Anchor, NONE, Payload::Anchor(AnchorKind::NotWordBoundary));
                *last = place_here(sink, *last, node);
            }
            Some(b'R') => {
                c.pos += 2;
                let node = sink.alloc(Op::Crlf, NONE, Payload::None);
                *last = place_here(sink, *last, node);
            }
            Some(b'g') | Some(b'0'..=b'9') => {
                *last = parse_backref(c, sink, *last)?;
            }
            _ => {
                if let Some(bytes) = scan_literal_run(c, flags)? {
                    *last = emit_literal_bytes(sink, *last, &bytes);
                } else {
                    return Err(Error::Syntax { pos: c.pos, reason: "unsupported escape" });
                }
            }
        },
        b')' | b'|' => unreachable!("caller handles group/alternation boundaries"),
        b if is_quantifier_start(b) => {
            return Err(Error::Syntax { pos: c.pos, reason: "quantifier with no preceding atom" })
        }
        _ => {
            if let Some(bytes) = scan_literal_run(c, flags)? {
                *last = emit_literal_bytes(sink, *last, &bytes);
            } else {
                return Err(Error::Internal("literal scan produced nothing"));
            }
        }
    }
    maybe_quantifier(c, sink, last)
}

fn emit_class<S: Sink>(c: &mut Cursor, sink: &mut S, last: NodeRef, width: usize, class: ClassCode) -> NodeRef {
    c.pos += width;
    let node = sink.alloc(Op::Match, NONE, Payload::Match { ch1: None, ch2: Some(class) });
    place_here(sink, last, node)
}

fn emit_literal_bytes<S: Sink>(sink: &mut S, last: NodeRef, bytes: &[u8]) -> NodeRef {
    if bytes.len() >= 2 {
        let (offset, len) = sink.push_string(bytes);
        let node = sink.alloc(Op::MatchStr, NONE, Payload::MatchStr { offset, len });
        place_here(sink, last, node)
    } else {
        let node =
            sink.alloc(Op::Match, NONE, Payload::Match { ch1: Some(bytes[0]), ch2: None });
        place_here(sink, last, node)
    }
}

fn parse_group<S: Sink>(
    c: &mut Cursor,
    flags: CompileFlags,
    sink: &mut S,
    last: NodeRef,
    group_count: &mut u8,
) -> Result<NodeRef, Error> {
    debug_assert_eq!(c.peek(), Some(b'('));
    let start = c.pos;
    c.pos += 1;
    let capturing = if c.peek() == Some(b'?') {
        if c.peek_at(1) == Some(b':') {
            c.pos += 2;
            false
        } else {
            return Err(Error::Syntax { pos: c.pos, reason: "misplaced '?' after '('" });
        }
    } else {
        true
    };
    let index = if capturing {
        *group_count = group_count
            .checked_add(1)
            .ok_or(Error::BadGroupReference { pos: start, reason: "more than 255 groups" })?;
        Some(*group_count - 1)
    } else {
        None
    };
    let group_node = sink.alloc(Op::Group, NONE, Payload::Group { index });
    let group_node = place_here(sink, last, group_node);

    let mut inner_last = group_node;
    loop {
        match c.peek() {
            None => return Err(Error::Syntax { pos: start, reason: "unterminated '('" }),
            Some(b')') => {
                c.pos += 1;
                break;
            }
            Some(b'|') => {
                c.pos += 1;
                inner_last = rebase_as_alternate(sink, inner_last);
            }
            _ => parse_atom(c, flags, sink, &mut inner_last, group_count)?,
        }
    }
    Ok(group_node)
}

/// Runs the shared grammar over `pattern` through `sink`, returning the
/// tree root (always the synthesized outer group 0) and the total number
/// of declared capture groups (including group 0 itself).
fn parse<S: Sink>(pattern: &[u8], flags: CompileFlags, sink: &mut S) -> Result<(NodeRef, u8), Error> {
    let root = sink.alloc(Op::Group, NONE, Payload::Group { index: Some(0) });
    let mut group_count: u8 = 1;
    let mut last = root;
    let mut c = Cursor::new(pattern);
    loop {
        match c.peek() {
            None => break,
            Some(b'|') => {
                c.pos += 1;
                last = rebase_as_alternate(sink, last);
            }
            Some(b')') => {
                return Err(Error::Syntax { pos: c.pos, reason: "unmatched ')'" });
            }
            _ => parse_atom(&mut c, flags, sink, &mut last, &mut group_count)?,
        }
    }
    let done = sink.alloc(Op::Done, NONE, Payload::None);
    place_here(sink, last, done);
    Ok((root, group_count))
}

/// The measuring pass: walks the pattern once and returns exact upper
/// bounds for the arena, building no real tree.
pub fn measure(pattern: &[u8], flags: CompileFlags) -> Result<Counts, Error> {
    if pattern.len() > u32::MAX as usize / 2 {
        return Err(Error::OutOfMemory);
    }
    let mut counter = Counter::new();
    let (_, groups) = parse(pattern, flags, &mut counter)?;
    Ok(counter.counts(groups))
}

/// The build pass: allocates the arena at exactly the sizes `measure`
/// returned and walks the pattern again, this time actually writing nodes.
pub fn build(pattern: &[u8], flags: CompileFlags, arena: &mut Arena) -> Result<(NodeRef, u8), Error> {
    parse(pattern, flags, arena)
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::Arena;

    fn compile_ok(pattern: &str, flags: CompileFlags) -> (Arena, NodeRef, u8) {
        let bytes = pattern.as_bytes();
        let counts = measure(bytes, flags).expect("measure failed");
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (root, groups) = build(bytes, flags, &mut arena).expect("build failed");
        assert_eq!(arena.len(), counts.nodes, "build exceeded/undershot measured node count");
        (arena, root, groups)
    }

    #[test]
    fn measuring_pass_matches_build_node_count() {
        for pat in [
            "abc",
            "a(b+)c",
            r"^(\d+)-(\w+)$",
            "a?a?a?a?aaaa",
            "(cat|car|cart)",
            ".*?(abc)",
            "[a-z0-9]+",
            r"\bfoo\B",
        ] {
            compile_ok(pat, CompileFlags::empty());
        }
    }

    #[test]
    fn literal_run_fuses_into_matchstr() {
        let (arena, root, _) = compile_ok("abc", CompileFlags::empty());
        let group = arena.node(root);
        assert_eq!(group.op, Op::Group);
        // group.b should eventually lead to a MatchStr node somewhere in
        // the small tree (abc fused, then DONE appended via CONCAT).
        let mut found = false;
        for n in &arena.nodes {
            if n.op == Op::MatchStr {
                found = true;
            }
        }
        assert!(found, "expected a fused MATCHSTR for \"abc\"");
    }

    #[test]
    fn quantifier_stops_fusion_one_byte_short() {
        let (arena, _, _) = compile_ok("ab+c", CompileFlags::empty());
        let has_plus = arena.nodes.iter().any(|n| n.op == Op::Plus);
        assert!(has_plus, "expected a PLUS node wrapping the trailing 'b'");
    }

    #[test]
    fn double_quantifier_is_syntax_error() {
        let bytes = b"a**";
        let counts = measure(bytes, CompileFlags::empty());
        assert!(matches!(counts, Err(Error::Syntax { .. })));
    }

    #[test]
    fn quantifier_with_no_atom_is_syntax_error() {
        let bytes = b"*abc";
        assert!(matches!(measure(bytes, CompileFlags::empty()), Err(Error::Syntax { .. })));
    }

    #[test]
    fn bad_quantifier_bounds() {
        assert!(matches!(
            measure(b"a{5,2}", CompileFlags::empty()),
            Err(Error::MalformedQuantifier { .. })
        ));
        assert!(matches!(
            measure(b"a{01}", CompileFlags::empty()),
            Err(Error::MalformedQuantifier { .. })
        ));
        assert!(matches!(
            measure(b"a{1001}", CompileFlags::empty()),
            Err(Error::MalformedQuantifier { .. })
        ));
    }

    #[test]
    fn group_indices_are_dense() {
        let (arena, _, groups) = compile_ok("(a)(b(c))", CompileFlags::empty());
        assert_eq!(groups, 3); // group 0 + two explicit groups
        let mut seen = Vec::new();
        for n in &arena.nodes {
            if let Payload::Group { index: Some(i) } = n.payload {
                seen.push(i);
            }
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn out_of_range_backreference_is_rejected() {
        assert!(matches!(
            measure(b"\\0", CompileFlags::empty()),
            Err(Error::BadGroupReference { .. })
        ));
    }

    #[test]
    fn unterminated_bracket_is_malformed_set() {
        assert!(matches!(
            measure(b"[abc", CompileFlags::empty()),
            Err(Error::MalformedSet { .. })
        ));
    }
}
