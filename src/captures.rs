// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A read-only view over one match's capture offsets, in POSIX
//! `regmatch_t` style (`-1` for a group that didn't participate).

/// Capture offsets for one successful match, borrowing the text that was
/// searched. Index `0` is always the whole match; indices `1..` are the
/// pattern's explicit capture groups in declaration order.
///
/// Offsets are byte offsets, not char offsets: this engine matches 8-bit
/// bytes, not Unicode scalar values, so a group boundary is never
/// adjusted to a UTF-8 char boundary the way `str` indexing expects.
#[derive(Debug, Clone)]
pub struct Captures<'t> {
    text: &'t [u8],
    offsets: Vec<(i32, i32)>,
}

impl<'t> Captures<'t> {
    pub(crate) fn new(text: &'t [u8], offsets: Vec<(i32, i32)>) -> Captures<'t> {
        Captures { text, offsets }
    }

    /// Number of groups, including the implicit whole-match group 0.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Byte offsets of group `i`, or `None` if it didn't participate in
    /// the match (e.g. the unexercised branch of an alternation).
    pub fn pos(&self, i: usize) -> Option<(usize, usize)> {
        let (start, end) = *self.offsets.get(i)?;
        if start < 0 || end < 0 {
            None
        } else {
            Some((start as usize, end as usize))
        }
    }

    /// The bytes matched by group `i`.
    pub fn get(&self, i: usize) -> Option<&'t [u8]> {
        let (start, end) = self.pos(i)?;
        Some(&self.text[start..end])
    }

    /// Group `0`: the whole match.
    pub fn whole(&self) -> &'t [u8] {
        self.get(0).expect("group 0 always participates in a successful match")
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'t [u8]>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_group_is_none() {
        let caps = Captures::new(b"ab", vec![(0, 2), (-1, -1)]);
        assert_eq!(caps.whole(), b"ab");
        assert_eq!(caps.get(1), None);
    }

    #[test]
    fn matched_group_slices_correctly() {
        let caps = Captures::new(b"42-foo", vec![(0, 6), (0, 2), (3, 6)]);
        assert_eq!(caps.get(1), Some(&b"42"[..]));
        assert_eq!(caps.get(2), Some(&b"foo"[..]));
    }
}
