// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The six literal end-to-end scenarios, run through the `matches`/`group`
//! entry point so the test doubles as coverage of the stored-last-match API.

use rele::{MatchFlags, Regex};

fn groups(re: &Regex, text: &[u8]) -> Vec<Option<(usize, usize)>> {
    assert!(re.matches(text, MatchFlags::empty()));
    re.groups().to_vec()
}

#[test]
fn scenario_1_plain_literal() {
    let re = Regex::compile("abc").unwrap();
    let g = groups(&re, b"xxabcyy");
    assert_eq!(g[0], Some((2, 5)));
}

#[test]
fn scenario_2_plus_capture() {
    let re = Regex::compile("a(b+)c").unwrap();
    let g = groups(&re, b"aabbbcd");
    assert_eq!(g[0], Some((1, 6)));
    assert_eq!(g[1], Some((2, 5)));
}

#[test]
fn scenario_3_anchored_two_groups() {
    let re = Regex::compile(r"^(\d+)-(\w+)$").unwrap();
    let g = groups(&re, b"42-foo");
    assert_eq!(g[0], Some((0, 6)));
    assert_eq!(g[1], Some((0, 2)));
    assert_eq!(g[2], Some((3, 6)));
}

#[test]
fn scenario_4_optional_chain() {
    let re = Regex::compile("a?a?a?a?aaaa").unwrap();
    let g = groups(&re, b"aaaa");
    assert_eq!(g[0], Some((0, 4)));
}

#[test]
fn scenario_5_alternation_first_branch_wins() {
    let re = Regex::compile("(cat|car|cart)").unwrap();
    let g = groups(&re, b"cart");
    assert_eq!(g[0], Some((0, 3)));
    assert_eq!(g[1], Some((0, 3)));
}

#[test]
fn scenario_6_lazy_dotstar_capture() {
    let re = Regex::compile(r".*?(abc)").unwrap();
    let g = groups(&re, b"xxabcabc");
    assert_eq!(g[0], Some((0, 5)));
    assert_eq!(g[1], Some((2, 5)));
}
