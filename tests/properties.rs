// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cross-cutting properties from the engine's testable-properties section:
//! capture-slot shape, determinism, caseless equivalence, fast-start
//! on/off agreement, and the `keep_tasks` free-list behavior.

use rele::{CompileFlags, MatchFlags, Regex};

#[test]
fn group_zero_always_spans_a_valid_range() {
    let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
    let caps = re.find("id 42-foo here").unwrap();
    let (start, end) = caps.pos(0).unwrap();
    assert!(start <= end);
    assert!(end <= "id 42-foo here".len());
}

#[test]
fn unmatched_groups_are_both_unset_or_both_set() {
    let re = Regex::compile("(a)|(b)").unwrap();
    let caps = re.find("a").unwrap();
    assert!(caps.pos(1).is_some());
    assert!(caps.pos(2).is_none());
}

#[test]
fn matching_is_deterministic_across_repeated_calls() {
    let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
    let first = re.find("id 42-foo here").unwrap().pos(0);
    for _ in 0..20 {
        assert_eq!(re.find("id 42-foo here").unwrap().pos(0), first);
    }
}

#[test]
fn caseless_compile_matches_mixed_case_like_lowercased_text() {
    let caseless = Regex::compile_with_flags("hello", CompileFlags::CASELESS).unwrap();
    let exact = Regex::compile("hello").unwrap();
    assert_eq!(
        caseless.find("say HeLLo now").unwrap().pos(0),
        exact.find("say hello now").unwrap().pos(0)
    );
}

#[test]
fn fast_start_on_and_off_agree() {
    let with_fast_start = Regex::compile(".*needle").unwrap();
    let without = Regex::compile_with_flags(".*needle", CompileFlags::NO_FAST_START).unwrap();
    let text = "hay hay needle hay needle";
    assert_eq!(with_fast_start.find(text).unwrap().pos(0), without.find(text).unwrap().pos(0));
}

#[test]
fn dotstar_literal_matches_iff_literal_occurs() {
    let re = Regex::compile(".*needle.*").unwrap();
    assert!(re.is_match("hay needle hay"));
    assert!(!re.is_match("hay hay hay"));
}

#[test]
fn bounded_repetition_length_stays_within_bounds() {
    let re = Regex::compile("(ab){2,4}").unwrap();
    let caps = re.find("abababababab").unwrap();
    let (start, end) = caps.pos(0).unwrap();
    let len = end - start;
    assert!(len >= 2 * 2 && len <= 4 * 2);
}

#[test]
fn keep_tasks_flag_does_not_change_match_results() {
    // The free list's internal emptiness is covered at the unit level
    // (src/context.rs); here we only check the flag is a pure speed hint.
    let re = Regex::compile("a+b").unwrap();
    assert!(re.matches(b"aaab", MatchFlags::KEEP_TASKS));
    assert_eq!(re.group(0), Some((0, 4)));
    assert!(!re.matches(b"xyz", MatchFlags::KEEP_TASKS));
    assert_eq!(re.group(0), None);
    assert!(re.matches(b"aaab", MatchFlags::empty()));
    assert_eq!(re.group(0), Some((0, 4)));
}

#[test]
fn newline_flag_switches_anchors_to_line_boundaries() {
    let single_line = Regex::compile("^b").unwrap();
    assert!(!single_line.is_match("a\nb"));

    let multi_line = Regex::compile_with_flags("^b", CompileFlags::NEWLINE).unwrap();
    assert!(multi_line.is_match("a\nb"));
}

#[test]
fn backreference_subset_matches_posix_compatible_pattern() {
    let re = Regex::compile(r"(\w+)-\1").unwrap();
    assert!(re.is_match("ab-ab"));
    assert!(!re.is_match("ab-cd"));
}

#[test]
fn non_capturing_group_does_not_add_a_capture_slot() {
    let re = Regex::compile("(?:ab)+(c)").unwrap();
    let caps = re.find("ababc").unwrap();
    assert_eq!(caps.get(0).unwrap(), b"ababc");
    assert_eq!(caps.get(1).unwrap(), b"c");
}

#[test]
fn zero_exact_repetition_matches_empty_without_consuming() {
    let re = Regex::compile("a{0}b").unwrap();
    let caps = re.find("b").unwrap();
    assert_eq!(caps.pos(0), Some((0, 1)));
}

#[test]
fn open_ended_repetition_accepts_zero_or_more() {
    let re = Regex::compile("a{0,}b").unwrap();
    assert_eq!(re.find("b").unwrap().pos(0), Some((0, 1)));
    assert_eq!(re.find("aaab").unwrap().pos(0), Some((0, 4)));
}

#[test]
fn backslash_r_matches_any_newline_convention() {
    let re = Regex::compile(r"a\Rb").unwrap();
    assert!(re.is_match("a\r\nb"));
    assert!(re.is_match("a\nb"));
    assert!(re.is_match("a\rb"));
    assert!(!re.is_match("a b"));
}
