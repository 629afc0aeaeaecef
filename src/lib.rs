// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small, embedded-oriented regular expression engine.
//!
//! A pattern compiles in two passes into a single pre-sized arena (no
//! per-node heap allocation, no pointer graph to unwind), then runs
//! against input through an iterative task walker: no native recursion,
//! a fixed per-task counter stack, and leftmost-match POSIX-style capture
//! offsets.
//!
//! ```
//! use rele::{MatchFlags, Regex};
//!
//! let re = Regex::compile(r"(\d+)-(\w+)").unwrap();
//!
//! // find() hands back a Captures borrowing the searched text directly.
//! let caps = re.find("id 42-foo here").unwrap();
//! assert_eq!(caps.whole(), b"42-foo");
//! assert_eq!(caps.get(1), Some(&b"42"[..]));
//!
//! // matches()/group()/groups() follow regexec's shape instead: the
//! // match is recorded on the Regex and read back separately.
//! assert!(re.matches(b"id 42-foo here", MatchFlags::empty()));
//! assert_eq!(re.group(1), Some((3, 5)));
//! ```
//!
//! This engine is 8-bit and byte-oriented, not Unicode-aware: capture
//! offsets are byte offsets, `.` matches one byte, and character classes
//! cover the ASCII ranges only. See `Regex` for the full surface.

mod captures;
mod charset;
mod compile;
mod context;
mod error;
mod flags;
mod node;
mod optimize;
mod task;
mod walk;

#[cfg(feature = "dot")]
mod dot;

pub use captures::Captures;
pub use context::Regex;
pub use error::Error;
pub use flags::{CompileFlags, MatchFlags};
