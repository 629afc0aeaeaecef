// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bitflags::bitflags;

bitflags! {
    /// Flags that affect how a pattern is compiled.
    pub struct CompileFlags: u32 {
        /// Case-insensitive matching: pattern literals and set members are
        /// folded to cover both cases at compile time; input is lowercased
        /// once per byte on the hot path (see DESIGN.md).
        const CASELESS = 1 << 0;
        /// Multi-line mode: `^`/`$` match at line boundaries (not just
        /// start/end of input) and `.` stops matching `\n`.
        const NEWLINE = 1 << 1;
        /// Disable the optimizer's fast-start anchor selection. Matching
        /// semantics must be unaffected; this flag exists for testing that
        /// invariant and for patterns where the
        /// scan overhead of fast-start isn't worth it.
        const NO_FAST_START = 1 << 2;
    }
}

impl Default for CompileFlags {
    fn default() -> CompileFlags {
        CompileFlags::empty()
    }
}

bitflags! {
    /// Flags that affect a single `matches()` call.
    pub struct MatchFlags: u32 {
        /// Keep the task free list populated after this call instead of
        /// draining it, so a subsequent call on the same `Regex` can reuse
        /// it without reallocating.
        const KEEP_TASKS = 1 << 0;
    }
}

impl Default for MatchFlags {
    fn default() -> MatchFlags {
        MatchFlags::empty()
    }
}
