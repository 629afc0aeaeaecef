// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Graphviz export of a compiled tree, gated behind the `dot` feature.
//! Exists for debugging a compiled pattern by eye; not part of the
//! matching hot path and never built by default.

use dot_writer::{Attributes, DotWriter};

use node::{Arena, NodeRef, NONE};

pub fn render(arena: &Arena, root: NodeRef) -> String {
    let mut bytes = Vec::new();
    {
        let mut writer = DotWriter::from(&mut bytes);
        writer.set_pretty_print(true);
        let mut digraph = writer.digraph();
        for (idx, n) in arena.nodes.iter().enumerate() {
            digraph.node_named(format!("n{}", idx)).set_label(&format!("{:?}", n.op));
        }
        for (idx, n) in arena.nodes.iter().enumerate() {
            if n.a != NONE {
                digraph.edge(format!("n{}", idx), format!("n{}", n.a)).set_label("a");
            }
            if n.b != NONE {
                digraph.edge(format!("n{}", idx), format!("n{}", n.b)).set_label("b");
            }
        }
        digraph.edge("root".to_string(), format!("n{}", root));
    }
    String::from_utf8(bytes).expect("dot-writer only ever emits UTF-8 graphviz syntax")
}

#[cfg(test)]
mod tests {
    use super::*;
    use compile::{build, measure};
    use flags::CompileFlags;

    #[test]
    fn renders_something_parseable_by_eye() {
        let bytes = b"a+b";
        let counts = measure(bytes, CompileFlags::empty()).unwrap();
        let mut arena = Arena::with_capacity(counts.nodes, counts.sets, counts.string_bytes);
        let (root, _) = build(bytes, CompileFlags::empty(), &mut arena).unwrap();
        let dot = render(&arena, root);
        assert!(dot.contains("digraph"));
        assert!(dot.contains("Plus"));
    }
}
