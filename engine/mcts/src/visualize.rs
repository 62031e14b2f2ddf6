//! Graphviz export of a search tree for inspection.
//!
//! Every tree node becomes a DOT node labelled with its visit count and value;
//! every edge is labelled with its move in UCI form and its visit count. The
//! position's FEN is attached as a tooltip.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use crate::node::Node;
use crate::tree::MctsTree;

/// Render the whole tree as a DOT digraph.
pub fn to_dot(tree: &MctsTree) -> String {
    let mut out = String::new();
    out.push_str("digraph mcts {\n");
    out.push_str("  node [shape=box, fontname=\"monospace\"];\n");
    let mut next_id = 0usize;
    write_node(&mut out, tree.root(), &mut next_id);
    out.push_str("}\n");
    out
}

/// Write the DOT rendering of `tree` to `path`.
pub fn write_dot(tree: &MctsTree, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_dot(tree))?;
    info!(
        nodes = tree.len(),
        path = %path.display(),
        "Wrote search tree"
    );
    Ok(())
}

/// Emit `node` and its subtree; returns the DOT id assigned to `node`.
fn write_node(out: &mut String, node: &Node, next_id: &mut usize) -> usize {
    let id = *next_id;
    *next_id += 1;

    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "  n{} [label=\"N={}\\nV={:.3}\", tooltip=\"{}\"];",
        id,
        node.visit_count,
        node.value,
        escape(&node.state)
    );

    for edge in &node.edges {
        let child_id = write_node(out, &edge.node, next_id);
        let _ = writeln!(
            out,
            "  n{} -> n{} [label=\"{} ({})\"];",
            id, child_id, edge.action, edge.visit_count
        );
    }
    id
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
