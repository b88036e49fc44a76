use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;

use super::{Clusters, EdgeCounts, edge_label, sanitize_id};
use crate::graph::ProjectGraph;
use crate::graph::node::DegreeClass;

/// DOT fillcolor for a degree class.
fn class_fillcolor(class: DegreeClass) -> &'static str {
    match class {
        DegreeClass::Hub => "#D7BDE2",
        DegreeClass::Importer => "#AED6F1",
        DegreeClass::Exporter => "#A9DFBF",
        DegreeClass::Isolated => "#EAECEE",
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn write_node(graph: &ProjectGraph, idx: NodeIndex, indent: &str, out: &mut String) {
    let node = &graph.graph[idx];
    writeln!(
        out,
        "{indent}n{} [label=\"{}\" tooltip=\"{} ({} lines)\" fillcolor=\"{}\"];",
        idx.index(),
        escape_dot(&node.name),
        escape_dot(&node.path),
        node.line_count,
        class_fillcolor(graph.degree_class_at(idx))
    )
    .unwrap();
}

/// Render the file graph as DOT, optionally with one `cluster_*` subgraph per directory.
pub fn render_dot(graph: &ProjectGraph, clusters: &Clusters, edges: &EdgeCounts, grouped: bool) -> String {
    let mut out = String::new();
    writeln!(out, "digraph import_graph {{").unwrap();
    writeln!(out, "    rankdir=TB;").unwrap();
    writeln!(out, "    node [shape=box style=filled fontname=monospace];").unwrap();

    for (dir, members) in clusters {
        if grouped {
            writeln!(out, "    subgraph cluster_{} {{", sanitize_id(dir)).unwrap();
            writeln!(out, "        label=\"{}\";", escape_dot(dir)).unwrap();
            writeln!(out, "        color=lightgrey;").unwrap();
            for &idx in members {
                write_node(graph, idx, "        ", &mut out);
            }
            writeln!(out, "    }}").unwrap();
        } else {
            for &idx in members {
                write_node(graph, idx, "    ", &mut out);
            }
        }
    }

    for ((src, tgt), count) in edges {
        writeln!(
            out,
            "    n{} -> n{} [label=\"{}\"];",
            src.index(),
            tgt.index(),
            edge_label(*count)
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}
