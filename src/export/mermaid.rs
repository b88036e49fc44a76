use std::fmt::Write;

use petgraph::stable_graph::NodeIndex;

use super::{Clusters, EdgeCounts, edge_label, sanitize_id};
use crate::graph::ProjectGraph;
use crate::graph::node::DegreeClass;

/// Escape a string for Mermaid node labels (quotes inside labels break the syntax).
fn escape_mermaid_label(s: &str) -> String {
    s.replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

fn write_node(graph: &ProjectGraph, idx: NodeIndex, indent: &str, out: &mut String) {
    let node = &graph.graph[idx];
    writeln!(
        out,
        "{indent}n{}[\"{}\"]:::{}",
        idx.index(),
        escape_mermaid_label(&node.name),
        graph.degree_class_at(idx).as_str()
    )
    .unwrap();
}

/// Render the file graph as a Mermaid flowchart, optionally with one subgraph per
/// directory.
pub fn render_mermaid(
    graph: &ProjectGraph,
    clusters: &Clusters,
    edges: &EdgeCounts,
    grouped: bool,
) -> String {
    let mut out = String::new();
    writeln!(out, "flowchart TB").unwrap();

    for (dir, members) in clusters {
        if grouped {
            writeln!(
                out,
                "    subgraph {}[\"{}\"]",
                sanitize_id(dir),
                escape_mermaid_label(dir)
            )
            .unwrap();
            for &idx in members {
                write_node(graph, idx, "        ", &mut out);
            }
            writeln!(out, "    end").unwrap();
        } else {
            for &idx in members {
                write_node(graph, idx, "    ", &mut out);
            }
        }
    }

    for ((src, tgt), count) in edges {
        writeln!(
            out,
            "    n{} -->|\"{}\"|n{}",
            src.index(),
            edge_label(*count),
            tgt.index()
        )
        .unwrap();
    }

    for class in [
        DegreeClass::Hub,
        DegreeClass::Importer,
        DegreeClass::Exporter,
        DegreeClass::Isolated,
    ] {
        let (fill, stroke) = match class {
            DegreeClass::Hub => ("#7c3aed", "#06b6d4"),
            DegreeClass::Importer => ("#1e1e3a", "#06b6d4"),
            DegreeClass::Exporter => ("#1e1e3a", "#7c3aed"),
            DegreeClass::Isolated => ("#15151e", "#2d2d3d"),
        };
        writeln!(
            out,
            "    classDef {} fill:{fill},stroke:{stroke},color:#9ca3af",
            class.as_str()
        )
        .unwrap();
    }
    out
}
