pub mod dot;
pub mod mermaid;
pub mod model;
pub mod svg;

use std::collections::{BTreeMap, HashSet};

use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use crate::error::GraphError;
use crate::graph::ProjectGraph;
use crate::view::layout::ROOT_BAND;

use model::{ExportFormat, ExportParams, ExportResult};

/// Mermaid renderers struggle past this many edges.
const MERMAID_EDGE_LIMIT: usize = 500;

/// Visible files grouped by directory, both levels in path order.
pub(crate) type Clusters = BTreeMap<String, Vec<NodeIndex>>;

/// File-to-file edges between visible files, with how many imports each carries.
pub(crate) type EdgeCounts = BTreeMap<(NodeIndex, NodeIndex), usize>;

/// Export the file graph to DOT or Mermaid.
///
/// Filters are applied first (root prefix, then exclusions); edges are kept only when
/// both ends survive. Output is deterministic: clusters, nodes and edges come out in
/// path order.
pub fn export_graph(graph: &ProjectGraph, params: &ExportParams) -> Result<ExportResult, GraphError> {
    let visible = visible_nodes(graph, params)?;
    let clusters = cluster_by_dir(graph, &visible);
    let edges = aggregate_edges(graph, &visible);

    let node_count = visible.len();
    let edge_count = edges.len();

    let mut warnings = Vec::new();
    if params.format == ExportFormat::Mermaid && edge_count > MERMAID_EDGE_LIMIT {
        let msg = format!(
            "Large graph: {edge_count} edges may render poorly in Mermaid. \
             Consider --format dot or a --root filter."
        );
        tracing::warn!("{msg}");
        warnings.push(msg);
    }

    let content = match params.format {
        ExportFormat::Dot => dot::render_dot(graph, &clusters, &edges, params.clusters),
        ExportFormat::Mermaid => mermaid::render_mermaid(graph, &clusters, &edges, params.clusters),
    };

    Ok(ExportResult {
        content,
        node_count,
        edge_count,
        warnings,
    })
}

fn visible_nodes(graph: &ProjectGraph, params: &ExportParams) -> Result<HashSet<NodeIndex>, GraphError> {
    let patterns = params
        .exclude_patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|source| GraphError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(graph
        .graph
        .node_indices()
        .filter(|&idx| {
            let node = &graph.graph[idx];
            if params
                .root_filter
                .as_deref()
                .is_some_and(|root| !node.path.starts_with(root))
            {
                return false;
            }
            !patterns
                .iter()
                .any(|p| p.matches(&node.path) || p.matches(&node.name))
        })
        .collect())
}

fn cluster_by_dir(graph: &ProjectGraph, visible: &HashSet<NodeIndex>) -> Clusters {
    let mut clusters = Clusters::new();
    for &idx in visible {
        let dir = match graph.graph[idx].dir.as_str() {
            "" => ROOT_BAND,
            d => d,
        };
        clusters.entry(dir.to_owned()).or_default().push(idx);
    }
    for members in clusters.values_mut() {
        members.sort_by(|a, b| graph.graph[*a].path.cmp(&graph.graph[*b].path));
    }
    clusters
}

fn aggregate_edges(graph: &ProjectGraph, visible: &HashSet<NodeIndex>) -> EdgeCounts {
    let mut counts = EdgeCounts::new();
    for edge in graph.graph.edge_references() {
        let (src, tgt) = (edge.source(), edge.target());
        if src == tgt || !visible.contains(&src) || !visible.contains(&tgt) {
            continue;
        }
        *counts.entry((src, tgt)).or_insert(0) += 1;
    }
    counts
}

/// Replace anything that is not alphanumeric or `_`. Used for DOT cluster names and
/// Mermaid subgraph ids.
pub(crate) fn sanitize_id(s: &str) -> String {
    let mut result: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'n');
    }
    if result.is_empty() {
        result = "node".to_string();
    }
    result
}

pub(crate) fn edge_label(count: usize) -> String {
    if count == 1 {
        "1 import".to_string()
    } else {
        format!("{count} imports")
    }
}
