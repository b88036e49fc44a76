pub mod edge;
pub mod node;

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Directed;
use serde::Serialize;

use edge::EdgeKind;
use node::{DegreeClass, FileNode};

use crate::error::GraphError;
use crate::tree::{self, FileEntry};

/// The resolved import graph of one snapshot: a directed petgraph StableGraph with
/// O(1) path lookup.
///
/// Built from a tree whose imports have already been resolved. Imports that name a
/// path outside the snapshot produce no edge.
pub struct ProjectGraph {
    pub graph: StableGraph<FileNode, EdgeKind, Directed>,
    /// Maps canonical paths to their node indices.
    pub file_index: HashMap<String, NodeIndex>,
}

/// Aggregate counts for one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub files: usize,
    pub folders: usize,
    pub edges: usize,
    pub hubs: usize,
    pub exporters: usize,
    pub importers: usize,
    pub isolated: usize,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            file_index: HashMap::new(),
        }
    }

    /// Build the graph for every file under `root`.
    pub fn from_tree(root: &FileEntry) -> Self {
        Self::from_tree_files(&root.files())
    }

    /// Build the graph over an already flattened file list.
    pub fn from_tree_files(files: &[&FileEntry]) -> Self {
        let mut g = Self::new();
        for f in files {
            g.add_file(f);
        }
        for f in files {
            let from = g.file_index[&f.path];
            for (position, target) in f.imports.iter().enumerate() {
                if let Some(&to) = g.file_index.get(target) {
                    g.graph.add_edge(from, to, EdgeKind::Imports { position });
                }
            }
        }
        tracing::debug!(
            files = g.file_count(),
            edges = g.edge_count(),
            "built project graph"
        );
        g
    }

    /// Add a file node. Returns the existing index if the path is already present.
    pub fn add_file(&mut self, entry: &FileEntry) -> NodeIndex {
        if let Some(&existing) = self.file_index.get(&entry.path) {
            return existing;
        }
        let idx = self.graph.add_node(FileNode {
            path: entry.path.clone(),
            name: entry.name.clone(),
            dir: tree::parent_dir(&entry.path).to_owned(),
            line_count: entry.line_count.unwrap_or(0),
            exports: entry.exports.clone(),
        });
        self.file_index.insert(entry.path.clone(), idx);
        idx
    }

    pub fn file_count(&self) -> usize {
        self.file_index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, path: &str) -> Option<&FileNode> {
        self.file_index.get(path).map(|&i| &self.graph[i])
    }

    fn index(&self, path: &str) -> Result<NodeIndex, GraphError> {
        self.file_index
            .get(path)
            .copied()
            .ok_or_else(|| GraphError::UnknownFile(path.to_owned()))
    }

    /// Files `path` imports, in the order they appear in its `imports`.
    pub fn imports_of(&self, path: &str) -> Result<Vec<&FileNode>, GraphError> {
        let idx = self.index(path)?;
        let mut out: Vec<(usize, &FileNode)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| {
                let EdgeKind::Imports { position } = e.weight();
                (*position, &self.graph[e.target()])
            })
            .collect();
        out.sort_by_key(|(pos, _)| *pos);
        Ok(out.into_iter().map(|(_, n)| n).collect())
    }

    /// Distinct files whose imports contain `path`, sorted by path.
    pub fn imported_by(&self, path: &str) -> Result<Vec<&FileNode>, GraphError> {
        let idx = self.index(path)?;
        let mut sources: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect();
        sources.sort();
        sources.dedup();
        let mut out: Vec<&FileNode> = sources.into_iter().map(|i| &self.graph[i]).collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    pub fn degree_class(&self, path: &str) -> Result<DegreeClass, GraphError> {
        let idx = self.index(path)?;
        Ok(self.degree_class_at(idx))
    }

    pub(crate) fn degree_class_at(&self, idx: NodeIndex) -> DegreeClass {
        let incoming = self.graph.edges_directed(idx, Direction::Incoming).count();
        let outgoing = self.graph.edges_directed(idx, Direction::Outgoing).count();
        DegreeClass::from_degrees(incoming, outgoing)
    }

    /// Every edge as `(from, to)` paths.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].path.as_str(), self.graph[b].path.as_str()))
            .collect()
    }

    /// Sum of out-degrees and sum of in-degrees over all nodes. The two always agree
    /// with [`ProjectGraph::edge_count`].
    pub fn degree_totals(&self) -> (usize, usize) {
        self.graph.node_indices().fold((0, 0), |(out, inc), i| {
            (
                out + self.graph.edges_directed(i, Direction::Outgoing).count(),
                inc + self.graph.edges_directed(i, Direction::Incoming).count(),
            )
        })
    }

    pub fn stats(&self, root: &FileEntry) -> GraphStats {
        let mut stats = GraphStats {
            files: self.file_count(),
            folders: tree::count_folders(root),
            edges: self.edge_count(),
            ..GraphStats::default()
        };
        for idx in self.graph.node_indices() {
            match self.degree_class_at(idx) {
                DegreeClass::Hub => stats.hubs += 1,
                DegreeClass::Exporter => stats.exporters += 1,
                DegreeClass::Importer => stats.importers += 1,
                DegreeClass::Isolated => stats.isolated += 1,
            }
        }
        stats
    }
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
