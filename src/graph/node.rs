use serde::{Deserialize, Serialize};

/// Metadata about a file node in the project graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Canonical project path.
    pub path: String,
    /// Display name (last path segment).
    pub name: String,
    /// Parent directory, or `""` at the project root.
    pub dir: String,
    pub line_count: usize,
    pub exports: Vec<String>,
}

/// Coarse centrality proxy derived from a node's in/out degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeClass {
    /// Both imports and is imported.
    Hub,
    /// Only imported by others.
    Exporter,
    /// Only imports others.
    Importer,
    /// No resolved edges at all.
    Isolated,
}

impl DegreeClass {
    pub fn from_degrees(incoming: usize, outgoing: usize) -> Self {
        match (incoming > 0, outgoing > 0) {
            (true, true) => Self::Hub,
            (true, false) => Self::Exporter,
            (false, true) => Self::Importer,
            (false, false) => Self::Isolated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Exporter => "exporter",
            Self::Importer => "importer",
            Self::Isolated => "isolated",
        }
    }
}
