/// Output format for graph export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Graphviz DOT (default). Suitable for large graphs and tooling.
    Dot,
    /// Mermaid flowchart. Best for small-to-medium graphs in markdown.
    Mermaid,
}

/// Parameters controlling a graph export.
#[derive(Debug, Clone)]
pub struct ExportParams {
    pub format: ExportFormat,
    /// Only export files whose canonical path starts with this prefix.
    pub root_filter: Option<String>,
    /// Drop files whose canonical path, or file name, matches one of these globs.
    pub exclude_patterns: Vec<String>,
    /// Group files into one cluster per directory.
    pub clusters: bool,
}

impl ExportParams {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            root_filter: None,
            exclude_patterns: Vec::new(),
            clusters: true,
        }
    }
}

/// Result of a graph export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// The rendered graph text.
    pub content: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// Advisory warnings (scale guards). Already logged by `export_graph`.
    pub warnings: Vec<String>,
}
