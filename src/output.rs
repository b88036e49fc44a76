use std::fmt::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::GraphError;
use crate::graph::{GraphStats, ProjectGraph};
use crate::resolver::{ResolveReport, UnresolvedImport};
use crate::tree::FileEntry;
use crate::walker::Snapshot;

/// Aggregate statistics for one scanned snapshot.
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub project: String,
    #[serde(flatten)]
    pub stats: GraphStats,
    /// Specifiers rewritten to a project path.
    pub resolved_imports: usize,
    /// Relative or absolute specifiers that matched no project file.
    pub unresolved_imports: usize,
    /// Files found but not readable; they appear with no imports or exports.
    pub unreadable: usize,
    pub elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<Vec<UnresolvedImport>>,
}

impl ScanSummary {
    pub fn new(project: &str, snapshot: &Snapshot, elapsed_secs: f64, with_unresolved: bool) -> Self {
        let graph = ProjectGraph::from_tree(&snapshot.root);
        Self {
            project: project.to_owned(),
            stats: graph.stats(&snapshot.root),
            resolved_imports: snapshot.report.resolved,
            unresolved_imports: snapshot.report.unresolved.len(),
            unreadable: snapshot.unreadable,
            elapsed_secs,
            unresolved: with_unresolved.then(|| snapshot.report.unresolved.clone()),
        }
    }
}

/// Print a scan summary.
///
/// - `json = true`: a pretty-printed JSON object on stdout.
/// - `json = false`: a cargo-style human-readable summary on stdout.
///
/// Unreadable files are reported on **stderr** so stdout stays clean for JSON consumers.
pub fn print_summary(summary: &ScanSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising summary: {}", e),
        }
        return;
    }

    print!("{}", format_summary(summary));
    if summary.unreadable > 0 {
        eprintln!("  {} files unreadable (kept without imports)", summary.unreadable);
    }
}

pub fn format_summary(summary: &ScanSummary) -> String {
    let s = &summary.stats;
    let mut out = String::new();
    writeln!(
        out,
        "Scanned {} ({} files, {} folders) in {:.2}s",
        summary.project, s.files, s.folders, summary.elapsed_secs
    )
    .unwrap();
    writeln!(
        out,
        "  Resolved {} imports ({} unresolved), {} edges",
        summary.resolved_imports, summary.unresolved_imports, s.edges
    )
    .unwrap();
    writeln!(
        out,
        "  {} hubs, {} importers, {} exporters, {} isolated",
        s.hubs, s.importers, s.exporters, s.isolated
    )
    .unwrap();
    if let Some(unresolved) = &summary.unresolved {
        out.push_str(&format_unresolved(unresolved));
    }
    out
}

fn format_unresolved(unresolved: &[UnresolvedImport]) -> String {
    let mut out = String::new();
    for u in unresolved {
        writeln!(out, "  unresolved {} -> {} ({})", u.origin, u.specifier, u.reason).unwrap();
    }
    out
}

/// One line per summary, for `watch --json`.
pub fn print_summary_line(summary: &ScanSummary) {
    match serde_json::to_string(summary) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error serialising summary: {}", e),
    }
}

/// Indented folder tree, folders first, files with their line count.
pub fn format_tree(root: &FileEntry) -> String {
    let mut out = String::new();
    write_tree(root, 0, &mut out);
    out
}

fn write_tree(node: &FileEntry, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if node.is_folder() {
        writeln!(out, "{indent}{}/", node.name).unwrap();
        for child in &node.children {
            write_tree(child, depth + 1, out);
        }
    } else {
        writeln!(out, "{indent}{}  {}L", node.name, node.line_count.unwrap_or(0)).unwrap();
    }
}

/// Everything known about one file's place in the graph.
#[derive(Debug, Serialize)]
pub struct DepsReport {
    pub path: String,
    pub line_count: usize,
    pub exports: Vec<String>,
    pub imports: Vec<String>,
    pub imported_by: Vec<String>,
    pub class: &'static str,
    /// Specifiers of this file that matched nothing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl DepsReport {
    pub fn build(graph: &ProjectGraph, report: &ResolveReport, path: &str) -> Result<Self, GraphError> {
        let node = graph.node(path).ok_or_else(|| GraphError::UnknownFile(path.to_owned()))?;
        Ok(Self {
            path: node.path.clone(),
            line_count: node.line_count,
            exports: node.exports.clone(),
            imports: graph.imports_of(path)?.iter().map(|n| n.path.clone()).collect(),
            imported_by: graph.imported_by(path)?.iter().map(|n| n.path.clone()).collect(),
            class: graph.degree_class(path)?.as_str(),
            unresolved: report
                .unresolved
                .iter()
                .filter(|u| u.origin == path)
                .map(|u| u.specifier.clone())
                .collect(),
        })
    }
}

pub fn format_deps(deps: &DepsReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(deps).unwrap_or_default() + "\n";
    }
    let mut out = String::new();
    writeln!(out, "{} ({} lines, {})", deps.path, deps.line_count, deps.class).unwrap();
    writeln!(out, "exports: {}", join_or_none(&deps.exports)).unwrap();
    writeln!(out, "imports ({}):", deps.imports.len()).unwrap();
    for p in &deps.imports {
        writeln!(out, "  -> {p}").unwrap();
    }
    writeln!(out, "imported by ({}):", deps.imported_by.len()).unwrap();
    for p in &deps.imported_by {
        writeln!(out, "  <- {p}").unwrap();
    }
    for s in &deps.unresolved {
        writeln!(out, "  unresolved {s}").unwrap();
    }
    out
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_owned()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::demo::demo_project;

    fn demo_snapshot() -> Snapshot {
        Snapshot {
            root: demo_project(),
            report: ResolveReport {
                resolved: 12,
                unresolved: vec![UnresolvedImport {
                    origin: "src/App.tsx".into(),
                    specifier: "./missing".into(),
                    reason: "no matching file".into(),
                }],
            },
            unreadable: 0,
        }
    }

    #[test]
    fn test_summary_text() {
        let summary = ScanSummary::new("demo", &demo_snapshot(), 0.0, true);
        let text = format_summary(&summary);
        assert!(text.starts_with("Scanned demo (12 files, 5 folders)"));
        assert!(text.contains("Resolved 12 imports (1 unresolved), 12 edges"));
        assert!(text.contains("unresolved src/App.tsx -> ./missing"));
    }

    #[test]
    fn test_summary_json_omits_list_unless_asked() {
        let summary = ScanSummary::new("demo", &demo_snapshot(), 0.0, false);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["files"], 12);
        assert_eq!(json["unresolved_imports"], 1);
        assert!(json.get("unresolved").is_none());
    }

    #[test]
    fn test_tree_shows_line_counts() {
        let text = format_tree(&demo_project());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "src/");
        assert_eq!(lines[1], "  components/");
        assert_eq!(lines[2], "    ChatInterface.tsx  92L");
        assert!(text.contains("  main.tsx  10L"));
    }

    #[test]
    fn test_deps_compact() {
        let snap = demo_snapshot();
        let graph = ProjectGraph::from_tree(&snap.root);
        let deps = DepsReport::build(&graph, &snap.report, "src/App.tsx").unwrap();
        assert_eq!(deps.imported_by, vec!["src/main.tsx"]);
        assert_eq!(deps.class, "hub");
        let text = format_deps(&deps, OutputFormat::Compact);
        assert!(text.starts_with("src/App.tsx (18 lines, hub)\n"));
        assert!(text.contains("  -> src/pages/LoginPage.tsx\n"));
        assert!(text.contains("  unresolved ./missing\n"));
    }

    #[test]
    fn test_deps_unknown_file() {
        let snap = demo_snapshot();
        let graph = ProjectGraph::from_tree(&snap.root);
        assert!(DepsReport::build(&graph, &snap.report, "nope.ts").is_err());
    }
}
