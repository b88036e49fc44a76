use std::collections::BTreeMap;

use crate::graph::ProjectGraph;
use crate::tree::{self, FileEntry};

use super::{Band, GraphView, NodeRole, ViewEdge, ViewMode, ViewModel, ViewNode, ViewRequest};

/// Band label for files that sit directly at the project root.
pub const ROOT_BAND: &str = "root";

const CENTER: (f64, f64) = (0.5, 0.45);
const IMPORT_ROW_Y: f64 = 0.78;
const IMPORTED_BY_ROW_Y: f64 = 0.12;
const ROW_WIDTH: f64 = 0.8;
const MAX_ROW_SPACING: f64 = 0.22;

/// Lay out `root` for `request`.
///
/// A local request without a focus, or with a focus that is not a file of this snapshot,
/// yields [`ViewModel::Empty`].
pub fn build_view(request: &ViewRequest, root: &FileEntry) -> ViewModel {
    let files = root.files();
    match request {
        ViewRequest::Global => ViewModel::Graph(global_layout(&files)),
        ViewRequest::Local { focus: None } => ViewModel::Empty,
        ViewRequest::Local { focus: Some(path) } => {
            match files.iter().find(|f| &f.path == path) {
                Some(focus) => ViewModel::Graph(local_layout(focus, &files)),
                None => {
                    tracing::debug!(%path, "focused file not in snapshot");
                    ViewModel::Empty
                }
            }
        }
    }
}

/// x of the `index`-th of `count` nodes in a centered local row.
fn row_x(index: usize, count: usize) -> f64 {
    let spacing = (ROW_WIDTH / count.max(1) as f64).min(MAX_ROW_SPACING);
    let start = 0.5 - (count.saturating_sub(1)) as f64 * spacing / 2.0;
    start + index as f64 * spacing
}

/// Single-file view: `focus` at the center, the files it imports on the lower row and
/// the files importing it on the upper row.
pub fn local_layout(focus: &FileEntry, files: &[&FileEntry]) -> GraphView {
    let mut nodes = vec![ViewNode {
        id: focus.path.clone(),
        label: focus.name.clone(),
        x: CENTER.0,
        y: CENTER.1,
        role: NodeRole::Center,
        line_count: focus.line_count.unwrap_or(0),
    }];
    let mut edges = Vec::new();

    let imports: Vec<&FileEntry> = focus
        .imports
        .iter()
        .filter_map(|p| files.iter().find(|f| &f.path == p).copied())
        .collect();
    for (i, imp) in imports.iter().enumerate() {
        nodes.push(ViewNode {
            id: imp.path.clone(),
            label: imp.name.clone(),
            x: row_x(i, imports.len()),
            y: IMPORT_ROW_Y,
            role: NodeRole::Import,
            line_count: imp.line_count.unwrap_or(0),
        });
        edges.push(ViewEdge {
            from: focus.path.clone(),
            to: imp.path.clone(),
            label: edge_label(&imp.exports),
        });
    }

    let importers = tree::imported_by(&focus.path, files);
    for (i, dep) in importers.iter().enumerate() {
        nodes.push(ViewNode {
            id: dep.path.clone(),
            label: dep.name.clone(),
            x: row_x(i, importers.len()),
            y: IMPORTED_BY_ROW_Y,
            role: NodeRole::ImportedBy,
            line_count: dep.line_count.unwrap_or(0),
        });
        edges.push(ViewEdge {
            from: dep.path.clone(),
            to: focus.path.clone(),
            label: edge_label(&focus.exports),
        });
    }

    GraphView {
        mode: ViewMode::Local,
        nodes,
        edges,
        bands: Vec::new(),
    }
}

fn edge_label(exports: &[String]) -> Option<String> {
    if exports.is_empty() {
        None
    } else {
        Some(exports.join(", "))
    }
}

/// Normalized y of band `index` out of `count`.
pub fn band_y(index: usize, count: usize) -> f64 {
    let row = (index as f64 + 0.5) / count.max(1) as f64;
    0.08 + row * 0.84
}

/// Whole-project view: one horizontal band per directory, bands sorted by directory
/// path, files spread evenly along each band.
pub fn global_layout(files: &[&FileEntry]) -> GraphView {
    let mut bands: BTreeMap<&str, Vec<&FileEntry>> = BTreeMap::new();
    for f in files {
        let dir = match f.dir() {
            "" => ROOT_BAND,
            d => d,
        };
        bands.entry(dir).or_default().push(*f);
    }

    let graph = ProjectGraph::from_tree_files(files);
    let band_count = bands.len();
    let mut nodes = Vec::with_capacity(files.len());
    let mut band_labels = Vec::with_capacity(band_count);

    for (bi, (dir, members)) in bands.iter().enumerate() {
        let y = band_y(bi, band_count);
        band_labels.push(Band {
            label: (*dir).to_owned(),
            y,
        });
        for (fi, f) in members.iter().enumerate() {
            let col = (fi + 1) as f64 / (members.len() + 1) as f64;
            let class = graph
                .degree_class(&f.path)
                .unwrap_or(crate::graph::node::DegreeClass::Isolated);
            nodes.push(ViewNode {
                id: f.path.clone(),
                label: f.name.clone(),
                x: 0.1 + col * 0.8,
                y,
                role: NodeRole::Global(class),
                line_count: f.line_count.unwrap_or(0),
            });
        }
    }

    let edges = graph
        .edges()
        .into_iter()
        .map(|(from, to)| ViewEdge {
            from: from.to_owned(),
            to: to.to_owned(),
            label: None,
        })
        .collect();

    GraphView {
        mode: ViewMode::Global,
        nodes,
        edges,
        bands: band_labels,
    }
}
