//! Graph view model and its interactive renderer.
//!
//! [`layout`] turns a resolved snapshot into a [`ViewModel`]: normalized node positions,
//! edges and band labels for either the whole-project view or a single-file view.
//! [`viewport`] holds pan/zoom state and turns pointer input into pan, zoom and
//! selection. [`scene`] draws one frame of a view model as a list of draw commands, and
//! [`renderer`] drives that at a fixed frame rate until it is stopped or restarted.

pub mod layout;
pub mod renderer;
pub mod scene;
pub mod viewport;

use serde::{Deserialize, Serialize};

use crate::graph::node::DegreeClass;

pub use layout::build_view;
pub use renderer::{FrameDriver, RenderHandle, RenderLoop, Renderer, Surface};
pub use scene::{DrawCommand, Frame};
pub use viewport::{InputEvent, Interaction, Viewport};

/// Which of the two graph views to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One file at the center with its imports and importers.
    #[default]
    Local,
    /// Every file in the project, one band per directory.
    Global,
}

/// What the caller wants rendered. A local request may carry no focus (nothing selected
/// yet); that renders the empty state rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ViewRequest {
    Global,
    Local { focus: Option<String> },
}

impl ViewRequest {
    pub fn mode(&self) -> ViewMode {
        match self {
            Self::Global => ViewMode::Global,
            Self::Local { .. } => ViewMode::Local,
        }
    }
}

/// Role of a node in the view, which decides its styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The focused file of a local view.
    Center,
    /// A file the focused file imports.
    Import,
    /// A file that imports the focused file.
    ImportedBy,
    /// A node of the global view, classified by its resolved degree.
    Global(DegreeClass),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewNode {
    /// Canonical path.
    pub id: String,
    pub label: String,
    /// Normalized position in `[0, 1]²`, scaled by the surface size when drawn.
    pub x: f64,
    pub y: f64,
    pub role: NodeRole,
    pub line_count: usize,
}

impl ViewNode {
    /// Drawn radius in pixels.
    pub fn radius(&self) -> f64 {
        match self.role {
            NodeRole::Center => 32.0,
            NodeRole::Import | NodeRole::ImportedBy => 24.0,
            NodeRole::Global(_) => 16.0,
        }
    }

    /// Screen-space radius within which a click selects this node.
    pub fn hit_radius(&self) -> f64 {
        match self.role {
            NodeRole::Global(_) => 20.0,
            _ => self.radius(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEdge {
    pub from: String,
    pub to: String,
    /// Exported names carried by the edge; only set in the local view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A directory band label of the global view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub label: String,
    /// Normalized y of the band's row.
    pub y: f64,
}

/// A laid-out, renderable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub mode: ViewMode,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<Band>,
}

impl GraphView {
    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &ViewNode> {
        self.nodes.iter().filter(move |n| n.role == role)
    }
}

/// Either nothing to show or a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewModel {
    /// No file selected, or the selected file is not in the snapshot.
    Empty,
    Graph(GraphView),
}

impl ViewModel {
    pub fn graph(&self) -> Option<&GraphView> {
        match self {
            Self::Empty => None,
            Self::Graph(g) => Some(g),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn mode(&self) -> Option<ViewMode> {
        self.graph().map(|g| g.mode)
    }
}
