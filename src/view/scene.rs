use serde::Serialize;

use super::{GraphView, NodeRole, ViewMode, ViewModel, Viewport};
use crate::graph::node::DegreeClass;

pub mod palette {
    pub const ACCENT: &str = "#7c3aed";
    pub const CYAN: &str = "#06b6d4";
    pub const SURFACE: &str = "#15151e";
    pub const DIM: &str = "#1e1e3a";
    pub const FAINT: &str = "#2d2d3d";
    pub const CENTER_STROKE: &str = "#a78bfa";
    pub const TEXT: &str = "#ffffff";
    pub const TEXT_MUTED: &str = "#9ca3af";
    pub const TEXT_FAINT: &str = "#4b5563";
    pub const BACKGROUND: &str = "#0a0a0f";
}

pub const EMPTY_MESSAGE: &str = "No file selected";
const MAX_GLOBAL_LABEL: usize = 18;
const TRUNCATED_LABEL: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Mono,
    Sans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

/// One primitive of a frame. Coordinates after a `SetTransform` are world pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: String,
    },
    /// `screen = world * scale + (translate_x, translate_y)`.
    SetTransform {
        scale: f64,
        translate_x: f64,
        translate_y: f64,
    },
    QuadCurve {
        from: (f64, f64),
        control: (f64, f64),
        to: (f64, f64),
        stroke: String,
        width: f64,
    },
    /// Radial falloff from `color` at `inner` to transparent at `outer`.
    Glow {
        x: f64,
        y: f64,
        inner: f64,
        outer: f64,
        color: String,
    },
    Circle {
        x: f64,
        y: f64,
        r: f64,
        fill: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        stroke: Option<String>,
        stroke_width: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        font: Font,
        color: String,
        align: Align,
    },
}

/// Everything needed to paint one frame onto a `width` x `height` surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: u64,
    pub time: f64,
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

/// Per-mode animation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationProfile {
    /// Time added per frame.
    pub time_step: f64,
    /// Control-point sway amplitude, in pixels.
    pub sway: f64,
    /// Multiplier of the source x in the sway phase.
    pub sway_phase: f64,
    pub particle_speed: f64,
    pub particle_phase: f64,
    pub particle_radius: f64,
    pub edge_width: f64,
    pub edge_color: &'static str,
    pub particle_color: &'static str,
}

pub const GLOBAL_PROFILE: AnimationProfile = AnimationProfile {
    time_step: 0.005,
    sway: 10.0,
    sway_phase: 0.1,
    particle_speed: 0.2,
    particle_phase: 0.005,
    particle_radius: 2.0,
    edge_width: 1.5,
    edge_color: "rgba(124, 58, 237, 0.15)",
    particle_color: "rgba(124, 58, 237, 0.6)",
};

pub const LOCAL_PROFILE: AnimationProfile = AnimationProfile {
    time_step: 0.008,
    sway: 15.0,
    sway_phase: 1.0,
    particle_speed: 0.3,
    particle_phase: 0.01,
    particle_radius: 3.0,
    edge_width: 2.0,
    edge_color: "rgba(124, 58, 237, 0.3)",
    particle_color: palette::ACCENT,
};

impl AnimationProfile {
    pub fn for_mode(mode: ViewMode) -> &'static AnimationProfile {
        match mode {
            ViewMode::Global => &GLOBAL_PROFILE,
            ViewMode::Local => &LOCAL_PROFILE,
        }
    }
}

/// Time step for a view model; the empty state animates at the local rate.
pub fn time_step(view: &ViewModel) -> f64 {
    AnimationProfile::for_mode(view.mode().unwrap_or_default()).time_step
}

/// Point at parameter `p` on the quadratic bezier `a -> b` with control `m`.
pub fn bezier_point(a: (f64, f64), m: (f64, f64), b: (f64, f64), p: f64) -> (f64, f64) {
    let q = 1.0 - p;
    (
        q * q * a.0 + 2.0 * q * p * m.0 + p * p * b.0,
        q * q * a.1 + 2.0 * q * p * m.1 + p * p * b.1,
    )
}

/// Draw `view` at animation time `t`.
pub fn draw(view: &ViewModel, viewport: &Viewport, t: f64) -> Vec<DrawCommand> {
    let mut out = vec![DrawCommand::Clear {
        color: palette::BACKGROUND.to_owned(),
    }];
    match view {
        ViewModel::Empty => {
            out.push(DrawCommand::Text {
                x: viewport.width / 2.0,
                y: viewport.height / 2.0,
                text: EMPTY_MESSAGE.to_owned(),
                size: 16.0,
                font: Font::Sans,
                color: palette::TEXT_FAINT.to_owned(),
                align: Align::Center,
            });
        }
        ViewModel::Graph(graph) => {
            let (scale, translate_x, translate_y) = viewport.transform();
            out.push(DrawCommand::SetTransform {
                scale,
                translate_x,
                translate_y,
            });
            draw_edges(&mut out, graph, viewport, t);
            if graph.mode == ViewMode::Global {
                draw_bands(&mut out, graph, viewport);
            }
            draw_nodes(&mut out, graph, viewport);
        }
    }
    out
}

fn draw_edges(out: &mut Vec<DrawCommand>, graph: &GraphView, vp: &Viewport, t: f64) {
    let profile = AnimationProfile::for_mode(graph.mode);
    for edge in &graph.edges {
        let (Some(a), Some(b)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            continue;
        };
        let from = (a.x * vp.width, a.y * vp.height);
        let to = (b.x * vp.width, b.y * vp.height);
        let mid = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
        let control = (
            mid.0 + (t + from.0 * profile.sway_phase).sin() * profile.sway,
            mid.1,
        );

        out.push(DrawCommand::QuadCurve {
            from,
            control,
            to,
            stroke: profile.edge_color.to_owned(),
            width: profile.edge_width,
        });

        let p = (t * profile.particle_speed + from.0 * profile.particle_phase).rem_euclid(1.0);
        let (px, py) = bezier_point(from, control, to, p);
        out.push(DrawCommand::Circle {
            x: px,
            y: py,
            r: profile.particle_radius,
            fill: profile.particle_color.to_owned(),
            stroke: None,
            stroke_width: 0.0,
        });

        if let Some(label) = &edge.label {
            out.push(DrawCommand::Text {
                x: mid.0,
                y: mid.1 - 8.0,
                text: format!("{{ {label} }}"),
                size: 10.0,
                font: Font::Mono,
                color: "rgba(124, 58, 237, 0.6)".to_owned(),
                align: Align::Center,
            });
        }
    }
}

fn draw_bands(out: &mut Vec<DrawCommand>, graph: &GraphView, vp: &Viewport) {
    for band in &graph.bands {
        out.push(DrawCommand::Text {
            x: 12.0,
            y: band.y * vp.height - 18.0,
            text: band.label.clone(),
            size: 10.0,
            font: Font::Mono,
            color: palette::FAINT.to_owned(),
            align: Align::Left,
        });
    }
}

/// Fill, stroke and glow color of a node, by role.
fn node_style(role: NodeRole) -> (&'static str, &'static str, Option<&'static str>) {
    match role {
        NodeRole::Center => (palette::ACCENT, palette::CENTER_STROKE, Some("rgba(124, 58, 237, 0.25)")),
        NodeRole::Import => (palette::SURFACE, palette::CYAN, None),
        NodeRole::ImportedBy => (palette::SURFACE, palette::ACCENT, None),
        NodeRole::Global(class) => {
            let glow = Some("rgba(124, 58, 237, 0.12)");
            match class {
                DegreeClass::Hub => (palette::ACCENT, palette::CYAN, glow),
                DegreeClass::Importer => (palette::DIM, palette::CYAN, glow),
                DegreeClass::Exporter => (palette::DIM, palette::ACCENT, glow),
                DegreeClass::Isolated => (palette::SURFACE, palette::FAINT, None),
            }
        }
    }
}

fn draw_nodes(out: &mut Vec<DrawCommand>, graph: &GraphView, vp: &Viewport) {
    for node in &graph.nodes {
        let (x, y) = (node.x * vp.width, node.y * vp.height);
        let r = node.radius();
        let (fill, stroke, glow) = node_style(node.role);
        let global = matches!(node.role, NodeRole::Global(_));

        if let Some(color) = glow {
            out.push(DrawCommand::Glow {
                x,
                y,
                inner: r,
                outer: r * if global { 2.5 } else { 3.0 },
                color: color.to_owned(),
            });
        }
        out.push(DrawCommand::Circle {
            x,
            y,
            r,
            fill: fill.to_owned(),
            stroke: Some(stroke.to_owned()),
            stroke_width: if global { 1.5 } else { 2.0 },
        });

        if global {
            out.push(text_center(x, y + r + 14.0, global_label(&node.label), 10.0, palette::TEXT_MUTED));
            continue;
        }

        let label_color = if node.role == NodeRole::Center {
            palette::TEXT
        } else {
            palette::TEXT_MUTED
        };
        out.push(text_center(x, y + r + 18.0, node.label.clone(), 12.0, label_color));
        out.push(text_center(
            x,
            y + r + 32.0,
            format!("{} lines", node.line_count),
            10.0,
            palette::TEXT_FAINT,
        ));
        let caption = match node.role {
            NodeRole::ImportedBy => Some(("imports ↓", palette::ACCENT)),
            NodeRole::Import => Some(("imported by ↑", palette::CYAN)),
            _ => None,
        };
        if let Some((text, color)) = caption {
            out.push(text_center(x, y - r - 8.0, text.to_owned(), 9.0, color));
        }
    }
}

fn text_center(x: f64, y: f64, text: String, size: f64, color: &str) -> DrawCommand {
    DrawCommand::Text {
        x,
        y,
        text,
        size,
        font: Font::Mono,
        color: color.to_owned(),
        align: Align::Center,
    }
}

fn global_label(name: &str) -> String {
    if name.chars().count() > MAX_GLOBAL_LABEL {
        let head: String = name.chars().take(TRUNCATED_LABEL).collect();
        format!("{head}...")
    } else {
        name.to_owned()
    }
}
