use serde::{Deserialize, Serialize};

use super::GraphView;

pub const MIN_ZOOM: f64 = 0.4;
pub const MAX_ZOOM: f64 = 3.0;
/// Pan bound per axis at zoom 1; grows by [`PAN_PER_ZOOM`] per unit of zoom above 1.
pub const MAX_PAN: f64 = 400.0;
pub const PAN_PER_ZOOM: f64 = 200.0;
/// Movement beyond this many pixels on either axis turns a press into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Host input, in surface-local CSS pixels (origin at the surface's top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Delivered after `PointerUp` when the press and release hit the surface.
    Click { x: f64, y: f64 },
    /// `delta_y > 0` scrolls down, which zooms out.
    Wheel { x: f64, y: f64, delta_y: f64 },
    Resize { width: f64, height: f64 },
}

/// Pan/zoom state of one surface. Zoom is applied about the surface center, then pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn pan_limit(&self) -> f64 {
        MAX_PAN + (self.zoom - 1.0) * PAN_PER_ZOOM
    }

    fn clamp_pan(&mut self) {
        let limit = self.pan_limit();
        self.pan_x = self.pan_x.clamp(-limit, limit);
        self.pan_y = self.pan_y.clamp(-limit, limit);
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
        self.clamp_pan();
    }

    /// Zoom one wheel step, keeping the world point under `(x, y)` where it is.
    pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
        let (cx, cy) = self.center();
        let mx = x - cx;
        let my = y - cy;

        let old = self.zoom;
        let factor = if delta_y > 0.0 {
            ZOOM_OUT_FACTOR
        } else {
            ZOOM_IN_FACTOR
        };
        self.zoom = (old * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let ratio = self.zoom / old;
        self.pan_x = mx - ratio * (mx - self.pan_x);
        self.pan_y = my - ratio * (my - self.pan_y);
        self.clamp_pan();
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        (
            (wx - cx) * self.zoom + cx + self.pan_x,
            (wy - cy) * self.zoom + cy + self.pan_y,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        (
            (sx - cx - self.pan_x) / self.zoom + cx,
            (sy - cy - self.pan_y) / self.zoom + cy,
        )
    }

    /// Affine `(scale, translate_x, translate_y)` equivalent to
    /// translate(center + pan) · scale(zoom) · translate(-center).
    pub fn transform(&self) -> (f64, f64, f64) {
        let (cx, cy) = self.center();
        (
            self.zoom,
            cx + self.pan_x - self.zoom * cx,
            cy + self.pan_y - self.zoom * cy,
        )
    }

    /// Whether the surface has an area to draw on.
    pub fn is_drawable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// State of one press-move-release gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Gesture {
    active: bool,
    start_x: f64,
    start_y: f64,
    pan_start_x: f64,
    pan_start_y: f64,
    dragged: bool,
}

/// Turns host input into pan, zoom and selection for one view.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub viewport: Viewport,
    gesture: Gesture,
}

impl Interaction {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            gesture: Gesture::default(),
        }
    }

    /// Apply one event. Returns the path of a node selected by a click, if any.
    pub fn handle(&mut self, event: InputEvent, view: Option<&GraphView>) -> Option<String> {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.gesture = Gesture {
                    active: true,
                    start_x: x,
                    start_y: y,
                    pan_start_x: self.viewport.pan_x,
                    pan_start_y: self.viewport.pan_y,
                    dragged: false,
                };
                None
            }
            InputEvent::PointerMove { x, y } => {
                if !self.gesture.active {
                    return None;
                }
                let dx = x - self.gesture.start_x;
                let dy = y - self.gesture.start_y;
                if dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD {
                    self.gesture.dragged = true;
                }
                self.viewport
                    .set_pan(self.gesture.pan_start_x + dx, self.gesture.pan_start_y + dy);
                None
            }
            InputEvent::PointerUp => {
                self.gesture.active = false;
                None
            }
            InputEvent::Click { x, y } => {
                // `dragged` survives PointerUp so the trailing click can see it.
                if self.gesture.dragged {
                    return None;
                }
                let hit = view.and_then(|v| self.hit_test(v, x, y));
                if let Some(ref path) = hit {
                    tracing::debug!(%path, "node selected");
                }
                hit
            }
            InputEvent::Wheel { x, y, delta_y } => {
                self.viewport.zoom_at(x, y, delta_y);
                None
            }
            InputEvent::Resize { width, height } => {
                self.viewport.width = width;
                self.viewport.height = height;
                None
            }
        }
    }

    /// First node whose screen-space hit circle contains `(x, y)`.
    pub fn hit_test(&self, view: &GraphView, x: f64, y: f64) -> Option<String> {
        let vp = &self.viewport;
        view.nodes
            .iter()
            .find(|n| {
                let (sx, sy) = vp.world_to_screen(n.x * vp.width, n.y * vp.height);
                ((x - sx).powi(2) + (y - sy).powi(2)).sqrt() < n.hit_radius()
            })
            .map(|n| n.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{NodeRole, ViewMode, ViewNode};
    use crate::graph::node::DegreeClass;

    fn one_node_view() -> GraphView {
        GraphView {
            mode: ViewMode::Global,
            nodes: vec![ViewNode {
                id: "a.ts".into(),
                label: "a.ts".into(),
                x: 0.25,
                y: 0.5,
                role: NodeRole::Global(DegreeClass::Isolated),
                line_count: 1,
            }],
            edges: vec![],
            bands: vec![],
        }
    }

    fn wheel(i: &mut Interaction, delta_y: f64) {
        i.handle(InputEvent::Wheel { x: 400.0, y: 300.0, delta_y }, None);
    }

    #[test]
    fn test_zoom_in_pins_at_max() {
        let mut i = Interaction::new(800.0, 600.0);
        for _ in 0..100 {
            wheel(&mut i, -1.0);
        }
        assert_eq!(i.viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_out_pins_at_min() {
        let mut i = Interaction::new(800.0, 600.0);
        for _ in 0..100 {
            wheel(&mut i, 1.0);
        }
        assert_eq!(i.viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_keeps_point_under_cursor() {
        let mut i = Interaction::new(800.0, 600.0);
        let (cx, cy) = (620.0, 150.0);
        let before = i.viewport.screen_to_world(cx, cy);
        i.handle(InputEvent::Wheel { x: cx, y: cy, delta_y: -1.0 }, None);
        let after = i.viewport.screen_to_world(cx, cy);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn test_pan_is_clamped_by_zoom() {
        let mut i = Interaction::new(800.0, 600.0);
        i.handle(InputEvent::PointerDown { x: 0.0, y: 0.0 }, None);
        i.handle(InputEvent::PointerMove { x: 5000.0, y: -5000.0 }, None);
        assert_eq!((i.viewport.pan_x, i.viewport.pan_y), (MAX_PAN, -MAX_PAN));

        i.viewport.zoom = 2.0;
        assert_eq!(i.viewport.pan_limit(), 600.0);
        i.handle(InputEvent::PointerMove { x: 5000.0, y: 0.0 }, None);
        assert_eq!(i.viewport.pan_x, 600.0);
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let mut i = Interaction::new(800.0, 600.0);
        i.handle(InputEvent::PointerMove { x: 50.0, y: 50.0 }, None);
        assert_eq!((i.viewport.pan_x, i.viewport.pan_y), (0.0, 0.0));
    }

    #[test]
    fn test_small_wiggle_still_selects() {
        let view = one_node_view();
        let mut i = Interaction::new(800.0, 600.0);
        // Node center is at (200, 300).
        i.handle(InputEvent::PointerDown { x: 200.0, y: 300.0 }, Some(&view));
        i.handle(InputEvent::PointerMove { x: 202.0, y: 303.0 }, Some(&view));
        i.handle(InputEvent::PointerUp, Some(&view));
        let hit = i.handle(InputEvent::Click { x: 202.0, y: 303.0 }, Some(&view));
        assert_eq!(hit.as_deref(), Some("a.ts"));
    }

    #[test]
    fn test_drag_suppresses_selection() {
        let view = one_node_view();
        let mut i = Interaction::new(800.0, 600.0);
        i.handle(InputEvent::PointerDown { x: 190.0, y: 300.0 }, Some(&view));
        i.handle(InputEvent::PointerMove { x: 200.0, y: 300.0 }, Some(&view));
        i.handle(InputEvent::PointerUp, Some(&view));
        // The node moved with the pan, so the click lands on it; the drag still wins.
        let hit = i.handle(InputEvent::Click { x: 210.0, y: 300.0 }, Some(&view));
        assert_eq!(hit, None);

        // The next clean press selects again.
        i.handle(InputEvent::PointerDown { x: 210.0, y: 300.0 }, Some(&view));
        i.handle(InputEvent::PointerUp, Some(&view));
        let hit = i.handle(InputEvent::Click { x: 210.0, y: 300.0 }, Some(&view));
        assert_eq!(hit.as_deref(), Some("a.ts"));
    }

    #[test]
    fn test_hit_test_follows_zoom_and_pan() {
        let view = one_node_view();
        let mut i = Interaction::new(800.0, 600.0);
        i.viewport.zoom = 2.0;
        i.viewport.set_pan(50.0, 0.0);
        // (200 - 400) * 2 + 400 + 50 = 50
        assert_eq!(i.hit_test(&view, 50.0, 300.0).as_deref(), Some("a.ts"));
        assert_eq!(i.hit_test(&view, 200.0, 300.0), None);
    }

    #[test]
    fn test_transform_matches_world_to_screen() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom = 1.5;
        vp.set_pan(-30.0, 12.0);
        let (s, tx, ty) = vp.transform();
        let (sx, sy) = vp.world_to_screen(100.0, 80.0);
        assert!((100.0 * s + tx - sx).abs() < 1e-9);
        assert!((80.0 * s + ty - sy).abs() < 1e-9);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut i = Interaction::new(800.0, 600.0);
        i.handle(InputEvent::Resize { width: 0.0, height: 0.0 }, None);
        assert!(!i.viewport.is_drawable());
    }
}
