//! The renderer collaborator boundary.
//!
//! The engine never paints pixels. It asks the renderer to repaint a
//! cell from its resolved state, and publishes overlay primitives
//! (preview outlines, guide lines, anchor icons) as plain data keyed by
//! stable ids.

use crate::cell::CellId;
use crate::view::CellState;
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Stable identity for one overlay slot owned by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId {
    pub source: &'static str,
    pub index: u32,
}

impl OverlayId {
    pub fn new(source: &'static str, index: u32) -> Self {
        Self { source, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A drawable overlay primitive. Colors are CSS-style hex strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Ghost outline of a rectangle, optionally rotated about its center.
    Outline {
        bounds: Rect,
        rotation: f64,
        color: String,
        dashed: bool,
    },
    /// Ghost polyline, used for edge previews and edge highlights.
    Polyline {
        points: Vec<Point>,
        color: String,
        dashed: bool,
    },
    /// Full-canvas alignment guide at a fixed coordinate on one axis.
    GuideLine {
        axis: Axis,
        position: f64,
        color: String,
    },
    /// Fixed connection-point marker icon.
    AnchorIcon { at: Point },
    /// Filled highlight rectangle (committed anchor, drop target).
    HighlightRect { bounds: Rect, color: String },
}

/// Paints cells and overlays. Implemented by the host's drawing layer.
pub trait Renderer {
    /// Repaint a cell from its current state. `force_live_preview` marks
    /// repaints issued mid-gesture against unsaved preview state.
    fn redraw(&mut self, state: &CellState, force_live_preview: bool);

    fn set_overlay(&mut self, id: OverlayId, overlay: Overlay);

    fn clear_overlay(&mut self, id: OverlayId);
}

/// A renderer that records every call instead of drawing.
///
/// Used headless and throughout the engine's tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub overlays: HashMap<OverlayId, Overlay>,
    pub redraws: Vec<(CellId, bool)>,
    pub overlay_writes: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }
}

impl Renderer for RecordingRenderer {
    fn redraw(&mut self, state: &CellState, force_live_preview: bool) {
        self.redraws.push((state.cell, force_live_preview));
    }

    fn set_overlay(&mut self, id: OverlayId, overlay: Overlay) {
        self.overlay_writes += 1;
        self.overlays.insert(id, overlay);
    }

    fn clear_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }
}
