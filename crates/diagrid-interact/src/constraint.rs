//! Fixed connection points during connect and reconnect gestures.
//!
//! While a terminal drag hovers a connectable cell, this handler shows
//! the cell's anchor icons, tracks the nearest anchor within tolerance
//! and highlights it. Focus is sticky: it survives small excursions
//! outside the shape (the focus area) and is pinned while shift is
//! held, so aiming at an anchor just outside the perimeter stays easy.

use crate::config::EditorConfig;
use diagrid_model::{
    math, CellId, ConnectionConstraint, GraphModel, GraphView, Overlay, OverlayId, PointerEvent,
    Renderer,
};
use kurbo::{Point, Rect};

const ANCHOR_HIGHLIGHT_COLOR: &str = "#00ff00";
const HIGHLIGHT_ID: OverlayId = OverlayId {
    source: "constraint-current",
    index: 0,
};

/// Shows and picks fixed connection points on the focused cell.
#[derive(Debug, Default)]
pub struct ConstraintHandler {
    focus: Option<CellId>,
    constraints: Vec<ConnectionConstraint>,
    points: Vec<Point>,
    focus_area: Rect,
    current: Option<usize>,
}

impl ConstraintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_cell(&self) -> Option<CellId> {
        self.focus
    }

    /// The anchor the pointer currently picks, with its resolved point.
    pub fn current_constraint(&self) -> Option<(&ConnectionConstraint, Point)> {
        self.current
            .map(|i| (&self.constraints[i], self.points[i]))
    }

    /// Update focus and the picked anchor from a pointer event.
    /// `hover` is the connectable cell under the pointer, if any.
    pub fn update(
        &mut self,
        model: &GraphModel,
        view: &GraphView,
        renderer: &mut dyn Renderer,
        config: &EditorConfig,
        e: &PointerEvent,
        hover: Option<CellId>,
    ) {
        let p = e.graph_point();
        let keep_focus = self.focus.is_some()
            && (e.modifiers.shift || self.focus_area.contains(p))
            && self.focus.map(|f| view.get_state(f).is_some()) == Some(true);

        // A pinned focus wins over a new hover, so aiming across a
        // neighboring shape cannot steal the anchors mid-drag.
        let next_focus = if keep_focus { self.focus } else { hover };
        if next_focus != self.focus {
            self.clear_overlays(renderer);
            self.focus = None;
        }

        let Some(cell) = next_focus else {
            return;
        };
        if self.focus != Some(cell) {
            self.set_focus(model, view, renderer, config, cell);
        }

        // Pick the nearest anchor within tolerance.
        let tol_sq = config.constraint_tolerance * config.constraint_tolerance;
        let picked = self
            .points
            .iter()
            .enumerate()
            .map(|(i, pt)| (i, math::dist_sq(p, *pt)))
            .filter(|(_, d)| *d <= tol_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);

        if picked != self.current {
            self.current = picked;
            match picked {
                Some(i) => {
                    let at = self.points[i];
                    let r = config.constraint_tolerance / 2.0;
                    renderer.set_overlay(
                        HIGHLIGHT_ID,
                        Overlay::HighlightRect {
                            bounds: Rect::new(at.x - r, at.y - r, at.x + r, at.y + r),
                            color: ANCHOR_HIGHLIGHT_COLOR.to_string(),
                        },
                    );
                }
                None => renderer.clear_overlay(HIGHLIGHT_ID),
            }
        }
    }

    fn set_focus(
        &mut self,
        model: &GraphModel,
        view: &GraphView,
        renderer: &mut dyn Renderer,
        config: &EditorConfig,
        cell: CellId,
    ) {
        self.clear_overlays(renderer);
        let Some(state) = view.get_state(cell) else {
            return;
        };
        self.constraints = view.get_all_connection_constraints(model, cell);
        self.points = self
            .constraints
            .iter()
            .map(|c| view.get_connection_point(state, c))
            .collect();

        let mut area = state.bounds;
        for p in &self.points {
            area = area.union_pt(*p);
        }
        self.focus_area = area.inflate(config.constraint_tolerance, config.constraint_tolerance);
        self.focus = Some(cell);
        self.current = None;

        for (i, p) in self.points.iter().enumerate() {
            renderer.set_overlay(
                OverlayId::new("constraint", i as u32),
                Overlay::AnchorIcon { at: *p },
            );
        }
    }

    pub fn reset(&mut self, renderer: &mut dyn Renderer) {
        self.clear_overlays(renderer);
        self.focus = None;
        self.current = None;
        self.constraints.clear();
        self.points.clear();
        self.focus_area = Rect::ZERO;
    }

    fn clear_overlays(&mut self, renderer: &mut dyn Renderer) {
        for i in 0..self.points.len() {
            renderer.clear_overlay(OverlayId::new("constraint", i as u32));
        }
        renderer.clear_overlay(HIGHLIGHT_ID);
    }
}
