//! Alignment guides for move gestures.
//!
//! While a move is in flight the guide compares the moving bounds
//! against the outlines of stationary cells and pulls the delta onto
//! the first left/center/right (and top/middle/bottom) line within
//! tolerance. Guide alignment beats grid snapping; the grid applies
//! only on axes with no guide hit.

use diagrid_model::{math, Axis, Overlay, OverlayId, Renderer};
use kurbo::{Rect, Vec2};

const GUIDE_COLOR: &str = "#1e90ff";

/// Outcome of snapping one move delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideResult {
    pub delta: Vec2,
    /// Vertical guide line coordinate, when the x axis snapped to one.
    pub snapped_x: Option<f64>,
    /// Horizontal guide line coordinate, when the y axis snapped.
    pub snapped_y: Option<f64>,
}

/// Alignment-guide engine for one move gesture.
#[derive(Debug, Clone)]
pub struct Guide {
    tolerance: f64,
    /// Stationary candidate outlines, in paint order. The first match
    /// wins ties.
    candidates: Vec<Rect>,
}

impl Guide {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            candidates: Vec::new(),
        }
    }

    pub fn set_candidates(&mut self, candidates: Vec<Rect>) {
        self.candidates = candidates;
    }

    /// Snap `delta` so an edge or center line of the moved bounds
    /// aligns with a candidate line within tolerance.
    pub fn snap(&self, bounds: Rect, delta: Vec2, grid: Option<f64>) -> GuideResult {
        let moved = bounds + delta;
        let mut result = GuideResult {
            delta,
            snapped_x: None,
            snapped_y: None,
        };

        let own_x = [moved.x0, moved.center().x, moved.x1];
        let own_y = [moved.y0, moved.center().y, moved.y1];

        'x: for c in &self.candidates {
            for line in [c.x0, c.center().x, c.x1] {
                for own in own_x {
                    if (line - own).abs() <= self.tolerance {
                        result.delta.x += line - own;
                        result.snapped_x = Some(line);
                        break 'x;
                    }
                }
            }
        }
        'y: for c in &self.candidates {
            for line in [c.y0, c.center().y, c.y1] {
                for own in own_y {
                    if (line - own).abs() <= self.tolerance {
                        result.delta.y += line - own;
                        result.snapped_y = Some(line);
                        break 'y;
                    }
                }
            }
        }

        if let Some(grid) = grid {
            if result.snapped_x.is_none() {
                result.delta.x = math::snap(bounds.x0 + result.delta.x, grid) - bounds.x0;
            }
            if result.snapped_y.is_none() {
                result.delta.y = math::snap(bounds.y0 + result.delta.y, grid) - bounds.y0;
            }
        }
        result
    }

    fn overlay_ids() -> [OverlayId; 2] {
        [OverlayId::new("guide", 0), OverlayId::new("guide", 1)]
    }

    /// Publish or clear the guide line overlays for `result`.
    pub fn draw(&self, renderer: &mut dyn Renderer, result: &GuideResult) {
        let [x_id, y_id] = Self::overlay_ids();
        match result.snapped_x {
            Some(position) => renderer.set_overlay(
                x_id,
                Overlay::GuideLine {
                    axis: Axis::Vertical,
                    position,
                    color: GUIDE_COLOR.to_string(),
                },
            ),
            None => renderer.clear_overlay(x_id),
        }
        match result.snapped_y {
            Some(position) => renderer.set_overlay(
                y_id,
                Overlay::GuideLine {
                    axis: Axis::Horizontal,
                    position,
                    color: GUIDE_COLOR.to_string(),
                },
            ),
            None => renderer.clear_overlay(y_id),
        }
    }

    pub fn hide(&self, renderer: &mut dyn Renderer) {
        for id in Self::overlay_ids() {
            renderer.clear_overlay(id);
        }
    }
}
