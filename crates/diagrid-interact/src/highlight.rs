//! Colored cell outline used for connect and drop feedback.

use diagrid_model::{CellId, GraphView, Overlay, OverlayId, Renderer};

pub const VALID_COLOR: &str = "#00ff00";
pub const INVALID_COLOR: &str = "#ff0000";

/// Highlights at most one cell at a time with a colored outline.
///
/// Repainting the same cell in the same color is a no-op, so callers
/// can invoke `highlight` on every pointer move without overlay churn.
#[derive(Debug)]
pub struct CellHighlight {
    id: OverlayId,
    current: Option<(CellId, String)>,
}

impl CellHighlight {
    pub fn new(source: &'static str) -> Self {
        Self {
            id: OverlayId::new(source, 0),
            current: None,
        }
    }

    pub fn highlighted_cell(&self) -> Option<CellId> {
        self.current.as_ref().map(|(c, _)| *c)
    }

    /// Outline `cell` in `color`, or clear when `cell` is `None`.
    pub fn highlight(
        &mut self,
        view: &GraphView,
        renderer: &mut dyn Renderer,
        cell: Option<CellId>,
        color: &str,
    ) {
        match cell {
            Some(cell) => {
                if self
                    .current
                    .as_ref()
                    .is_some_and(|(c, col)| *c == cell && col == color)
                {
                    return;
                }
                if self.emit(view, renderer, cell, color) {
                    self.current = Some((cell, color.to_string()));
                } else {
                    self.unhighlight(renderer);
                }
            }
            None => self.unhighlight(renderer),
        }
    }

    pub fn unhighlight(&mut self, renderer: &mut dyn Renderer) {
        if self.current.take().is_some() {
            renderer.clear_overlay(self.id);
        }
    }

    /// Re-emit the current highlight from fresh view state, after the
    /// highlighted cell moved under us.
    pub fn refresh(&mut self, view: &GraphView, renderer: &mut dyn Renderer) {
        if let Some((cell, color)) = self.current.clone() {
            if !self.emit(view, renderer, cell, &color) {
                self.unhighlight(renderer);
            }
        }
    }

    fn emit(
        &self,
        view: &GraphView,
        renderer: &mut dyn Renderer,
        cell: CellId,
        color: &str,
    ) -> bool {
        let Some(state) = view.get_state(cell) else {
            return false;
        };
        let overlay = if state.is_edge() {
            Overlay::Polyline {
                points: state.absolute_points.clone(),
                color: color.to_string(),
                dashed: false,
            }
        } else {
            Overlay::Outline {
                bounds: state.bounds,
                rotation: state.rotation,
                color: color.to_string(),
                dashed: false,
            }
        };
        renderer.set_overlay(self.id, overlay);
        true
    }
}
