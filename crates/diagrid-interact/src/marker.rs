//! Terminal marking for connect and reconnect gestures.
//!
//! The marker tracks the connectable cell under the pointer, colors it
//! green or red through a [`CellHighlight`], and reports mark changes
//! as events the gesture owner drains.

use crate::config::EditorConfig;
use crate::highlight::{CellHighlight, INVALID_COLOR, VALID_COLOR};
use diagrid_model::{CellId, GraphView, PointerEvent, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkEvent {
    Marked(CellId),
    Unmarked(CellId),
}

/// Tracks and highlights the candidate terminal under the pointer.
#[derive(Debug)]
pub struct CellMarker {
    highlight: CellHighlight,
    marked: Option<CellId>,
    valid: bool,
    events: Vec<MarkEvent>,
}

impl Default for CellMarker {
    fn default() -> Self {
        Self::new()
    }
}

impl CellMarker {
    pub fn new() -> Self {
        Self {
            highlight: CellHighlight::new("cell-marker"),
            marked: None,
            valid: false,
            events: Vec::new(),
        }
    }

    /// The currently marked cell, valid ones only.
    pub fn marked_cell(&self) -> Option<CellId> {
        self.marked.filter(|_| self.valid)
    }

    pub fn take_events(&mut self) -> Vec<MarkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Update the mark from a pointer event. `candidate` is the
    /// connectable cell the caller resolved under the pointer;
    /// `is_valid` judges it. Returns the marked cell when it is valid.
    pub fn process(
        &mut self,
        view: &GraphView,
        renderer: &mut dyn Renderer,
        config: &EditorConfig,
        e: &PointerEvent,
        candidate: Option<CellId>,
        is_valid: &dyn Fn(CellId) -> bool,
    ) -> Option<CellId> {
        let candidate = candidate.filter(|c| self.intersects(view, config, *c, e));
        match candidate {
            Some(cell) => {
                let valid = is_valid(cell);
                self.mark(view, renderer, cell, valid);
            }
            None => self.unmark(renderer),
        }
        self.marked_cell()
    }

    /// Hotspot test: the pointer must sit in the central fraction of a
    /// vertex to mark it. Edges are marked anywhere along the stroke.
    fn intersects(
        &self,
        view: &GraphView,
        config: &EditorConfig,
        cell: CellId,
        e: &PointerEvent,
    ) -> bool {
        let Some(state) = view.get_state(cell) else {
            return false;
        };
        if !config.hotspot_enabled || state.is_edge() {
            return true;
        }
        let center = state.center();
        let p = e.graph_point();
        let hx = state.bounds.width() / 2.0 * config.hotspot;
        let hy = state.bounds.height() / 2.0 * config.hotspot;
        (p.x - center.x).abs() <= hx && (p.y - center.y).abs() <= hy
    }

    fn mark(&mut self, view: &GraphView, renderer: &mut dyn Renderer, cell: CellId, valid: bool) {
        if self.marked != Some(cell) {
            if let Some(previous) = self.marked {
                self.events.push(MarkEvent::Unmarked(previous));
            }
            self.events.push(MarkEvent::Marked(cell));
        }
        self.marked = Some(cell);
        self.valid = valid;
        let color = if valid { VALID_COLOR } else { INVALID_COLOR };
        self.highlight.highlight(view, renderer, Some(cell), color);
    }

    pub fn unmark(&mut self, renderer: &mut dyn Renderer) {
        if let Some(previous) = self.marked.take() {
            self.events.push(MarkEvent::Unmarked(previous));
        }
        self.valid = false;
        self.highlight.unhighlight(renderer);
    }

    pub fn reset(&mut self, renderer: &mut dyn Renderer) {
        self.marked = None;
        self.valid = false;
        self.events.clear();
        self.highlight.unhighlight(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagrid_model::{GraphModel, RecordingRenderer};
    use kurbo::{Point, Rect};

    fn setup() -> (GraphModel, GraphView, RecordingRenderer, EditorConfig, CellId) {
        let mut model = GraphModel::new();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let mut view = GraphView::new();
        view.validate(&model);
        (model, view, RecordingRenderer::new(), EditorConfig::default(), a)
    }

    #[test]
    fn test_valid_mark_returns_cell_and_fires_event() {
        let (_m, view, mut renderer, config, a) = setup();
        let mut marker = CellMarker::new();
        let e = PointerEvent::at(Point::new(50.0, 50.0)).with_cell(a);
        let hit = marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| true);
        assert_eq!(hit, Some(a));
        assert_eq!(marker.take_events(), vec![MarkEvent::Marked(a)]);
        // Same cell again: no new event.
        marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| true);
        assert!(marker.take_events().is_empty());
    }

    #[test]
    fn test_invalid_mark_highlights_red_and_returns_none() {
        let (_m, view, mut renderer, config, a) = setup();
        let mut marker = CellMarker::new();
        let e = PointerEvent::at(Point::new(50.0, 50.0)).with_cell(a);
        let hit = marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| false);
        assert_eq!(hit, None);
        match renderer.overlays.values().next() {
            Some(diagrid_model::Overlay::Outline { color, .. }) => {
                assert_eq!(color, INVALID_COLOR)
            }
            other => panic!("expected outline, got {other:?}"),
        }
    }

    #[test]
    fn test_hotspot_rejects_border() {
        let (_m, view, mut renderer, mut config, a) = setup();
        config.hotspot_enabled = true;
        let mut marker = CellMarker::new();
        // Near the border: outside the central 30%.
        let e = PointerEvent::at(Point::new(95.0, 50.0)).with_cell(a);
        let hit = marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| true);
        assert_eq!(hit, None);
        // Dead center: inside.
        let e = PointerEvent::at(Point::new(52.0, 48.0)).with_cell(a);
        let hit = marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| true);
        assert_eq!(hit, Some(a));
    }

    #[test]
    fn test_leaving_unmarks() {
        let (_m, view, mut renderer, config, a) = setup();
        let mut marker = CellMarker::new();
        let e = PointerEvent::at(Point::new(50.0, 50.0)).with_cell(a);
        marker.process(&view, &mut renderer, &config, &e, Some(a), &|_| true);
        marker.take_events();

        let e = PointerEvent::at(Point::new(500.0, 500.0));
        let hit = marker.process(&view, &mut renderer, &config, &e, None, &|_| true);
        assert_eq!(hit, None);
        assert_eq!(marker.take_events(), vec![MarkEvent::Unmarked(a)]);
        assert!(renderer.overlays.is_empty());
    }
}
