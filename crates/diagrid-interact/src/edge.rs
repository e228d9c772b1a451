//! Bend, label and terminal gestures on a single edge.
//!
//! Bend drags replace waypoints; virtual-bend drags materialize a new
//! waypoint first and then behave like a bend drag. Terminal drags ask
//! the constraint handler for a fixed anchor first and fall back to the
//! marker for a floating connection. Every commit happens in one model
//! transaction; an invalid connection aborts with the model untouched.

use crate::constraint::ConstraintHandler;
use crate::handle::{hit_edge_handle, EdgeHandle};
use crate::handler::{CellHandler, HandlerContext};
use crate::marker::CellMarker;
use diagrid_model::math::{self, point_segment_distance_sq};
use diagrid_model::{
    CellId, ConnectionConstraint, ModelError, Overlay, OverlayId, PointerEvent,
};
use kurbo::{Point, Vec2};

const PREVIEW_ID: OverlayId = OverlayId {
    source: "edge-preview",
    index: 0,
};
const PREVIEW_COLOR: &str = "#1e90ff";

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Terminal { is_source: bool },
    /// Dragging the waypoint at this index (virtual bends are
    /// materialized into the preview on pointer-down).
    Bend { index: usize },
    Label { start: Point, initial_offset: Vec2 },
}

/// Manipulation handler for one selected edge.
pub struct EdgeHandler {
    cell: CellId,
    gesture: Option<Gesture>,
    /// Full preview polyline, endpoints included.
    preview: Option<Vec<Point>>,
    marker: CellMarker,
    constraint: ConstraintHandler,
    /// Candidate terminal under the pointer, with the picked anchor.
    candidate: Option<CellId>,
    candidate_constraint: Option<ConnectionConstraint>,
    /// Last non-silent validation failure, surfaced on commit attempts.
    pub last_error: Option<String>,
    last_point: Point,
}

impl EdgeHandler {
    pub fn new(cell: CellId) -> Self {
        Self {
            cell,
            gesture: None,
            preview: None,
            marker: CellMarker::new(),
            constraint: ConstraintHandler::new(),
            candidate: None,
            candidate_constraint: None,
            last_error: None,
            last_point: Point::ZERO,
        }
    }

    fn bendable(&self, ctx: &HandlerContext) -> bool {
        ctx.policy.is_cell_bendable(ctx.model, self.cell)
            && !ctx
                .model
                .cell(self.cell)
                .is_some_and(|c| c.style.has_managed_routing())
    }

    /// Origin of the edge's parent, for absolute <-> geometry coords.
    fn parent_origin(&self, ctx: &HandlerContext) -> Vec2 {
        ctx.model
            .parent_of(self.cell)
            .and_then(|p| ctx.view.get_state(p))
            .map(|s| Vec2::new(s.bounds.x0, s.bounds.y0))
            .unwrap_or(Vec2::ZERO)
    }

    /// Re-project the preview's endpoints onto their terminals so they
    /// face the (possibly moved) adjacent point. Fixed anchors stay put.
    fn resolve_preview_endpoints(&mut self, ctx: &HandlerContext) {
        let Some(cell) = ctx.model.cell(self.cell) else {
            return;
        };
        let anchored_source = cell.style.terminal_anchor(true).is_some();
        let anchored_target = cell.style.terminal_anchor(false).is_some();
        let (source, target) = (cell.source, cell.target);
        let Some(points) = &mut self.preview else {
            return;
        };
        let n = points.len();
        if n < 2 {
            return;
        }
        if !anchored_source {
            if let Some(state) = source.and_then(|t| ctx.view.get_state(t)) {
                points[0] = math::perimeter_point(state.bounds, state.rotation, points[1]);
            }
        }
        if !anchored_target {
            if let Some(state) = target.and_then(|t| ctx.view.get_state(t)) {
                points[n - 1] = math::perimeter_point(state.bounds, state.rotation, points[n - 2]);
            }
        }
    }

    fn draw_preview(&self, ctx: &mut HandlerContext) {
        if let Some(points) = &self.preview {
            ctx.renderer.set_overlay(
                PREVIEW_ID,
                Overlay::Polyline {
                    points: points.clone(),
                    color: PREVIEW_COLOR.to_string(),
                    dashed: true,
                },
            );
        }
    }

    fn validation_error(
        &self,
        ctx: &HandlerContext,
        is_source: bool,
        terminal: Option<CellId>,
    ) -> Option<String> {
        let cell = ctx.model.cell(self.cell)?;
        let (source, target) = if is_source {
            (terminal, cell.target)
        } else {
            (cell.source, terminal)
        };
        ctx.policy.validate_edge(ctx.model, self.cell, source, target)
    }

    fn update_terminal_preview(
        &mut self,
        ctx: &mut HandlerContext,
        e: &PointerEvent,
        is_source: bool,
    ) {
        let p = e.graph_point();
        let own = self.cell;
        let hover = ctx
            .view
            .cell_at(p, ctx.config.handle_tolerance, &|c| c == own)
            .filter(|c| ctx.policy.is_cell_connectable(ctx.model, *c));

        self.constraint
            .update(ctx.model, ctx.view, ctx.renderer, ctx.config, e, hover);

        let endpoint;
        if let Some((c, point)) = self.constraint.current_constraint() {
            self.candidate = self.constraint.focused_cell();
            self.candidate_constraint = Some(c.clone());
            endpoint = point;
            self.marker.unmark(ctx.renderer);
        } else {
            self.candidate_constraint = None;
            let model = &*ctx.model;
            let policy = ctx.policy;
            let handler_cell = self.cell;
            let valid = |c: CellId| {
                let terminal = Some(c);
                let edge = match model.cell(handler_cell) {
                    Some(e) => e,
                    None => return false,
                };
                let (s, t) = if is_source {
                    (terminal, edge.target)
                } else {
                    (edge.source, terminal)
                };
                policy.validate_edge(model, handler_cell, s, t).is_none()
            };
            self.candidate = self.marker.process(
                ctx.view,
                ctx.renderer,
                ctx.config,
                e,
                hover,
                &valid,
            );
            endpoint = match self.candidate.and_then(|c| ctx.view.get_state(c)) {
                Some(state) => {
                    // Float the endpoint on the perimeter, facing the
                    // nearest interior point of the edge.
                    let toward = self
                        .preview
                        .as_ref()
                        .and_then(|pts| {
                            if is_source {
                                pts.get(1).copied()
                            } else {
                                pts.len().checked_sub(2).and_then(|i| pts.get(i)).copied()
                            }
                        })
                        .unwrap_or(p);
                    math::perimeter_point(state.bounds, state.rotation, toward)
                }
                None => p,
            };
        }

        // Record validation against whatever terminal the pointer is
        // over; an invalid hover must block the dangling fallback too.
        self.last_error = match self.candidate.or(hover) {
            Some(c) => self.validation_error(ctx, is_source, Some(c)),
            None => None,
        };

        if let Some(points) = &mut self.preview {
            if is_source {
                if let Some(first) = points.first_mut() {
                    *first = endpoint;
                }
            } else if let Some(last) = points.last_mut() {
                *last = endpoint;
            }
        }
        self.draw_preview(ctx);
    }

    fn commit_bend(&mut self, ctx: &mut HandlerContext, index: usize) -> Result<(), ModelError> {
        let Some(points) = self.preview.take() else {
            return Ok(());
        };
        if points.len() < 2 {
            return Ok(());
        }
        let mut waypoints: Vec<Point> = points[1..points.len() - 1].to_vec();
        let tol = ctx.config.handle_tolerance;

        // Merge-remove: the dragged bend landed on an adjacent bend.
        if let Some(dragged) = waypoints.get(index).copied() {
            let on_neighbor = [index.wrapping_sub(1), index + 1]
                .into_iter()
                .filter_map(|i| waypoints.get(i))
                .any(|n| math::dist_sq(*n, dragged) <= tol * tol);
            if on_neighbor {
                waypoints.remove(index);
            } else if ctx.config.straight_removal {
                // Colinear with its polyline neighbors: drop it.
                let prev = points[index];
                let next = points[index + 2];
                let t = ctx.config.straight_removal_tolerance;
                if point_segment_distance_sq(dragged, prev, next) <= t * t {
                    waypoints.remove(index);
                }
            }
        }

        let origin = self.parent_origin(ctx);
        let cell = self.cell;
        ctx.model.transact(|m| {
            let mut geo = m
                .cell(cell)
                .ok_or(ModelError::UnknownCell(cell))?
                .geometry
                .clone();
            geo.points = waypoints.iter().map(|p| *p - origin).collect();
            m.set_geometry(cell, geo)
        })
    }

    fn commit_terminal(
        &mut self,
        ctx: &mut HandlerContext,
        e: &PointerEvent,
        is_source: bool,
    ) -> Result<(), ModelError> {
        if let Some(error) = self.last_error.clone() {
            if !error.is_empty() {
                log::warn!("connection rejected: {error}");
            }
            return Ok(());
        }
        let candidate = self.candidate;
        if candidate.is_none() && !ctx.config.allow_dangling_edges {
            return Ok(());
        }

        let origin = self.parent_origin(ctx);
        let anchor = self.candidate_constraint.clone();
        let drop_point = e.graph_point() - origin;
        let cell = self.cell;
        let clone_edge = e.modifiers.alt;

        ctx.model.transact(|m| {
            let edge = if clone_edge {
                // Reconnect a copy, leaving the original untouched.
                let parent = m.parent_of(cell).unwrap_or(m.root());
                let clones = m.clone_cells(&[cell], Vec2::ZERO, parent)?;
                clones.first().copied().ok_or(ModelError::UnknownCell(cell))?
            } else {
                cell
            };
            m.set_terminal(edge, candidate, is_source)?;
            let mut style = m
                .cell(edge)
                .ok_or(ModelError::UnknownCell(edge))?
                .style
                .clone();
            style.set_terminal_anchor(is_source, anchor.as_ref());
            m.set_style(edge, style)?;
            let mut geo = m
                .cell(edge)
                .ok_or(ModelError::UnknownCell(edge))?
                .geometry
                .clone();
            geo.set_terminal_point(
                if candidate.is_none() {
                    Some(drop_point)
                } else {
                    None
                },
                is_source,
            );
            m.set_geometry(edge, geo)
        })
    }

    fn commit_label(
        &self,
        ctx: &mut HandlerContext,
        start: Point,
        initial_offset: Vec2,
    ) -> Result<(), ModelError> {
        let cell = self.cell;
        let offset = initial_offset + (self.last_point - start);
        ctx.model.transact(|m| {
            let mut geo = m
                .cell(cell)
                .ok_or(ModelError::UnknownCell(cell))?
                .geometry
                .clone();
            geo.offset = Some(offset);
            m.set_geometry(cell, geo)
        })
    }
}

impl CellHandler for EdgeHandler {
    fn cell(&self) -> CellId {
        self.cell
    }

    fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    fn mouse_down(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        if e.is_consumed() || self.gesture.is_some() {
            return;
        }
        let Some(state) = ctx.view.get_state(self.cell) else {
            return;
        };
        let bendable = self.bendable(ctx);
        let p = e.graph_point();
        let Some(hit) = hit_edge_handle(
            state,
            bendable,
            ctx.config.labels_movable,
            p,
            ctx.config.handle_tolerance,
        ) else {
            return;
        };

        let mut preview = state.absolute_points.clone();
        self.last_point = p;
        self.gesture = Some(match hit {
            EdgeHandle::Source => Gesture::Terminal { is_source: true },
            EdgeHandle::Target => Gesture::Terminal { is_source: false },
            EdgeHandle::Bend(index) => Gesture::Bend { index },
            EdgeHandle::VirtualBend(segment) => {
                // Materialize the midpoint as a real waypoint.
                let mid = preview[segment].midpoint(preview[segment + 1]);
                preview.insert(segment + 1, mid);
                Gesture::Bend { index: segment }
            }
            EdgeHandle::Label => {
                let initial_offset = ctx
                    .model
                    .cell(self.cell)
                    .and_then(|c| c.geometry.offset)
                    .unwrap_or(Vec2::ZERO);
                Gesture::Label {
                    start: p,
                    initial_offset,
                }
            }
        });
        self.preview = Some(preview);
        log::debug!("edge gesture started on {:?}", hit);
        e.consume();
    }

    fn mouse_move(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        let Some(gesture) = self.gesture else {
            return;
        };
        if ctx.view.get_state(self.cell).is_none() {
            log::warn!("edge state went stale mid-gesture, abandoning");
            self.reset(ctx);
            return;
        }
        self.last_point = e.graph_point();
        match gesture {
            Gesture::Bend { index } => {
                let p = if ctx.config.grid_enabled {
                    math::snap_point(e.graph_point(), ctx.config.grid_size)
                } else {
                    e.graph_point()
                };
                if let Some(points) = &mut self.preview {
                    if let Some(slot) = points.get_mut(index + 1) {
                        *slot = p;
                    }
                }
                self.resolve_preview_endpoints(ctx);
                self.draw_preview(ctx);
            }
            Gesture::Terminal { is_source } => {
                self.update_terminal_preview(ctx, e, is_source);
            }
            Gesture::Label { .. } => {}
        }
        e.consume();
    }

    fn mouse_up(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        self.last_point = e.graph_point();
        let stale = ctx.view.get_state(self.cell).is_none();
        let result = if stale {
            Ok(())
        } else {
            match gesture {
                Gesture::Bend { index } => self.commit_bend(ctx, index),
                Gesture::Terminal { is_source } => self.commit_terminal(ctx, e, is_source),
                Gesture::Label {
                    start,
                    initial_offset,
                } if self.last_point != start => self.commit_label(ctx, start, initial_offset),
                Gesture::Label { .. } => Ok(()),
            }
        };
        if let Err(err) = result {
            log::warn!("edge gesture commit failed: {err}");
        }
        self.reset(ctx);
        e.consume();
    }

    fn reset(&mut self, ctx: &mut HandlerContext) {
        self.gesture = None;
        self.preview = None;
        self.candidate = None;
        self.candidate_constraint = None;
        self.marker.reset(ctx.renderer);
        self.constraint.reset(ctx.renderer);
        ctx.renderer.clear_overlay(PREVIEW_ID);
        ctx.view.schedule_refresh();
    }

    fn redraw(&mut self, ctx: &mut HandlerContext) {
        self.draw_preview(ctx);
    }

    fn destroy(&mut self, ctx: &mut HandlerContext) {
        self.marker.reset(ctx.renderer);
        self.constraint.reset(ctx.renderer);
        ctx.renderer.clear_overlay(PREVIEW_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestRig;
    use diagrid_model::style::keys;
    use diagrid_model::Modifiers;
    use kurbo::Rect;

    fn connected_pair(rig: &mut TestRig) -> (CellId, CellId, CellId) {
        let a = rig.vertex(Rect::new(0.0, 0.0, 100.0, 50.0));
        let b = rig.vertex(Rect::new(200.0, 0.0, 300.0, 50.0));
        let e = rig.edge(Some(a), Some(b));
        (a, b, e)
    }

    fn waypoints(rig: &TestRig, e: CellId) -> Vec<Point> {
        rig.model.cell(e).unwrap().geometry.points.clone()
    }

    #[test]
    fn test_virtual_bend_inserts_waypoint() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut h = EdgeHandler::new(e);

        // Midpoint of the single segment (100,25)-(200,25).
        let ev = PointerEvent::at(Point::new(150.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        assert!(h.is_active());
        let ev = PointerEvent::at(Point::new(150.0, 90.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(150.0, 90.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        assert_eq!(waypoints(&rig, e), vec![Point::new(150.0, 90.0)]);
    }

    #[test]
    fn test_bend_drag_replaces_waypoint() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut geo = rig.model.cell(e).unwrap().geometry.clone();
        geo.points = vec![Point::new(150.0, 100.0)];
        rig.model.set_geometry(e, geo).unwrap();
        rig.refresh();
        let mut h = EdgeHandler::new(e);

        let ev = PointerEvent::at(Point::new(150.0, 100.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        assert!(h.is_active());
        let ev = PointerEvent::at(Point::new(160.0, 120.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(160.0, 120.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        assert_eq!(waypoints(&rig, e), vec![Point::new(160.0, 120.0)]);
    }

    #[test]
    fn test_bend_merge_remove_shrinks_by_one() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut geo = rig.model.cell(e).unwrap().geometry.clone();
        geo.points = vec![Point::new(130.0, 100.0), Point::new(170.0, 100.0)];
        rig.model.set_geometry(e, geo).unwrap();
        rig.refresh();
        let mut h = EdgeHandler::new(e);

        // Drag the first bend onto the second.
        let ev = PointerEvent::at(Point::new(130.0, 100.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(169.0, 100.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(169.0, 100.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        assert_eq!(waypoints(&rig, e), vec![Point::new(170.0, 100.0)]);
    }

    #[test]
    fn test_colinear_waypoint_straight_removal() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut geo = rig.model.cell(e).unwrap().geometry.clone();
        geo.points = vec![Point::new(150.0, 50.0)];
        rig.model.set_geometry(e, geo).unwrap();
        rig.refresh();
        let mut h = EdgeHandler::new(e);

        // Drop the waypoint onto the straight line between the
        // terminals (both connect at y=25).
        let ev = PointerEvent::at(Point::new(150.0, 50.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(150.0, 26.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(150.0, 26.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        assert!(waypoints(&rig, e).is_empty());
    }

    #[test]
    fn test_managed_routing_hides_bends() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut style = rig.model.cell(e).unwrap().style.clone();
        style.set(keys::EDGE_ROUTING, "orthogonal");
        rig.model.set_style(e, style).unwrap();
        rig.refresh();
        let mut h = EdgeHandler::new(e);

        let ev = PointerEvent::at(Point::new(150.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        assert!(!h.is_active());
        assert!(!ev.is_consumed());
    }

    #[test]
    fn test_label_click_without_drag_commits_nothing() {
        let mut rig = TestRig::new();
        rig.config.labels_movable = true;
        let (_a, _b, e) = connected_pair(&mut rig);
        // Managed routing keeps the segment midpoint free for the label.
        let mut style = rig.model.cell(e).unwrap().style.clone();
        style.set(keys::EDGE_ROUTING, "orthogonal");
        rig.model.set_style(e, style).unwrap();
        rig.refresh();
        let before = rig.snapshot();
        let mut h = EdgeHandler::new(e);

        let ev = PointerEvent::at(Point::new(150.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        assert!(h.is_active());
        let ev = PointerEvent::at(Point::new(150.0, 25.0));
        h.mouse_up(&mut rig.ctx(), &ev);
        assert_eq!(rig.snapshot(), before);
        assert_eq!(rig.model.cell(e).unwrap().geometry.offset, None);

        // An actual drag still stores the offset.
        let ev = PointerEvent::at(Point::new(150.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(150.0, 45.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(150.0, 45.0));
        h.mouse_up(&mut rig.ctx(), &ev);
        assert_eq!(
            rig.model.cell(e).unwrap().geometry.offset,
            Some(Vec2::new(0.0, 20.0))
        );
    }

    #[test]
    fn test_reconnect_target_to_anchor() {
        let mut rig = TestRig::new();
        let (_a, b, e) = connected_pair(&mut rig);
        let c = rig.vertex(Rect::new(200.0, 200.0, 300.0, 250.0));
        let mut h = EdgeHandler::new(e);

        // Pick up the target endpoint at (200,25)...
        let ev = PointerEvent::at(Point::new(200.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        assert!(h.is_active());
        // ...and drop it on c's top-middle anchor.
        let ev = PointerEvent::at(Point::new(249.0, 201.0)).with_cell(c);
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(249.0, 201.0)).with_cell(c);
        h.mouse_up(&mut rig.ctx(), &ev);

        let edge = rig.model.cell(e).unwrap();
        assert_eq!(edge.target, Some(c));
        assert_ne!(edge.target, Some(b));
        let anchor = edge.style.terminal_anchor(false).unwrap();
        assert_eq!(anchor.relative, Point::new(0.5, 0.0));
    }

    #[test]
    fn test_reconnect_to_dangling_point() {
        let mut rig = TestRig::new();
        let (_a, _b, e) = connected_pair(&mut rig);
        let mut h = EdgeHandler::new(e);

        let ev = PointerEvent::at(Point::new(200.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(400.0, 300.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(400.0, 300.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        let edge = rig.model.cell(e).unwrap();
        assert_eq!(edge.target, None);
        assert_eq!(edge.geometry.target_point, Some(Point::new(400.0, 300.0)));
    }

    #[test]
    fn test_dangling_forbidden_aborts() {
        let mut rig = TestRig::new();
        rig.config.allow_dangling_edges = false;
        let (_a, b, e) = connected_pair(&mut rig);
        let before = rig.snapshot();
        let mut h = EdgeHandler::new(e);

        let ev = PointerEvent::at(Point::new(200.0, 25.0));
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(400.0, 300.0));
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(400.0, 300.0));
        h.mouse_up(&mut rig.ctx(), &ev);

        assert_eq!(rig.snapshot(), before);
        assert_eq!(rig.model.cell(e).unwrap().target, Some(b));
    }

    #[test]
    fn test_invalid_connection_aborts_silently() {
        struct RejectAll;
        impl crate::policy::GraphPolicy for RejectAll {
            fn validate_edge(
                &self,
                _model: &diagrid_model::GraphModel,
                _edge: CellId,
                _source: Option<CellId>,
                _target: Option<CellId>,
            ) -> Option<String> {
                Some(String::new())
            }
        }

        let mut rig = TestRig::new();
        let (_a, b, e) = connected_pair(&mut rig);
        let c = rig.vertex(Rect::new(200.0, 200.0, 300.0, 250.0));
        let before = rig.snapshot();
        let mut h = EdgeHandler::new(e);
        let policy = RejectAll;

        let mut ctx = rig.ctx();
        ctx.policy = &policy;
        let ev = PointerEvent::at(Point::new(200.0, 25.0));
        h.mouse_down(&mut ctx, &ev);
        // Hover the center of c: marker path, judged invalid.
        let ev = PointerEvent::at(Point::new(250.0, 225.0)).with_cell(c);
        h.mouse_move(&mut ctx, &ev);
        let ev = PointerEvent::at(Point::new(250.0, 225.0)).with_cell(c);
        h.mouse_up(&mut ctx, &ev);

        assert_eq!(rig.snapshot(), before);
        assert_eq!(rig.model.cell(e).unwrap().target, Some(b));
    }

    #[test]
    fn test_alt_reconnect_clones_edge() {
        let mut rig = TestRig::new();
        let (a, b, e) = connected_pair(&mut rig);
        let c = rig.vertex(Rect::new(200.0, 200.0, 300.0, 250.0));
        let cells_before = rig.model.cell_count();
        let mut h = EdgeHandler::new(e);

        let alt = Modifiers {
            alt: true,
            ..Modifiers::default()
        };
        let ev = PointerEvent::at(Point::new(200.0, 25.0)).with_modifiers(alt);
        h.mouse_down(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(249.0, 201.0)).with_cell(c).with_modifiers(alt);
        h.mouse_move(&mut rig.ctx(), &ev);
        let ev = PointerEvent::at(Point::new(249.0, 201.0)).with_cell(c).with_modifiers(alt);
        h.mouse_up(&mut rig.ctx(), &ev);

        // Original untouched, one new edge from a to c.
        assert_eq!(rig.model.cell(e).unwrap().target, Some(b));
        assert_eq!(rig.model.cell_count(), cells_before + 1);
        let clone = rig
            .model
            .cells()
            .find(|cl| cl.is_edge() && cl.id != e)
            .unwrap();
        assert_eq!(clone.source, Some(a));
        assert_eq!(clone.target, Some(c));
    }
}
