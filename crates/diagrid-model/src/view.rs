//! The derived, render-ready view of the model.
//!
//! [`GraphView::validate`] resolves every visible cell into a
//! [`CellState`] with absolute coordinates: vertex bounds accumulated
//! through the parent chain, edge polylines with both endpoints
//! resolved against their terminals. Handlers read and hit-test states;
//! during a gesture they may write preview values back through
//! [`GraphView::state_mut`] without touching the model.

use crate::cell::{CellId, CellKind};
use crate::geometry::ConnectionConstraint;
use crate::math::{perimeter_point, point_segment_distance_sq, rotate_point};
use crate::model::GraphModel;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// Resolved display state of one cell, in graph coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub cell: CellId,
    pub kind: CellKind,
    /// Absolute bounds. For edges this is the bounding box of the
    /// resolved polyline.
    pub bounds: Rect,
    /// Rotation in degrees about the bounds center.
    pub rotation: f64,
    /// For edges: the full polyline, endpoints included. Always exactly
    /// two longer than the edge's waypoint list.
    pub absolute_points: Vec<Point>,
    pub visible: bool,
    pub connectable: bool,
}

impl CellState {
    pub fn empty(cell: CellId, kind: CellKind) -> Self {
        Self {
            cell,
            kind,
            bounds: Rect::ZERO,
            rotation: 0.0,
            absolute_points: Vec::new(),
            visible: true,
            connectable: false,
        }
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Rotation-aware containment test, inflated by `tolerance`.
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        if self.is_edge() {
            let tol_sq = tolerance * tolerance;
            return self
                .absolute_points
                .windows(2)
                .any(|seg| point_segment_distance_sq(point, seg[0], seg[1]) <= tol_sq);
        }
        let local = if self.rotation != 0.0 {
            rotate_point(point, -self.rotation.to_radians(), self.center())
        } else {
            point
        };
        self.bounds.inflate(tolerance, tolerance).contains(local)
    }
}

/// Derived state for the whole diagram plus the canvas transform.
#[derive(Debug, Clone)]
pub struct GraphView {
    pub scale: f64,
    pub translate: Vec2,
    states: HashMap<CellId, CellState>,
    /// Paint order, bottom-most first. The root is not included.
    order: Vec<CellId>,
    validated_revision: Option<u64>,
    refresh_pending: bool,
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphView {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
            states: HashMap::new(),
            order: Vec::new(),
            validated_revision: None,
            refresh_pending: false,
        }
    }

    pub fn get_state(&self, id: CellId) -> Option<&CellState> {
        self.states.get(&id)
    }

    /// Mutable access for gesture live preview. Preview writes are
    /// discarded by the next `validate`.
    pub fn state_mut(&mut self, id: CellId) -> Option<&mut CellState> {
        self.states.get_mut(&id)
    }

    /// Cell ids in paint order, bottom-most first.
    pub fn paint_order(&self) -> &[CellId] {
        &self.order
    }

    pub fn screen_to_graph(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate.x) / self.scale,
            (p.y - self.translate.y) / self.scale,
        )
    }

    pub fn graph_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate.x,
            p.y * self.scale + self.translate.y,
        )
    }

    // ----- refresh -----

    /// Note that derived state is stale. Many calls coalesce into the
    /// single rebuild performed by the next [`flush`](Self::flush).
    pub fn schedule_refresh(&mut self) {
        self.refresh_pending = true;
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Rebuild derived state if anything marked it stale. Returns
    /// whether a rebuild happened.
    pub fn flush(&mut self, model: &GraphModel) -> bool {
        if self.refresh_pending || self.validated_revision != Some(model.revision()) {
            self.validate(model);
            true
        } else {
            false
        }
    }

    /// Full rebuild of all cell states from the model.
    pub fn validate(&mut self, model: &GraphModel) {
        self.states.clear();
        self.order.clear();
        let mut edges: Vec<(CellId, Vec2)> = Vec::new();
        let root = model.root();
        let root_children: Vec<CellId> = model.children_of(root).to_vec();
        for child in root_children {
            self.validate_vertex_tree(model, child, Rect::ZERO, true, &mut edges);
        }
        // Edges resolve after every vertex has a state, so terminals
        // later in the tree are already available.
        for (edge, origin) in edges {
            self.validate_edge(model, edge, origin);
        }
        self.validated_revision = Some(model.revision());
        self.refresh_pending = false;
        log::trace!("view validated: {} state(s)", self.states.len());
    }

    fn validate_vertex_tree(
        &mut self,
        model: &GraphModel,
        id: CellId,
        parent_bounds: Rect,
        parent_visible: bool,
        edges: &mut Vec<(CellId, Vec2)>,
    ) {
        let Some(cell) = model.cell(id) else {
            return;
        };
        let origin = Vec2::new(parent_bounds.x0, parent_bounds.y0);
        if cell.is_edge() {
            self.order.push(id);
            edges.push((id, origin));
            return;
        }

        let geo = &cell.geometry;
        let bounds = if geo.relative {
            let offset = geo.offset.unwrap_or(Vec2::ZERO);
            let x = parent_bounds.x0 + geo.rect.x0 * parent_bounds.width() + offset.x;
            let y = parent_bounds.y0 + geo.rect.y0 * parent_bounds.height() + offset.y;
            Rect::new(x, y, x + geo.rect.width(), y + geo.rect.height())
        } else {
            geo.rect + origin
        };
        let visible = parent_visible && cell.visible;

        let mut state = CellState::empty(id, CellKind::Vertex);
        state.bounds = bounds;
        state.rotation = cell.style.rotation();
        state.visible = visible;
        state.connectable = cell.connectable;
        self.states.insert(id, state);
        self.order.push(id);

        if !cell.collapsed {
            for child in cell.children.clone() {
                self.validate_vertex_tree(model, child, bounds, visible, edges);
            }
        }
    }

    fn validate_edge(&mut self, model: &GraphModel, id: CellId, origin: Vec2) {
        let Some(cell) = model.cell(id) else {
            return;
        };
        let geo = &cell.geometry;
        let waypoints: Vec<Point> = geo.points.iter().map(|p| *p + origin).collect();

        // References steer the perimeter projection: the nearest
        // waypoint if any, otherwise the far end.
        let source_hint = self.terminal_hint(model, cell.source, geo.terminal_point(true), origin);
        let target_hint = self.terminal_hint(model, cell.target, geo.terminal_point(false), origin);
        let source_ref = waypoints.first().copied().or(target_hint);
        let target_ref = waypoints.last().copied().or(source_hint);

        let source = self.resolve_endpoint(model, cell.source, id, true, origin, source_ref);
        let target = self.resolve_endpoint(model, cell.target, id, false, origin, target_ref);

        let mut points = Vec::with_capacity(waypoints.len() + 2);
        points.push(source);
        points.extend(waypoints);
        points.push(target);

        let mut bounds = Rect::from_points(points[0], points[0]);
        for p in &points[1..] {
            bounds = bounds.union_pt(*p);
        }

        let mut state = CellState::empty(id, CellKind::Edge);
        state.bounds = bounds;
        state.absolute_points = points;
        state.visible = cell.visible;
        state.connectable = cell.connectable;
        self.states.insert(id, state);
    }

    /// A rough position for one end, used as the other end's reference.
    fn terminal_hint(
        &self,
        model: &GraphModel,
        terminal: Option<CellId>,
        explicit: Option<Point>,
        origin: Vec2,
    ) -> Option<Point> {
        if let Some(t) = terminal {
            if let Some(state) = self.get_state(t) {
                return Some(state.center());
            }
            return model
                .cell(t)
                .map(|c| c.geometry.center() + origin);
        }
        explicit.map(|p| p + origin)
    }

    fn resolve_endpoint(
        &self,
        model: &GraphModel,
        terminal: Option<CellId>,
        edge: CellId,
        is_source: bool,
        origin: Vec2,
        reference: Option<Point>,
    ) -> Point {
        if let Some(t) = terminal {
            if let Some(state) = self.get_state(t) {
                let anchor = model
                    .cell(edge)
                    .and_then(|c| c.style.terminal_anchor(is_source));
                if let Some(constraint) = anchor {
                    return self.get_connection_point(state, &constraint);
                }
                let toward = reference.unwrap_or_else(|| state.center());
                return perimeter_point(state.bounds, state.rotation, toward);
            }
        }
        // Dangling end: explicit terminal point, then the reference,
        // then anything at all so the polyline stays well-formed.
        model
            .cell(edge)
            .and_then(|c| c.geometry.terminal_point(is_source))
            .map(|p| p + origin)
            .or(reference)
            .unwrap_or(Point::ZERO)
    }

    /// Resolve a connection constraint against a terminal's state.
    pub fn get_connection_point(&self, state: &CellState, constraint: &ConnectionConstraint) -> Point {
        let b = state.bounds;
        let p = Point::new(
            b.x0 + constraint.relative.x * b.width(),
            b.y0 + constraint.relative.y * b.height(),
        );
        let p = if state.rotation != 0.0 {
            rotate_point(p, state.rotation.to_radians(), state.center())
        } else {
            p
        };
        if constraint.perimeter && p != state.center() {
            perimeter_point(b, state.rotation, p)
        } else {
            p
        }
    }

    /// All fixed connection points a terminal offers: the style's
    /// declared anchors, or a default ring of side midpoints and
    /// corners.
    pub fn get_all_connection_constraints(
        &self,
        model: &GraphModel,
        id: CellId,
    ) -> Vec<ConnectionConstraint> {
        let Some(cell) = model.cell(id) else {
            return Vec::new();
        };
        if !cell.connectable || cell.is_edge() {
            return Vec::new();
        }
        if let Some(declared) = cell.style.anchor_points() {
            return declared
                .into_iter()
                .map(|(x, y)| ConnectionConstraint::new(x, y, true))
                .collect();
        }
        [
            (0.5, 0.0),
            (1.0, 0.0),
            (1.0, 0.5),
            (1.0, 1.0),
            (0.5, 1.0),
            (0.0, 1.0),
            (0.0, 0.5),
            (0.0, 0.0),
        ]
        .into_iter()
        .map(|(x, y)| ConnectionConstraint::new(x, y, true))
        .collect()
    }

    /// Topmost visible cell under `point`, honoring paint order.
    /// `ignore` filters candidates out (the cell being dragged, say).
    pub fn cell_at(
        &self,
        point: Point,
        tolerance: f64,
        ignore: &dyn Fn(CellId) -> bool,
    ) -> Option<CellId> {
        for id in self.order.iter().rev() {
            if ignore(*id) {
                continue;
            }
            let Some(state) = self.get_state(*id) else {
                continue;
            };
            if !state.visible {
                continue;
            }
            if state.contains(point, tolerance) {
                return Some(*id);
            }
        }
        None
    }
}
