//! Handle layout and hit-testing for the per-cell handlers.
//!
//! Pure functions from a cell's resolved state to handle positions, and
//! the inverse pick from a pointer position. Vertex handles rotate with
//! the shape; edge handles follow the resolved polyline.

use diagrid_model::math::{dist_sq, rotate_point, ResizeHandle};
use diagrid_model::CellState;
use kurbo::Point;

/// Distance of the rotation grip above the shape's top edge.
pub const ROTATION_HANDLE_OFFSET: f64 = 25.0;

/// A grip on a selected vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexHandle {
    Resize(ResizeHandle),
    Rotate,
    Label,
    Custom(usize),
}

/// A grip on a selected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeHandle {
    Source,
    Target,
    /// Existing waypoint, by index into the edge's waypoint list.
    Bend(usize),
    /// Midpoint of segment `i`; dragging it materializes a waypoint.
    VirtualBend(usize),
    Label,
}

/// Positions of every grip on a vertex, rotated with the shape.
pub fn vertex_handle_positions(
    state: &CellState,
    custom: &[Point],
    resizable: bool,
    rotatable: bool,
    labels_movable: bool,
) -> Vec<(VertexHandle, Point)> {
    let rot = state.rotation.to_radians();
    let center = state.center();
    let place = |p: Point| {
        if rot != 0.0 {
            rotate_point(p, rot, center)
        } else {
            p
        }
    };

    let mut out = Vec::new();
    for (i, p) in custom.iter().enumerate() {
        out.push((VertexHandle::Custom(i), *p));
    }
    if rotatable {
        let top = Point::new(center.x, state.bounds.y0 - ROTATION_HANDLE_OFFSET);
        out.push((VertexHandle::Rotate, place(top)));
    }
    if resizable {
        for h in ResizeHandle::ALL {
            out.push((VertexHandle::Resize(h), place(h.position(state.bounds))));
        }
    }
    if labels_movable {
        out.push((VertexHandle::Label, center));
    }
    out
}

/// Pick the vertex grip under `p`, custom grips first, the label last.
pub fn hit_vertex_handle(
    state: &CellState,
    custom: &[Point],
    resizable: bool,
    rotatable: bool,
    labels_movable: bool,
    p: Point,
    tolerance: f64,
) -> Option<VertexHandle> {
    let tol_sq = tolerance * tolerance;
    vertex_handle_positions(state, custom, resizable, rotatable, labels_movable)
        .into_iter()
        .find(|(_, at)| dist_sq(*at, p) <= tol_sq)
        .map(|(h, _)| h)
}

/// Positions of every grip on an edge.
///
/// Bend and virtual-bend grips only appear on bendable edges whose
/// routing leaves the interior geometry to the user.
pub fn edge_handle_positions(state: &CellState, bendable: bool) -> Vec<(EdgeHandle, Point)> {
    let points = &state.absolute_points;
    let mut out = Vec::new();
    let Some(first) = points.first() else {
        return out;
    };
    let Some(last) = points.last() else {
        return out;
    };
    out.push((EdgeHandle::Source, *first));
    out.push((EdgeHandle::Target, *last));
    if bendable {
        for (i, p) in points[1..points.len() - 1].iter().enumerate() {
            out.push((EdgeHandle::Bend(i), *p));
        }
        for (i, seg) in points.windows(2).enumerate() {
            out.push((EdgeHandle::VirtualBend(i), seg[0].midpoint(seg[1])));
        }
    }
    out.push((EdgeHandle::Label, state.center()));
    out
}

/// Pick the edge grip under `p`. Terminals win over bends, bends over
/// virtual bends, the label comes last.
pub fn hit_edge_handle(
    state: &CellState,
    bendable: bool,
    labels_movable: bool,
    p: Point,
    tolerance: f64,
) -> Option<EdgeHandle> {
    let tol_sq = tolerance * tolerance;
    edge_handle_positions(state, bendable)
        .into_iter()
        .filter(|(h, _)| labels_movable || *h != EdgeHandle::Label)
        .find(|(_, at)| dist_sq(*at, p) <= tol_sq)
        .map(|(h, _)| h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagrid_model::CellKind;
    use kurbo::Rect;

    fn vertex_state(bounds: Rect, rotation: f64) -> CellState {
        let mut s = CellState::empty(uuid::Uuid::new_v4(), CellKind::Vertex);
        s.bounds = bounds;
        s.rotation = rotation;
        s
    }

    fn edge_state(points: Vec<Point>) -> CellState {
        let mut s = CellState::empty(uuid::Uuid::new_v4(), CellKind::Edge);
        s.absolute_points = points;
        s
    }

    #[test]
    fn test_vertex_handles_unrotated() {
        let state = vertex_state(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0);
        let hit = hit_vertex_handle(&state, &[], true, true, false, Point::new(99.0, 49.0), 8.0);
        assert_eq!(hit, Some(VertexHandle::Resize(ResizeHandle::BottomRight)));
        let hit = hit_vertex_handle(&state, &[], true, true, false, Point::new(50.0, -25.0), 8.0);
        assert_eq!(hit, Some(VertexHandle::Rotate));
        let hit = hit_vertex_handle(&state, &[], true, true, false, Point::new(50.0, 25.0), 8.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn test_vertex_handles_rotate_with_shape() {
        let state = vertex_state(Rect::new(0.0, 0.0, 100.0, 50.0), 90.0);
        // The unrotated top-center grip lands to the right of center
        // after a quarter turn.
        let hit = hit_vertex_handle(&state, &[], true, true, false, Point::new(75.0, 25.0), 2.0);
        assert_eq!(hit, Some(VertexHandle::Resize(ResizeHandle::Top)));
    }

    #[test]
    fn test_capability_flags_hide_handles() {
        let state = vertex_state(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0);
        let handles = vertex_handle_positions(&state, &[], false, false, false);
        assert!(handles.is_empty());
    }

    #[test]
    fn test_custom_handles_win() {
        let state = vertex_state(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0);
        let custom = [Point::new(100.0, 50.0)];
        let hit = hit_vertex_handle(&state, &custom, true, true, false, Point::new(99.0, 49.0), 8.0);
        assert_eq!(hit, Some(VertexHandle::Custom(0)));
    }

    #[test]
    fn test_edge_handles_priority() {
        let state = edge_state(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
        ]);
        let hit = hit_edge_handle(&state, true, false, Point::new(1.0, 0.0), 8.0);
        assert_eq!(hit, Some(EdgeHandle::Source));
        let hit = hit_edge_handle(&state, true, false, Point::new(50.0, 1.0), 8.0);
        assert_eq!(hit, Some(EdgeHandle::Bend(0)));
        let hit = hit_edge_handle(&state, true, false, Point::new(25.0, 0.0), 8.0);
        assert_eq!(hit, Some(EdgeHandle::VirtualBend(0)));
        let hit = hit_edge_handle(&state, true, false, Point::new(75.0, 0.0), 8.0);
        assert_eq!(hit, Some(EdgeHandle::VirtualBend(1)));
    }

    #[test]
    fn test_unbendable_edge_shows_terminals_only() {
        let state = edge_state(vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
        ]);
        let hit = hit_edge_handle(&state, false, false, Point::new(50.0, 1.0), 8.0);
        assert_eq!(hit, None);
        let hit = hit_edge_handle(&state, false, false, Point::new(100.0, 0.0), 8.0);
        assert_eq!(hit, Some(EdgeHandle::Target));
    }
}
