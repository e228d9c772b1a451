//! Shared geometry math for the manipulation handlers.
//!
//! Free functions over plain geometry values: grid snapping, the resize
//! union used by vertex gestures, rotation helpers, perimeter projection
//! and point/segment distance.

use kurbo::{Point, Rect, Vec2};

/// Snap a scalar to the nearest multiple of `grid`.
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid > 0.0 {
        (value / grid).round() * grid
    } else {
        value
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_point(p: Point, grid: f64) -> Point {
    Point::new(snap(p.x, grid), snap(p.y, grid))
}

/// Which resize handle initiated a gesture. Determines the edges the
/// drag delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    pub fn touches_left(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft
        )
    }

    pub fn touches_right(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight
        )
    }

    pub fn touches_top(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight
        )
    }

    pub fn touches_bottom(self) -> bool {
        matches!(
            self,
            ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight
        )
    }

    /// Moves only a vertical edge (left or right).
    pub fn horizontal_only(self) -> bool {
        matches!(self, ResizeHandle::Left | ResizeHandle::Right)
    }

    /// Moves only a horizontal edge (top or bottom).
    pub fn vertical_only(self) -> bool {
        matches!(self, ResizeHandle::Top | ResizeHandle::Bottom)
    }

    /// Position of this handle on a bounding rectangle.
    pub fn position(self, bounds: Rect) -> Point {
        let cx = bounds.center().x;
        let cy = bounds.center().y;
        match self {
            ResizeHandle::TopLeft => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::Top => Point::new(cx, bounds.y0),
            ResizeHandle::TopRight => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::Right => Point::new(bounds.x1, cy),
            ResizeHandle::BottomRight => Point::new(bounds.x1, bounds.y1),
            ResizeHandle::Bottom => Point::new(cx, bounds.y1),
            ResizeHandle::BottomLeft => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::Left => Point::new(bounds.x0, cy),
        }
    }
}

/// Options for [`union_resize`].
#[derive(Debug, Clone, Copy)]
pub struct ResizeOptions {
    pub grid_size: f64,
    pub grid_enabled: bool,
    /// Preserve the original aspect ratio, anchoring the side opposite
    /// the dragged handle.
    pub constrained: bool,
    /// Expand symmetrically around the original center.
    pub centered: bool,
    pub min_size: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            grid_enabled: false,
            constrained: false,
            centered: false,
            min_size: 1.0,
        }
    }
}

/// Resize `bounds` by `delta` applied through `handle`.
///
/// Each edge the handle touches moves independently and snaps to the grid
/// when enabled. The delta is expected in the shape's local, unrotated
/// frame; callers re-rotate the result into parent coordinates.
pub fn union_resize(bounds: Rect, delta: Vec2, handle: ResizeHandle, opts: &ResizeOptions) -> Rect {
    let mut left = bounds.x0;
    let mut right = bounds.x1;
    let mut top = bounds.y0;
    let mut bottom = bounds.y1;

    if handle.touches_left() {
        left += delta.x;
        if opts.grid_enabled {
            left = snap(left, opts.grid_size);
        }
    }
    if handle.touches_right() {
        right += delta.x;
        if opts.grid_enabled {
            right = snap(right, opts.grid_size);
        }
    }
    if handle.touches_top() {
        top += delta.y;
        if opts.grid_enabled {
            top = snap(top, opts.grid_size);
        }
    }
    if handle.touches_bottom() {
        bottom += delta.y;
        if opts.grid_enabled {
            bottom = snap(bottom, opts.grid_size);
        }
    }

    let mut width = right - left;
    let mut height = bottom - top;

    // Dragging an edge past its opposite flips the rectangle.
    if width < 0.0 {
        left += width;
        width = -width;
    }
    if height < 0.0 {
        top += height;
        height = -height;
    }

    if opts.constrained && bounds.width() > 0.0 && bounds.height() > 0.0 {
        let aspect = bounds.width() / bounds.height();

        if handle.horizontal_only() {
            height = width / aspect;
        } else if handle.vertical_only() {
            width = height * aspect;
        } else {
            // Corner drag: the dominant relative change wins.
            let sx = width / bounds.width();
            let sy = height / bounds.height();
            if sx >= sy {
                height = width / aspect;
            } else {
                width = height * aspect;
            }
        }

        // Re-anchor so the side opposite the handle stays fixed; edges
        // that never moved stay centered on their original span.
        if handle.touches_left() {
            left = bounds.x1 - width;
        } else if !handle.touches_right() {
            left = bounds.x0 + (bounds.width() - width) / 2.0;
        } else {
            left = bounds.x0;
        }
        if handle.touches_top() {
            top = bounds.y1 - height;
        } else if !handle.touches_bottom() {
            top = bounds.y0 + (bounds.height() - height) / 2.0;
        } else {
            top = bounds.y0;
        }
    }

    if opts.centered {
        let center = bounds.center();
        let dw = width - bounds.width();
        let dh = height - bounds.height();
        width = (bounds.width() + 2.0 * dw).max(0.0);
        height = (bounds.height() + 2.0 * dh).max(0.0);
        left = center.x - width / 2.0;
        top = center.y - height / 2.0;
    }

    if opts.min_size > 0.0 {
        width = width.max(opts.min_size);
        height = height.max(opts.min_size);
    }

    Rect::new(left, top, left + width, top + height)
}

/// Rotate a point around `about` by `angle` radians.
pub fn rotate_point(p: Point, angle: f64, about: Point) -> Point {
    let cos = angle.cos();
    let sin = angle.sin();
    let dx = p.x - about.x;
    let dy = p.y - about.y;
    Point::new(
        about.x + dx * cos - dy * sin,
        about.y + dx * sin + dy * cos,
    )
}

/// Rotate a vector by `angle` radians.
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let cos = angle.cos();
    let sin = angle.sin();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Bearing from `center` to `p` in degrees, range (-180, 180].
pub fn bearing(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}

/// Raster a rotation angle to coarser increments as the pointer moves
/// away from the shape center: full degrees close in, up to 15-degree
/// steps at arm's length.
pub fn raster_angle(angle_deg: f64, dist: f64) -> f64 {
    let step = if dist < 100.0 {
        1.0
    } else if dist < 200.0 {
        5.0
    } else if dist < 300.0 {
        10.0
    } else {
        15.0
    };
    (angle_deg / step).round() * step
}

/// Round an angle to one decimal degree.
pub fn round_angle(angle_deg: f64) -> f64 {
    (angle_deg * 10.0).round() / 10.0
}

/// Project the ray from the center of `bounds` toward `from` onto the
/// rectangle perimeter. `rotation_deg` rotates the rectangle about its
/// center. Returns the center when `from` coincides with it.
pub fn perimeter_point(bounds: Rect, rotation_deg: f64, from: Point) -> Point {
    let center = bounds.center();
    let rot = rotation_deg.to_radians();
    // Work in the unrotated frame.
    let local = if rot != 0.0 {
        rotate_point(from, -rot, center)
    } else {
        from
    };
    let dx = local.x - center.x;
    let dy = local.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }
    let hw = bounds.width() / 2.0;
    let hh = bounds.height() / 2.0;
    let t = if dx == 0.0 {
        hh / dy.abs()
    } else if dy == 0.0 {
        hw / dx.abs()
    } else {
        (hw / dx.abs()).min(hh / dy.abs())
    };
    let hit = Point::new(center.x + t * dx, center.y + t * dy);
    if rot != 0.0 {
        rotate_point(hit, rot, center)
    } else {
        hit
    }
}

pub fn dist_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the segment `a`-`b`.
pub fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f64 {
    let len_sq = dist_sq(a, b);
    if len_sq == 0.0 {
        return dist_sq(p, a);
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    dist_sq(p, proj)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_snap() {
        assert!(approx(snap(23.0, 10.0), 20.0));
        assert!(approx(snap(25.0, 10.0), 30.0));
        assert!(approx(snap(23.0, 0.0), 23.0));
    }

    #[test]
    fn test_union_bottom_right_with_grid() {
        // The canonical scenario: (0,0,100,50) dragged by (+20,+20) at
        // the bottom-right with grid 10 -> (0,0,120,70).
        let opts = ResizeOptions {
            grid_size: 10.0,
            grid_enabled: true,
            ..ResizeOptions::default()
        };
        let out = union_resize(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Vec2::new(20.0, 20.0),
            ResizeHandle::BottomRight,
            &opts,
        );
        assert_eq!(out, Rect::new(0.0, 0.0, 120.0, 70.0));
    }

    #[test]
    fn test_union_left_handle_moves_origin() {
        let out = union_resize(
            Rect::new(10.0, 10.0, 110.0, 60.0),
            Vec2::new(-10.0, 0.0),
            ResizeHandle::Left,
            &ResizeOptions::default(),
        );
        assert_eq!(out, Rect::new(0.0, 10.0, 110.0, 60.0));
    }

    #[test]
    fn test_union_flip_past_opposite_edge() {
        let out = union_resize(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Vec2::new(-150.0, 0.0),
            ResizeHandle::Right,
            &ResizeOptions::default(),
        );
        assert!(approx(out.x0, -50.0));
        assert!(approx(out.x1, 0.0));
    }

    #[test]
    fn test_union_constrained_keeps_aspect_for_all_corners() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let opts = ResizeOptions {
            constrained: true,
            ..ResizeOptions::default()
        };
        for handle in [
            ResizeHandle::TopLeft,
            ResizeHandle::TopRight,
            ResizeHandle::BottomLeft,
            ResizeHandle::BottomRight,
        ] {
            let out = union_resize(bounds, Vec2::new(37.0, 13.0), handle, &opts);
            assert!(
                (out.width() / out.height() - 2.0).abs() < 1e-9,
                "aspect broken for {handle:?}: {out:?}"
            );
        }
    }

    #[test]
    fn test_union_constrained_anchors_opposite_corner() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let opts = ResizeOptions {
            constrained: true,
            ..ResizeOptions::default()
        };
        let out = union_resize(bounds, Vec2::new(50.0, 0.0), ResizeHandle::BottomRight, &opts);
        // Top-left corner is the anchor.
        assert!(approx(out.x0, 0.0));
        assert!(approx(out.y0, 0.0));
    }

    #[test]
    fn test_union_centered_preserves_center() {
        let bounds = Rect::new(10.0, 20.0, 110.0, 70.0);
        let opts = ResizeOptions {
            centered: true,
            ..ResizeOptions::default()
        };
        for handle in ResizeHandle::ALL {
            let out = union_resize(bounds, Vec2::new(17.0, -9.0), handle, &opts);
            assert!(approx(out.center().x, bounds.center().x), "{handle:?}");
            assert!(approx(out.center().y, bounds.center().y), "{handle:?}");
        }
    }

    #[test]
    fn test_union_min_size() {
        let out = union_resize(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Vec2::new(-9.9, -9.9),
            ResizeHandle::BottomRight,
            &ResizeOptions::default(),
        );
        assert!(out.width() >= 1.0 && out.height() >= 1.0);
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(
            Point::new(10.0, 0.0),
            std::f64::consts::FRAC_PI_2,
            Point::ZERO,
        );
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 10.0));
    }

    #[test]
    fn test_bearing() {
        assert!(approx(bearing(Point::ZERO, Point::new(10.0, 0.0)), 0.0));
        assert!(approx(bearing(Point::ZERO, Point::new(0.0, 10.0)), 90.0));
    }

    #[test]
    fn test_raster_angle_bands() {
        // Fine resolution near the shape, coarse far away.
        assert!(approx(raster_angle(37.4, 50.0), 37.0));
        assert!(approx(raster_angle(37.4, 150.0), 35.0));
        assert!(approx(raster_angle(37.4, 250.0), 40.0));
        assert!(approx(raster_angle(37.4, 500.0), 30.0));
    }

    #[test]
    fn test_perimeter_point_axis_aligned() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = perimeter_point(bounds, 0.0, Point::new(200.0, 25.0));
        assert!(approx(p.x, 100.0));
        assert!(approx(p.y, 25.0));

        let p = perimeter_point(bounds, 0.0, Point::new(50.0, -100.0));
        assert!(approx(p.x, 50.0));
        assert!(approx(p.y, 0.0));
    }

    #[test]
    fn test_perimeter_point_from_center() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(perimeter_point(bounds, 0.0, bounds.center()), bounds.center());
    }

    #[test]
    fn test_point_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        assert!(approx(point_segment_distance_sq(Point::new(50.0, 5.0), a, b), 25.0));
        // Beyond the endpoint the distance is to the endpoint itself.
        assert!(approx(
            point_segment_distance_sq(Point::new(110.0, 0.0), a, b),
            100.0
        ));
    }
}
