//! Geometry owned by a cell: bounds for vertices, waypoints and terminal
//! points for edges.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// The geometry of a single cell.
///
/// For vertices `rect` is expressed in the parent's coordinate space, or
/// as fractions of the parent bounds when `relative` is set (plus the
/// optional absolute `offset`). For edges `points` holds the interior
/// waypoints; `source_point`/`target_point` apply only while the matching
/// terminal reference on the cell is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub rect: Rect,
    pub relative: bool,
    pub offset: Option<Vec2>,
    pub points: Vec<Point>,
    pub source_point: Option<Point>,
    pub target_point: Option<Point>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            relative: false,
            offset: None,
            points: Vec::new(),
            source_point: None,
            target_point: None,
        }
    }
}

impl Geometry {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    /// Translate the whole geometry: bounds, waypoints and any explicit
    /// terminal points move together.
    pub fn translate(&mut self, delta: Vec2) {
        if !self.relative {
            self.rect = self.rect + delta;
        }
        for p in &mut self.points {
            *p += delta;
        }
        if let Some(p) = &mut self.source_point {
            *p += delta;
        }
        if let Some(p) = &mut self.target_point {
            *p += delta;
        }
    }

    /// Explicit terminal point for the given end, used while dangling.
    pub fn terminal_point(&self, is_source: bool) -> Option<Point> {
        if is_source {
            self.source_point
        } else {
            self.target_point
        }
    }

    pub fn set_terminal_point(&mut self, point: Option<Point>, is_source: bool) {
        if is_source {
            self.source_point = point;
        } else {
            self.target_point = point;
        }
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

/// A named anchor on a shape's boundary used for fixed connections.
///
/// `relative` is a (0..1, 0..1) point on the shape bounds; when
/// `perimeter` is set the resolved pixel point is projected onto the
/// shape's perimeter along the ray from the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConstraint {
    pub relative: Point,
    pub perimeter: bool,
    pub name: Option<String>,
}

impl ConnectionConstraint {
    pub fn new(x: f64, y: f64, perimeter: bool) -> Self {
        Self {
            relative: Point::new(x, y),
            perimeter,
            name: None,
        }
    }

    pub fn named(x: f64, y: f64, perimeter: bool, name: &str) -> Self {
        Self {
            relative: Point::new(x, y),
            perimeter,
            name: Some(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_moves_everything() {
        let mut geo = Geometry::new(Rect::new(10.0, 10.0, 30.0, 30.0));
        geo.points.push(Point::new(50.0, 50.0));
        geo.source_point = Some(Point::new(0.0, 0.0));
        geo.translate(Vec2::new(5.0, -5.0));

        assert_eq!(geo.rect, Rect::new(15.0, 5.0, 35.0, 25.0));
        assert_eq!(geo.points[0], Point::new(55.0, 45.0));
        assert_eq!(geo.source_point, Some(Point::new(5.0, -5.0)));
    }

    #[test]
    fn test_translate_skips_relative_rect() {
        let mut geo = Geometry::new(Rect::new(0.5, 0.5, 0.5, 0.5));
        geo.relative = true;
        geo.translate(Vec2::new(100.0, 100.0));
        assert_eq!(geo.rect, Rect::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_terminal_points() {
        let mut geo = Geometry::default();
        geo.set_terminal_point(Some(Point::new(1.0, 2.0)), true);
        assert_eq!(geo.terminal_point(true), Some(Point::new(1.0, 2.0)));
        assert_eq!(geo.terminal_point(false), None);
    }
}
