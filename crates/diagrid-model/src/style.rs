//! Cell styling as an opaque key/value map with typed accessors.

use crate::geometry::ConnectionConstraint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known style keys.
pub mod keys {
    /// Rotation in degrees.
    pub const ROTATION: &str = "rotation";
    /// `"fixed"` locks the aspect ratio during resize.
    pub const ASPECT: &str = "aspect";
    /// Edge routing kind; some routings own their interior geometry.
    pub const EDGE_ROUTING: &str = "edgeRouting";
    /// Semicolon-separated `x,y` anchor list, each in 0..1.
    pub const ANCHORS: &str = "anchors";
    /// `"1"` marks a container vertex.
    pub const CONTAINER: &str = "container";
    pub const SOURCE_ANCHOR_X: &str = "sourceAnchorX";
    pub const SOURCE_ANCHOR_Y: &str = "sourceAnchorY";
    pub const TARGET_ANCHOR_X: &str = "targetAnchorX";
    pub const TARGET_ANCHOR_Y: &str = "targetAnchorY";
}

/// Routings that compute their own interior points; user-placed bends
/// would be overwritten, so bend handles are hidden for these.
const MANAGED_ROUTINGS: [&str; 3] = ["orthogonal", "elbow", "entity"];

/// An ordered, opaque key -> value style map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    entries: BTreeMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Rotation in degrees, defaulting to zero.
    pub fn rotation(&self) -> f64 {
        self.get_f64(keys::ROTATION).unwrap_or(0.0)
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees == 0.0 {
            self.remove(keys::ROTATION);
        } else {
            self.set(keys::ROTATION, &format!("{degrees}"));
        }
    }

    /// Whether the aspect ratio is locked regardless of modifiers.
    pub fn fixed_aspect(&self) -> bool {
        self.get(keys::ASPECT) == Some("fixed")
    }

    pub fn routing(&self) -> Option<&str> {
        self.get(keys::EDGE_ROUTING)
    }

    /// True when the routing owns the edge's interior geometry.
    pub fn has_managed_routing(&self) -> bool {
        self.routing()
            .is_some_and(|r| MANAGED_ROUTINGS.contains(&r))
    }

    pub fn is_container(&self) -> bool {
        self.get(keys::CONTAINER) == Some("1")
    }

    /// Anchor points declared on the style, as relative (0..1) pairs.
    pub fn anchor_points(&self) -> Option<Vec<(f64, f64)>> {
        let raw = self.get(keys::ANCHORS)?;
        let mut out = Vec::new();
        for pair in raw.split(';') {
            let mut it = pair.split(',');
            let x: f64 = it.next()?.trim().parse().ok()?;
            let y: f64 = it.next()?.trim().parse().ok()?;
            out.push((x, y));
        }
        Some(out)
    }

    /// Record the anchor a terminal was connected through, or clear it.
    pub fn set_terminal_anchor(&mut self, is_source: bool, constraint: Option<&ConnectionConstraint>) {
        let (kx, ky) = if is_source {
            (keys::SOURCE_ANCHOR_X, keys::SOURCE_ANCHOR_Y)
        } else {
            (keys::TARGET_ANCHOR_X, keys::TARGET_ANCHOR_Y)
        };
        match constraint {
            Some(c) => {
                self.set(kx, &format!("{}", c.relative.x));
                self.set(ky, &format!("{}", c.relative.y));
            }
            None => {
                self.remove(kx);
                self.remove(ky);
            }
        }
    }

    /// The anchor a terminal is connected through, if any.
    pub fn terminal_anchor(&self, is_source: bool) -> Option<ConnectionConstraint> {
        let (kx, ky) = if is_source {
            (keys::SOURCE_ANCHOR_X, keys::SOURCE_ANCHOR_Y)
        } else {
            (keys::TARGET_ANCHOR_X, keys::TARGET_ANCHOR_Y)
        };
        let x = self.get_f64(kx)?;
        let y = self.get_f64(ky)?;
        Some(ConnectionConstraint::new(x, y, true))
    }
}
