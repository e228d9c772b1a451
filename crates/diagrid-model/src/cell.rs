//! Cell definitions for the diagram model.

use crate::geometry::Geometry;
use crate::style::Style;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a cell. Survives every mutation of the cell.
pub type CellId = Uuid;

/// The kind of a cell - a node with bounds, or a connector between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Vertex,
    Edge,
}

/// A node in the diagram tree.
///
/// Cells form a tree via `parent`/`children`; child ordering is insertion
/// order and doubles as paint order (later entries draw on top). Edges
/// additionally reference a `source` and `target` cell, either of which
/// may be unset while the edge dangles.
///
/// Capability flags are plain data resolved once per query; the engine
/// never dispatches on the cell's runtime shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub kind: CellKind,
    pub parent: Option<CellId>,
    pub children: Vec<CellId>,
    pub source: Option<CellId>,
    pub target: Option<CellId>,
    pub geometry: Geometry,
    pub style: Style,
    pub visible: bool,
    pub collapsed: bool,
    pub movable: bool,
    pub resizable: bool,
    pub rotatable: bool,
    pub connectable: bool,
    pub bendable: bool,
}

impl Cell {
    /// Create a vertex with the given parent-relative bounds.
    pub fn vertex(rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: CellKind::Vertex,
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
            geometry: Geometry::new(rect),
            style: Style::new(),
            visible: true,
            collapsed: false,
            movable: true,
            resizable: true,
            rotatable: true,
            connectable: true,
            bendable: false,
        }
    }

    /// Create an unconnected edge.
    pub fn edge() -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: CellKind::Edge,
            parent: None,
            children: Vec::new(),
            source: None,
            target: None,
            geometry: Geometry::default(),
            style: Style::new(),
            visible: true,
            collapsed: false,
            movable: true,
            resizable: false,
            rotatable: false,
            connectable: false,
            bendable: true,
        }
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == CellKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == CellKind::Edge
    }

    /// Set a style entry, builder style.
    pub fn with_style(mut self, key: &str, value: &str) -> Self {
        self.style.set(key, value);
        self
    }

    /// Terminal reference for the given end.
    pub fn terminal(&self, is_source: bool) -> Option<CellId> {
        if is_source { self.source } else { self.target }
    }
}
