//! Normalized pointer events and the host-updated input context.

use crate::cell::CellId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

/// A pointer event already normalized by the host platform layer.
///
/// A handler calls `consume` exactly when it accepts ownership of the
/// gesture; consumed events are never acted on again.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    graph_point: Point,
    screen_point: Point,
    cell: Option<CellId>,
    pub modifiers: Modifiers,
    consumed: std::cell::Cell<bool>,
}

impl PointerEvent {
    pub fn new(
        graph_point: Point,
        screen_point: Point,
        cell: Option<CellId>,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            graph_point,
            screen_point,
            cell,
            modifiers,
            consumed: std::cell::Cell::new(false),
        }
    }

    /// Event at a graph position with no hit cell and no modifiers.
    pub fn at(graph_point: Point) -> Self {
        Self::new(graph_point, graph_point, None, Modifiers::default())
    }

    pub fn with_cell(mut self, cell: CellId) -> Self {
        self.cell = Some(cell);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn graph_point(&self) -> Point {
        self.graph_point
    }

    pub fn screen_point(&self) -> Point {
        self.screen_point
    }

    /// The cell the platform layer resolved under the pointer, if any.
    pub fn cell(&self) -> Option<CellId> {
        self.cell
    }

    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}

/// Explicit input context owned by the orchestrator and updated by the
/// host application. Replaces document-global key listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputContext {
    pub modifiers: Modifiers,
}

impl InputContext {
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}
