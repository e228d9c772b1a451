//! Host-pluggable editing rules.
//!
//! The engine asks one policy object every question a gesture raises:
//! may this cell move, is this connection valid, is that vertex a drop
//! container. Hosts override individual methods; the defaults read the
//! plain capability flags on the cells.

use diagrid_model::{CellId, GraphModel, GraphView, ModelError};
use kurbo::Point;

/// Editing rules consulted by the handlers.
///
/// `validate_edge` follows a three-way protocol: `None` means the
/// connection is valid, `Some("")` rejects it silently, and a non-empty
/// message rejects it and is surfaced to the user.
pub trait GraphPolicy {
    fn is_cell_movable(&self, model: &GraphModel, id: CellId) -> bool {
        model.cell(id).is_some_and(|c| c.movable)
    }

    fn is_cell_resizable(&self, model: &GraphModel, id: CellId) -> bool {
        model.cell(id).is_some_and(|c| c.resizable)
    }

    fn is_cell_rotatable(&self, model: &GraphModel, id: CellId) -> bool {
        model.cell(id).is_some_and(|c| c.rotatable)
    }

    fn is_cell_connectable(&self, model: &GraphModel, id: CellId) -> bool {
        model.cell(id).is_some_and(|c| c.connectable)
    }

    fn is_cell_bendable(&self, model: &GraphModel, id: CellId) -> bool {
        model.cell(id).is_some_and(|c| c.bendable)
    }

    /// Validate a proposed connection for `edge`.
    fn validate_edge(
        &self,
        model: &GraphModel,
        edge: CellId,
        source: Option<CellId>,
        target: Option<CellId>,
    ) -> Option<String> {
        let _ = (model, edge, source, target);
        None
    }

    /// Whether `target` accepts the moving cells as new children.
    fn is_valid_drop_target(&self, model: &GraphModel, target: CellId, moving: &[CellId]) -> bool {
        if moving.contains(&target) {
            return false;
        }
        model
            .cell(target)
            .is_some_and(|c| c.is_vertex() && c.style.is_container())
    }

    /// Whether dropping the single moving vertex onto `edge` should
    /// split the edge through it.
    fn is_split_target(&self, model: &GraphModel, edge: CellId, moving: &[CellId]) -> bool {
        let [cell] = moving else {
            return false;
        };
        let Some(edge_cell) = model.cell(edge) else {
            return false;
        };
        if !edge_cell.is_edge() {
            return false;
        }
        // Splitting through one of the edge's own terminals is a no-op.
        if edge_cell.source == Some(*cell) || edge_cell.target == Some(*cell) {
            return false;
        }
        model.cell(*cell).is_some_and(|c| c.is_vertex() && c.connectable)
    }

    /// Extra draggable handles for a cell, in graph coordinates.
    fn custom_handles(&self, model: &GraphModel, view: &GraphView, cell: CellId) -> Vec<Point> {
        let _ = (model, view, cell);
        Vec::new()
    }

    /// Apply a drag of the `index`-th custom handle to `point`.
    fn apply_custom_handle(
        &self,
        model: &mut GraphModel,
        cell: CellId,
        index: usize,
        point: Point,
    ) -> Result<(), ModelError> {
        let _ = (model, cell, index, point);
        Ok(())
    }
}

/// The stock policy: capability flags decide everything, every
/// connection is valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl GraphPolicy for DefaultPolicy {}
