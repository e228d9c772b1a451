//! The per-cell handler seam.
//!
//! Every selected cell owns one handler for the duration of its
//! selection. A handler claims a gesture by consuming the pointer-down
//! event; from then on the orchestrator routes pointer traffic to that
//! handler alone until pointer-up or reset.

use crate::config::EditorConfig;
use crate::policy::GraphPolicy;
use diagrid_model::{CellId, GraphModel, GraphView, PointerEvent, Renderer};

/// Everything a handler needs for one call, borrowed from the host.
pub struct HandlerContext<'a> {
    pub model: &'a mut GraphModel,
    pub view: &'a mut GraphView,
    pub renderer: &'a mut dyn Renderer,
    pub policy: &'a dyn GraphPolicy,
    pub config: &'a EditorConfig,
    /// Number of currently selected cells. Gates live preview.
    pub selection_count: usize,
}

/// A manipulation handler bound to one cell.
pub trait CellHandler {
    fn cell(&self) -> CellId;

    /// Whether a gesture is in flight.
    fn is_active(&self) -> bool;

    /// Offer a pointer-down. The handler consumes the event to claim
    /// the gesture.
    fn mouse_down(&mut self, ctx: &mut HandlerContext, e: &PointerEvent);

    fn mouse_move(&mut self, ctx: &mut HandlerContext, e: &PointerEvent);

    fn mouse_up(&mut self, ctx: &mut HandlerContext, e: &PointerEvent);

    /// Abandon any in-flight gesture without committing.
    fn reset(&mut self, ctx: &mut HandlerContext);

    /// Re-publish handle overlays from current view state.
    fn redraw(&mut self, ctx: &mut HandlerContext);

    /// Remove every overlay owned by this handler.
    fn destroy(&mut self, ctx: &mut HandlerContext);
}
