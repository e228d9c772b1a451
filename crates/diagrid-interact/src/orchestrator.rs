//! Selection bookkeeping and pointer-event fan-out.
//!
//! The orchestrator owns one handler per selected cell plus the shared
//! move handler, and enforces the single-gesture rule: the first
//! handler to consume a pointer-down owns every later event of that
//! gesture, and further pointer-downs are ignored until it ends.

use crate::edge::EdgeHandler;
use crate::handler::{CellHandler, HandlerContext};
use crate::mover::MoveHandler;
use crate::vertex::VertexHandler;
use diagrid_model::{CellId, InputContext, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveGesture {
    /// A per-cell handler owns the gesture.
    Handler(CellId),
    /// The selection-wide move handler owns it.
    Move,
}

/// Top-level interaction entry point for the host application.
pub struct SelectionHandler {
    handlers: Vec<Box<dyn CellHandler>>,
    mover: MoveHandler,
    selection: Vec<CellId>,
    active: Option<ActiveGesture>,
    /// Host-updated modifier state, for key events outside a gesture.
    pub input: InputContext,
}

impl Default for SelectionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            mover: MoveHandler::new(),
            selection: Vec::new(),
            active: None,
            input: InputContext::default(),
        }
    }

    pub fn selection(&self) -> &[CellId] {
        &self.selection
    }

    pub fn is_selected(&self, id: CellId) -> bool {
        self.selection.contains(&id)
    }

    pub fn has_active_gesture(&self) -> bool {
        self.active.is_some()
    }

    // ----- selection -----

    /// Replace the selection outright.
    pub fn set_selection(&mut self, ctx: &mut HandlerContext, ids: &[CellId]) {
        self.selection.clear();
        for id in ids {
            if ctx.model.contains(*id) && !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
        self.rebuild_handlers(ctx);
    }

    pub fn add_to_selection(&mut self, ctx: &mut HandlerContext, id: CellId) {
        if ctx.model.contains(id) && !self.selection.contains(&id) {
            self.selection.push(id);
            self.rebuild_handlers(ctx);
        }
    }

    pub fn remove_from_selection(&mut self, ctx: &mut HandlerContext, id: CellId) {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
            self.rebuild_handlers(ctx);
        }
    }

    pub fn clear_selection(&mut self, ctx: &mut HandlerContext) {
        self.selection.clear();
        self.rebuild_handlers(ctx);
    }

    fn rebuild_handlers(&mut self, ctx: &mut HandlerContext) {
        for h in &mut self.handlers {
            h.destroy(ctx);
        }
        self.handlers.clear();
        self.active = None;
        for id in self.selection.iter().take(ctx.config.max_handlers) {
            let Some(cell) = ctx.model.cell(*id) else {
                continue;
            };
            let handler: Box<dyn CellHandler> = if cell.is_edge() {
                Box::new(EdgeHandler::new(*id))
            } else {
                Box::new(VertexHandler::new(*id))
            };
            self.handlers.push(handler);
        }
        log::debug!(
            "selection changed: {} cell(s), {} handler(s)",
            self.selection.len(),
            self.handlers.len()
        );
    }

    fn handler_mut(&mut self, id: CellId) -> Option<&mut Box<dyn CellHandler>> {
        self.handlers.iter_mut().find(|h| h.cell() == id)
    }

    // ----- pointer routing -----

    pub fn mouse_down(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        if self.active.is_some() {
            // One gesture at a time; a second press changes nothing.
            return;
        }
        for h in &mut self.handlers {
            h.mouse_down(ctx, e);
            if e.is_consumed() {
                self.active = Some(ActiveGesture::Handler(h.cell()));
                return;
            }
        }
        // No handle hit: a press on a selected cell's body starts a
        // selection move.
        let hit = e
            .cell()
            .or_else(|| ctx.view.cell_at(e.graph_point(), 0.0, &|_| false));
        let Some(hit) = hit else {
            return;
        };
        let grabbed = self
            .selection
            .iter()
            .any(|s| *s == hit || ctx.model.is_ancestor(*s, hit));
        if grabbed {
            let selection = self.selection.clone();
            if self.mover.start(ctx, &selection, e) {
                self.active = Some(ActiveGesture::Move);
                e.consume();
            }
        }
    }

    pub fn mouse_move(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        match self.active {
            Some(ActiveGesture::Handler(id)) => match self.handler_mut(id) {
                Some(h) => {
                    h.mouse_move(ctx, e);
                    if !h.is_active() {
                        // The handler abandoned the gesture (stale state).
                        self.active = None;
                    }
                }
                None => self.active = None,
            },
            Some(ActiveGesture::Move) => self.mover.mouse_move(ctx, e),
            None => {}
        }
    }

    pub fn mouse_up(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        match self.active.take() {
            Some(ActiveGesture::Handler(id)) => {
                if let Some(h) = self.handler_mut(id) {
                    h.mouse_up(ctx, e);
                }
            }
            Some(ActiveGesture::Move) => self.mover.mouse_up(ctx, e),
            None => {}
        }
    }

    /// Abort any in-flight gesture without committing.
    pub fn escape(&mut self, ctx: &mut HandlerContext) {
        for h in &mut self.handlers {
            h.reset(ctx);
        }
        self.mover.reset(ctx);
        self.active = None;
    }

    // ----- change propagation -----

    /// Note a model change. Cheap; the actual rebuild happens once in
    /// [`flush`](Self::flush).
    pub fn model_changed(&mut self, ctx: &mut HandlerContext) {
        ctx.view.schedule_refresh();
    }

    /// Revalidate the view if stale, prune dead cells from the
    /// selection and rebuild handlers. Returns whether anything was
    /// rebuilt.
    pub fn flush(&mut self, ctx: &mut HandlerContext) -> bool {
        if !ctx.view.flush(ctx.model) {
            return false;
        }
        let before = self.selection.len();
        self.selection.retain(|id| ctx.model.contains(*id));
        if self.selection.len() != before || !self.handlers.is_empty() {
            self.rebuild_handlers(ctx);
        }
        for h in &mut self.handlers {
            h.redraw(ctx);
        }
        true
    }
}
