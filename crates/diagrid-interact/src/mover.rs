//! Whole-selection move and clone gestures.
//!
//! One move handler serves the entire selection: it aggregates the
//! moving bounds, snaps the drag against alignment guides (grid as
//! fallback), previews ghost outlines, resolves the drop target while
//! excluding the moving cells and their descendants, and commits the
//! final move, clone, re-parent or edge split in one transaction.

use crate::guide::Guide;
use crate::handler::HandlerContext;
use crate::highlight::{CellHighlight, VALID_COLOR};
use diagrid_model::math;
use diagrid_model::{CellId, ModelError, Overlay, OverlayId, PointerEvent};
use kurbo::{Point, Rect, Vec2};

const GHOST_COLOR: &str = "#808080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropTarget {
    /// Drop into this container vertex.
    Parent(CellId),
    /// Split this edge through the single moving vertex.
    Split(CellId),
}

/// Move/clone engine for the current selection.
pub struct MoveHandler {
    cells: Vec<CellId>,
    start: Point,
    union: Rect,
    guide: Guide,
    delta: Vec2,
    cloning: bool,
    drop_target: Option<DropTarget>,
    highlight: CellHighlight,
    active: bool,
}

impl MoveHandler {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            start: Point::ZERO,
            union: Rect::ZERO,
            guide: Guide::new(2.0),
            delta: Vec2::ZERO,
            cloning: false,
            drop_target: None,
            highlight: CellHighlight::new("drop-target"),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn in_moving_set(&self, ctx: &HandlerContext, id: CellId) -> bool {
        self.cells
            .iter()
            .any(|c| *c == id || ctx.model.is_ancestor(*c, id))
    }

    /// Begin a move at `e` for `selection`. Only top-level movable
    /// cells take part; descendants ride along with their ancestors.
    /// Returns whether a gesture started.
    pub fn start(&mut self, ctx: &mut HandlerContext, selection: &[CellId], e: &PointerEvent) -> bool {
        let cells: Vec<CellId> = selection
            .iter()
            .copied()
            .filter(|id| ctx.policy.is_cell_movable(ctx.model, *id))
            .filter(|id| {
                !selection
                    .iter()
                    .any(|other| other != id && ctx.model.is_ancestor(*other, *id))
            })
            .collect();
        if cells.is_empty() {
            return false;
        }

        let mut union: Option<Rect> = None;
        for id in &cells {
            if let Some(state) = ctx.view.get_state(*id) {
                union = Some(match union {
                    Some(u) => u.union(state.bounds),
                    None => state.bounds,
                });
            }
        }
        let Some(union) = union else {
            return false;
        };

        self.cells = cells;
        self.union = union;
        self.start = e.graph_point();
        self.delta = Vec2::ZERO;
        self.cloning = false;
        self.drop_target = None;
        self.guide = Guide::new(ctx.config.guide_tolerance);
        // Stationary vertices, in paint order, are the guide candidates.
        let mut candidates = Vec::new();
        for id in ctx.view.paint_order().to_vec() {
            if self.in_moving_set(ctx, id) {
                continue;
            }
            if let Some(state) = ctx.view.get_state(id) {
                if !state.is_edge() && state.visible {
                    candidates.push(state.bounds);
                }
            }
        }
        self.guide.set_candidates(candidates);
        self.active = true;
        log::debug!("move gesture started with {} cell(s)", self.cells.len());
        true
    }

    pub fn mouse_move(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        if !self.active {
            return;
        }
        let p = e.graph_point();
        let mut delta = p - self.start;
        if e.modifiers.shift {
            // Constrain to the dominant axis.
            if delta.x.abs() >= delta.y.abs() {
                delta.y = 0.0;
            } else {
                delta.x = 0.0;
            }
        }
        self.cloning = e.modifiers.alt;

        let grid = ctx.config.grid_enabled.then_some(ctx.config.grid_size);
        if ctx.config.guides_enabled && !e.modifiers.alt {
            let result = self.guide.snap(self.union, delta, grid);
            delta = result.delta;
            self.guide.draw(ctx.renderer, &result);
        } else {
            if let Some(grid) = grid {
                delta.x = math::snap(self.union.x0 + delta.x, grid) - self.union.x0;
                delta.y = math::snap(self.union.y0 + delta.y, grid) - self.union.y0;
            }
            self.guide.hide(ctx.renderer);
        }
        self.delta = delta;

        // Ghost previews follow the snapped delta.
        for (i, id) in self.cells.iter().enumerate() {
            let Some(state) = ctx.view.get_state(*id) else {
                continue;
            };
            let overlay = if state.is_edge() {
                Overlay::Polyline {
                    points: state.absolute_points.iter().map(|p| *p + delta).collect(),
                    color: GHOST_COLOR.to_string(),
                    dashed: true,
                }
            } else {
                Overlay::Outline {
                    bounds: state.bounds + delta,
                    rotation: state.rotation,
                    color: GHOST_COLOR.to_string(),
                    dashed: true,
                }
            };
            ctx.renderer.set_overlay(OverlayId::new("move", i as u32), overlay);
        }

        self.drop_target = self.resolve_drop_target(ctx, p);
        let highlight_cell = match self.drop_target {
            Some(DropTarget::Parent(c)) | Some(DropTarget::Split(c)) => Some(c),
            None => None,
        };
        self.highlight
            .highlight(ctx.view, ctx.renderer, highlight_cell, VALID_COLOR);
    }

    /// Walk up from the cell under the pointer to the first valid
    /// container or splittable edge.
    fn resolve_drop_target(&self, ctx: &HandlerContext, p: Point) -> Option<DropTarget> {
        let moving = &self.cells;
        let mut cursor = ctx.view.cell_at(p, 0.0, &|c| self.in_moving_set(ctx, c));
        while let Some(c) = cursor {
            if ctx.config.split_enabled && ctx.policy.is_split_target(ctx.model, c, moving) {
                return Some(DropTarget::Split(c));
            }
            if ctx.policy.is_valid_drop_target(ctx.model, c, moving) {
                return Some(DropTarget::Parent(c));
            }
            cursor = ctx.model.parent_of(c).filter(|p| *p != ctx.model.root());
        }
        None
    }

    pub fn mouse_up(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        if !self.active {
            return;
        }
        let pointer = e.graph_point();
        let delta = self.delta;
        let moved = delta.hypot() > 0.0;
        let result = if moved {
            self.commit(ctx, pointer, delta)
        } else {
            Ok(())
        };
        if let Err(err) = result {
            log::warn!("move commit failed: {err}");
        }
        self.reset(ctx);
    }

    fn origin_of(&self, ctx: &HandlerContext, parent: CellId) -> Vec2 {
        if parent == ctx.model.root() {
            return Vec2::ZERO;
        }
        ctx.view
            .get_state(parent)
            .map(|s| Vec2::new(s.bounds.x0, s.bounds.y0))
            .unwrap_or(Vec2::ZERO)
    }

    fn commit(&mut self, ctx: &mut HandlerContext, pointer: Point, delta: Vec2) -> Result<(), ModelError> {
        let cells = self.cells.clone();
        let drop_target = self.drop_target;
        let cloning = self.cloning;

        if cloning {
            let root = ctx.model.root();
            let target = match drop_target {
                Some(DropTarget::Parent(p)) => Some(p),
                _ => None,
            };
            // Without a drop target each clone stays beside its original
            // under the same parent; with one, its geometry is
            // re-expressed in the target's frame.
            let dests: Vec<(CellId, Vec2)> = cells
                .iter()
                .map(|id| {
                    let old_parent = ctx.model.parent_of(*id).unwrap_or(root);
                    let parent = target.unwrap_or(old_parent);
                    let shift =
                        delta + self.origin_of(ctx, old_parent) - self.origin_of(ctx, parent);
                    (parent, shift)
                })
                .collect();
            return ctx.model.transact(|m| {
                let clones = m.clone_cells(&cells, Vec2::ZERO, root)?;
                for (clone, (parent, shift)) in clones.iter().zip(&dests) {
                    let mut geo = m
                        .cell(*clone)
                        .ok_or(ModelError::UnknownCell(*clone))?
                        .geometry
                        .clone();
                    geo.translate(*shift);
                    m.set_geometry(*clone, geo)?;
                    if m.parent_of(*clone) != Some(*parent) {
                        m.set_parent(*clone, *parent, None)?;
                    }
                }
                Ok(())
            });
        }

        let new_parent = match drop_target {
            Some(DropTarget::Parent(p)) => Some(p),
            _ => None,
        };
        let root = ctx.model.root();
        // Dragging fully outside the current parent falls back to the
        // root when removal from parents is enabled.
        let escape_to_root = |ctx: &HandlerContext, id: CellId| -> bool {
            if !ctx.config.remove_from_parent {
                return false;
            }
            let Some(parent) = ctx.model.parent_of(id) else {
                return false;
            };
            if parent == root {
                return false;
            }
            ctx.view
                .get_state(parent)
                .is_some_and(|s| !s.bounds.contains(pointer))
        };

        let mut reparent: Vec<(CellId, CellId, Vec2)> = Vec::new();
        for id in &cells {
            let old_parent = ctx.model.parent_of(*id).unwrap_or(root);
            let target = match new_parent {
                Some(p) if p != old_parent => Some(p),
                Some(_) => None,
                None if escape_to_root(ctx, *id) => Some(root),
                None => None,
            };
            let shift = match target {
                Some(t) => delta + self.origin_of(ctx, old_parent) - self.origin_of(ctx, t),
                None => delta,
            };
            reparent.push((*id, target.unwrap_or(old_parent), shift));
        }
        let old_parents: Vec<CellId> = cells
            .iter()
            .filter_map(|id| ctx.model.parent_of(*id))
            .collect();
        let split = match drop_target {
            Some(DropTarget::Split(edge)) => Some(edge),
            _ => None,
        };
        let prune = ctx.config.prune_empty_containers;

        ctx.model.transact(|m| {
            for (id, parent, shift) in &reparent {
                let mut geo = m
                    .cell(*id)
                    .ok_or(ModelError::UnknownCell(*id))?
                    .geometry
                    .clone();
                geo.translate(*shift);
                m.set_geometry(*id, geo)?;
                if m.parent_of(*id) != Some(*parent) {
                    m.set_parent(*id, *parent, None)?;
                }
            }
            if let (Some(edge), [moved]) = (split, cells.as_slice()) {
                Self::split_edge(m, edge, *moved)?;
            }
            if prune {
                for parent in old_parents {
                    let still_there = m.contains(parent);
                    if still_there
                        && parent != m.root()
                        && m.children_of(parent).is_empty()
                        && m.cell(parent).is_some_and(|c| c.style.is_container())
                    {
                        m.remove(parent)?;
                    }
                }
            }
            Ok(())
        })
    }

    /// Split `edge` through `cell`: a clone keeps the original source
    /// and ends at the cell, the original now starts at the cell.
    fn split_edge(
        m: &mut diagrid_model::GraphModel,
        edge: CellId,
        cell: CellId,
    ) -> Result<(), ModelError> {
        let parent = m.parent_of(edge).unwrap_or(m.root());
        let clones = m.clone_cells(&[edge], Vec2::ZERO, parent)?;
        let Some(clone) = clones.first().copied() else {
            return Err(ModelError::UnknownCell(edge));
        };
        // Interior waypoints belong to neither half after a split.
        for id in [clone, edge] {
            let mut geo = m
                .cell(id)
                .ok_or(ModelError::UnknownCell(id))?
                .geometry
                .clone();
            geo.points.clear();
            m.set_geometry(id, geo)?;
        }
        m.set_terminal(clone, Some(cell), false)?;
        m.set_terminal(edge, Some(cell), true)?;
        Ok(())
    }

    pub fn reset(&mut self, ctx: &mut HandlerContext) {
        if self.active {
            for i in 0..self.cells.len() {
                ctx.renderer.clear_overlay(OverlayId::new("move", i as u32));
            }
        }
        self.guide.hide(ctx.renderer);
        self.highlight.unhighlight(ctx.renderer);
        self.cells.clear();
        self.delta = Vec2::ZERO;
        self.drop_target = None;
        self.cloning = false;
        self.active = false;
        ctx.view.schedule_refresh();
    }
}

impl Default for MoveHandler {
    fn default() -> Self {
        Self::new()
    }
}
