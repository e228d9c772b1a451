//! Resize, rotate and label gestures on a single vertex.
//!
//! The handler previews the whole gesture without touching the model:
//! either live, by rewriting the cell's view state in place, or as a
//! ghost outline when the cell has children or the selection is large.
//! Pointer-up commits the final bounds in one transaction; reset at any
//! point abandons the gesture with the model untouched.

use crate::handle::{hit_vertex_handle, VertexHandle};
use crate::handler::{CellHandler, HandlerContext};
use diagrid_model::math::{self, ResizeHandle, ResizeOptions};
use diagrid_model::{CellId, CellKind, GraphModel, ModelError, Overlay, OverlayId, PointerEvent};
use kurbo::{Point, Rect, Vec2};

const PREVIEW_ID: OverlayId = OverlayId {
    source: "vertex-preview",
    index: 0,
};
const PREVIEW_COLOR: &str = "#1e90ff";

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Resize {
        handle: ResizeHandle,
        start: Point,
        start_bounds: Rect,
        rotation: f64,
    },
    Rotate {
        center: Point,
        start_rotation: f64,
        start_bearing: f64,
    },
    Label {
        start: Point,
        initial_offset: Vec2,
    },
    Custom {
        index: usize,
    },
}

/// Manipulation handler for one selected vertex.
pub struct VertexHandler {
    cell: CellId,
    gesture: Option<Gesture>,
    preview_bounds: Option<Rect>,
    preview_rotation: Option<f64>,
    last_point: Point,
    live_preview: bool,
}

impl VertexHandler {
    pub fn new(cell: CellId) -> Self {
        Self {
            cell,
            gesture: None,
            preview_bounds: None,
            preview_rotation: None,
            last_point: Point::ZERO,
            live_preview: false,
        }
    }

    fn update_resize_preview(
        &mut self,
        ctx: &mut HandlerContext,
        e: &PointerEvent,
        handle: ResizeHandle,
        start: Point,
        start_bounds: Rect,
        rotation: f64,
    ) {
        let fixed_aspect = ctx
            .model
            .cell(self.cell)
            .is_some_and(|c| c.style.fixed_aspect());
        let opts = ResizeOptions {
            grid_size: ctx.config.grid_size,
            grid_enabled: ctx.config.grid_enabled,
            constrained: e.modifiers.shift || fixed_aspect,
            centered: e.modifiers.alt,
            min_size: ctx.config.min_cell_size,
        };
        let rot = rotation.to_radians();
        let delta = e.graph_point() - start;
        let local_delta = if rot != 0.0 {
            math::rotate_vec(delta, -rot)
        } else {
            delta
        };
        let local = math::union_resize(start_bounds, local_delta, handle, &opts);
        // Rotation happens about the shape center, so a center shift in
        // the local frame maps to a rotated shift in graph coordinates.
        let mut new = if rot != 0.0 {
            let dc = local.center() - start_bounds.center();
            local + (math::rotate_vec(dc, rot) - dc)
        } else {
            local
        };
        if let Some(max) = ctx.config.max_bounds {
            new = new.intersect(max);
        }
        // An unrotated parent may not be shrunk off its children.
        if rotation == 0.0 {
            for child in ctx.model.children_of(self.cell).to_vec() {
                if let Some(s) = ctx.view.get_state(child) {
                    new = new.union(s.bounds);
                }
            }
        }
        self.preview_bounds = Some(new);
        self.show_preview(ctx, new, rotation);
    }

    fn show_preview(&mut self, ctx: &mut HandlerContext, bounds: Rect, rotation: f64) {
        if self.live_preview {
            if let Some(state) = ctx.view.state_mut(self.cell) {
                state.bounds = bounds;
                state.rotation = rotation;
                let state = state.clone();
                ctx.renderer.redraw(&state, true);
                return;
            }
        }
        ctx.renderer.set_overlay(
            PREVIEW_ID,
            Overlay::Outline {
                bounds,
                rotation,
                color: PREVIEW_COLOR.to_string(),
                dashed: true,
            },
        );
    }

    fn commit_resize(
        &self,
        ctx: &mut HandlerContext,
        start_bounds: Rect,
        new: Rect,
    ) -> Result<(), ModelError> {
        let cell = self.cell;
        ctx.model.transact(|m| {
            let geo = m
                .cell(cell)
                .ok_or(ModelError::UnknownCell(cell))?
                .geometry
                .clone();
            let dx0 = new.x0 - start_bounds.x0;
            let dy0 = new.y0 - start_bounds.y0;
            let x0 = geo.rect.x0 + dx0;
            let y0 = geo.rect.y0 + dy0;
            let mut geo = geo;
            geo.rect = Rect::new(x0, y0, x0 + new.width(), y0 + new.height());
            m.set_geometry(cell, geo)?;
            // Children live in parent coordinates; counter-translate so
            // they keep their absolute position when the origin moves.
            if dx0 != 0.0 || dy0 != 0.0 {
                for child in m.children_of(cell).to_vec() {
                    let Some(c) = m.cell(child) else {
                        continue;
                    };
                    if c.geometry.relative {
                        continue;
                    }
                    let mut cg = c.geometry.clone();
                    cg.translate(Vec2::new(-dx0, -dy0));
                    m.set_geometry(child, cg)?;
                }
            }
            Ok(())
        })
    }

    fn commit_rotation(&self, ctx: &mut HandlerContext, degrees: f64) -> Result<(), ModelError> {
        let cell = self.cell;
        ctx.model.transact(|m| {
            let mut style = m
                .cell(cell)
                .ok_or(ModelError::UnknownCell(cell))?
                .style
                .clone();
            let delta = math::round_angle(degrees) - style.rotation();
            style.set_rotation(math::round_angle(degrees));
            m.set_style(cell, style)?;
            rotate_children(m, cell, delta)
        })
    }

    fn commit_label(
        &self,
        ctx: &mut HandlerContext,
        start: Point,
        initial_offset: Vec2,
    ) -> Result<(), ModelError> {
        let cell = self.cell;
        let offset = initial_offset + (self.last_point - start);
        ctx.model.transact(|m| {
            let mut geo = m
                .cell(cell)
                .ok_or(ModelError::UnknownCell(cell))?
                .geometry
                .clone();
            geo.offset = Some(offset);
            m.set_geometry(cell, geo)
        })
    }
}

/// Carry a rotation delta into the non-relative children of `parent`,
/// turning each about the parent's local center so the subtree turns as
/// one rigid piece.
fn rotate_children(m: &mut GraphModel, parent: CellId, delta_deg: f64) -> Result<(), ModelError> {
    if delta_deg == 0.0 {
        return Ok(());
    }
    let Some(p) = m.cell(parent) else {
        return Ok(());
    };
    let center = Point::new(p.geometry.rect.width() / 2.0, p.geometry.rect.height() / 2.0);
    let rot = delta_deg.to_radians();
    for child in m.children_of(parent).to_vec() {
        let Some(c) = m.cell(child) else {
            continue;
        };
        if c.geometry.relative {
            continue;
        }
        let mut geo = c.geometry.clone();
        match c.kind {
            CellKind::Vertex => {
                let new_center = math::rotate_point(geo.rect.center(), rot, center);
                let (w, h) = (geo.rect.width(), geo.rect.height());
                geo.rect = Rect::new(
                    new_center.x - w / 2.0,
                    new_center.y - h / 2.0,
                    new_center.x + w / 2.0,
                    new_center.y + h / 2.0,
                );
                let mut style = c.style.clone();
                style.set_rotation(math::round_angle(style.rotation() + delta_deg));
                m.set_geometry(child, geo)?;
                m.set_style(child, style)?;
                rotate_children(m, child, delta_deg)?;
            }
            CellKind::Edge => {
                for pt in &mut geo.points {
                    *pt = math::rotate_point(*pt, rot, center);
                }
                if let Some(sp) = geo.source_point {
                    geo.source_point = Some(math::rotate_point(sp, rot, center));
                }
                if let Some(tp) = geo.target_point {
                    geo.target_point = Some(math::rotate_point(tp, rot, center));
                }
                m.set_geometry(child, geo)?;
            }
        }
    }
    Ok(())
}

impl CellHandler for VertexHandler {
    fn cell(&self) -> CellId {
        self.cell
    }

    fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    fn mouse_down(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        if e.is_consumed() || self.gesture.is_some() {
            return;
        }
        let Some(state) = ctx.view.get_state(self.cell) else {
            return;
        };
        let custom = ctx.policy.custom_handles(ctx.model, ctx.view, self.cell);
        let resizable = ctx.policy.is_cell_resizable(ctx.model, self.cell);
        let rotatable = ctx.policy.is_cell_rotatable(ctx.model, self.cell);
        let p = e.graph_point();
        let Some(hit) = hit_vertex_handle(
            state,
            &custom,
            resizable,
            rotatable,
            ctx.config.labels_movable,
            p,
            ctx.config.handle_tolerance,
        ) else {
            return;
        };

        self.live_preview = ctx.model.children_of(self.cell).is_empty()
            && ctx.selection_count <= ctx.config.live_preview_max_cells;
        self.last_point = p;
        self.gesture = Some(match hit {
            VertexHandle::Resize(handle) => Gesture::Resize {
                handle,
                start: p,
                start_bounds: state.bounds,
                rotation: state.rotation,
            },
            VertexHandle::Rotate => {
                let center = state.center();
                Gesture::Rotate {
                    center,
                    start_rotation: state.rotation,
                    start_bearing: math::bearing(center, p),
                }
            }
            VertexHandle::Label => {
                let initial_offset = ctx
                    .model
                    .cell(self.cell)
                    .and_then(|c| c.geometry.offset)
                    .unwrap_or(Vec2::ZERO);
                Gesture::Label {
                    start: p,
                    initial_offset,
                }
            }
            VertexHandle::Custom(index) => Gesture::Custom { index },
        });
        log::debug!("vertex gesture started on {:?}", hit);
        e.consume();
    }

    fn mouse_move(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        let Some(gesture) = self.gesture else {
            return;
        };
        // The cell vanished mid-gesture (a concurrent edit): abandon.
        if ctx.view.get_state(self.cell).is_none() {
            log::warn!("vertex state went stale mid-gesture, abandoning");
            self.reset(ctx);
            return;
        }
        self.last_point = e.graph_point();
        match gesture {
            Gesture::Resize {
                handle,
                start,
                start_bounds,
                rotation,
            } => {
                self.update_resize_preview(ctx, e, handle, start, start_bounds, rotation);
            }
            Gesture::Rotate {
                center,
                start_rotation,
                start_bearing,
            } => {
                let p = e.graph_point();
                let raw = start_rotation + (math::bearing(center, p) - start_bearing);
                let angle = if ctx.config.rotation_raster {
                    math::raster_angle(raw, (p - center).hypot())
                } else {
                    raw
                };
                let angle = math::round_angle(angle);
                self.preview_rotation = Some(angle);
                let bounds = ctx
                    .view
                    .get_state(self.cell)
                    .map(|s| s.bounds)
                    .unwrap_or_default();
                self.show_preview(ctx, bounds, angle);
            }
            Gesture::Label { .. } | Gesture::Custom { .. } => {}
        }
        e.consume();
    }

    fn mouse_up(&mut self, ctx: &mut HandlerContext, e: &PointerEvent) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        self.last_point = e.graph_point();
        let stale = ctx.view.get_state(self.cell).is_none();
        let result = if stale {
            Ok(())
        } else {
            match gesture {
                Gesture::Resize { start_bounds, .. } => match self.preview_bounds {
                    Some(new) if new != start_bounds => self.commit_resize(ctx, start_bounds, new),
                    _ => Ok(()),
                },
                Gesture::Rotate { start_rotation, .. } => match self.preview_rotation {
                    Some(angle) if angle != start_rotation => self.commit_rotation(ctx, angle),
                    _ => Ok(()),
                },
                Gesture::Label {
                    start,
                    initial_offset,
                } if self.last_point != start => self.commit_label(ctx, start, initial_offset),
                Gesture::Label { .. } => Ok(()),
                Gesture::Custom { index } => {
                    ctx.policy
                        .apply_custom_handle(ctx.model, self.cell, index, self.last_point)
                }
            }
        };
        if let Err(err) = result {
            log::warn!("vertex gesture commit failed: {err}");
        }
        self.reset(ctx);
        e.consume();
    }

    fn reset(&mut self, ctx: &mut HandlerContext) {
        self.gesture = None;
        self.preview_bounds = None;
        self.preview_rotation = None;
        ctx.renderer.clear_overlay(PREVIEW_ID);
        // Discard any live-preview state the gesture wrote.
        ctx.view.schedule_refresh();
    }

    fn redraw(&mut self, ctx: &mut HandlerContext) {
        if let (Some(bounds), Some(state)) = (self.preview_bounds, ctx.view.get_state(self.cell)) {
            let rotation = self.preview_rotation.unwrap_or(state.rotation);
            self.show_preview(ctx, bounds, rotation);
        }
    }

    fn destroy(&mut self, ctx: &mut HandlerContext) {
        ctx.renderer.clear_overlay(PREVIEW_ID);
    }
}
