//! Tunables for the manipulation handlers.

use kurbo::Rect;

/// Editor-wide configuration shared by every handler.
///
/// Defaults match the common interactive-diagram feel: a 10px grid
/// (disabled until the host enables it), 2px alignment guides and a
/// 30% connect hotspot.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub grid_size: f64,
    pub grid_enabled: bool,
    /// Snap moves to the outlines of nearby cells.
    pub guides_enabled: bool,
    pub guide_tolerance: f64,
    /// Pick radius for manipulation handles, in graph units.
    pub handle_tolerance: f64,
    /// Central fraction of a cell that accepts connections.
    pub hotspot: f64,
    pub hotspot_enabled: bool,
    /// Live in-place preview is used only while at most this many cells
    /// are selected; larger selections fall back to ghost outlines.
    pub live_preview_max_cells: usize,
    /// Permit dropping an edge endpoint on empty space.
    pub allow_dangling_edges: bool,
    /// Remove a dragged bend that ends up colinear with its neighbors.
    pub straight_removal: bool,
    pub straight_removal_tolerance: f64,
    /// Dropping a vertex onto an edge splits the edge through it.
    pub split_enabled: bool,
    /// Dragging a child out of its parent re-parents it to the root.
    pub remove_from_parent: bool,
    /// Delete container cells left empty by a re-parenting move.
    pub prune_empty_containers: bool,
    /// Snap rotation to coarser steps as the pointer leaves the shape.
    pub rotation_raster: bool,
    /// Cells may not be moved or resized outside these bounds.
    pub max_bounds: Option<Rect>,
    /// Pick radius for fixed connection points.
    pub constraint_tolerance: f64,
    /// Upper bound on per-cell handlers kept alive for a selection.
    pub max_handlers: usize,
    pub labels_movable: bool,
    pub min_cell_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            grid_enabled: false,
            guides_enabled: true,
            guide_tolerance: 2.0,
            handle_tolerance: 8.0,
            hotspot: 0.3,
            hotspot_enabled: false,
            live_preview_max_cells: 1,
            allow_dangling_edges: true,
            straight_removal: true,
            straight_removal_tolerance: 2.0,
            split_enabled: true,
            remove_from_parent: true,
            prune_empty_containers: false,
            rotation_raster: true,
            max_bounds: None,
            constraint_tolerance: 10.0,
            max_handlers: 100,
            labels_movable: false,
            min_cell_size: 1.0,
        }
    }
}
