//! Diagrid Model Library
//!
//! Platform-agnostic diagram model for the Diagrid editor engine: typed
//! cells (vertices and edges), transactional mutation with undo/redo, the
//! derived view-state layer, and the pointer-event plumbing consumed by
//! the interaction handlers.

pub mod cell;
pub mod event;
pub mod geometry;
pub mod math;
pub mod model;
pub mod render;
pub mod style;
pub mod view;

pub use cell::{Cell, CellId, CellKind};
pub use event::{InputContext, Modifiers, PointerEvent};
pub use geometry::{ConnectionConstraint, Geometry};
pub use model::{GraphModel, ModelChange, ModelError, UndoableEdit};
pub use render::{Axis, Overlay, OverlayId, RecordingRenderer, Renderer};
pub use style::Style;
pub use view::{CellState, GraphView};
