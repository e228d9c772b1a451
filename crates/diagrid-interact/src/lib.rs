//! Diagrid Interaction Library
//!
//! Direct-manipulation handlers for the Diagrid editor engine: resize,
//! rotate and label gestures on vertices, bend and reconnect gestures
//! on edges, selection-wide move/clone with alignment guides and drop
//! targets, and the orchestrator that routes pointer events and
//! enforces the one-gesture-at-a-time rule.
//!
//! The crate is headless: it reads and writes the `diagrid-model`
//! document and view, and publishes overlay primitives through the
//! model's renderer trait. Hosts plug in a [`GraphPolicy`] for
//! application rules and an [`EditorConfig`] for tunables.

pub mod config;
pub mod constraint;
pub mod edge;
pub mod guide;
pub mod handle;
pub mod handler;
pub mod highlight;
pub mod marker;
pub mod mover;
pub mod orchestrator;
pub mod policy;
pub mod vertex;

#[cfg(test)]
mod testutil;

pub use config::EditorConfig;
pub use constraint::ConstraintHandler;
pub use edge::EdgeHandler;
pub use guide::{Guide, GuideResult};
pub use handle::{EdgeHandle, VertexHandle};
pub use handler::{CellHandler, HandlerContext};
pub use highlight::CellHighlight;
pub use marker::{CellMarker, MarkEvent};
pub use mover::MoveHandler;
pub use orchestrator::SelectionHandler;
pub use policy::{DefaultPolicy, GraphPolicy};
pub use vertex::VertexHandler;
