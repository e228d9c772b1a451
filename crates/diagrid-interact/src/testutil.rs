//! Shared fixtures for the handler tests.

use crate::config::EditorConfig;
use crate::handler::HandlerContext;
use crate::policy::DefaultPolicy;
use diagrid_model::{CellId, GraphModel, GraphView, RecordingRenderer};
use kurbo::Rect;

/// A headless editor: model, view, recording renderer and defaults.
pub struct TestRig {
    pub model: GraphModel,
    pub view: GraphView,
    pub renderer: RecordingRenderer,
    pub config: EditorConfig,
    pub policy: DefaultPolicy,
    pub selection_count: usize,
}

impl TestRig {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            model: GraphModel::new(),
            view: GraphView::new(),
            renderer: RecordingRenderer::new(),
            config: EditorConfig::default(),
            policy: DefaultPolicy,
            selection_count: 1,
        }
    }

    pub fn vertex(&mut self, rect: Rect) -> CellId {
        let root = self.model.root();
        let id = self.model.add_vertex(root, rect).unwrap();
        self.view.validate(&self.model);
        id
    }

    pub fn edge(&mut self, source: Option<CellId>, target: Option<CellId>) -> CellId {
        let root = self.model.root();
        let id = self.model.add_edge(root, source, target).unwrap();
        self.view.validate(&self.model);
        id
    }

    pub fn refresh(&mut self) {
        self.view.validate(&self.model);
    }

    pub fn ctx(&mut self) -> HandlerContext<'_> {
        HandlerContext {
            model: &mut self.model,
            view: &mut self.view,
            renderer: &mut self.renderer,
            policy: &self.policy,
            config: &self.config,
            selection_count: self.selection_count,
        }
    }

    /// Canonical JSON of the model's persistent state.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.model).unwrap()
    }
}
