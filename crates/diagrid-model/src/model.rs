//! The authoritative diagram model and its transaction layer.
//!
//! All mutation goes through atomic operations that record invertible
//! [`ModelChange`]s. Operations self-bracket, so a stray call still
//! commits; an explicit `begin_update`/`end_update` pair (nestable)
//! coalesces every change made inside it into a single [`UndoableEdit`]
//! that undoes and redoes as one unit, and listeners (the view refresh
//! path) only ever observe committed edits.

use crate::cell::{Cell, CellId, CellKind};
use crate::geometry::Geometry;
use crate::style::Style;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Maximum number of undoable edits to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Failures of the model API proper. Expected interaction outcomes
/// (invalid connections, missing drop targets) are not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown cell {0}")]
    UnknownCell(CellId),
    #[error("cell {0} is not an edge")]
    NotAnEdge(CellId),
    #[error("cell {0} is not a vertex")]
    NotAVertex(CellId),
    #[error("cell {0} already exists in the model")]
    DuplicateCell(CellId),
    #[error("the root cell cannot be removed or reparented")]
    RootImmutable,
    #[error("reparenting {0} under its own descendant")]
    WouldCreateCycle(CellId),
}

/// One invertible mutation of the model.
#[derive(Debug, Clone)]
pub enum ModelChange {
    Geometry {
        cell: CellId,
        previous: Geometry,
        next: Geometry,
    },
    Style {
        cell: CellId,
        previous: Style,
        next: Style,
    },
    Terminal {
        cell: CellId,
        is_source: bool,
        previous: Option<CellId>,
        next: Option<CellId>,
    },
    Add {
        cell: Cell,
        parent: CellId,
        index: usize,
    },
    Remove {
        cell: Cell,
        parent: CellId,
        index: usize,
    },
    Reparent {
        cell: CellId,
        old_parent: CellId,
        old_index: usize,
        new_parent: CellId,
        new_index: usize,
    },
    Order {
        parent: CellId,
        previous: Vec<CellId>,
        next: Vec<CellId>,
    },
}

/// A committed group of changes that undoes atomically.
#[derive(Debug, Clone)]
pub struct UndoableEdit {
    pub changes: Vec<ModelChange>,
}

/// The diagram model: a tree of cells under a fixed root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphModel {
    cells: HashMap<CellId, Cell>,
    root: CellId,
    #[serde(skip)]
    update_level: usize,
    #[serde(skip)]
    current: Vec<ModelChange>,
    #[serde(skip)]
    undo_stack: Vec<UndoableEdit>,
    #[serde(skip)]
    redo_stack: Vec<UndoableEdit>,
    #[serde(skip)]
    revision: u64,
    #[serde(skip)]
    dirty: HashSet<CellId>,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphModel {
    pub fn new() -> Self {
        let mut root = Cell::vertex(Rect::ZERO);
        root.movable = false;
        root.resizable = false;
        root.rotatable = false;
        root.connectable = false;
        let root_id = root.id;
        let mut cells = HashMap::new();
        cells.insert(root_id, root);
        Self {
            cells,
            root: root_id,
            update_level: 0,
            current: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            revision: 0,
            dirty: HashSet::new(),
        }
    }

    // ----- queries -----

    pub fn root(&self) -> CellId {
        self.root
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn parent_of(&self, id: CellId) -> Option<CellId> {
        self.cells.get(&id).and_then(|c| c.parent)
    }

    pub fn children_of(&self, id: CellId) -> &[CellId] {
        self.cells
            .get(&id)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` is on the parent chain of `cell` (or is the
    /// cell itself).
    pub fn is_ancestor(&self, ancestor: CellId, cell: CellId) -> bool {
        let mut cursor = Some(cell);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent_of(id);
        }
        false
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Monotonic counter bumped on every committed edit, undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain the set of cells touched since the last drain. Feeds the
    /// debounced view refresh.
    pub fn take_dirty(&mut self) -> HashSet<CellId> {
        std::mem::take(&mut self.dirty)
    }

    fn require(&self, id: CellId) -> Result<&Cell, ModelError> {
        self.cells.get(&id).ok_or(ModelError::UnknownCell(id))
    }

    // ----- transaction bracket -----

    pub fn begin_update(&mut self) {
        self.update_level += 1;
    }

    pub fn end_update(&mut self) {
        if self.update_level == 0 {
            log::warn!("unbalanced end_update ignored");
            return;
        }
        self.update_level -= 1;
        if self.update_level == 0 && !self.current.is_empty() {
            let changes = std::mem::take(&mut self.current);
            log::debug!("committed edit with {} change(s)", changes.len());
            self.undo_stack.push(UndoableEdit { changes });
            if self.undo_stack.len() > MAX_UNDO_HISTORY {
                self.undo_stack.remove(0);
            }
            self.redo_stack.clear();
            self.revision += 1;
        }
    }

    pub fn in_update(&self) -> bool {
        self.update_level > 0
    }

    /// Run `f` inside one transaction. On error every change `f` already
    /// made is rolled back before the error is returned, so a commit is
    /// all-or-nothing.
    pub fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ModelError>,
    ) -> Result<T, ModelError> {
        self.begin_update();
        let mark = self.current.len();
        match f(self) {
            Ok(value) => {
                self.end_update();
                Ok(value)
            }
            Err(err) => {
                while self.current.len() > mark {
                    if let Some(change) = self.current.pop() {
                        self.apply_change(&change, false);
                    }
                }
                self.end_update();
                Err(err)
            }
        }
    }

    fn record(&mut self, change: ModelChange) {
        self.current.push(change);
    }

    // ----- atomic operations -----

    pub fn set_geometry(&mut self, id: CellId, geometry: Geometry) -> Result<(), ModelError> {
        let previous = self.require(id)?.geometry.clone();
        if previous == geometry {
            return Ok(());
        }
        self.begin_update();
        let change = ModelChange::Geometry {
            cell: id,
            previous,
            next: geometry,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(())
    }

    pub fn set_style(&mut self, id: CellId, style: Style) -> Result<(), ModelError> {
        let previous = self.require(id)?.style.clone();
        if previous == style {
            return Ok(());
        }
        self.begin_update();
        let change = ModelChange::Style {
            cell: id,
            previous,
            next: style,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(())
    }

    /// Connect or disconnect one end of an edge.
    pub fn set_terminal(
        &mut self,
        edge: CellId,
        terminal: Option<CellId>,
        is_source: bool,
    ) -> Result<(), ModelError> {
        let cell = self.require(edge)?;
        if cell.kind != CellKind::Edge {
            return Err(ModelError::NotAnEdge(edge));
        }
        if let Some(t) = terminal {
            self.require(t)?;
        }
        let previous = self.require(edge)?.terminal(is_source);
        if previous == terminal {
            return Ok(());
        }
        self.begin_update();
        let change = ModelChange::Terminal {
            cell: edge,
            is_source,
            previous,
            next: terminal,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(())
    }

    /// Insert `cell` under `parent` at `index` (append when `None`).
    /// The cell's `children` list is inserted as given; subtrees are
    /// built by adding each descendant separately.
    pub fn add(
        &mut self,
        parent: CellId,
        mut cell: Cell,
        index: Option<usize>,
    ) -> Result<CellId, ModelError> {
        self.require(parent)?;
        if self.cells.contains_key(&cell.id) {
            return Err(ModelError::DuplicateCell(cell.id));
        }
        cell.parent = Some(parent);
        let index = index
            .unwrap_or_else(|| self.children_of(parent).len())
            .min(self.children_of(parent).len());
        let id = cell.id;
        self.begin_update();
        let change = ModelChange::Add {
            cell,
            parent,
            index,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(id)
    }

    pub fn add_vertex(&mut self, parent: CellId, rect: Rect) -> Result<CellId, ModelError> {
        self.add(parent, Cell::vertex(rect), None)
    }

    pub fn add_edge(
        &mut self,
        parent: CellId,
        source: Option<CellId>,
        target: Option<CellId>,
    ) -> Result<CellId, ModelError> {
        if let Some(s) = source {
            self.require(s)?;
        }
        if let Some(t) = target {
            self.require(t)?;
        }
        let mut cell = Cell::edge();
        cell.source = source;
        cell.target = target;
        self.add(parent, cell, None)
    }

    /// Remove a cell and its whole subtree. Terminal references from
    /// surviving edges into the removed subtree are cleared first, so
    /// undo restores connectivity exactly.
    pub fn remove(&mut self, id: CellId) -> Result<(), ModelError> {
        self.require(id)?;
        if id == self.root {
            return Err(ModelError::RootImmutable);
        }
        self.begin_update();

        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);
        let removed: HashSet<CellId> = subtree.iter().copied().collect();

        // Disconnect surviving edges that point into the subtree.
        let dangling: Vec<(CellId, bool)> = self
            .cells
            .values()
            .filter(|c| c.is_edge() && !removed.contains(&c.id))
            .flat_map(|c| {
                let mut ends = Vec::new();
                if c.source.is_some_and(|s| removed.contains(&s)) {
                    ends.push((c.id, true));
                }
                if c.target.is_some_and(|t| removed.contains(&t)) {
                    ends.push((c.id, false));
                }
                ends
            })
            .collect();
        for (edge, is_source) in dangling {
            self.set_terminal(edge, None, is_source)?;
        }

        // Children detach before their parents, so the recorded
        // snapshots replay cleanly in reverse on undo.
        for cell_id in subtree.iter().rev() {
            let Some(cell) = self.cells.get(cell_id) else {
                continue;
            };
            let Some(parent) = cell.parent else {
                continue;
            };
            let index = self
                .children_of(parent)
                .iter()
                .position(|c| c == cell_id)
                .unwrap_or(0);
            let snapshot = match self.cells.get(cell_id) {
                Some(c) => c.clone(),
                None => continue,
            };
            let change = ModelChange::Remove {
                cell: snapshot,
                parent,
                index,
            };
            self.apply_change(&change, true);
            self.record(change);
        }

        self.end_update();
        Ok(())
    }

    /// Pre-order subtree listing (parents before children).
    fn collect_subtree(&self, id: CellId, out: &mut Vec<CellId>) {
        out.push(id);
        for child in self.children_of(id).to_vec() {
            self.collect_subtree(child, out);
        }
    }

    /// Move a cell (with its subtree) under a new parent.
    pub fn set_parent(
        &mut self,
        id: CellId,
        new_parent: CellId,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        self.require(new_parent)?;
        if id == self.root {
            return Err(ModelError::RootImmutable);
        }
        if self.is_ancestor(id, new_parent) {
            return Err(ModelError::WouldCreateCycle(id));
        }
        let old_parent = self.parent_of(id).ok_or(ModelError::UnknownCell(id))?;
        let old_index = self
            .children_of(old_parent)
            .iter()
            .position(|c| *c == id)
            .unwrap_or(0);
        if old_parent == new_parent && index.is_none() {
            return Ok(());
        }
        let new_index = index
            .unwrap_or_else(|| self.children_of(new_parent).len())
            .min(self.children_of(new_parent).len());
        self.begin_update();
        let change = ModelChange::Reparent {
            cell: id,
            old_parent,
            old_index,
            new_parent,
            new_index,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(())
    }

    /// Clone the given cells (with subtrees) under `parent`, translating
    /// top-level geometry by `delta`. Terminals between cloned cells are
    /// remapped onto the clones; terminals pointing outside the set keep
    /// their original reference. Returns the top-level clone ids.
    pub fn clone_cells(
        &mut self,
        ids: &[CellId],
        delta: Vec2,
        parent: CellId,
    ) -> Result<Vec<CellId>, ModelError> {
        self.require(parent)?;
        let roots: Vec<CellId> = ids
            .iter()
            .copied()
            .filter(|id| {
                self.contains(*id)
                    && !ids
                        .iter()
                        .any(|other| *other != *id && self.is_ancestor(*other, *id))
            })
            .collect();

        // Fresh identities for every cell in every subtree.
        let mut mapping: HashMap<CellId, CellId> = HashMap::new();
        let mut subtree = Vec::new();
        for root in &roots {
            self.collect_subtree(*root, &mut subtree);
        }
        for id in &subtree {
            mapping.insert(*id, uuid::Uuid::new_v4());
        }

        self.begin_update();
        let result = (|| -> Result<Vec<CellId>, ModelError> {
            let mut top = Vec::new();
            for root in &roots {
                let new_id =
                    self.clone_subtree(*root, parent, &mapping, Some(delta))?;
                top.push(new_id);
            }
            Ok(top)
        })();
        self.end_update();
        result
    }

    fn clone_subtree(
        &mut self,
        id: CellId,
        parent: CellId,
        mapping: &HashMap<CellId, CellId>,
        delta: Option<Vec2>,
    ) -> Result<CellId, ModelError> {
        let original = self.require(id)?.clone();
        let mut clone = original.clone();
        clone.id = mapping.get(&id).copied().unwrap_or_else(uuid::Uuid::new_v4);
        clone.children = Vec::new();
        clone.source = original.source.map(|s| mapping.get(&s).copied().unwrap_or(s));
        clone.target = original.target.map(|t| mapping.get(&t).copied().unwrap_or(t));
        if let Some(delta) = delta {
            clone.geometry.translate(delta);
        }
        let new_id = self.add(parent, clone, None)?;
        for child in original.children {
            self.clone_subtree(child, new_id, mapping, None)?;
        }
        Ok(new_id)
    }

    // ----- z-order -----

    /// Move a cell to the end of its parent's child list (topmost).
    pub fn bring_to_front(&mut self, id: CellId) -> Result<(), ModelError> {
        self.reorder(id, |children, pos| {
            let id = children.remove(pos);
            children.push(id);
        })
    }

    /// Move a cell to the front of its parent's child list (bottommost).
    pub fn send_to_back(&mut self, id: CellId) -> Result<(), ModelError> {
        self.reorder(id, |children, pos| {
            let id = children.remove(pos);
            children.insert(0, id);
        })
    }

    fn reorder(
        &mut self,
        id: CellId,
        f: impl FnOnce(&mut Vec<CellId>, usize),
    ) -> Result<(), ModelError> {
        let parent = self.parent_of(id).ok_or(ModelError::UnknownCell(id))?;
        let previous = self.children_of(parent).to_vec();
        let Some(pos) = previous.iter().position(|c| *c == id) else {
            return Err(ModelError::UnknownCell(id));
        };
        let mut next = previous.clone();
        f(&mut next, pos);
        if next == previous {
            return Ok(());
        }
        self.begin_update();
        let change = ModelChange::Order {
            parent,
            previous,
            next,
        };
        self.apply_change(&change, true);
        self.record(change);
        self.end_update();
        Ok(())
    }

    // ----- undo / redo -----

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the most recent committed edit. Returns false when there is
    /// nothing to undo or a transaction is still open.
    pub fn undo(&mut self) -> bool {
        if self.update_level > 0 {
            log::warn!("undo ignored inside an open transaction");
            return false;
        }
        let Some(edit) = self.undo_stack.pop() else {
            return false;
        };
        for change in edit.changes.iter().rev() {
            self.apply_change(change, false);
        }
        self.revision += 1;
        self.redo_stack.push(edit);
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.update_level > 0 {
            log::warn!("redo ignored inside an open transaction");
            return false;
        }
        let Some(edit) = self.redo_stack.pop() else {
            return false;
        };
        for change in &edit.changes {
            self.apply_change(change, true);
        }
        self.revision += 1;
        self.undo_stack.push(edit);
        true
    }

    // ----- change application -----

    fn apply_change(&mut self, change: &ModelChange, forward: bool) {
        match change {
            ModelChange::Geometry {
                cell,
                previous,
                next,
            } => {
                if let Some(c) = self.cells.get_mut(cell) {
                    c.geometry = if forward { next.clone() } else { previous.clone() };
                }
                self.dirty.insert(*cell);
            }
            ModelChange::Style {
                cell,
                previous,
                next,
            } => {
                if let Some(c) = self.cells.get_mut(cell) {
                    c.style = if forward { next.clone() } else { previous.clone() };
                }
                self.dirty.insert(*cell);
            }
            ModelChange::Terminal {
                cell,
                is_source,
                previous,
                next,
            } => {
                let value = if forward { *next } else { *previous };
                if let Some(c) = self.cells.get_mut(cell) {
                    if *is_source {
                        c.source = value;
                    } else {
                        c.target = value;
                    }
                }
                self.dirty.insert(*cell);
            }
            ModelChange::Add {
                cell,
                parent,
                index,
            } => {
                if forward {
                    self.insert_cell(cell.clone(), *parent, *index);
                } else {
                    self.detach_cell(cell.id);
                }
                self.dirty.insert(cell.id);
                self.dirty.insert(*parent);
            }
            ModelChange::Remove {
                cell,
                parent,
                index,
            } => {
                if forward {
                    self.detach_cell(cell.id);
                } else {
                    self.insert_cell(cell.clone(), *parent, *index);
                }
                self.dirty.insert(cell.id);
                self.dirty.insert(*parent);
            }
            ModelChange::Reparent {
                cell,
                old_parent,
                old_index,
                new_parent,
                new_index,
            } => {
                let (from, _from_index, to, to_index) = if forward {
                    (*old_parent, *old_index, *new_parent, *new_index)
                } else {
                    (*new_parent, *new_index, *old_parent, *old_index)
                };
                if let Some(p) = self.cells.get_mut(&from) {
                    p.children.retain(|c| c != cell);
                }
                if let Some(p) = self.cells.get_mut(&to) {
                    let index = to_index.min(p.children.len());
                    p.children.insert(index, *cell);
                }
                if let Some(c) = self.cells.get_mut(cell) {
                    c.parent = Some(to);
                }
                self.dirty.insert(*cell);
                self.dirty.insert(from);
                self.dirty.insert(to);
            }
            ModelChange::Order {
                parent,
                previous,
                next,
            } => {
                if let Some(p) = self.cells.get_mut(parent) {
                    p.children = if forward { next.clone() } else { previous.clone() };
                }
                self.dirty.insert(*parent);
            }
        }
    }

    fn insert_cell(&mut self, mut cell: Cell, parent: CellId, index: usize) {
        cell.parent = Some(parent);
        let id = cell.id;
        self.cells.insert(id, cell);
        if let Some(p) = self.cells.get_mut(&parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, id);
        }
    }

    fn detach_cell(&mut self, id: CellId) {
        if let Some(parent) = self.parent_of(id) {
            if let Some(p) = self.cells.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.cells.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn new_model() -> GraphModel {
        let _ = env_logger::builder().is_test(true).try_init();
        GraphModel::new()
    }

    fn snapshot(model: &GraphModel) -> String {
        // Canonical JSON of the persistent fields; undo stacks are
        // skipped by serde.
        serde_json::to_string(model).unwrap()
    }

    #[test]
    fn test_add_and_query() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert!(model.contains(a));
        assert_eq!(model.parent_of(a), Some(root));
        assert_eq!(model.children_of(root), &[a]);
    }

    #[test]
    fn test_transaction_coalesces_into_one_edit() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let before = snapshot(&model);

        model.begin_update();
        let mut geo = model.cell(a).unwrap().geometry.clone();
        geo.translate(Vec2::new(5.0, 5.0));
        model.set_geometry(a, geo).unwrap();
        let mut style = model.cell(a).unwrap().style.clone();
        style.set_rotation(90.0);
        model.set_style(a, style).unwrap();
        model.end_update();

        // Both changes undo as one unit.
        assert!(model.undo());
        assert_eq!(snapshot(&model), before);
        assert!(model.redo());
        assert_eq!(model.cell(a).unwrap().style.rotation(), 90.0);
    }

    #[test]
    fn test_undo_redo_geometry() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let mut geo = model.cell(a).unwrap().geometry.clone();
        geo.rect = Rect::new(20.0, 20.0, 40.0, 40.0);
        model.set_geometry(a, geo.clone()).unwrap();

        assert!(model.undo());
        assert_eq!(model.cell(a).unwrap().geometry.rect, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(model.redo());
        assert_eq!(model.cell(a).unwrap().geometry.rect, Rect::new(20.0, 20.0, 40.0, 40.0));
    }

    #[test]
    fn test_remove_clears_terminals_and_undo_restores() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = model.add_vertex(root, Rect::new(50.0, 0.0, 60.0, 10.0)).unwrap();
        let e = model.add_edge(root, Some(a), Some(b)).unwrap();
        let before = snapshot(&model);

        model.remove(b).unwrap();
        assert!(!model.contains(b));
        assert_eq!(model.cell(e).unwrap().target, None);

        assert!(model.undo());
        assert_eq!(snapshot(&model), before);
        assert_eq!(model.cell(e).unwrap().target, Some(b));
    }

    #[test]
    fn test_remove_subtree_is_one_edit() {
        let mut model = new_model();
        let root = model.root();
        let parent = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let child = model.add_vertex(parent, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        let before = snapshot(&model);

        model.remove(parent).unwrap();
        assert!(!model.contains(parent));
        assert!(!model.contains(child));

        assert!(model.undo());
        assert_eq!(snapshot(&model), before);
        assert_eq!(model.children_of(parent), &[child]);
    }

    #[test]
    fn test_clone_cells_remaps_terminals() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = model.add_vertex(root, Rect::new(50.0, 0.0, 60.0, 10.0)).unwrap();
        let e = model.add_edge(root, Some(a), Some(b)).unwrap();

        let clones = model
            .clone_cells(&[a, b, e], Vec2::new(100.0, 0.0), root)
            .unwrap();
        assert_eq!(clones.len(), 3);

        let cloned_edge = clones
            .iter()
            .find(|id| model.cell(**id).unwrap().is_edge())
            .copied()
            .unwrap();
        let src = model.cell(cloned_edge).unwrap().source.unwrap();
        let tgt = model.cell(cloned_edge).unwrap().target.unwrap();
        assert!(clones.contains(&src));
        assert!(clones.contains(&tgt));
        // Originals untouched.
        assert_eq!(model.cell(e).unwrap().source, Some(a));
        assert_eq!(
            model.cell(a).unwrap().geometry.rect,
            Rect::new(0.0, 0.0, 10.0, 10.0)
        );
        // Clone geometry shifted by the delta.
        let cloned_a = model.cell(src).unwrap();
        assert_eq!(cloned_a.geometry.rect, Rect::new(100.0, 0.0, 110.0, 10.0));
    }

    #[test]
    fn test_clone_skips_nested_selection() {
        let mut model = new_model();
        let root = model.root();
        let parent = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let child = model.add_vertex(parent, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();

        let clones = model
            .clone_cells(&[parent, child], Vec2::ZERO, root)
            .unwrap();
        // The child rides along inside its cloned parent, not separately.
        assert_eq!(clones.len(), 1);
        assert_eq!(model.children_of(clones[0]).len(), 1);
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let before = snapshot(&model);
        let missing = uuid::Uuid::new_v4();

        let result = model.transact(|m| {
            let mut geo = m.cell(a).unwrap().geometry.clone();
            geo.translate(Vec2::new(100.0, 0.0));
            m.set_geometry(a, geo)?;
            m.set_geometry(missing, Geometry::default())
        });
        assert_eq!(result, Err(ModelError::UnknownCell(missing)));
        assert_eq!(snapshot(&model), before);
        assert!(!model.can_undo() || snapshot(&model) == before);
    }

    #[test]
    fn test_set_parent_reparents_and_undoes() {
        let mut model = new_model();
        let root = model.root();
        let container = model.add_vertex(root, Rect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        let a = model.add_vertex(root, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();

        model.set_parent(a, container, None).unwrap();
        assert_eq!(model.parent_of(a), Some(container));
        assert!(model.children_of(root).contains(&container));
        assert!(!model.children_of(root).contains(&a));

        assert!(model.undo());
        assert_eq!(model.parent_of(a), Some(root));
    }

    #[test]
    fn test_set_parent_rejects_cycle() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let b = model.add_vertex(a, Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
        assert_eq!(
            model.set_parent(a, b, None),
            Err(ModelError::WouldCreateCycle(a))
        );
    }

    #[test]
    fn test_z_order() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let c = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();

        model.bring_to_front(a).unwrap();
        assert_eq!(model.children_of(root), &[b, c, a]);
        model.send_to_back(c).unwrap();
        assert_eq!(model.children_of(root), &[c, b, a]);
        assert!(model.undo());
        assert_eq!(model.children_of(root), &[b, c, a]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        model.take_dirty();

        let mut geo = model.cell(a).unwrap().geometry.clone();
        geo.points.push(Point::new(1.0, 1.0));
        model.set_geometry(a, geo).unwrap();
        let dirty = model.take_dirty();
        assert!(dirty.contains(&a));
        assert!(model.take_dirty().is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        let b = model.add_vertex(root, Rect::new(200.0, 0.0, 300.0, 50.0)).unwrap();
        model.add_edge(root, Some(a), Some(b)).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let back: GraphModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cell_count(), model.cell_count());
        assert_eq!(back.children_of(back.root()), model.children_of(root));
    }

    #[test]
    fn test_history_cap() {
        let mut model = new_model();
        let root = model.root();
        let a = model.add_vertex(root, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        for i in 0..(MAX_UNDO_HISTORY + 20) {
            let mut geo = model.cell(a).unwrap().geometry.clone();
            geo.rect = Rect::new(i as f64, 0.0, i as f64 + 10.0, 10.0);
            model.set_geometry(a, geo).unwrap();
        }
        let mut undone = 0;
        while model.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
    }
}
