//! Widget-side tree facade: expansion state, row mapping, selection, and the
//! column-model surface the sync layer consumes.
//!
//! A [`TreeView`] pairs a [`TreeModel`] with per-widget presentation state.
//! Visibility follows one rule: the root is always visible, and any other
//! path is visible exactly when every strict ancestor is expanded. Rows are
//! the pre-order positions of visible nodes, root at row 0; the synthetic
//! header the renderer may emit is not a row.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::event::{ListenerId, ListenerList};
use crate::model::TreeModel;
use crate::path::TreePath;
use crate::selection::{SelectionMode, TreeSelectionModel};

/// Notification payload for expansion-state changes.
#[derive(Debug, Clone)]
pub struct TreeExpansionEvent {
    /// The toggled path.
    pub path: TreePath,
    /// The state after the change.
    pub expanded: bool,
}

struct ViewInner {
    model: Rc<dyn TreeModel>,
    expanded: HashSet<TreePath>,
    selection: TreeSelectionModel,
    header_visible: bool,
    column_widths: Vec<u32>,
    expansion_listeners: ListenerList<TreeExpansionEvent>,
}

/// Handle to the widget-side tree state.
#[derive(Clone)]
pub struct TreeView {
    inner: Rc<RefCell<ViewInner>>,
}

impl TreeView {
    /// Create a view over `model` with nothing expanded, an empty
    /// multiple-selection, and no header.
    #[must_use]
    pub fn new(model: Rc<dyn TreeModel>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ViewInner {
                model,
                expanded: HashSet::new(),
                selection: TreeSelectionModel::new(SelectionMode::Multiple),
                header_visible: false,
                column_widths: Vec::new(),
                expansion_listeners: ListenerList::new(),
            })),
        }
    }

    /// Set whether the synthetic header row is rendered.
    #[must_use]
    pub fn with_header_visible(self, visible: bool) -> Self {
        self.inner.borrow_mut().header_visible = visible;
        self
    }

    /// Set per-column widths (the column-model collaborator).
    #[must_use]
    pub fn with_column_widths(self, widths: Vec<u32>) -> Self {
        self.inner.borrow_mut().column_widths = widths;
        self
    }

    /// Use the given selection model instead of the default.
    #[must_use]
    pub fn with_selection(self, selection: TreeSelectionModel) -> Self {
        self.inner.borrow_mut().selection = selection;
        self
    }

    /// The current model.
    #[must_use]
    pub fn model(&self) -> Rc<dyn TreeModel> {
        Rc::clone(&self.inner.borrow().model)
    }

    /// Replace the model wholesale, resetting expansion and selection.
    ///
    /// Viewer render states referencing the old structure must be discarded
    /// by their owner; nothing the old model sent remains valid.
    pub fn replace_model(&self, model: Rc<dyn TreeModel>) {
        let selection = {
            let mut inner = self.inner.borrow_mut();
            inner.model = model;
            inner.expanded.clear();
            inner.selection.clone()
        };
        selection.clear_selection();
    }

    /// Whether the header pseudo-row is shown.
    #[must_use]
    pub fn header_visible(&self) -> bool {
        self.inner.borrow().header_visible
    }

    /// Number of columns, from the model.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.model().column_count()
    }

    /// Width of column `index`, when configured.
    #[must_use]
    pub fn column_width(&self, index: usize) -> Option<u32> {
        self.inner.borrow().column_widths.get(index).copied()
    }

    /// The selection model handle.
    #[must_use]
    pub fn selection(&self) -> TreeSelectionModel {
        self.inner.borrow().selection.clone()
    }

    /// Whether `path` is expanded.
    #[must_use]
    pub fn is_expanded(&self, path: &TreePath) -> bool {
        self.inner.borrow().expanded.contains(path)
    }

    /// Set the expansion state of `path`, firing expansion listeners on an
    /// effective change.
    pub fn set_expanded(&self, path: &TreePath, expanded: bool) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if expanded {
                inner.expanded.insert(path.clone())
            } else {
                inner.expanded.remove(path)
            }
        };
        if !changed {
            return;
        }
        let listeners = self.inner.borrow().expansion_listeners.snapshot();
        if listeners.is_empty() {
            return;
        }
        let event = TreeExpansionEvent { path: path.clone(), expanded };
        for callback in listeners {
            callback(&event);
        }
    }

    /// Flip the expansion state of `path`.
    pub fn toggle_expanded(&self, path: &TreePath) {
        self.set_expanded(path, !self.is_expanded(path));
    }

    /// Whether `path` is visible: the root always is; any other path is
    /// visible when every strict ancestor is expanded.
    #[must_use]
    pub fn is_path_visible(&self, path: &TreePath) -> bool {
        match path.parent_path() {
            None => true,
            Some(parent) => self.is_expanded(&parent) && self.is_path_visible(&parent),
        }
    }

    /// Resolve a visible row index to its path. Rows past the visible end
    /// yield `None`.
    #[must_use]
    pub fn path_for_row(&self, row: usize) -> Option<TreePath> {
        let model = self.model();
        let root = model.root();
        let mut remaining = row;
        self.locate_row(model.as_ref(), TreePath::for_root(root), &mut remaining)
    }

    /// Number of currently visible rows.
    #[must_use]
    pub fn visible_row_count(&self) -> usize {
        let model = self.model();
        let root = model.root();
        self.count_visible(model.as_ref(), &TreePath::for_root(root))
    }

    /// Register an expansion-change listener.
    pub fn add_expansion_listener(
        &self,
        callback: impl Fn(&TreeExpansionEvent) + 'static,
    ) -> ListenerId {
        self.inner.borrow_mut().expansion_listeners.register(callback)
    }

    /// Unregister an expansion-change listener.
    pub fn remove_expansion_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().expansion_listeners.unregister(id)
    }

    fn locate_row(
        &self,
        model: &dyn TreeModel,
        path: TreePath,
        remaining: &mut usize,
    ) -> Option<TreePath> {
        if *remaining == 0 {
            return Some(path);
        }
        *remaining -= 1;
        if !self.is_expanded(&path) {
            return None;
        }
        let node = path.last().clone();
        for index in 0..model.child_count(&node) {
            let Ok(child) = model.child(&node, index) else {
                continue;
            };
            if let Some(found) = self.locate_row(model, path.by_adding_child(child), remaining) {
                return Some(found);
            }
        }
        None
    }

    fn count_visible(&self, model: &dyn TreeModel, path: &TreePath) -> usize {
        let mut count = 1;
        if self.is_expanded(path) {
            let node = path.last().clone();
            for index in 0..model.child_count(&node) {
                if let Ok(child) = model.child(&node, index) {
                    count += self.count_visible(model, &path.by_adding_child(child));
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNodeModel;
    use crate::node::TreeNode;
    use std::cell::Cell;

    /// root -> {a, b}, b -> {c}.
    fn fixture() -> (TreeView, TreePath, TreePath, TreePath, TreePath) {
        let root = TreeNode::new();
        let a = TreeNode::new();
        let b = TreeNode::new();
        let c = TreeNode::new();
        root.add_child(&a);
        root.add_child(&b);
        b.add_child(&c);

        let model = TreeNodeModel::new(root.clone());
        let view = TreeView::new(Rc::new(model));

        let root_path = TreePath::for_root(root);
        let a_path = root_path.by_adding_child(a);
        let b_path = root_path.by_adding_child(b);
        let c_path = b_path.by_adding_child(c);
        (view, root_path, a_path, b_path, c_path)
    }

    #[test]
    fn visibility_requires_every_ancestor_expanded() {
        let (view, root_path, a_path, b_path, c_path) = fixture();

        assert!(view.is_path_visible(&root_path));
        assert!(!view.is_path_visible(&a_path));
        assert!(!view.is_path_visible(&c_path));

        view.set_expanded(&root_path, true);
        assert!(view.is_path_visible(&a_path));
        assert!(view.is_path_visible(&b_path));
        assert!(!view.is_path_visible(&c_path));

        view.set_expanded(&b_path, true);
        assert!(view.is_path_visible(&c_path));

        // Collapsing an inner ancestor hides the whole subtree.
        view.set_expanded(&root_path, false);
        assert!(!view.is_path_visible(&c_path));
    }

    #[test]
    fn row_mapping_follows_visible_preorder() {
        let (view, root_path, a_path, b_path, c_path) = fixture();

        assert_eq!(view.visible_row_count(), 1);
        assert_eq!(view.path_for_row(0), Some(root_path.clone()));
        assert_eq!(view.path_for_row(1), None);

        view.set_expanded(&root_path, true);
        view.set_expanded(&b_path, true);

        assert_eq!(view.visible_row_count(), 4);
        assert_eq!(view.path_for_row(0), Some(root_path));
        assert_eq!(view.path_for_row(1), Some(a_path));
        assert_eq!(view.path_for_row(2), Some(b_path));
        assert_eq!(view.path_for_row(3), Some(c_path));
        assert_eq!(view.path_for_row(4), None);
    }

    #[test]
    fn expansion_listeners_fire_on_effective_change_only() {
        let (view, root_path, ..) = fixture();
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        let id = view.add_expansion_listener(move |_| sink.set(sink.get() + 1));

        view.set_expanded(&root_path, true);
        assert_eq!(fired.get(), 1);

        // Already expanded: no event.
        view.set_expanded(&root_path, true);
        assert_eq!(fired.get(), 1);

        view.toggle_expanded(&root_path);
        assert_eq!(fired.get(), 2);

        assert!(view.remove_expansion_listener(id));
        view.toggle_expanded(&root_path);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn replace_model_resets_presentation_state() {
        let (view, root_path, _a, b_path, _c) = fixture();
        view.set_expanded(&root_path, true);
        view.selection().add_selection_paths(vec![b_path]);

        let replacement = TreeNodeModel::new(TreeNode::new());
        view.replace_model(Rc::new(replacement.clone()));

        assert!(view.selection().selection_paths().is_empty());
        assert_eq!(view.visible_row_count(), 1);
        assert_eq!(view.model().root(), replacement.root());
    }

    #[test]
    fn column_model_surface() {
        let (view, ..) = fixture();
        let view = view.with_column_widths(vec![120, 80]);
        assert_eq!(view.column_width(0), Some(120));
        assert_eq!(view.column_width(1), Some(80));
        assert_eq!(view.column_width(2), None);
    }
}
