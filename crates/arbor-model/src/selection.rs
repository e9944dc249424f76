//! Path-based selection state.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{ListenerId, ListenerList};
use crate::path::TreePath;

/// How many paths may be selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// At most one selected path; additions replace.
    #[default]
    Single,
    /// Any number of selected paths.
    Multiple,
}

/// Notification payload for selection changes: the selection after the
/// change, in selection order.
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    /// Currently selected paths.
    pub paths: Vec<TreePath>,
}

struct SelectionInner {
    mode: SelectionMode,
    paths: Vec<TreePath>,
    listeners: ListenerList<SelectionEvent>,
}

/// Handle to an ordered selected-path set with change notification.
///
/// Paths are kept in selection order. Removing an unselected path is a
/// no-op; listeners fire only on effective changes, after all interior
/// borrows are released.
#[derive(Clone)]
pub struct TreeSelectionModel {
    inner: Rc<RefCell<SelectionInner>>,
}

impl TreeSelectionModel {
    /// An empty selection with the given mode.
    #[must_use]
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SelectionInner {
                mode,
                paths: Vec::new(),
                listeners: ListenerList::new(),
            })),
        }
    }

    /// The selection mode.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.inner.borrow().mode
    }

    /// Selected paths, in selection order.
    #[must_use]
    pub fn selection_paths(&self) -> Vec<TreePath> {
        self.inner.borrow().paths.clone()
    }

    /// Whether `path` is selected.
    #[must_use]
    pub fn is_path_selected(&self, path: &TreePath) -> bool {
        self.inner.borrow().paths.contains(path)
    }

    /// Replace the selection wholesale.
    pub fn set_selection_paths(&self, paths: Vec<TreePath>) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let had_paths = !inner.paths.is_empty();
            inner.paths.clear();
            let added = inner.add(paths);
            added || had_paths
        };
        if changed {
            self.fire();
        }
    }

    /// Add paths to the selection. In [`SelectionMode::Single`] the last
    /// added path replaces the selection.
    pub fn add_selection_paths(&self, paths: Vec<TreePath>) {
        let changed = self.inner.borrow_mut().add(paths);
        if changed {
            self.fire();
        }
    }

    /// Remove paths from the selection; absent paths are ignored.
    pub fn remove_selection_paths(&self, paths: &[TreePath]) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.paths.len();
            inner.paths.retain(|existing| !paths.contains(existing));
            inner.paths.len() != before
        };
        if changed {
            self.fire();
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&self) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let had_paths = !inner.paths.is_empty();
            inner.paths.clear();
            had_paths
        };
        if changed {
            self.fire();
        }
    }

    /// Register a selection-change listener.
    pub fn add_listener(&self, callback: impl Fn(&SelectionEvent) + 'static) -> ListenerId {
        self.inner.borrow_mut().listeners.register(callback)
    }

    /// Unregister a selection-change listener.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.unregister(id)
    }

    fn fire(&self) {
        let (listeners, paths) = {
            let inner = self.inner.borrow();
            (inner.listeners.snapshot(), inner.paths.clone())
        };
        if listeners.is_empty() {
            return;
        }
        let event = SelectionEvent { paths };
        for callback in listeners {
            callback(&event);
        }
    }
}

impl Default for TreeSelectionModel {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl std::fmt::Debug for TreeSelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TreeSelectionModel")
            .field("mode", &inner.mode)
            .field("paths", &inner.paths.len())
            .finish()
    }
}

impl SelectionInner {
    fn add(&mut self, paths: Vec<TreePath>) -> bool {
        let mut changed = false;
        for path in paths {
            match self.mode {
                SelectionMode::Single => {
                    if self.paths.len() != 1 || self.paths.first() != Some(&path) {
                        self.paths.clear();
                        self.paths.push(path);
                        changed = true;
                    }
                }
                SelectionMode::Multiple => {
                    if !self.paths.contains(&path) {
                        self.paths.push(path);
                        changed = true;
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TreeNode;
    use std::cell::Cell;

    fn path() -> TreePath {
        TreePath::for_root(TreeNode::new())
    }

    #[test]
    fn single_mode_replaces() {
        let selection = TreeSelectionModel::new(SelectionMode::Single);
        let first = path();
        let second = path();

        selection.add_selection_paths(vec![first.clone()]);
        selection.add_selection_paths(vec![second.clone()]);

        assert_eq!(selection.selection_paths(), vec![second.clone()]);
        assert!(!selection.is_path_selected(&first));
        assert!(selection.is_path_selected(&second));
    }

    #[test]
    fn multiple_mode_accumulates_without_duplicates() {
        let selection = TreeSelectionModel::new(SelectionMode::Multiple);
        let a = path();
        let b = path();

        selection.add_selection_paths(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(selection.selection_paths(), vec![a, b]);
    }

    #[test]
    fn remove_is_noop_for_absent_paths() {
        let selection = TreeSelectionModel::new(SelectionMode::Multiple);
        let a = path();
        selection.add_selection_paths(vec![a.clone()]);

        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        selection.add_listener(move |_| sink.set(sink.get() + 1));

        selection.remove_selection_paths(&[path()]);
        assert_eq!(fired.get(), 0);

        selection.remove_selection_paths(&[a]);
        assert_eq!(fired.get(), 1);
        assert!(selection.selection_paths().is_empty());
    }

    #[test]
    fn set_selection_replaces_wholesale() {
        let selection = TreeSelectionModel::new(SelectionMode::Multiple);
        let a = path();
        let b = path();
        selection.add_selection_paths(vec![a]);

        selection.set_selection_paths(vec![b.clone()]);
        assert_eq!(selection.selection_paths(), vec![b]);

        selection.set_selection_paths(Vec::new());
        assert!(selection.selection_paths().is_empty());
    }

    #[test]
    fn listeners_fire_only_on_effective_change() {
        let selection = TreeSelectionModel::new(SelectionMode::Multiple);
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        selection.add_listener(move |_| sink.set(sink.get() + 1));

        selection.clear_selection();
        assert_eq!(fired.get(), 0);

        let a = path();
        selection.add_selection_paths(vec![a.clone()]);
        assert_eq!(fired.get(), 1);

        // Re-adding the same path changes nothing.
        selection.add_selection_paths(vec![a]);
        assert_eq!(fired.get(), 1);
    }
}
