//! Client-originated input directives.
//!
//! Expansion toggles arrive keyed by visible row index; selection updates
//! carry a clear flag plus added/removed row lists. Both resolve rows to
//! paths through the view's row lookup before touching server state.

use arbor_model::{TreePath, TreeView};
use tracing::debug;

use crate::render_state::RenderState;

/// A selection-update directive from the client.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionUpdate {
    /// Replace the existing selection instead of extending it.
    pub clear: bool,
    /// Rows the client selected.
    pub added_rows: Vec<usize>,
    /// Rows the client deselected.
    pub removed_rows: Vec<usize>,
}

/// Apply a client expansion toggle for `row`.
///
/// The toggled path is recorded as the viewer's client path first, so the
/// resulting expansion event is not echoed back to the client that caused
/// it, and its sent marker is dropped so a later server-side change
/// retransmits it fully. Unknown rows are ignored.
pub fn apply_expansion_input(view: &TreeView, state: &RenderState, row: usize) {
    let Some(path) = view.path_for_row(row) else {
        debug!(row, "expansion input for unknown row ignored");
        return;
    };
    state.set_client_path(&path);
    state.remove_sent_path(&path);
    view.toggle_expanded(&path);
}

/// Apply a client selection update: removals first, then additions
/// (replacing the selection when `clear` is set).
pub fn apply_selection_input(view: &TreeView, update: &SelectionUpdate) {
    let resolve = |rows: &[usize]| -> Vec<TreePath> {
        rows.iter().filter_map(|&row| view.path_for_row(row)).collect()
    };

    let removed = resolve(&update.removed_rows);
    if !removed.is_empty() {
        view.selection().remove_selection_paths(&removed);
    }
    let added = resolve(&update.added_rows);
    if !added.is_empty() {
        if update.clear {
            view.selection().set_selection_paths(added);
        } else {
            view.selection().add_selection_paths(added);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::{TreeNode, TreeNodeModel, TreePath};
    use std::rc::Rc;

    /// root -> {a, b}; root expanded so rows are root=0, a=1, b=2.
    fn fixture() -> (TreeView, TreePath, TreePath, TreePath) {
        let root = TreeNode::new();
        let a = TreeNode::new();
        let b = TreeNode::new();
        root.add_child(&a);
        root.add_child(&b);

        let model = TreeNodeModel::new(root.clone());
        let view = TreeView::new(Rc::new(model));
        let root_path = TreePath::for_root(root);
        view.set_expanded(&root_path, true);
        let a_path = root_path.by_adding_child(a);
        let b_path = root_path.by_adding_child(b);
        (view, root_path, a_path, b_path)
    }

    #[test]
    fn expansion_toggle_suppresses_echo_for_sent_paths() {
        let (view, _root_path, a_path, _b_path) = fixture();
        let state = RenderState::new(&view);
        state.add_sent_path(a_path.clone());

        apply_expansion_input(&view, &state, 1);

        assert!(view.is_expanded(&a_path));
        // The client knows what it toggled: no echo...
        assert!(!state.is_path_changed(&a_path));
        // ...but its sent marker is gone, so the next explicit change
        // retransmits the node fully.
        assert!(!state.is_sent(&a_path));
    }

    #[test]
    fn expansion_toggle_collapses_an_expanded_path() {
        let (view, root_path, ..) = fixture();
        let state = RenderState::new(&view);
        state.add_sent_path(root_path.clone());

        apply_expansion_input(&view, &state, 0);
        assert!(!view.is_expanded(&root_path));
    }

    #[test]
    fn unknown_row_is_ignored() {
        let (view, ..) = fixture();
        let state = RenderState::new(&view);
        apply_expansion_input(&view, &state, 99);
        assert!(!state.has_changed_paths());
    }

    #[test]
    fn selection_update_resolves_rows() {
        let (view, _root_path, a_path, b_path) = fixture();

        apply_selection_input(
            &view,
            &SelectionUpdate { clear: false, added_rows: vec![1, 2], removed_rows: vec![] },
        );
        assert!(view.selection().is_path_selected(&a_path));
        assert!(view.selection().is_path_selected(&b_path));

        apply_selection_input(
            &view,
            &SelectionUpdate { clear: false, added_rows: vec![], removed_rows: vec![1] },
        );
        assert!(!view.selection().is_path_selected(&a_path));
        assert!(view.selection().is_path_selected(&b_path));
    }

    #[test]
    fn clear_flag_replaces_selection() {
        let (view, root_path, a_path, b_path) = fixture();
        view.selection().add_selection_paths(vec![a_path.clone(), b_path.clone()]);

        apply_selection_input(
            &view,
            &SelectionUpdate { clear: true, added_rows: vec![0], removed_rows: vec![] },
        );
        assert_eq!(view.selection().selection_paths(), vec![root_path]);
    }
}
