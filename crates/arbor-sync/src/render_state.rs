//! Per-viewer record of what the client already knows.
//!
//! A [`RenderState`] tracks, for one viewer of one tree:
//!
//! - **sent paths** — transmitted to the client and presumed known
//!   byte-for-byte, including immediate child identifiers, until
//!   invalidated;
//! - **changed paths** — expansion state changed server-side since the last
//!   synchronization;
//! - **unsent selections** — selected paths the client has no element for
//!   yet;
//! - the **client path** — the single path whose expansion the client itself
//!   just toggled, suppressed from the changed set so the client is never
//!   echoed a change it already knows;
//! - the **full-render flag**, `true` until the first complete traversal.
//!
//! The state subscribes to the view's expansion events at construction and
//! unsubscribes when dropped.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

use arbor_model::{ListenerId, TreeModel, TreePath, TreeView};

struct StateInner {
    sent_paths: HashSet<TreePath>,
    changed_paths: HashSet<TreePath>,
    unsent_selections: HashSet<TreePath>,
    client_path: Option<TreePath>,
    full_render: bool,
}

/// Handle to one viewer's render state.
#[derive(Clone)]
pub struct RenderState {
    inner: Rc<RefCell<StateInner>>,
    registration: Rc<ExpansionRegistration>,
}

/// Undoes the expansion-listener registration when the last handle drops.
struct ExpansionRegistration {
    view: TreeView,
    listener: ListenerId,
}

impl Drop for ExpansionRegistration {
    fn drop(&mut self) {
        self.view.remove_expansion_listener(self.listener);
    }
}

impl RenderState {
    /// Create a state for a fresh viewer of `view` and start listening for
    /// expansion changes.
    #[must_use]
    pub fn new(view: &TreeView) -> Self {
        let inner = Rc::new(RefCell::new(StateInner {
            sent_paths: HashSet::new(),
            changed_paths: HashSet::new(),
            unsent_selections: HashSet::new(),
            client_path: None,
            full_render: true,
        }));
        let weak = Rc::downgrade(&inner);
        let listener = view.add_expansion_listener(move |event| {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.borrow_mut();
                if state.client_path.as_ref() != Some(&event.path) {
                    state.changed_paths.insert(event.path.clone());
                }
            }
        });
        Self {
            inner,
            registration: Rc::new(ExpansionRegistration { view: view.clone(), listener }),
        }
    }

    /// Whether the next render must retransmit the whole visible tree.
    #[must_use]
    pub fn is_full_render(&self) -> bool {
        self.inner.borrow().full_render
    }

    /// Set the full-render flag.
    pub fn set_full_render(&self, full_render: bool) {
        self.inner.borrow_mut().full_render = full_render;
    }

    /// Record the path whose expansion the client itself toggled, so the
    /// change is not echoed back. Only a path the client already has (a sent
    /// path) is recorded.
    pub fn set_client_path(&self, path: &TreePath) {
        let mut inner = self.inner.borrow_mut();
        inner.client_path = None;
        if inner.sent_paths.contains(path) {
            inner.client_path = Some(path.clone());
        }
    }

    /// Mark `path` as transmitted.
    pub fn add_sent_path(&self, path: TreePath) {
        self.inner.borrow_mut().sent_paths.insert(path);
    }

    /// Forget that `path` was transmitted.
    pub fn remove_sent_path(&self, path: &TreePath) {
        self.inner.borrow_mut().sent_paths.remove(path);
    }

    /// Whether `path` has been transmitted.
    #[must_use]
    pub fn is_sent(&self, path: &TreePath) -> bool {
        self.inner.borrow().sent_paths.contains(path)
    }

    /// Whether `path` changed since the last synchronization.
    #[must_use]
    pub fn is_path_changed(&self, path: &TreePath) -> bool {
        self.inner.borrow().changed_paths.contains(path)
    }

    /// Whether anything is pending: a changed path or a client toggle.
    #[must_use]
    pub fn has_changed_paths(&self) -> bool {
        let inner = self.inner.borrow();
        inner.client_path.is_some() || !inner.changed_paths.is_empty()
    }

    /// The changed paths, sorted by visible row order (see
    /// [`compare_row_order`]).
    #[must_use]
    pub fn sorted_changed_paths(&self, model: &dyn TreeModel) -> Vec<TreePath> {
        let mut paths: Vec<TreePath> =
            self.inner.borrow().changed_paths.iter().cloned().collect();
        paths.sort_by(|a, b| compare_row_order(model, a, b));
        paths
    }

    /// Clear the changed set and the client path after a synchronization.
    pub fn clear_changed_paths(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.client_path = None;
        inner.changed_paths.clear();
    }

    /// Whether any selected paths await transmission.
    #[must_use]
    pub fn has_unsent_selections(&self) -> bool {
        !self.inner.borrow().unsent_selections.is_empty()
    }

    /// Record a selected path the client has no element for yet.
    pub fn add_unsent_selection(&self, path: TreePath) {
        self.inner.borrow_mut().unsent_selections.insert(path);
    }

    /// Drop a path from the unsent-selection set.
    pub fn remove_unsent_selection(&self, path: &TreePath) {
        self.inner.borrow_mut().unsent_selections.remove(path);
    }

    /// Whether `path` is recorded as an unsent selection.
    #[must_use]
    pub fn is_selection_unsent(&self, path: &TreePath) -> bool {
        self.inner.borrow().unsent_selections.contains(path)
    }
}

impl std::fmt::Debug for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RenderState")
            .field("sent", &inner.sent_paths.len())
            .field("changed", &inner.changed_paths.len())
            .field("unsent_selections", &inner.unsent_selections.len())
            .field("client_path", &inner.client_path.is_some())
            .field("full_render", &inner.full_render)
            .finish()
    }
}

/// Order two paths by visible row position.
///
/// A path with fewer components that is a proper prefix of the other sorts
/// first; otherwise the paths are ordered by the child ordinal under the
/// nearest common ancestor, looked up through the model. Components at
/// position 0 are the shared root, so comparison starts at position 1. A
/// child missing from its parent (a stale path) orders before its siblings.
pub fn compare_row_order(model: &dyn TreeModel, a: &TreePath, b: &TreePath) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let a_count = a.count();
    let b_count = b.count();
    if a_count == 1 {
        return Ordering::Less;
    }
    if b_count == 1 {
        return Ordering::Greater;
    }
    let a_components = a.components();
    let b_components = b.components();
    let end = a_count.min(b_count);
    let mut index = 1;
    while index < end {
        if a_components[index] != b_components[index] {
            return compare_ordinals(model, &a_components, &b_components, index);
        }
        index += 1;
    }
    if a_count == index {
        return Ordering::Less;
    }
    if b_count == index {
        return Ordering::Greater;
    }
    compare_ordinals(model, &a_components, &b_components, index)
}

fn compare_ordinals(
    model: &dyn TreeModel,
    a_components: &[arbor_model::TreeNode],
    b_components: &[arbor_model::TreeNode],
    index: usize,
) -> Ordering {
    let parent = &a_components[index - 1];
    let ordinal = |child| match model.index_of_child(parent, child) {
        Some(position) => position as i64,
        None => -1,
    };
    ordinal(&a_components[index]).cmp(&ordinal(&b_components[index]))
}
