//! Per-viewer session slots.
//!
//! Each viewer of a tree gets one [`ViewerSession`]: its [`RenderState`]
//! plus its [`SequentialIdSource`] (client render ids are assigned per
//! viewer). Sessions are created lazily on first render or first client
//! interaction and live until removed — typically when the model is
//! replaced wholesale, which invalidates everything the viewer was sent.

use std::collections::HashMap;
use std::fmt;

use arbor_model::TreeView;
use tracing::debug;

use crate::ids::SequentialIdSource;
use crate::render_state::RenderState;

/// Opaque key identifying one viewer (session) of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ViewerId(String);

impl ViewerId {
    /// Wrap a viewer key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One viewer's synchronization state.
pub struct ViewerSession {
    /// What this viewer has been sent and what is pending.
    pub state: RenderState,
    /// This viewer's element-id assignments.
    pub ids: SequentialIdSource,
}

impl ViewerSession {
    /// A fresh session subscribed to `view`'s expansion events.
    #[must_use]
    pub fn new(view: &TreeView) -> Self {
        Self { state: RenderState::new(view), ids: SequentialIdSource::new() }
    }
}

/// The per-viewer persistent-state slots for one tree.
#[derive(Default)]
pub struct RenderStateStore {
    sessions: HashMap<ViewerId, ViewerSession>,
}

impl RenderStateStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `viewer`, if one exists.
    #[must_use]
    pub fn get(&self, viewer: &ViewerId) -> Option<&ViewerSession> {
        self.sessions.get(viewer)
    }

    /// Mutable access to the session for `viewer`, if one exists.
    pub fn get_mut(&mut self, viewer: &ViewerId) -> Option<&mut ViewerSession> {
        self.sessions.get_mut(viewer)
    }

    /// The session for `viewer`, created lazily against `view`.
    pub fn get_or_create(&mut self, viewer: &ViewerId, view: &TreeView) -> &mut ViewerSession {
        self.sessions.entry(viewer.clone()).or_insert_with(|| {
            debug!(viewer = %viewer, "creating render state");
            ViewerSession::new(view)
        })
    }

    /// Discard the session for `viewer`. Dropping the session unsubscribes
    /// its expansion listener; the next render for this viewer starts from
    /// scratch.
    pub fn remove(&mut self, viewer: &ViewerId) -> bool {
        let removed = self.sessions.remove(viewer).is_some();
        if removed {
            debug!(viewer = %viewer, "render state discarded");
        }
        removed
    }

    /// Discard every session.
    pub fn clear(&mut self) {
        if !self.sessions.is_empty() {
            debug!(sessions = self.sessions.len(), "all render states discarded");
        }
        self.sessions.clear();
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_model::{TreeNode, TreeNodeModel, TreePath};
    use std::rc::Rc;

    fn view() -> (TreeView, TreePath) {
        let root = TreeNode::new();
        root.add_child(&TreeNode::new());
        let path = TreePath::for_root(root.clone());
        (TreeView::new(Rc::new(TreeNodeModel::new(root))), path)
    }

    #[test]
    fn sessions_are_created_lazily_and_reused() {
        let (view, _) = view();
        let mut store = RenderStateStore::new();
        let viewer = ViewerId::from("session-1");

        assert!(store.get(&viewer).is_none());
        store.get_or_create(&viewer, &view).state.set_full_render(false);
        assert_eq!(store.len(), 1);

        // The same slot comes back, state intact.
        assert!(!store.get_or_create(&viewer, &view).state.is_full_render());
    }

    #[test]
    fn removal_detaches_the_expansion_listener() {
        let (view, root_path) = view();
        let mut store = RenderStateStore::new();
        let viewer = ViewerId::from("session-1");

        store.get_or_create(&viewer, &view);
        assert!(store.remove(&viewer));
        assert!(!store.remove(&viewer));

        // The dropped session no longer observes expansion changes; a new
        // session starts uninitialized.
        view.set_expanded(&root_path, true);
        let session = store.get_or_create(&viewer, &view);
        assert!(session.state.is_full_render());
        assert!(!session.state.has_changed_paths());
    }

    #[test]
    fn viewers_are_independent() {
        let (view, root_path) = view();
        let mut store = RenderStateStore::new();
        let one = ViewerId::from("one");
        let two = ViewerId::from("two");

        store.get_or_create(&one, &view).state.set_full_render(false);
        store.get_or_create(&two, &view);

        view.set_expanded(&root_path, true);
        assert!(store.get(&one).unwrap().state.has_changed_paths());
        assert!(store.get(&two).unwrap().state.has_changed_paths());

        // Clearing one viewer's pending changes leaves the other's alone.
        store.get(&one).unwrap().state.clear_changed_paths();
        assert!(!store.get(&one).unwrap().state.has_changed_paths());
        assert!(store.get(&two).unwrap().state.has_changed_paths());

        store.clear();
        assert!(store.is_empty());
    }
}
