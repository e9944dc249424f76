//! Synchronization peer: the request/response surface for one tree.
//!
//! A [`TreeSyncPeer`] ties a [`TreeView`] to its per-viewer sessions and
//! drives the two directions of the protocol: rendering structure batches
//! and selection strings out, and applying expansion/selection directives
//! coming in. One peer serves any number of viewers; each gets its own
//! render state and element-id assignments.

use arbor_model::TreeView;
use tracing::debug;

use crate::batch::StructureBatch;
use crate::input::{self, SelectionUpdate};
use crate::renderer::StructureRenderer;
use crate::selection_sync;
use crate::store::{RenderStateStore, ViewerId};

/// Per-tree synchronization orchestrator.
pub struct TreeSyncPeer {
    view: TreeView,
    store: RenderStateStore,
}

impl TreeSyncPeer {
    /// Create a peer for `view` with no viewer sessions yet.
    #[must_use]
    pub fn new(view: TreeView) -> Self {
        Self { view, store: RenderStateStore::new() }
    }

    /// The view this peer synchronizes.
    #[must_use]
    pub fn view(&self) -> &TreeView {
        &self.view
    }

    /// Render the structure batch for `viewer`.
    ///
    /// A viewer without a session gets one lazily and receives a full
    /// render. Afterwards the viewer's changed set and client path are
    /// cleared: the batch now accounts for them.
    pub fn render(&mut self, viewer: &ViewerId) -> StructureBatch {
        let session = self.store.get_or_create(viewer, &self.view);
        let state = session.state.clone();
        let batch = StructureRenderer::new(&self.view, &state, &mut session.ids).render();
        state.clear_changed_paths();
        debug!(viewer = %viewer, descriptors = batch.len(), full = batch.full_render, "rendered");
        batch
    }

    /// The comma-joined element ids of the currently visible selection for
    /// `viewer`, recording invisible selections as unsent.
    pub fn selection_string(&mut self, viewer: &ViewerId) -> String {
        let session = self.store.get_or_create(viewer, &self.view);
        let state = session.state.clone();
        selection_sync::selection_string(&self.view, &state, &mut session.ids)
    }

    /// Apply a client expansion toggle for the given visible row.
    pub fn process_expansion(&mut self, viewer: &ViewerId, row: usize) {
        let session = self.store.get_or_create(viewer, &self.view);
        let state = session.state.clone();
        input::apply_expansion_input(&self.view, &state, row);
    }

    /// Apply a client selection update. Selection is shared server state;
    /// per-viewer unsent bookkeeping happens when selection strings are
    /// rendered.
    pub fn process_selection(&mut self, update: &SelectionUpdate) {
        input::apply_selection_input(&self.view, update);
    }

    /// Discard the session for `viewer`; the next render is a full one.
    pub fn invalidate(&mut self, viewer: &ViewerId) -> bool {
        self.store.remove(viewer)
    }

    /// Discard every viewer session, e.g. after the model was replaced
    /// wholesale.
    pub fn invalidate_all(&mut self) {
        self.store.clear();
    }

    /// Whether `viewer` currently has a session.
    #[must_use]
    pub fn has_session(&self, viewer: &ViewerId) -> bool {
        self.store.get(viewer).is_some()
    }
}
