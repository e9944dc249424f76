#![forbid(unsafe_code)]

//! Incremental client synchronization for server-side trees.
//!
//! This crate tracks, per viewer, what a remote client already knows about a
//! tree ([`RenderState`]), and computes the minimal descriptor batch to
//! bring the client's view up to date ([`StructureRenderer`]). The
//! [`TreeSyncPeer`] ties both to a view and handles the client-originated
//! expansion and selection directives flowing the other way.
//!
//! Like `arbor-model`, everything here is single-threaded by design: a tree
//! and its render states belong to one mutual-exclusion domain, driven by
//! one logical request/response cycle at a time.

pub mod batch;
pub mod ids;
pub mod input;
pub mod peer;
pub mod render_state;
pub mod renderer;
pub mod selection_sync;
pub mod store;

pub use batch::{NodeDescriptor, NodeFlags, StructureBatch};
pub use ids::{ElementId, RenderIdSource, SequentialIdSource};
pub use input::{SelectionUpdate, apply_expansion_input, apply_selection_input};
pub use peer::TreeSyncPeer;
pub use render_state::{RenderState, compare_row_order};
pub use renderer::StructureRenderer;
pub use selection_sync::selection_string;
pub use store::{RenderStateStore, ViewerId, ViewerSession};
