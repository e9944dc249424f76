#![forbid(unsafe_code)]

//! Arbor public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates and offers a lightweight
//! prelude for day-to-day usage.

// --- Model re-exports ------------------------------------------------------

pub use arbor_model::error::{TreeError, TreeResult};
pub use arbor_model::event::{ListenerId, ListenerList, TreeEventKind, TreeModelEvent};
pub use arbor_model::model::{TreeModel, TreeNodeModel};
pub use arbor_model::node::{ColumnValue, LeafHint, TreeNode};
pub use arbor_model::path::TreePath;
pub use arbor_model::selection::{SelectionEvent, SelectionMode, TreeSelectionModel};
pub use arbor_model::view::{TreeExpansionEvent, TreeView};

// --- Sync re-exports -------------------------------------------------------

pub use arbor_sync::batch::{NodeDescriptor, NodeFlags, StructureBatch};
pub use arbor_sync::ids::{ElementId, RenderIdSource, SequentialIdSource};
pub use arbor_sync::input::SelectionUpdate;
pub use arbor_sync::peer::TreeSyncPeer;
pub use arbor_sync::render_state::RenderState;
pub use arbor_sync::renderer::StructureRenderer;
pub use arbor_sync::store::{RenderStateStore, ViewerId, ViewerSession};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ColumnValue, LeafHint, SelectionMode, SelectionUpdate, StructureBatch, TreeError,
        TreeModel, TreeNode, TreeNodeModel, TreePath, TreeResult, TreeSyncPeer, TreeView,
        ViewerId,
    };

    pub use crate::{model, sync};
}

pub use arbor_model as model;
pub use arbor_sync as sync;
