#![forbid(unsafe_code)]

//! Server-side tree data model: nodes, paths, change events, tabular model
//! adapters, selection, and the widget-side view facade.
//!
//! Everything here is `Rc`/`RefCell`-based and deliberately single-threaded:
//! a tree and the state derived from it form one mutual-exclusion domain,
//! mutated and read within one logical request/response cycle. Listener
//! dispatch always happens after interior borrows are released, so callbacks
//! can re-enter the tree safely.

pub mod error;
pub mod event;
pub mod model;
pub mod node;
pub mod path;
pub mod selection;
pub mod view;

pub use error::{TreeError, TreeResult};
pub use event::{ListenerId, ListenerList, TreeEventKind, TreeModelEvent};
pub use model::{TreeModel, TreeNodeModel};
pub use node::{ColumnValue, LeafHint, TreeNode};
pub use path::TreePath;
pub use selection::{SelectionEvent, SelectionMode, TreeSelectionModel};
pub use view::{TreeExpansionEvent, TreeView};
