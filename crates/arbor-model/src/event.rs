//! Change notifications and ordered listener registration.
//!
//! Every mutable tree participant (nodes, models, views, selection models)
//! carries a [`ListenerList`]: an ordered collection of registered callbacks
//! dispatched synchronously, in registration order. Dispatchers snapshot the
//! list before invoking anything, so callbacks are free to re-enter the tree,
//! register, or unregister without observing a half-mutated list.
//!
//! Events are built lazily: a dispatcher first checks [`ListenerList::is_empty`]
//! and only constructs the event payload when someone is listening.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::node::TreeNode;
use crate::path::TreePath;

/// Handle identifying a single listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The kind of structural or value change a [`TreeModelEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEventKind {
    /// Children were appended to the source node.
    Inserted,
    /// Children were removed from the source node.
    Removed,
    /// A child's column values were replaced wholesale.
    Changed,
    /// Arbitrary restructuring happened beneath the source node.
    StructureChanged,
}

/// A change notification emitted by a node and re-emitted by model adapters.
///
/// `path` leads from the tree root to the node whose child list (or child
/// value) changed. `child_indices` and `children` describe the affected
/// entries; both are empty for [`TreeEventKind::StructureChanged`].
#[derive(Debug, Clone)]
pub struct TreeModelEvent {
    /// What happened.
    pub kind: TreeEventKind,
    /// Root path to the node the change happened under.
    pub path: TreePath,
    /// Indices of the affected children within the source node.
    pub child_indices: SmallVec<[usize; 4]>,
    /// Handles of the affected children.
    pub children: SmallVec<[TreeNode; 4]>,
}

/// An ordered list of registered callbacks for events of type `E`.
///
/// Dispatch order is registration order. Unregistering an absent id is a
/// no-op. [`ListenerList::snapshot`] returns the callbacks as owned handles
/// so dispatch can happen outside any interior borrow.
pub struct ListenerList<E> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<dyn Fn(&E)>)>,
}

impl<E> ListenerList<E> {
    /// Create an empty listener list.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }

    /// Register a callback, returning its id.
    pub fn register(&mut self, callback: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Rc::new(callback)));
        id
    }

    /// Unregister a callback by id. Returns `false` when the id is unknown.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Whether any listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The registered callbacks, in registration order.
    ///
    /// Callers dispatch over the snapshot after releasing any interior
    /// borrows, so a callback removed mid-dispatch still sees the event it
    /// was registered for at snapshot time.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Fn(&E)>> {
        self.entries.iter().map(|(_, callback)| Rc::clone(callback)).collect()
    }
}

impl<E> Default for ListenerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList").field("len", &self.entries.len()).finish()
    }
}
