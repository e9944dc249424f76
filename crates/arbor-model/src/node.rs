//! Mutable tree nodes with change notification.
//!
//! [`TreeNode`] is a cheaply-cloneable handle to a shared node: equality,
//! hashing, and child lookup go by node identity, never by contents. Children
//! are owned through the handle; the parent link is a weak back-reference, so
//! a subtree never keeps its parent alive.
//!
//! Mutations validate their preconditions first and fire change notifications
//! last, after every interior borrow has been released. Listeners may
//! therefore re-enter the tree freely, including subscribing to nodes that
//! were inserted by the very event being dispatched.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use smallvec::{SmallVec, smallvec};

use crate::error::{TreeError, TreeResult};
use crate::event::{ListenerId, ListenerList, TreeEventKind, TreeModelEvent};
use crate::path::TreePath;

/// An opaque, serializable column value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnValue {
    /// A boolean cell value.
    Bool(bool),
    /// An integer cell value.
    Int(i64),
    /// A text cell value.
    Text(String),
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Bool(value) => write!(f, "{value}"),
            ColumnValue::Int(value) => write!(f, "{value}"),
            ColumnValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Bool(value)
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Int(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_owned())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

/// Tri-state leaf override.
///
/// With [`LeafHint::Derive`] (the default) a node is a leaf exactly when it
/// has no children; the other two variants force the answer either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeafHint {
    /// Leaf iff the node has no children.
    #[default]
    Derive,
    /// Always report leaf.
    ForceLeaf,
    /// Never report leaf.
    ForceBranch,
}

struct NodeData {
    parent: Weak<RefCell<NodeData>>,
    children: Vec<TreeNode>,
    columns: HashMap<String, ColumnValue>,
    leaf_hint: LeafHint,
    listeners: ListenerList<TreeModelEvent>,
}

/// Handle to a mutable tree node.
///
/// Clones share the same underlying node. A node is created detached (no
/// parent, no children, empty columns) and is attached by calling
/// [`TreeNode::add_child`] on an existing node.
#[derive(Clone)]
pub struct TreeNode {
    data: Rc<RefCell<NodeData>>,
}

impl TreeNode {
    /// Create a detached node with empty column values.
    #[must_use]
    pub fn new() -> Self {
        Self::with_columns(HashMap::new())
    }

    /// Create a detached node holding the given column values.
    #[must_use]
    pub fn with_columns(columns: HashMap<String, ColumnValue>) -> Self {
        Self {
            data: Rc::new(RefCell::new(NodeData {
                parent: Weak::new(),
                children: Vec::new(),
                columns,
                leaf_hint: LeafHint::default(),
                listeners: ListenerList::new(),
            })),
        }
    }

    /// The current parent, `None` for a root or detached fragment.
    #[must_use]
    pub fn parent(&self) -> Option<TreeNode> {
        self.data.borrow().parent.upgrade().map(|data| TreeNode { data })
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    /// The child at `index`.
    pub fn child(&self, index: usize) -> TreeResult<TreeNode> {
        let data = self.data.borrow();
        data.children
            .get(index)
            .cloned()
            .ok_or(TreeError::IndexOutOfBounds { index, len: data.children.len() })
    }

    /// Snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<TreeNode> {
        self.data.borrow().children.clone()
    }

    /// Position of `node` in the child list, by identity.
    #[must_use]
    pub fn index_of(&self, node: &TreeNode) -> Option<usize> {
        self.data.borrow().children.iter().position(|child| child == node)
    }

    /// Append `child` to the end of the child list and fire an inserted
    /// notification carrying its index.
    ///
    /// A child that is currently attached elsewhere is detached first (the
    /// prior parent fires its removed notification), so a node never has two
    /// parents.
    pub fn add_child(&self, child: &TreeNode) {
        if *self == *child {
            // A node cannot adopt itself.
            return;
        }
        if let Some(previous) = child.parent() {
            previous.remove_child(child);
        }
        let index = {
            let mut data = self.data.borrow_mut();
            data.children.push(child.clone());
            data.children.len() - 1
        };
        child.data.borrow_mut().parent = Rc::downgrade(&self.data);
        self.dispatch(|| TreeModelEvent {
            kind: TreeEventKind::Inserted,
            path: self.path_from_root(),
            child_indices: smallvec![index],
            children: smallvec![child.clone()],
        });
    }

    /// Remove `child` from the child list, clearing its parent link and
    /// firing a removed notification with its former index.
    ///
    /// A node that is not a child is a no-op.
    pub fn remove_child(&self, child: &TreeNode) {
        let index = {
            let mut data = self.data.borrow_mut();
            match data.children.iter().position(|entry| entry == child) {
                Some(index) => {
                    data.children.remove(index);
                    index
                }
                None => return,
            }
        };
        child.data.borrow_mut().parent = Weak::new();
        self.dispatch(|| TreeModelEvent {
            kind: TreeEventKind::Removed,
            path: self.path_from_root(),
            child_indices: smallvec![index],
            children: smallvec![child.clone()],
        });
    }

    /// Remove every child, clearing their parent links.
    ///
    /// Fires a single removed notification covering all former indices, even
    /// when there were no children.
    pub fn remove_all_children(&self) {
        let removed = {
            let mut data = self.data.borrow_mut();
            std::mem::take(&mut data.children)
        };
        for child in &removed {
            child.data.borrow_mut().parent = Weak::new();
        }
        self.dispatch(|| TreeModelEvent {
            kind: TreeEventKind::Removed,
            path: self.path_from_root(),
            child_indices: (0..removed.len()).collect(),
            children: removed.iter().cloned().collect(),
        });
    }

    /// Copy-out of the column-value mapping.
    #[must_use]
    pub fn column_values(&self) -> HashMap<String, ColumnValue> {
        self.data.borrow().columns.clone()
    }

    /// The value stored under `key`, if any.
    #[must_use]
    pub fn column_value(&self, key: &str) -> Option<ColumnValue> {
        self.data.borrow().columns.get(key).cloned()
    }

    /// The column keys of this node, in lexical order.
    #[must_use]
    pub fn column_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.borrow().columns.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Replace the column mapping wholesale.
    ///
    /// Fires a changed notification for this node's index within its parent;
    /// a root or detached node changes silently.
    pub fn set_column_values(&self, values: HashMap<String, ColumnValue>) {
        self.data.borrow_mut().columns = values;
        if let Some(parent) = self.parent() {
            if let Some(index) = parent.index_of(self) {
                self.dispatch(|| TreeModelEvent {
                    kind: TreeEventKind::Changed,
                    path: parent.path_from_root(),
                    child_indices: smallvec![index],
                    children: smallvec![self.clone()],
                });
            }
        }
    }

    /// Whether this node is a leaf: the explicit hint wins, otherwise a node
    /// without children is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        let data = self.data.borrow();
        match data.leaf_hint {
            LeafHint::ForceLeaf => true,
            LeafHint::ForceBranch => false,
            LeafHint::Derive => data.children.is_empty(),
        }
    }

    /// Set the leaf override.
    pub fn set_leaf_hint(&self, hint: LeafHint) {
        self.data.borrow_mut().leaf_hint = hint;
    }

    /// Resolve `path` starting at this node.
    ///
    /// The path's first component must be this node; every further component
    /// must be a direct child (by identity) of its predecessor.
    pub fn node_for_path(&self, path: &TreePath) -> TreeResult<TreeNode> {
        let components = path.components();
        let Some((first, rest)) = components.split_first() else {
            return Err(TreeError::EmptyPath);
        };
        if first != self {
            return Err(TreeError::PathNotRooted);
        }
        let mut current = self.clone();
        for (offset, component) in rest.iter().enumerate() {
            let next = {
                let data = current.data.borrow();
                data.children.iter().find(|child| *child == component).cloned()
            };
            current = next.ok_or(TreeError::ChildNotFound { depth: offset + 1 })?;
        }
        Ok(current)
    }

    /// The path from the root of this node's tree down to this node, computed
    /// by walking parent links.
    #[must_use]
    pub fn path_from_root(&self) -> TreePath {
        match self.parent() {
            Some(parent) => parent.path_from_root().by_adding_child(self.clone()),
            None => TreePath::for_root(self.clone()),
        }
    }

    /// Register a change listener on this node.
    pub fn add_listener(&self, callback: impl Fn(&TreeModelEvent) + 'static) -> ListenerId {
        self.data.borrow_mut().listeners.register(callback)
    }

    /// Unregister a change listener. Unknown ids are a no-op.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.data.borrow_mut().listeners.unregister(id)
    }

    /// Announce that arbitrary restructuring happened beneath this node.
    ///
    /// Model adapters react by resynchronizing their subscriptions from the
    /// root.
    pub fn notify_structure_changed(&self) {
        self.dispatch(|| TreeModelEvent {
            kind: TreeEventKind::StructureChanged,
            path: self.path_from_root(),
            child_indices: SmallVec::new(),
            children: SmallVec::new(),
        });
    }

    /// Dispatch an event to this node's listeners, building it only when
    /// someone is listening. Must be called with no interior borrow held.
    fn dispatch(&self, build: impl FnOnce() -> TreeModelEvent) {
        let listeners = self.data.borrow().listeners.snapshot();
        if listeners.is_empty() {
            return;
        }
        let event = build();
        for callback in listeners {
            callback(&event);
        }
    }
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for TreeNode {}

impl Hash for TreeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.data), state);
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeNode({:p})", Rc::as_ptr(&self.data))
    }
}
