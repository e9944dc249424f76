//! Tabular projection of a node hierarchy.
//!
//! [`TreeModel`] is the abstract rows/typed-columns seam consumed by views
//! and the sync layer; it also provides the child-ordinal lookup the render
//! state's row-order comparator depends on. [`TreeNodeModel`] is the default
//! implementation wrapping a single root [`TreeNode`].
//!
//! `TreeNodeModel` keeps one invariant exactly: it is subscribed to every
//! node currently reachable from the root, and to nothing else. Structural
//! notifications from the tree re-establish this invariant (subscribe to
//! inserted subtrees, unsubscribe removed ones, resynchronize wholesale on a
//! structure change) before the event is re-emitted to model-level
//! listeners.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::TreeResult;
use crate::event::{ListenerId, ListenerList, TreeEventKind, TreeModelEvent};
use crate::node::{ColumnValue, TreeNode};

/// Abstract rows/columns view over a node hierarchy.
pub trait TreeModel {
    /// The root node.
    fn root(&self) -> TreeNode;

    /// The child of `parent` at `index`.
    fn child(&self, parent: &TreeNode, index: usize) -> TreeResult<TreeNode>;

    /// Number of children under `parent`.
    fn child_count(&self, parent: &TreeNode) -> usize;

    /// Ordinal of `child` under `parent`, by identity.
    fn index_of_child(&self, parent: &TreeNode, child: &TreeNode) -> Option<usize>;

    /// Whether `node` is a leaf.
    fn is_leaf(&self, node: &TreeNode) -> bool;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// The value of `node` in column `column`, `None` when the node has no
    /// value for that column's key.
    fn value_at(&self, node: &TreeNode, column: usize) -> Option<ColumnValue>;
}

struct ModelInner {
    root: TreeNode,
    column_keys: Vec<String>,
    /// Nodes this model is subscribed to, with the registration to undo.
    subscriptions: HashMap<TreeNode, ListenerId>,
    listeners: ListenerList<TreeModelEvent>,
}

/// A [`TreeModel`] compiled from a [`TreeNode`] hierarchy.
///
/// Built with explicit column keys, or by unioning the column keys found in
/// a full pre-order traversal (a node's own keys are visited in lexical
/// order; the union keeps first-seen order across the traversal).
#[derive(Clone)]
pub struct TreeNodeModel {
    inner: Rc<RefCell<ModelInner>>,
}

impl TreeNodeModel {
    /// Build a model over `root`, compiling column keys from the tree.
    #[must_use]
    pub fn new(root: TreeNode) -> Self {
        let keys = compile_columns(&root);
        Self::build(root, keys)
    }

    /// Build a model over `root` with explicit column keys.
    #[must_use]
    pub fn with_columns(root: TreeNode, column_keys: Vec<String>) -> Self {
        Self::build(root, column_keys)
    }

    fn build(root: TreeNode, column_keys: Vec<String>) -> Self {
        let model = Self {
            inner: Rc::new(RefCell::new(ModelInner {
                root: root.clone(),
                column_keys,
                subscriptions: HashMap::new(),
                listeners: ListenerList::new(),
            })),
        };
        model.attach_recursive(&root);
        model
    }

    /// Register a listener for re-emitted model-level events.
    pub fn add_model_listener(
        &self,
        callback: impl Fn(&TreeModelEvent) + 'static,
    ) -> ListenerId {
        self.inner.borrow_mut().listeners.register(callback)
    }

    /// Unregister a model-level listener.
    pub fn remove_model_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().listeners.unregister(id)
    }

    /// Number of nodes currently subscribed to (test and diagnostics seam).
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Subscribe to `node` and its entire subtree. Subscribing an
    /// already-subscribed node is a no-op, which keeps the walk idempotent
    /// under reentrant notifications.
    fn attach_recursive(&self, node: &TreeNode) {
        let subscribed = self.inner.borrow().subscriptions.contains_key(node);
        if !subscribed {
            let weak = Rc::downgrade(&self.inner);
            let id = node.add_listener(move |event| {
                if let Some(inner) = weak.upgrade() {
                    Self::handle_node_event(&inner, event);
                }
            });
            self.inner.borrow_mut().subscriptions.insert(node.clone(), id);
        }
        for child in node.children() {
            self.attach_recursive(&child);
        }
    }

    /// Unsubscribe from `node` and its entire subtree, exactly once per
    /// node.
    fn detach_recursive(&self, node: &TreeNode) {
        if let Some(id) = self.inner.borrow_mut().subscriptions.remove(node) {
            node.remove_listener(id);
        }
        for child in node.children() {
            self.detach_recursive(&child);
        }
    }

    fn detach_all(&self) {
        let subscriptions = {
            let mut inner = self.inner.borrow_mut();
            std::mem::take(&mut inner.subscriptions)
        };
        for (node, id) in subscriptions {
            node.remove_listener(id);
        }
    }

    fn handle_node_event(inner: &Rc<RefCell<ModelInner>>, event: &TreeModelEvent) {
        let model = TreeNodeModel { inner: Rc::clone(inner) };
        match event.kind {
            TreeEventKind::Inserted => {
                for child in &event.children {
                    model.attach_recursive(child);
                }
            }
            TreeEventKind::Removed => {
                for child in &event.children {
                    model.detach_recursive(child);
                }
            }
            TreeEventKind::Changed => {}
            TreeEventKind::StructureChanged => {
                model.detach_all();
                let root = inner.borrow().root.clone();
                model.attach_recursive(&root);
            }
        }
        let listeners = inner.borrow().listeners.snapshot();
        for callback in listeners {
            callback(event);
        }
    }
}

impl TreeModel for TreeNodeModel {
    fn root(&self) -> TreeNode {
        self.inner.borrow().root.clone()
    }

    fn child(&self, parent: &TreeNode, index: usize) -> TreeResult<TreeNode> {
        parent.child(index)
    }

    fn child_count(&self, parent: &TreeNode) -> usize {
        parent.child_count()
    }

    fn index_of_child(&self, parent: &TreeNode, child: &TreeNode) -> Option<usize> {
        parent.index_of(child)
    }

    fn is_leaf(&self, node: &TreeNode) -> bool {
        node.is_leaf()
    }

    fn column_count(&self) -> usize {
        self.inner.borrow().column_keys.len()
    }

    fn value_at(&self, node: &TreeNode, column: usize) -> Option<ColumnValue> {
        let inner = self.inner.borrow();
        let key = inner.column_keys.get(column)?;
        node.column_value(key)
    }
}

/// Union of column keys over a pre-order traversal, first-seen order.
fn compile_columns(root: &TreeNode) -> Vec<String> {
    fn collect(node: &TreeNode, keys: &mut Vec<String>) {
        for key in node.column_keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        for child in node.children() {
            collect(&child, keys);
        }
    }
    let mut keys = Vec::new();
    collect(root, &mut keys);
    keys
}
