//! Root-to-node paths with structural sharing.
//!
//! A [`TreePath`] is an immutable, non-empty sequence of node handles from
//! the tree root down to a target node. Extending a path shares the parent
//! path rather than copying it, so building paths during a recursive render
//! walk is cheap.
//!
//! Paths are snapshots: they do not observe later tree mutations and can go
//! stale. Equality is component-wise node identity; the hash is the last
//! component's hash, so a path and its extensions distribute independently.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{TreeError, TreeResult};
use crate::node::TreeNode;

/// An immutable root-to-node route.
#[derive(Clone)]
pub struct TreePath {
    /// Path to the parent, `None` when `last` is the root.
    parent: Option<Rc<TreePath>>,
    /// The target node.
    last: TreeNode,
}

impl TreePath {
    /// A single-component path, usually for the tree root.
    #[must_use]
    pub fn for_root(node: TreeNode) -> Self {
        Self { parent: None, last: node }
    }

    /// Build a path from an ordered component slice (root first).
    ///
    /// Fails with [`TreeError::EmptyPath`] on an empty slice.
    pub fn new(components: &[TreeNode]) -> TreeResult<Self> {
        let (first, rest) = components.split_first().ok_or(TreeError::EmptyPath)?;
        let mut path = Self::for_root(first.clone());
        for node in rest {
            path = path.by_adding_child(node.clone());
        }
        Ok(path)
    }

    /// A new path extending this one by `child`.
    #[must_use]
    pub fn by_adding_child(&self, child: TreeNode) -> Self {
        Self { parent: Some(Rc::new(self.clone())), last: child }
    }

    /// The path to this path's parent, `None` for a root path.
    #[must_use]
    pub fn parent_path(&self) -> Option<TreePath> {
        self.parent.as_deref().cloned()
    }

    /// The target node.
    #[must_use]
    pub fn last(&self) -> &TreeNode {
        &self.last
    }

    /// Number of components (always >= 1).
    #[must_use]
    pub fn count(&self) -> usize {
        let mut count = 1;
        let mut current = self.parent.as_deref();
        while let Some(path) = current {
            count += 1;
            current = path.parent.as_deref();
        }
        count
    }

    /// The component at `index`, where 0 is the root.
    pub fn component(&self, index: usize) -> TreeResult<TreeNode> {
        let count = self.count();
        if index >= count {
            return Err(TreeError::IndexOutOfBounds { index, len: count });
        }
        let mut current = self;
        for _ in 0..count - 1 - index {
            // Invariant: count positions above still have parents.
            match current.parent.as_deref() {
                Some(parent) => current = parent,
                None => return Err(TreeError::IndexOutOfBounds { index, len: count }),
            }
        }
        Ok(current.last.clone())
    }

    /// All components in order, root first.
    #[must_use]
    pub fn components(&self) -> Vec<TreeNode> {
        let mut out = Vec::with_capacity(self.count());
        let mut current = Some(self);
        while let Some(path) = current {
            out.push(path.last.clone());
            current = path.parent.as_deref();
        }
        out.reverse();
        out
    }

    /// Whether `ancestor` is a prefix of this path (every path is its own
    /// ancestor).
    #[must_use]
    pub fn starts_with(&self, ancestor: &TreePath) -> bool {
        let my_count = self.count();
        let ancestor_count = ancestor.count();
        if ancestor_count > my_count {
            return false;
        }
        let mut current = self.clone();
        for _ in 0..my_count - ancestor_count {
            match current.parent_path() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        current == *ancestor
    }
}

impl PartialEq for TreePath {
    fn eq(&self, other: &Self) -> bool {
        if self.count() != other.count() {
            return false;
        }
        let mut a = Some(self);
        let mut b = Some(other);
        while let (Some(x), Some(y)) = (a, b) {
            if x.last != y.last {
                return false;
            }
            a = x.parent.as_deref();
            b = y.parent.as_deref();
        }
        true
    }
}

impl Eq for TreePath {}

impl Hash for TreePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.last.hash(state);
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.components()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_component_slice_is_rejected() {
        assert_eq!(TreePath::new(&[]), Err(TreeError::EmptyPath));
    }

    #[test]
    fn count_and_component_access() {
        let a = TreeNode::new();
        let b = TreeNode::new();
        let c = TreeNode::new();
        let path = TreePath::new(&[a.clone(), b.clone(), c.clone()]).unwrap();

        assert_eq!(path.count(), 3);
        assert_eq!(path.component(0).unwrap(), a);
        assert_eq!(path.component(1).unwrap(), b);
        assert_eq!(path.component(2).unwrap(), c);
        assert_eq!(
            path.component(3),
            Err(TreeError::IndexOutOfBounds { index: 3, len: 3 })
        );
        assert_eq!(path.last(), &c);
    }

    #[test]
    fn parent_path_is_structurally_shared_and_valid() {
        let a = TreeNode::new();
        let b = TreeNode::new();
        let path = TreePath::for_root(a.clone()).by_adding_child(b);

        let parent = path.parent_path().unwrap();
        assert_eq!(parent.count(), 1);
        assert_eq!(parent.last(), &a);
        assert!(parent.parent_path().is_none());
    }

    #[test]
    fn equality_is_componentwise_identity() {
        let a = TreeNode::new();
        let b = TreeNode::new();

        let one = TreePath::new(&[a.clone(), b.clone()]).unwrap();
        let two = TreePath::for_root(a.clone()).by_adding_child(b.clone());
        assert_eq!(one, two);

        // Same shape, different nodes: not equal.
        let other = TreePath::new(&[a.clone(), TreeNode::new()]).unwrap();
        assert_ne!(one, other);

        // Different lengths: not equal.
        assert_ne!(one, TreePath::for_root(a));
    }

    #[test]
    fn starts_with_prefix_semantics() {
        let a = TreeNode::new();
        let b = TreeNode::new();
        let c = TreeNode::new();
        let deep = TreePath::new(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let mid = TreePath::new(&[a.clone(), b.clone()]).unwrap();
        let root = TreePath::for_root(a.clone());

        assert!(deep.starts_with(&deep));
        assert!(deep.starts_with(&mid));
        assert!(deep.starts_with(&root));
        assert!(!mid.starts_with(&deep));
        assert!(!deep.starts_with(&TreePath::for_root(b)));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn construction_round_trips_components(len in 1usize..8, prefix_seed in 0usize..8) {
            let nodes: Vec<TreeNode> = (0..len).map(|_| TreeNode::new()).collect();
            let path = TreePath::new(&nodes).unwrap();

            prop_assert_eq!(path.count(), len);
            prop_assert_eq!(path.components(), nodes.clone());
            prop_assert_eq!(path.last(), &nodes[len - 1]);

            // Every prefix is itself a valid, structurally shared path.
            let prefix_len = 1 + prefix_seed % len;
            let prefix = TreePath::new(&nodes[..prefix_len]).unwrap();
            prop_assert!(path.starts_with(&prefix));
            prop_assert_eq!(prefix.count(), prefix_len);

            match path.parent_path() {
                Some(parent) => prop_assert_eq!(parent.components(), nodes[..len - 1].to_vec()),
                None => prop_assert_eq!(len, 1),
            }
        }
    }
}
