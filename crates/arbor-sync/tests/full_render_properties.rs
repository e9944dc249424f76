//! Property tests for the full-render traversal: for arbitrary bounded
//! trees and expansion sets, a full render emits each visible path exactly
//! once, parents before children, and marks exactly the expanded-or-leaf
//! visible paths as sent.

use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;

use arbor_model::{TreeModel, TreeNode, TreeNodeModel, TreePath, TreeView};
use arbor_sync::{RenderState, SequentialIdSource, StructureRenderer};

#[derive(Debug, Clone)]
struct Shape {
    children: Vec<Shape>,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = Just(Shape { children: Vec::new() });
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(|children| Shape { children })
    })
}

fn build_tree(shape: &Shape) -> TreeNode {
    let node = TreeNode::new();
    for child_shape in &shape.children {
        node.add_child(&build_tree(child_shape));
    }
    node
}

/// All paths of the tree in pre-order, regardless of visibility.
fn all_paths(path: TreePath, out: &mut Vec<TreePath>) {
    out.push(path.clone());
    for child in path.last().children() {
        all_paths(path.by_adding_child(child), out);
    }
}

/// The currently visible paths, in visual row order.
fn visible_paths(view: &TreeView, path: TreePath, out: &mut Vec<TreePath>) {
    out.push(path.clone());
    if view.is_expanded(&path) {
        for child in path.last().children() {
            visible_paths(view, path.by_adding_child(child), out);
        }
    }
}

proptest! {
    #[test]
    fn full_render_covers_the_visible_tree_exactly(
        shape in shape_strategy(),
        expansion_bits in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let root = build_tree(&shape);
        let model = TreeNodeModel::new(root.clone());
        let view = TreeView::new(Rc::new(model.clone()));

        // Expand an arbitrary subset of paths, hidden ones included.
        let mut paths = Vec::new();
        all_paths(TreePath::for_root(root.clone()), &mut paths);
        for (index, path) in paths.iter().enumerate() {
            if expansion_bits.get(index).copied().unwrap_or(false) {
                view.set_expanded(path, true);
            }
        }

        let state = RenderState::new(&view);
        let mut ids = SequentialIdSource::new();
        let batch = StructureRenderer::new(&view, &state, &mut ids).render();

        let mut visible = Vec::new();
        visible_paths(&view, TreePath::for_root(root), &mut visible);

        // Every visible path exactly once, nothing else.
        prop_assert!(batch.full_render);
        prop_assert_eq!(batch.len(), visible.len());
        prop_assert_eq!(batch.len(), view.visible_row_count());
        let unique: HashSet<_> = batch.nodes.iter().map(|node| node.id.clone()).collect();
        prop_assert_eq!(unique.len(), batch.len());

        // Parents are always emitted before their children.
        let mut seen = HashSet::new();
        for node in &batch.nodes {
            if let Some(parent_id) = &node.parent_id {
                prop_assert!(seen.contains(parent_id));
            }
            seen.insert(node.id.clone());
        }

        // Sent exactly when expanded or leaf.
        for path in &visible {
            let expected = view.is_expanded(path) || model.is_leaf(path.last());
            prop_assert_eq!(state.is_sent(path), expected);
        }

        // A second pass with nothing changed transmits nothing.
        let mut ids_again = SequentialIdSource::new();
        let quiet = StructureRenderer::new(&view, &state, &mut ids_again).render();
        prop_assert!(quiet.is_empty());
    }
}
