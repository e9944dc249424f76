//! Differential structure renderer.
//!
//! Walks the visible portion of a tree and emits only the node descriptors
//! the viewer does not already have, consulting the [`RenderState`] for what
//! was previously sent and what changed since.
//!
//! # Algorithm
//!
//! On a full render: the header pseudo-node (when the view shows headers),
//! then the root, recursively. Each emitted node that is expanded recurses
//! into its children, extending the path one component at a time; a node
//! that ends up expanded-or-leaf is marked sent. On an incremental render:
//! only the changed paths are re-rendered, in visible row order, each as the
//! head of its own fragment.
//!
//! One rule carries the bandwidth savings: a path that is sent and not
//! changed is skipped entirely — not re-emitted, not re-walked into. Column
//! cell ids ride along only the first time a node is transmitted.
//!
//! A path in the changed set whose node has since been removed from the
//! model is stale, not an error; it is skipped silently.

use std::collections::HashSet;
use std::rc::Rc;

use arbor_model::{TreeModel, TreeNode, TreePath, TreeView};
use tracing::{debug_span, trace};

use crate::batch::{NodeDescriptor, NodeFlags, StructureBatch};
use crate::ids::RenderIdSource;
use crate::render_state::RenderState;

/// Single-pass renderer over one view for one viewer.
pub struct StructureRenderer<'a> {
    view: &'a TreeView,
    model: Rc<dyn TreeModel>,
    state: &'a RenderState,
    ids: &'a mut dyn RenderIdSource,
    /// Paths already emitted in this pass (`None` is the header), guarding
    /// against a node reached through two routes in one pass.
    rendered: HashSet<Option<TreePath>>,
    nodes: Vec<NodeDescriptor>,
}

impl<'a> StructureRenderer<'a> {
    /// Prepare a render pass.
    #[must_use]
    pub fn new(view: &'a TreeView, state: &'a RenderState, ids: &'a mut dyn RenderIdSource) -> Self {
        let model = view.model();
        Self { view, model, state, ids, rendered: HashSet::new(), nodes: Vec::new() }
    }

    /// Run the pass and produce the batch.
    ///
    /// A full render clears the state's full-render flag; clearing the
    /// changed set afterwards is the caller's responsibility (the peer does
    /// it once the batch is handed to the wire).
    pub fn render(mut self) -> StructureBatch {
        let span = debug_span!("tree_structure_render", full = self.state.is_full_render());
        let _guard = span.enter();

        let mut full_render = false;
        if self.state.is_full_render() {
            if self.view.header_visible() {
                self.render_node(None, None, false);
            }
            let root = self.model.root();
            self.render_node(Some(root.clone()), Some(TreePath::for_root(root)), true);
            self.state.set_full_render(false);
            full_render = true;
        } else if self.state.has_changed_paths() {
            for path in self.state.sorted_changed_paths(self.model.as_ref()) {
                if !self.path_is_live(&path) {
                    trace!("stale changed path skipped");
                    continue;
                }
                self.render_node(Some(path.last().clone()), Some(path), true);
            }
        }

        trace!(descriptors = self.nodes.len(), "structure batch assembled");
        StructureBatch { full_render, nodes: self.nodes }
    }

    fn render_node(&mut self, value: Option<TreeNode>, path: Option<TreePath>, root: bool) {
        if self.rendered.contains(&path) {
            return;
        }
        if let Some(path) = &path {
            if self.state.is_sent(path) && !self.state.is_path_changed(path) {
                return;
            }
        }
        self.rendered.insert(path.clone());

        let descriptor = self.describe(path.as_ref(), value.as_ref(), root);
        self.nodes.push(descriptor);

        let (Some(value), Some(path)) = (value, path) else {
            return;
        };
        let expanded = self.view.is_expanded(&path);
        let leaf = self.model.is_leaf(&value);
        if expanded {
            for index in 0..self.model.child_count(&value) {
                let Ok(child) = self.model.child(&value, index) else {
                    continue;
                };
                self.render_node(Some(child.clone()), Some(path.by_adding_child(child)), false);
            }
        }
        if expanded || leaf {
            self.state.add_sent_path(path);
        }
    }

    fn describe(
        &mut self,
        path: Option<&TreePath>,
        value: Option<&TreeNode>,
        root: bool,
    ) -> NodeDescriptor {
        let id = self.ids.render_id(path, 0);
        let mut parent_id = None;
        let mut flags = NodeFlags::empty();
        match path {
            None => flags |= NodeFlags::HEADER,
            Some(path) => {
                if let Some(parent) = path.parent_path() {
                    parent_id = Some(self.ids.render_id(Some(&parent), 0));
                }
                if self.view.is_expanded(path) {
                    flags |= NodeFlags::EXPANDED;
                } else if value.is_some_and(|node| self.model.is_leaf(node)) {
                    flags |= NodeFlags::LEAF;
                }
                if root {
                    flags |= NodeFlags::ROOT;
                }
            }
        }

        // Column cells are sent once per node identity; the header carries
        // its cells on the (single) pass that emits it.
        let needs_columns = path.is_none_or(|path| !self.state.is_sent(path));
        let mut columns = Vec::new();
        if needs_columns {
            for column in 1..self.model.column_count() {
                columns.push(self.ids.render_id(path, column));
            }
        }
        NodeDescriptor { id, parent_id, flags, columns }
    }

    /// Whether `path` still resolves through the model, component by
    /// component, starting at the current root.
    fn path_is_live(&self, path: &TreePath) -> bool {
        let components = path.components();
        let Some((first, rest)) = components.split_first() else {
            return false;
        };
        if *first != self.model.root() {
            return false;
        }
        let mut parent = first.clone();
        for component in rest {
            if self.model.index_of_child(&parent, component).is_none() {
                return false;
            }
            parent = component.clone();
        }
        true
    }
}
