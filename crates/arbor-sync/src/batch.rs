//! Wire-facing structure batch.
//!
//! A render pass produces a [`StructureBatch`]: an ordered sequence of
//! [`NodeDescriptor`]s for the host framework's serialization layer. The
//! field meanings are fixed here; the exact wire syntax belongs to the
//! transport layer and is out of scope.

use bitflags::bitflags;

use crate::ids::ElementId;

bitflags! {
    /// Per-descriptor state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct NodeFlags: u8 {
        /// The node is expanded.
        const EXPANDED = 1 << 0;
        /// The node is a collapsed leaf.
        const LEAF = 1 << 1;
        /// The node heads this batch fragment (the tree root on a full
        /// render, each changed path on an incremental one).
        const ROOT = 1 << 2;
        /// The synthetic header pseudo-node.
        const HEADER = 1 << 3;
    }
}

/// One node as transmitted to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescriptor {
    /// Element id of the node's primary (column 0) element.
    pub id: ElementId,
    /// Element id of the parent node's primary element, when one exists.
    pub parent_id: Option<ElementId>,
    /// Expansion/leaf/root/header flags.
    pub flags: NodeFlags,
    /// Element ids for the non-primary column cells (columns 1..N-1).
    /// Present only the first time a node is transmitted; cells are sent
    /// once per node identity, not on every sync.
    pub columns: Vec<ElementId>,
}

impl NodeDescriptor {
    /// Whether this descriptor is the synthetic header.
    #[must_use]
    pub fn is_header(&self) -> bool {
        self.flags.contains(NodeFlags::HEADER)
    }

    /// Whether the node is expanded.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.flags.contains(NodeFlags::EXPANDED)
    }

    /// Whether the node was transmitted as a collapsed leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.flags.contains(NodeFlags::LEAF)
    }

    /// Whether the node heads its batch fragment.
    #[must_use]
    pub fn is_fragment_root(&self) -> bool {
        self.flags.contains(NodeFlags::ROOT)
    }
}

/// The outcome of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructureBatch {
    /// Whether this batch retransmits the whole visible tree.
    pub full_render: bool,
    /// Node descriptors, parents always before their children.
    pub nodes: Vec<NodeDescriptor>,
}

impl StructureBatch {
    /// Number of descriptors in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the batch transmits nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The descriptor with the given element id, if present.
    #[must_use]
    pub fn node(&self, id: &ElementId) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|node| node.id == *id)
    }
}
