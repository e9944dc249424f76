//! Client-assigned element identifiers.
//!
//! The host framework maps every server-side element the client can see to
//! an opaque identifier string, stable for as long as that element stays
//! visible. Here an element is a `(path, column)` cell — or the synthetic
//! header pseudo-element, addressed with no path.

use std::collections::HashMap;
use std::fmt;

use arbor_model::TreePath;

/// Opaque client-side identifier for a rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Source of client render ids for tree elements.
///
/// `path == None` addresses the header pseudo-element. Ids are assigned on
/// first use and must stay stable for repeated lookups of the same element.
pub trait RenderIdSource {
    /// The id for the element at `(path, column)`, assigning one if needed.
    fn render_id(&mut self, path: Option<&TreePath>, column: usize) -> ElementId;

    /// The already-assigned id for `(path, column)`, if any.
    fn assigned_id(&self, path: Option<&TreePath>, column: usize) -> Option<ElementId>;
}

/// Default [`RenderIdSource`] handing out sequential prefixed ids.
#[derive(Debug)]
pub struct SequentialIdSource {
    assigned: HashMap<(Option<TreePath>, usize), ElementId>,
    next: u64,
    prefix: String,
}

impl SequentialIdSource {
    /// A source producing ids `n0`, `n1`, ...
    #[must_use]
    pub fn new() -> Self {
        Self::with_prefix("n")
    }

    /// A source producing ids with the given prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { assigned: HashMap::new(), next: 0, prefix: prefix.into() }
    }

    /// Number of ids assigned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Whether no ids have been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderIdSource for SequentialIdSource {
    fn render_id(&mut self, path: Option<&TreePath>, column: usize) -> ElementId {
        let key = (path.cloned(), column);
        if let Some(id) = self.assigned.get(&key) {
            return id.clone();
        }
        let id = ElementId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        self.assigned.insert(key, id.clone());
        id
    }

    fn assigned_id(&self, path: Option<&TreePath>, column: usize) -> Option<ElementId> {
        self.assigned.get(&(path.cloned(), column)).cloned()
    }
}
