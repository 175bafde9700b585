#![forbid(unsafe_code)]

//! Labeled hierarchies and their parent index.
//!
//! A hierarchy is supplied as nested [`Node`] values and flattened once into
//! an arena ([`Hierarchy`]) with parent links, child lists, and depth. The
//! engine walks the arena instead of re-traversing the nested tree to find a
//! node's parent.
//!
//! # Example
//!
//! ```
//! use permtree_core::hierarchy::{Hierarchy, Node};
//!
//! let hierarchy = Hierarchy::new(vec![
//!     Node::new("europe", "Europe")
//!         .child(Node::new("germany", "Germany").child(Node::new("berlin", "Berlin")))
//!         .child(Node::new("france", "France")),
//! ])
//! .unwrap();
//!
//! assert_eq!(hierarchy.len(), 4);
//! assert_eq!(hierarchy.parent_id("berlin"), Some("germany"));
//! assert_eq!(hierarchy.depth_of("berlin"), Some(2));
//! ```

use ahash::AHashMap;
use std::fmt;

use crate::filter::{FilteredTree, filter_nodes};

/// A node in a labeled hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Identifier, unique across the whole hierarchy.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Ordered children (empty for leaves).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a leaf node.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Set children from a vec.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<Node>) -> Self {
        self.children = nodes;
        self
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count this node and all of its descendants.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.children
            .iter()
            .fold(1usize, |acc, child| acc.saturating_add(child.total_count()))
    }
}

/// Position of a node inside a [`Hierarchy`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    #[inline]
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Raw arena position.
    #[inline]
    #[must_use]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    label: String,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    depth: usize,
}

/// Errors raised while indexing a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Two nodes share the same id.
    DuplicateId(String),
    /// A node has an empty id.
    EmptyId {
        /// Label of the offending node.
        label: String,
    },
    /// More nodes than the arena can address.
    TooLarge(usize),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate node id: {id}"),
            Self::EmptyId { label } => write!(f, "node '{label}' has an empty id"),
            Self::TooLarge(count) => write!(f, "hierarchy too large: {count} nodes"),
        }
    }
}

impl std::error::Error for HierarchyError {}

/// An indexed, immutable hierarchy.
///
/// Nodes are stored in pre-order. Each entry knows its parent, its children,
/// and its depth (roots are depth 0).
#[derive(Debug, Clone)]
pub struct Hierarchy {
    roots: Vec<Node>,
    entries: Vec<Entry>,
    root_indices: Vec<NodeIndex>,
    by_id: AHashMap<String, NodeIndex>,
}

impl Hierarchy {
    /// Index the given root nodes.
    pub fn new(roots: Vec<Node>) -> Result<Self, HierarchyError> {
        let total = roots
            .iter()
            .fold(0usize, |acc, root| acc.saturating_add(root.total_count()));
        if total > u32::MAX as usize {
            return Err(HierarchyError::TooLarge(total));
        }

        let mut entries = Vec::with_capacity(total);
        let mut by_id = AHashMap::with_capacity(total);
        let mut root_indices = Vec::with_capacity(roots.len());

        // (node, parent, depth); reversed pushes keep pre-order.
        let mut stack: Vec<(&Node, Option<NodeIndex>, usize)> =
            roots.iter().rev().map(|node| (node, None, 0)).collect();
        while let Some((node, parent, depth)) = stack.pop() {
            if node.id.is_empty() {
                return Err(HierarchyError::EmptyId {
                    label: node.label.clone(),
                });
            }
            let index = NodeIndex::new(entries.len());
            if by_id.insert(node.id.clone(), index).is_some() {
                return Err(HierarchyError::DuplicateId(node.id.clone()));
            }
            entries.push(Entry {
                id: node.id.clone(),
                label: node.label.clone(),
                parent,
                children: Vec::with_capacity(node.children.len()),
                depth,
            });
            match parent {
                Some(p) => entries[p.get()].children.push(index),
                None => root_indices.push(index),
            }
            for child in node.children.iter().rev() {
                stack.push((child, Some(index), depth + 1));
            }
        }

        Ok(Self {
            roots,
            entries,
            root_indices,
            by_id,
        })
    }

    /// The nested nodes this hierarchy was built from.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.roots
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the hierarchy has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Look up the arena position of a node id.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// Root node positions, in supplied order.
    #[must_use]
    pub fn roots(&self) -> &[NodeIndex] {
        &self.root_indices
    }

    /// Id of the node at `index`.
    #[must_use]
    pub fn id(&self, index: NodeIndex) -> &str {
        &self.entries[index.get()].id
    }

    /// Label of the node at `index`.
    #[must_use]
    pub fn label(&self, index: NodeIndex) -> &str {
        &self.entries[index.get()].label
    }

    /// Parent of the node at `index` (`None` for roots).
    #[must_use]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.entries[index.get()].parent
    }

    /// Direct children of the node at `index`.
    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.entries[index.get()].children
    }

    /// Depth of the node at `index` (roots are 0).
    #[must_use]
    pub fn depth(&self, index: NodeIndex) -> usize {
        self.entries[index.get()].depth
    }

    /// Parent id of the node with the given id.
    #[must_use]
    pub fn parent_id(&self, id: &str) -> Option<&str> {
        let parent = self.parent(self.index_of(id)?)?;
        Some(self.id(parent))
    }

    /// Depth of the node with the given id.
    #[must_use]
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.index_of(id).map(|index| self.depth(index))
    }

    /// Iterate all node positions in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.entries.len()).map(NodeIndex::new)
    }

    /// Iterate the ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.parent(index),
        }
    }

    /// Collect `index` and all of its descendants in pre-order.
    #[must_use]
    pub fn subtree(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Filter the hierarchy by a case-insensitive label search.
    ///
    /// See [`filter_nodes`].
    #[must_use]
    pub fn filter(&self, term: &str) -> FilteredTree {
        filter_nodes(&self.roots, term)
    }
}

/// Iterator over a node's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<NodeIndex>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::new("tech-corp", "TechCorp Inc.")
                .child(
                    Node::new("engineering", "Engineering")
                        .child(Node::new("platform", "Platform"))
                        .child(Node::new("product-dev", "Product Development")),
                )
                .child(Node::new("hr", "Human Resources")),
            Node::new("other", "Other"),
        ]
    }

    #[test]
    fn indexes_in_pre_order() {
        let h = Hierarchy::new(sample()).unwrap();
        let ids: Vec<&str> = h.iter().map(|i| h.id(i)).collect();
        assert_eq!(
            ids,
            [
                "tech-corp",
                "engineering",
                "platform",
                "product-dev",
                "hr",
                "other"
            ]
        );
        assert_eq!(h.roots().len(), 2);
    }

    #[test]
    fn parent_links_and_depth() {
        let h = Hierarchy::new(sample()).unwrap();
        assert_eq!(h.parent_id("platform"), Some("engineering"));
        assert_eq!(h.parent_id("engineering"), Some("tech-corp"));
        assert_eq!(h.parent_id("tech-corp"), None);
        assert_eq!(h.depth_of("product-dev"), Some(2));
        assert_eq!(h.depth_of("other"), Some(0));
        assert_eq!(h.depth_of("missing"), None);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let h = Hierarchy::new(sample()).unwrap();
        let leaf = h.index_of("platform").unwrap();
        let ids: Vec<&str> = h.ancestors(leaf).map(|i| h.id(i)).collect();
        assert_eq!(ids, ["engineering", "tech-corp"]);
    }

    #[test]
    fn subtree_includes_self_and_descendants() {
        let h = Hierarchy::new(sample()).unwrap();
        let root = h.index_of("tech-corp").unwrap();
        let ids: Vec<&str> = h.subtree(root).into_iter().map(|i| h.id(i)).collect();
        assert_eq!(
            ids,
            ["tech-corp", "engineering", "platform", "product-dev", "hr"]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Hierarchy::new(vec![
            Node::new("a", "A").child(Node::new("b", "B")),
            Node::new("b", "Other B"),
        ])
        .unwrap_err();
        assert_eq!(err, HierarchyError::DuplicateId("b".into()));
    }

    #[test]
    fn empty_ids_are_rejected() {
        let err = Hierarchy::new(vec![Node::new("", "Nameless")]).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::EmptyId {
                label: "Nameless".into()
            }
        );
    }

    #[test]
    fn empty_hierarchy() {
        let h = Hierarchy::new(Vec::new()).unwrap();
        assert!(h.is_empty());
        assert_eq!(h.iter().count(), 0);
    }

    #[test]
    fn node_total_count() {
        assert_eq!(sample()[0].total_count(), 5);
        assert!(Node::new("x", "X").is_leaf());
    }
}
