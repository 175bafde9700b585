#![forbid(unsafe_code)]

//! View model for the permission tree.
//!
//! [`TreeViewState`] holds what the renderer needs beyond the permission
//! state itself: which nodes are expanded and the current search term.
//! [`TreeViewState::rows`] flattens the (filtered) hierarchy into the rows a
//! renderer draws, top to bottom, each carrying its permissions and the
//! label ranges to highlight.
//!
//! # Example
//!
//! ```
//! use permtree_core::{Hierarchy, Node, PermissionState};
//! use permtree_widgets::tree_view::TreeViewState;
//!
//! let hierarchy = Hierarchy::new(vec![
//!     Node::new("europe", "Europe").child(Node::new("paris", "Paris")),
//! ])
//! .unwrap();
//! let mut view = TreeViewState::new();
//!
//! // Collapsed by default: only the root is visible.
//! assert_eq!(view.rows(&hierarchy, &PermissionState::new()).len(), 1);
//!
//! view.set_search(&hierarchy, "par");
//! let rows = view.rows(&hierarchy, &PermissionState::new());
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].highlights, vec![0..3]);
//! ```

use std::collections::BTreeSet;
use std::ops::Range;

use permtree_core::{Hierarchy, Node, NodePermissions, PermissionState, match_len_ignore_case};

/// One visible row of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: String,
    pub label: String,
    /// Nesting level; roots are 0.
    pub depth: usize,
    /// Whether the row shows an expand/collapse affordance.
    pub has_children: bool,
    pub expanded: bool,
    pub permissions: NodePermissions,
    /// Byte ranges of `label` matching the search term.
    pub highlights: Vec<Range<usize>>,
}

/// Expansion and search state for a tree renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeViewState {
    expanded: BTreeSet<String>,
    search: String,
}

impl TreeViewState {
    /// Everything collapsed, no search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear search and expansion, e.g. when the hierarchy or subject changes.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.search.clear();
    }

    /// Current search term as typed.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Ids currently expanded.
    #[must_use]
    pub fn expanded(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: impl Into<String>) {
        self.expanded.insert(id.into());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Flip the expansion of `id`. Returns the new expansion state.
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        let expanded = if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_owned());
            true
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "tree_view.toggle",
            node = id,
            action = if expanded { "expand" } else { "collapse" }
        );
        expanded
    }

    /// Set the search term.
    ///
    /// A non-blank term replaces the expansion set with the ancestors of
    /// every match. Clearing the term keeps whatever is expanded.
    pub fn set_search(&mut self, hierarchy: &Hierarchy, term: impl Into<String>) {
        self.search = term.into();
        if !self.search.trim().is_empty() {
            self.expanded = hierarchy.filter(&self.search).expanded;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "tree_view.search",
            term = self.search.as_str(),
            expanded = self.expanded.len()
        );
    }

    /// Visible rows in render order.
    ///
    /// Children appear only under expanded rows. With a search term, only
    /// matches and their ancestors are listed.
    #[must_use]
    pub fn rows(&self, hierarchy: &Hierarchy, state: &PermissionState) -> Vec<TreeRow> {
        let filtered = hierarchy.filter(&self.search);
        let mut rows = Vec::new();
        for node in &filtered.nodes {
            self.push_rows(node, 0, state, &mut rows);
        }
        rows
    }

    fn push_rows(&self, node: &Node, depth: usize, state: &PermissionState, out: &mut Vec<TreeRow>) {
        let expanded = self.is_expanded(&node.id);
        out.push(TreeRow {
            id: node.id.clone(),
            label: node.label.clone(),
            depth,
            has_children: !node.children.is_empty(),
            expanded,
            permissions: state.get(&node.id),
            highlights: highlight_ranges(&node.label, &self.search),
        });
        if expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, state, out);
            }
        }
    }
}

/// Byte ranges of non-overlapping case-insensitive matches of `term` in
/// `label`, left to right. A blank term highlights nothing.
#[must_use]
pub fn highlight_ranges(label: &str, term: &str) -> Vec<Range<usize>> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    let mut ranges = Vec::new();
    let mut resume = 0usize;
    for (start, _) in label.char_indices() {
        if start < resume {
            continue;
        }
        if let Some(len) = match_len_ignore_case(&label[start..], &needle) {
            ranges.push(start..start + len);
            resume = start + len;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use permtree_core::{FlagKind, PermissionEngine, PermissionFlag};
    use std::sync::Arc;

    fn locations() -> Hierarchy {
        Hierarchy::new(vec![
            Node::new("north-america", "North America").child(
                Node::new("usa", "USA")
                    .child(Node::new("new-york", "New York").child(Node::new("new-york-city", "New York City")))
                    .child(Node::new("california", "California")),
            ),
            Node::new("europe", "Europe").child(Node::new("france", "France")),
        ])
        .unwrap()
    }

    fn ids(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn collapsed_tree_shows_roots_only() {
        let view = TreeViewState::new();
        let rows = view.rows(&locations(), &PermissionState::new());
        assert_eq!(ids(&rows), ["north-america", "europe"]);
        assert!(rows.iter().all(|r| r.has_children && !r.expanded));
    }

    #[test]
    fn expanding_reveals_children_with_depth() {
        let mut view = TreeViewState::new();
        assert!(view.toggle_expanded("north-america"));
        view.expand("usa");
        let rows = view.rows(&locations(), &PermissionState::new());
        assert_eq!(
            ids(&rows),
            ["north-america", "usa", "new-york", "california", "europe"]
        );
        assert_eq!(rows[2].depth, 2);
        assert!(rows[2].has_children);
        assert!(!rows[3].has_children);
    }

    #[test]
    fn toggle_twice_collapses() {
        let mut view = TreeViewState::new();
        assert!(view.toggle_expanded("usa"));
        assert!(!view.toggle_expanded("usa"));
        assert!(!view.is_expanded("usa"));
    }

    #[test]
    fn search_expands_ancestors_and_filters() {
        let mut view = TreeViewState::new();
        let hierarchy = locations();
        view.set_search(&hierarchy, "york");
        let rows = view.rows(&hierarchy, &PermissionState::new());
        assert_eq!(
            ids(&rows),
            ["north-america", "usa", "new-york", "new-york-city"]
        );
        assert_eq!(rows[2].highlights, vec![4..8]);
        assert_eq!(rows[3].highlights, vec![4..8]);
        assert!(rows[0].highlights.is_empty());
    }

    #[test]
    fn clearing_search_keeps_expansion() {
        let mut view = TreeViewState::new();
        let hierarchy = locations();
        view.set_search(&hierarchy, "fra");
        assert!(view.is_expanded("europe"));
        view.set_search(&hierarchy, "");
        assert!(view.is_expanded("europe"));
        let rows = view.rows(&hierarchy, &PermissionState::new());
        assert_eq!(ids(&rows), ["north-america", "europe", "france"]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut view = TreeViewState::new();
        view.set_search(&locations(), "paris");
        view.expand("usa");
        view.reset();
        assert_eq!(view, TreeViewState::new());
    }

    #[test]
    fn rows_carry_engine_permissions() {
        let hierarchy = Arc::new(locations());
        let mut engine = PermissionEngine::new(Arc::clone(&hierarchy));
        engine.set_flag("california", FlagKind::Write, true).unwrap();

        let mut view = TreeViewState::new();
        view.expand("north-america");
        let rows = view.rows(&hierarchy, engine.state());
        assert_eq!(rows[0].permissions.write, PermissionFlag::MIXED);
        assert_eq!(rows[1].permissions.read, PermissionFlag::MIXED);
        assert_eq!(rows[2].permissions.read, PermissionFlag::UNCHECKED);
    }

    #[test]
    fn highlight_ranges_are_case_insensitive_and_disjoint() {
        assert_eq!(highlight_ranges("New York", "NEW"), vec![0..3]);
        assert_eq!(highlight_ranges("aaaa", "aa"), vec![0..2, 2..4]);
        assert_eq!(highlight_ranges("Banana", "an"), vec![1..3, 3..5]);
        assert!(highlight_ranges("Paris", "  ").is_empty());
        assert!(highlight_ranges("Paris", "xyz").is_empty());
    }

    #[test]
    fn highlight_ranges_respect_char_boundaries() {
        let label = "Zürich Zug";
        let ranges = highlight_ranges(label, "zü");
        assert_eq!(ranges, vec![0..3]);
        assert_eq!(&label[ranges[0].clone()], "Zü");
        assert_eq!(highlight_ranges(label, "z"), vec![0..1, 8..9]);
    }

    #[test]
    fn matched_rows_always_carry_a_highlight() {
        let hierarchy = Hierarchy::new(vec![
            Node::new("tr", "Turkey").child(Node::new("ist", "İstanbul")),
        ])
        .unwrap();
        let state = PermissionState::new();
        let mut view = TreeViewState::new();

        view.set_search(&hierarchy, "i");
        assert!(view.rows(&hierarchy, &state).is_empty());

        view.set_search(&hierarchy, "İst");
        let rows = view.rows(&hierarchy, &state);
        assert_eq!(ids(&rows), ["tr", "ist"]);
        assert_eq!(rows[1].highlights, vec![0.."İst".len()]);
    }
}
