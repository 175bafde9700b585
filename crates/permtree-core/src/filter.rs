#![forbid(unsafe_code)]

//! Case-insensitive label filtering for hierarchies.

use std::collections::BTreeSet;

use crate::hierarchy::Node;

/// Result of [`filter_nodes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredTree {
    /// Kept nodes, original order, with only kept children.
    pub nodes: Vec<Node>,
    /// Ids of kept nodes that have kept children and should be shown expanded.
    pub expanded: BTreeSet<String>,
}

impl FilteredTree {
    /// Whether no node matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Allocation-free case-insensitive containment check.
///
/// `needle_lower` must already be lowercase.
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle_lower.is_ascii() {
        let haystack = haystack.as_bytes();
        let needle = needle_lower.as_bytes();
        if needle.len() > haystack.len() {
            return false;
        }
        return haystack
            .windows(needle.len())
            .any(|window| window.iter().zip(needle).all(|(h, n)| h.to_ascii_lowercase() == *n));
    }
    haystack
        .char_indices()
        .any(|(start, _)| match_len_ignore_case(&haystack[start..], needle_lower).is_some())
}

/// Byte length of the prefix of `haystack` matching `needle_lower`, if any.
///
/// Characters are folded one at a time, so a label character whose lowercase
/// form is longer than one character only matches that whole form. Filtering
/// and highlighting both go through here and always agree.
#[must_use]
pub fn match_len_ignore_case(haystack: &str, needle_lower: &str) -> Option<usize> {
    if needle_lower.is_empty() {
        return None;
    }
    let mut needle = needle_lower.chars().peekable();
    let mut chars = haystack.char_indices();
    while needle.peek().is_some() {
        let (_, actual) = chars.next()?;
        for folded in actual.to_lowercase() {
            if needle.next() != Some(folded) {
                return None;
            }
        }
    }
    Some(chars.next().map_or(haystack.len(), |(offset, _)| offset))
}

/// Filter nodes by a case-insensitive search term.
///
/// A node is kept when its label contains the term or when any descendant is
/// kept; a kept node lists only its kept children. Every kept node with kept
/// children lands in [`FilteredTree::expanded`]. A blank term returns the
/// input unchanged with nothing force-expanded.
#[must_use]
pub fn filter_nodes(nodes: &[Node], term: &str) -> FilteredTree {
    let term = term.trim();
    if term.is_empty() {
        return FilteredTree {
            nodes: nodes.to_vec(),
            expanded: BTreeSet::new(),
        };
    }
    let term_lower = term.to_lowercase();
    let mut expanded = BTreeSet::new();
    let nodes = nodes
        .iter()
        .filter_map(|node| filter_node(node, &term_lower, &mut expanded))
        .collect();
    FilteredTree { nodes, expanded }
}

fn filter_node(node: &Node, term_lower: &str, expanded: &mut BTreeSet<String>) -> Option<Node> {
    let children: Vec<Node> = node
        .children
        .iter()
        .filter_map(|child| filter_node(child, term_lower, expanded))
        .collect();

    let label_matches = contains_ignore_case(&node.label, term_lower);
    if !label_matches && children.is_empty() {
        return None;
    }
    if !children.is_empty() {
        expanded.insert(node.id.clone());
    }
    Some(Node {
        id: node.id.clone(),
        label: node.label.clone(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> Vec<Node> {
        vec![
            Node::new("tech-corp", "TechCorp Inc.")
                .child(
                    Node::new("engineering", "Engineering")
                        .child(Node::new("platform", "Platform"))
                        .child(Node::new("product-dev", "Product Development")),
                )
                .child(
                    Node::new("sales", "Sales")
                        .child(Node::new("enterprise", "Enterprise"))
                        .child(Node::new("smb", "SMB")),
                )
                .child(Node::new("hr", "Human Resources")),
        ]
    }

    fn ids(nodes: &[Node], out: &mut Vec<String>) {
        for node in nodes {
            out.push(node.id.clone());
            ids(&node.children, out);
        }
    }

    #[test]
    fn blank_term_keeps_everything() {
        let filtered = filter_nodes(&org(), "   ");
        assert_eq!(filtered.nodes, org());
        assert!(filtered.expanded.is_empty());
    }

    #[test]
    fn keeps_ancestors_of_matches() {
        let filtered = filter_nodes(&org(), "plat");
        let mut kept = Vec::new();
        ids(&filtered.nodes, &mut kept);
        assert_eq!(kept, ["tech-corp", "engineering", "platform"]);
        assert_eq!(
            filtered.expanded.iter().map(String::as_str).collect::<Vec<_>>(),
            ["engineering", "tech-corp"]
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        let filtered = filter_nodes(&org(), "SMB");
        let mut kept = Vec::new();
        ids(&filtered.nodes, &mut kept);
        assert_eq!(kept, ["tech-corp", "sales", "smb"]);

        let filtered = filter_nodes(&org(), "smb");
        let mut lower = Vec::new();
        ids(&filtered.nodes, &mut lower);
        assert_eq!(kept, lower);
    }

    #[test]
    fn matching_parent_drops_non_matching_children() {
        let filtered = filter_nodes(&org(), "sales");
        let mut kept = Vec::new();
        ids(&filtered.nodes, &mut kept);
        assert_eq!(kept, ["tech-corp", "sales"]);
        assert!(!filtered.expanded.contains("sales"));
        assert!(filtered.expanded.contains("tech-corp"));
    }

    #[test]
    fn matching_parent_with_matching_child_is_expanded() {
        let nodes = vec![
            Node::new("p", "Project").child(Node::new("pp", "Project Phoenix")),
        ];
        let filtered = filter_nodes(&nodes, "project");
        assert!(filtered.expanded.contains("p"));
        assert_eq!(filtered.nodes[0].children.len(), 1);
    }

    #[test]
    fn no_match_is_empty() {
        let filtered = filter_nodes(&org(), "zzz");
        assert!(filtered.is_empty());
        assert!(filtered.expanded.is_empty());
    }

    #[test]
    fn contains_ignore_case_paths() {
        assert!(contains_ignore_case("Product Development", "dev"));
        assert!(!contains_ignore_case("HR", "human"));
        assert!(contains_ignore_case("Zürich", "zü"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("ab", "abc"));
    }

    #[test]
    fn expanding_lowercase_folds_whole_character() {
        assert_eq!(match_len_ignore_case("İstanbul", "i"), None);
        assert_eq!(match_len_ignore_case("İstanbul", &"İs".to_lowercase()), Some("İs".len()));
        assert!(!contains_ignore_case("İstanbul", "i"));
        assert!(contains_ignore_case("İstanbul", "stan"));
        let nodes = vec![Node::new("ist", "İstanbul")];
        assert!(filter_nodes(&nodes, "i").is_empty());
        assert_eq!(filter_nodes(&nodes, "İST").nodes.len(), 1);
    }
}
