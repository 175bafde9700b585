#![forbid(unsafe_code)]

//! Tri-state permission propagation over a [`Hierarchy`].
//!
//! The engine owns a [`PermissionState`] for one hierarchy and updates it
//! through [`PermissionEngine::set_flag`]:
//!
//! 1. **Downward**: the node and every descendant get the new determinate
//!    value. Write implies read (`write = true` forces `read = true`) and no
//!    read implies no write (`read = false` forces `write = false`).
//! 2. **Upward**: each ancestor, nearest first, recomputes the changed flag
//!    from its direct children, then re-applies the cross-flag rule.
//!
//! Updates are computed on a copy and swapped in on success, so callers never
//! observe a half-propagated state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use permtree_core::engine::PermissionEngine;
//! use permtree_core::flag::{FlagKind, PermissionFlag};
//! use permtree_core::hierarchy::{Hierarchy, Node};
//!
//! let hierarchy = Hierarchy::new(vec![
//!     Node::new("a", "A")
//!         .child(Node::new("b", "B"))
//!         .child(Node::new("c", "C")),
//! ])
//! .unwrap();
//! let mut engine = PermissionEngine::new(Arc::new(hierarchy));
//!
//! engine.set_flag("b", FlagKind::Write, true).unwrap();
//! assert_eq!(engine.get("b").read, PermissionFlag::CHECKED);
//! assert_eq!(engine.get("a").write, PermissionFlag::MIXED);
//! ```

use std::fmt;
use std::sync::Arc;

use web_time::Instant;

use crate::flag::{FlagKind, NodePermissions, PermissionFlag};
use crate::hierarchy::{Hierarchy, NodeIndex};
use crate::state::{PermissionSnapshot, PermissionState};

/// Errors reported by [`PermissionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The node id is not part of the engine's hierarchy.
    UnknownNode(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node: {id}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Summary of a completed [`PermissionEngine::set_flag`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Propagation {
    /// The node the flag was set on.
    pub node: String,
    pub kind: FlagKind,
    pub value: bool,
    /// Descendants overwritten by the downward pass (the node excluded).
    pub descendants_updated: usize,
    /// Ancestors recomputed by the upward pass. Always the node's depth.
    pub ancestors_updated: usize,
}

/// A node that breaks one of the state invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `write` is checked while `read` is not.
    WriteWithoutRead { node: String },
    /// A leaf carries an indeterminate flag.
    IndeterminateLeaf { node: String, kind: FlagKind },
    /// A parent flag disagrees with the aggregate of its children.
    Aggregation {
        node: String,
        kind: FlagKind,
        expected: PermissionFlag,
        actual: PermissionFlag,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteWithoutRead { node } => {
                write!(f, "{node}: write is checked but read is not")
            }
            Self::IndeterminateLeaf { node, kind } => {
                write!(f, "{node}: leaf {kind} flag is indeterminate")
            }
            Self::Aggregation {
                node,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{node}: {kind} is {actual:?}, children aggregate to {expected:?}"
            ),
        }
    }
}

/// Permission state for one hierarchy, plus the propagation rules.
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    hierarchy: Arc<Hierarchy>,
    state: PermissionState,
}

impl PermissionEngine {
    /// Create an engine with every node unchecked.
    #[must_use]
    pub fn new(hierarchy: Arc<Hierarchy>) -> Self {
        Self {
            hierarchy,
            state: PermissionState::new(),
        }
    }

    /// Start from an existing tri-state map.
    #[must_use]
    pub fn with_state(mut self, state: PermissionState) -> Self {
        self.state = state;
        self
    }

    /// The hierarchy being edited.
    #[must_use]
    pub fn hierarchy(&self) -> &Arc<Hierarchy> {
        &self.hierarchy
    }

    /// Current permission state.
    #[must_use]
    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    /// Consume the engine, returning its state.
    #[must_use]
    pub fn into_state(self) -> PermissionState {
        self.state
    }

    /// Permissions of `id`, unchecked when absent.
    #[must_use]
    pub fn get(&self, id: &str) -> NodePermissions {
        self.state.get(id)
    }

    /// Switch to another hierarchy.
    ///
    /// The parent index belongs to the hierarchy, so a different hierarchy
    /// also discards the current state. Passing the same `Arc` is a no-op.
    pub fn set_hierarchy(&mut self, hierarchy: Arc<Hierarchy>) {
        if Arc::ptr_eq(&self.hierarchy, &hierarchy) {
            return;
        }
        self.hierarchy = hierarchy;
        self.state = PermissionState::new();
    }

    /// Replace the state with a boolean snapshot. No propagation is run.
    ///
    /// Entries for ids outside the hierarchy are kept; they never affect
    /// known nodes.
    pub fn load_initial(&mut self, snapshot: &PermissionSnapshot) {
        let unknown = snapshot
            .keys()
            .filter(|id| !self.hierarchy.contains(id))
            .count();
        tracing::debug!(
            message = "permissions.load_initial",
            entries = snapshot.len(),
            unknown_entries = unknown
        );
        self.state = PermissionState::from_snapshot(snapshot);
    }

    /// Replace the state with a tri-state map. No propagation is run.
    pub fn restore(&mut self, state: PermissionState) {
        self.state = state;
    }

    /// Boolean view of the state for persistence.
    #[must_use]
    pub fn flatten(&self) -> PermissionSnapshot {
        self.state.flatten()
    }

    /// Set one flag on a node and propagate through the hierarchy.
    ///
    /// Unknown ids are rejected before anything changes.
    pub fn set_flag(
        &mut self,
        node_id: &str,
        kind: FlagKind,
        value: bool,
    ) -> Result<Propagation, EngineError> {
        let Some(index) = self.hierarchy.index_of(node_id) else {
            tracing::warn!(
                message = "permissions.unknown_node",
                node = node_id,
                kind = kind.as_str()
            );
            return Err(EngineError::UnknownNode(node_id.to_owned()));
        };

        let start = Instant::now();
        let span = tracing::debug_span!(
            "permissions.set_flag",
            node = node_id,
            kind = kind.as_str(),
            value,
            descendants_updated = tracing::field::Empty,
            ancestors_updated = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        let _guard = span.enter();

        let hierarchy = &*self.hierarchy;
        let mut next = self.state.clone();

        let subtree = hierarchy.subtree(index);
        for &member in &subtree {
            apply_downward(next.entry_mut(hierarchy.id(member)), kind, value);
        }

        let mut ancestors_updated = 0usize;
        for ancestor in hierarchy.ancestors(index) {
            recompute_ancestor(hierarchy, &mut next, ancestor, kind, value);
            ancestors_updated += 1;
        }

        self.state = next;

        let descendants_updated = subtree.len().saturating_sub(1);
        span.record("descendants_updated", descendants_updated as u64);
        span.record("ancestors_updated", ancestors_updated as u64);
        span.record("duration_us", start.elapsed().as_micros() as u64);

        Ok(Propagation {
            node: node_id.to_owned(),
            kind,
            value,
            descendants_updated,
            ancestors_updated,
        })
    }

    /// Check every node of the hierarchy against the state invariants.
    ///
    /// Returns an empty list for a consistent state.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let hierarchy = &*self.hierarchy;
        let mut violations = Vec::new();
        for index in hierarchy.iter() {
            let id = hierarchy.id(index);
            let perms = self.state.get(id);
            if perms.write.checked && !perms.read.checked {
                violations.push(InvariantViolation::WriteWithoutRead {
                    node: id.to_owned(),
                });
            }
            let is_leaf = hierarchy.children(index).is_empty();
            for kind in FlagKind::ALL {
                let actual = perms[kind];
                if is_leaf {
                    if actual.indeterminate {
                        violations.push(InvariantViolation::IndeterminateLeaf {
                            node: id.to_owned(),
                            kind,
                        });
                    }
                    continue;
                }
                let expected = aggregate_children(hierarchy, &self.state, index, kind);
                if actual != expected {
                    violations.push(InvariantViolation::Aggregation {
                        node: id.to_owned(),
                        kind,
                        expected,
                        actual,
                    });
                }
            }
        }
        violations
    }
}

fn apply_downward(perms: &mut NodePermissions, kind: FlagKind, value: bool) {
    perms[kind] = PermissionFlag::from_bool(value);
    match (kind, value) {
        (FlagKind::Write, true) => perms.read = PermissionFlag::CHECKED,
        (FlagKind::Read, false) => perms.write = PermissionFlag::UNCHECKED,
        _ => {}
    }
}

fn aggregate_children(
    hierarchy: &Hierarchy,
    state: &PermissionState,
    index: NodeIndex,
    kind: FlagKind,
) -> PermissionFlag {
    PermissionFlag::aggregate(
        hierarchy
            .children(index)
            .iter()
            .map(|&child| state.flag(hierarchy.id(child), kind)),
    )
}

fn recompute_ancestor(
    hierarchy: &Hierarchy,
    state: &mut PermissionState,
    index: NodeIndex,
    kind: FlagKind,
    value: bool,
) {
    let id = hierarchy.id(index);
    let mut perms = state.get(id);
    perms[kind] = aggregate_children(hierarchy, state, index, kind);

    match kind {
        FlagKind::Write => {
            if perms.write.is_fully_checked() {
                perms.read = PermissionFlag::CHECKED;
            } else if perms.write.indeterminate && !perms.read.is_fully_checked() {
                // A fully checked read stays put; anything else follows the children.
                perms.read = aggregate_children(hierarchy, state, index, FlagKind::Read);
            }
        }
        FlagKind::Read if !value => {
            // The downward pass cleared write below this ancestor. Write follows
            // its children here instead of being forced off.
            perms.write = aggregate_children(hierarchy, state, index, FlagKind::Write);
            if !perms.read.checked {
                perms.write = PermissionFlag::UNCHECKED;
            }
        }
        FlagKind::Read => {}
    }

    state.insert(id, perms);
}
