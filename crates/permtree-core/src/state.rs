#![forbid(unsafe_code)]

//! The mutable permission map edited by the engine.

use std::collections::{BTreeMap, HashMap};

use crate::flag::{FlagKind, FlatPermissions, NodePermissions, PermissionFlag};

/// Boolean permissions keyed by node id, ordered for deterministic output.
///
/// This is the shape loaded from stores and handed to sinks.
pub type PermissionSnapshot = BTreeMap<String, FlatPermissions>;

/// Tri-state permissions keyed by node id.
///
/// Only touched or loaded nodes have entries. Lookups for any other id yield
/// [`NodePermissions::NONE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PermissionState {
    entries: HashMap<String, NodePermissions, ahash::RandomState>,
}

impl PermissionState {
    /// An empty state (every node unchecked).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from boolean permissions; every flag is determinate.
    #[must_use]
    pub fn from_snapshot(snapshot: &PermissionSnapshot) -> Self {
        let entries = snapshot
            .iter()
            .map(|(id, flat)| (id.clone(), NodePermissions::from_flat(*flat)))
            .collect();
        Self { entries }
    }

    /// Permissions for `id`, defaulting to both flags unchecked.
    #[must_use]
    pub fn get(&self, id: &str) -> NodePermissions {
        self.entries.get(id).copied().unwrap_or(NodePermissions::NONE)
    }

    /// One flag for `id`, defaulting to unchecked.
    #[must_use]
    pub fn flag(&self, id: &str, kind: FlagKind) -> PermissionFlag {
        self.get(id)[kind]
    }

    /// Whether `id` has an explicit entry.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Replace the permissions for `id`.
    pub fn insert(&mut self, id: impl Into<String>, permissions: NodePermissions) {
        self.entries.insert(id.into(), permissions);
    }

    /// Mutable access to the entry for `id`, creating the default if absent.
    pub(crate) fn entry_mut(&mut self, id: &str) -> &mut NodePermissions {
        self.entries.entry(id.to_owned()).or_default()
    }

    /// Number of explicit entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate explicit entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodePermissions)> {
        self.entries.iter().map(|(id, perms)| (id.as_str(), perms))
    }

    /// Drop indeterminacy and return the boolean view of every entry.
    #[must_use]
    pub fn flatten(&self) -> PermissionSnapshot {
        self.entries
            .iter()
            .map(|(id, perms)| (id.clone(), perms.flatten()))
            .collect()
    }
}

impl FromIterator<(String, NodePermissions)> for PermissionState {
    fn from_iter<I: IntoIterator<Item = (String, NodePermissions)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
