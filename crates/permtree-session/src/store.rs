#![forbid(unsafe_code)]

//! Where permission snapshots come from and go to.
//!
//! [`PermissionSink`] receives the flattened map on save. [`PermissionStore`]
//! additionally supplies the snapshot a session starts from. [`MemoryStore`]
//! keeps both in a map keyed by `(subject, hierarchy)`.

use std::collections::BTreeMap;
use std::fmt;

use permtree_core::PermissionSnapshot;

use crate::config::Catalog;

/// Errors raised by a sink or store.
#[derive(Debug)]
pub enum StoreError {
    /// The backend refused the write.
    Rejected { subject: String, hierarchy: String, reason: String },
    /// Backend I/O failed.
    ///
    /// [`MemoryStore`] never raises this; file or network backends
    /// implementing [`PermissionSink`] report their failures here.
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected {
                subject,
                hierarchy,
                reason,
            } => write!(f, "save of {subject}/{hierarchy} rejected: {reason}"),
            Self::Io(e) => write!(f, "store I/O error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Rejected { .. } => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Receives flattened permissions when a session saves.
pub trait PermissionSink {
    fn save(
        &mut self,
        subject: &str,
        hierarchy: &str,
        snapshot: &PermissionSnapshot,
    ) -> Result<(), StoreError>;
}

/// A sink that can also supply the stored snapshot.
pub trait PermissionStore: PermissionSink {
    /// Stored snapshot for the pair; empty when nothing is stored.
    fn load(&self, subject: &str, hierarchy: &str) -> PermissionSnapshot;
}

impl<T: PermissionSink + ?Sized> PermissionSink for &mut T {
    fn save(
        &mut self,
        subject: &str,
        hierarchy: &str,
        snapshot: &PermissionSnapshot,
    ) -> Result<(), StoreError> {
        (**self).save(subject, hierarchy, snapshot)
    }
}

impl<T: PermissionStore + ?Sized> PermissionStore for &mut T {
    fn load(&self, subject: &str, hierarchy: &str) -> PermissionSnapshot {
        (**self).load(subject, hierarchy)
    }
}

impl<T: PermissionSink + ?Sized> PermissionSink for Box<T> {
    fn save(
        &mut self,
        subject: &str,
        hierarchy: &str,
        snapshot: &PermissionSnapshot,
    ) -> Result<(), StoreError> {
        (**self).save(subject, hierarchy, snapshot)
    }
}

impl<T: PermissionStore + ?Sized> PermissionStore for Box<T> {
    fn load(&self, subject: &str, hierarchy: &str) -> PermissionSnapshot {
        (**self).load(subject, hierarchy)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<(String, String), PermissionSnapshot>,
    saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with every subject's stored permissions.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut store = Self::new();
        for subject in catalog.subjects() {
            for (hierarchy, snapshot) in &subject.permissions {
                store.insert(&subject.id, hierarchy, snapshot.clone());
            }
        }
        store
    }

    /// Replace the snapshot for a pair without counting it as a save.
    pub fn insert(&mut self, subject: &str, hierarchy: &str, snapshot: PermissionSnapshot) {
        self.entries
            .insert((subject.to_owned(), hierarchy.to_owned()), snapshot);
    }

    #[must_use]
    pub fn get(&self, subject: &str, hierarchy: &str) -> Option<&PermissionSnapshot> {
        self.entries.get(&(subject.to_owned(), hierarchy.to_owned()))
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of successful [`PermissionSink::save`] calls.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PermissionSink for MemoryStore {
    fn save(
        &mut self,
        subject: &str,
        hierarchy: &str,
        snapshot: &PermissionSnapshot,
    ) -> Result<(), StoreError> {
        self.insert(subject, hierarchy, snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

impl PermissionStore for MemoryStore {
    fn load(&self, subject: &str, hierarchy: &str) -> PermissionSnapshot {
        self.get(subject, hierarchy).cloned().unwrap_or_default()
    }
}
