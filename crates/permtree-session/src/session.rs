#![forbid(unsafe_code)]

//! Editing session for one `(subject, hierarchy)` selection at a time.
//!
//! An [`EditingSession`] owns the catalog, a [`PermissionStore`], the
//! [`PermissionEngine`] for the current selection, the tree view state, and
//! a roles combobox. Switching subject or hierarchy discards unsaved edits,
//! reloads from the store, and resets the view. [`EditingSession::save`]
//! hands the flattened map to the store.

use std::fmt;

use permtree_core::{
    EngineError, FlagKind, NodePermissions, PermissionEngine, PermissionSnapshot, Propagation,
};
use permtree_widgets::{Combobox, ComboboxConfig, TreeRow, TreeViewState};
use web_time::Instant;

use crate::config::{Catalog, CatalogHierarchy, Subject};
use crate::store::{PermissionStore, StoreError};

/// Errors raised by an [`EditingSession`].
#[derive(Debug)]
pub enum SessionError {
    /// The catalog has no subjects or no hierarchies.
    EmptyCatalog,
    UnknownSubject(String),
    UnknownHierarchy(String),
    Engine(EngineError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "catalog has no subjects or no hierarchies"),
            Self::UnknownSubject(id) => write!(f, "unknown subject: {id}"),
            Self::UnknownHierarchy(key) => write!(f, "unknown hierarchy: {key}"),
            Self::Engine(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub subject: String,
    pub hierarchy: String,
    /// Entries in the saved snapshot.
    pub entries: usize,
}

/// Permission editor state over a catalog and a store.
pub struct EditingSession<S> {
    catalog: Catalog,
    store: S,
    subject: usize,
    hierarchy: usize,
    engine: PermissionEngine,
    view: TreeViewState,
    roles: Combobox<String>,
    dirty: bool,
}

impl<S: PermissionStore> EditingSession<S> {
    /// Start on the first subject and the first hierarchy.
    pub fn new(catalog: Catalog, store: S) -> Result<Self, SessionError> {
        let Some(first) = catalog.hierarchies().first() else {
            return Err(SessionError::EmptyCatalog);
        };
        if catalog.subjects().is_empty() {
            return Err(SessionError::EmptyCatalog);
        }
        let engine = PermissionEngine::new(first.hierarchy.clone());
        let roles = Combobox::new(
            catalog.roles().to_vec(),
            ComboboxConfig::multi().placeholder("Select roles..."),
        );
        let mut session = Self {
            catalog,
            store,
            subject: 0,
            hierarchy: 0,
            engine,
            view: TreeViewState::new(),
            roles,
            dirty: false,
        };
        session.reload_roles();
        session.reload();
        Ok(session)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Currently selected subject.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.catalog.subjects()[self.subject]
    }

    /// Currently selected hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &CatalogHierarchy {
        &self.catalog.hierarchies()[self.hierarchy]
    }

    #[must_use]
    pub fn engine(&self) -> &PermissionEngine {
        &self.engine
    }

    #[must_use]
    pub fn view(&self) -> &TreeViewState {
        &self.view
    }

    /// Whether there are edits since the last load or save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switch subject. The hierarchy resets to the first one.
    ///
    /// Unsaved edits are discarded. Unknown ids leave the session unchanged,
    /// and so does picking the current subject while on the first hierarchy.
    pub fn select_subject(&mut self, id: &str) -> Result<(), SessionError> {
        let Some(position) = self.catalog.subjects().iter().position(|s| s.id == id) else {
            tracing::warn!(message = "session.unknown_subject", subject = id);
            return Err(SessionError::UnknownSubject(id.to_owned()));
        };
        if position == self.subject && self.hierarchy == 0 {
            return Ok(());
        }
        self.subject = position;
        self.hierarchy = 0;
        self.reload_roles();
        self.reload();
        tracing::info!(
            message = "session.select_subject",
            subject = id,
            hierarchy = self.hierarchy().key.as_str()
        );
        Ok(())
    }

    /// Switch hierarchy for the current subject.
    ///
    /// Unsaved edits are discarded. Unknown keys and the current key leave
    /// the session unchanged.
    pub fn select_hierarchy(&mut self, key: &str) -> Result<(), SessionError> {
        let Some(position) = self.catalog.hierarchies().iter().position(|h| h.key == key) else {
            tracing::warn!(message = "session.unknown_hierarchy", hierarchy = key);
            return Err(SessionError::UnknownHierarchy(key.to_owned()));
        };
        if position == self.hierarchy {
            return Ok(());
        }
        self.hierarchy = position;
        self.reload();
        tracing::info!(
            message = "session.select_hierarchy",
            subject = self.subject().id.as_str(),
            hierarchy = key
        );
        Ok(())
    }

    fn reload(&mut self) {
        let subject = &self.catalog.subjects()[self.subject];
        let hierarchy = &self.catalog.hierarchies()[self.hierarchy];
        let snapshot = self.store.load(&subject.id, &hierarchy.key);

        self.engine.set_hierarchy(hierarchy.hierarchy.clone());
        self.engine.load_initial(&snapshot);
        self.view.reset();
        self.dirty = false;

        let violations = self.engine.check_invariants();
        if !violations.is_empty() {
            tracing::debug!(
                message = "session.inconsistent_snapshot",
                subject = subject.id.as_str(),
                hierarchy = hierarchy.key.as_str(),
                violations = violations.len()
            );
        }
    }

    fn reload_roles(&mut self) {
        let subject = &self.catalog.subjects()[self.subject];
        let indices: Vec<usize> = subject
            .roles
            .iter()
            .filter_map(|role| self.roles.items().iter().position(|r| r == role))
            .collect();
        self.roles.set_input("");
        self.roles.set_selected(indices);
    }

    /// Current permissions of a node.
    #[must_use]
    pub fn get(&self, id: &str) -> NodePermissions {
        self.engine.get(id)
    }

    /// Apply an edit to the current hierarchy.
    pub fn set_flag(
        &mut self,
        id: &str,
        kind: FlagKind,
        value: bool,
    ) -> Result<Propagation, SessionError> {
        let propagation = self.engine.set_flag(id, kind, value)?;
        self.dirty = true;
        Ok(propagation)
    }

    /// Update the tree search term.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.view.set_search(self.engine.hierarchy(), term);
    }

    /// Flip expansion of a tree row. Returns the new expansion state.
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        self.view.toggle_expanded(id)
    }

    /// Visible tree rows.
    #[must_use]
    pub fn rows(&self) -> Vec<TreeRow> {
        self.view.rows(self.engine.hierarchy(), self.engine.state())
    }

    /// Roles combobox. Its selection is display-only and never saved.
    #[must_use]
    pub fn roles(&self) -> &Combobox<String> {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut Combobox<String> {
        &mut self.roles
    }

    /// Roles currently selected in the combobox.
    #[must_use]
    pub fn selected_roles(&self) -> Vec<&str> {
        self.roles
            .selected_items()
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    /// Flattened permissions of the current selection.
    #[must_use]
    pub fn snapshot(&self) -> PermissionSnapshot {
        self.engine.flatten()
    }

    /// Hand the flattened permissions to the store.
    pub fn save(&mut self) -> Result<SaveReceipt, SessionError> {
        let start = Instant::now();
        let snapshot = self.engine.flatten();
        let subject = self.catalog.subjects()[self.subject].id.clone();
        let hierarchy = self.catalog.hierarchies()[self.hierarchy].key.clone();

        if let Err(err) = self.store.save(&subject, &hierarchy, &snapshot) {
            tracing::warn!(
                message = "session.save_failed",
                subject = subject.as_str(),
                hierarchy = hierarchy.as_str(),
                error = %err
            );
            return Err(err.into());
        }
        self.dirty = false;

        tracing::info!(
            message = "session.save",
            subject = subject.as_str(),
            hierarchy = hierarchy.as_str(),
            entries = snapshot.len(),
            duration_us = start.elapsed().as_micros() as u64
        );
        Ok(SaveReceipt {
            subject,
            hierarchy,
            entries: snapshot.len(),
        })
    }
}

impl<S> fmt::Debug for EditingSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingSession")
            .field("subject", &self.catalog.subjects()[self.subject].id)
            .field("hierarchy", &self.catalog.hierarchies()[self.hierarchy].key)
            .field("entries", &self.engine.state().len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
