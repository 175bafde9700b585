#![forbid(unsafe_code)]

//! PermTree public facade.
//!
//! Re-exports the engine, the headless widget state, and (with the default
//! `session` feature) catalogs and editing sessions, plus a [`prelude`] for
//! day-to-day usage.
//!
//! # Example
//!
//! ```
//! use permtree::prelude::*;
//! use std::sync::Arc;
//!
//! let hierarchy = Arc::new(Hierarchy::new(vec![
//!     Node::new("a", "A").child(Node::new("b", "B")).child(Node::new("c", "C")),
//! ])?);
//! let mut engine = PermissionEngine::new(hierarchy);
//!
//! engine.set_flag("b", FlagKind::Write, true)?;
//! assert_eq!(engine.get("a").write, PermissionFlag::MIXED);
//!
//! engine.set_flag("c", FlagKind::Write, true)?;
//! assert_eq!(engine.get("a").read, PermissionFlag::CHECKED);
//! # Ok::<(), permtree::Error>(())
//! ```

pub mod error;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use permtree_core::{
    EngineError, FilteredTree, FlagKind, FlatPermissions, Hierarchy, HierarchyError,
    InvariantViolation, Node, NodePermissions, PermissionEngine, PermissionFlag,
    PermissionSnapshot, PermissionState, Propagation, filter_nodes,
};

// --- Widget re-exports -----------------------------------------------------

pub use permtree_widgets::{
    Combobox, ComboboxConfig, ComboboxItem, Pills, TreeRow, TreeViewState, highlight_ranges,
};

// --- Session re-exports ----------------------------------------------------

#[cfg(feature = "session")]
pub use permtree_session::{
    Catalog, CatalogConfig, ConfigError, EditingSession, MemoryStore, PermissionSink,
    PermissionStore, SaveReceipt, SessionError, StoreError,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, FlagKind, FlatPermissions, Hierarchy, Node, NodePermissions, PermissionEngine,
        PermissionFlag, PermissionSnapshot, Result, TreeViewState,
    };

    #[cfg(feature = "session")]
    pub use crate::{CatalogConfig, EditingSession, MemoryStore, PermissionStore};

    pub use crate::{core, widgets};

    #[cfg(feature = "session")]
    pub use crate::session;
}

pub use permtree_core as core;
#[cfg(feature = "session")]
pub use permtree_session as session;
pub use permtree_widgets as widgets;
