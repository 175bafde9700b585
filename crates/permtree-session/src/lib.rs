#![forbid(unsafe_code)]

//! Session layer: catalog configuration, permission stores, editing sessions.
//!
//! # Role in PermTree
//! `permtree-session` wires the engine and the widget state to data:
//!
//! - [`config`]: a [`CatalogConfig`] of roles, hierarchies, and subjects,
//!   loaded from TOML or JSON and built into a [`Catalog`].
//! - [`store`]: the [`PermissionSink`] / [`PermissionStore`] seam and the
//!   in-memory [`MemoryStore`].
//! - [`session`]: the [`EditingSession`] that owns one engine per
//!   `(subject, hierarchy)` selection and saves through the store.

pub mod config;
pub mod session;
pub mod store;

pub use config::{
    Catalog, CatalogConfig, CatalogHierarchy, ConfigError, HierarchyConfig, Subject, SubjectConfig,
};
pub use session::{EditingSession, SaveReceipt, SessionError};
pub use store::{MemoryStore, PermissionSink, PermissionStore, StoreError};
