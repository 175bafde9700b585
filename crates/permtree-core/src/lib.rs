#![forbid(unsafe_code)]

//! Core: hierarchies, tri-state permission flags, and propagation.
//!
//! # Role in PermTree
//! `permtree-core` owns the only stateful logic of the workspace: the
//! [`PermissionEngine`](engine::PermissionEngine) that keeps per-node
//! `read`/`write` flags consistent across a labeled tree.
//!
//! # Primary responsibilities
//! - **Hierarchy**: nested [`Node`](hierarchy::Node)s indexed once into an
//!   arena with parent links.
//! - **Flags**: [`PermissionFlag`](flag::PermissionFlag) (checked /
//!   indeterminate) and the aggregation rule for parents.
//! - **Engine**: downward and upward propagation with the write ⇒ read rule.
//! - **Filter**: case-insensitive label search that keeps ancestors of
//!   matches.
//!
//! # How it fits in the system
//! `permtree-widgets` reads engine state to build view rows; `permtree-session`
//! owns an engine per `(subject, hierarchy)` selection and persists its
//! flattened map.

pub mod engine;
pub mod filter;
pub mod flag;
pub mod hierarchy;
pub mod state;

pub use engine::{EngineError, InvariantViolation, PermissionEngine, Propagation};
pub use filter::{FilteredTree, contains_ignore_case, filter_nodes, match_len_ignore_case};
pub use flag::{FlagKind, FlatPermissions, NodePermissions, PermissionFlag};
pub use hierarchy::{Hierarchy, HierarchyError, Node, NodeIndex};
pub use state::{PermissionSnapshot, PermissionState};
