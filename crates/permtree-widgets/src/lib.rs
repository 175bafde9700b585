#![forbid(unsafe_code)]

//! View-side state for permission editors.
//!
//! # Role in PermTree
//! `permtree-widgets` turns engine state into something a renderer can draw
//! without owning any permission logic itself:
//!
//! - [`TreeViewState`]: expansion, search, and the flattened rows of the
//!   permission tree with match highlights.
//! - [`Combobox`]: a searchable single- or multi-select list with pills.
//!
//! Enable the `tracing` feature to emit debug events on expansion, search,
//! and selection changes.

pub mod combobox;
pub mod tree_view;

pub use combobox::{Combobox, ComboboxConfig, ComboboxItem, Pills};
pub use tree_view::{TreeRow, TreeViewState, highlight_ranges};
