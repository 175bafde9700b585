#![forbid(unsafe_code)]

//! Searchable selection state for single- and multi-select comboboxes.
//!
//! [`Combobox`] keeps the data side of a combobox: the typed input, the
//! filtered item list, the highlighted row, the selection, and the pill
//! summary shown for multi-select. Focus handling, menu open/close, and row
//! virtualization belong to the host toolkit.
//!
//! # Example
//!
//! ```
//! use permtree_widgets::combobox::{Combobox, ComboboxConfig, Pills};
//!
//! let items: Vec<String> = (1..=1000).map(|i| format!("Item {i}")).collect();
//! let mut combo = Combobox::new(items, ComboboxConfig::multi().max_visible_pills(1));
//!
//! combo.set_input("item 99");
//! assert_eq!(combo.filtered_len(), 11); // 99, 990..=999
//! combo.select_highlighted();
//! combo.toggle(0);
//!
//! assert_eq!(combo.selected_items().len(), 2);
//! match combo.pills() {
//!     Pills::Items { shown, overflow } => {
//!         assert_eq!(shown.len(), 1);
//!         assert_eq!(overflow, 1);
//!     }
//!     other => panic!("unexpected pills: {other:?}"),
//! }
//! ```

use std::borrow::Cow;

use permtree_core::contains_ignore_case;

/// An item that can be shown and searched in a [`Combobox`].
pub trait ComboboxItem {
    /// Text shown for the item and written to the input on single select.
    fn display_text(&self) -> Cow<'_, str>;

    /// Text matched against the input. Defaults to [`Self::display_text`].
    fn search_text(&self) -> Cow<'_, str> {
        self.display_text()
    }
}

impl ComboboxItem for String {
    fn display_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl ComboboxItem for &str {
    fn display_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// Construction options for a [`Combobox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxConfig {
    pub multi_select: bool,
    /// Pills shown before collapsing the rest into `+N`. Zero shows only a
    /// count.
    pub max_visible_pills: usize,
    pub placeholder: String,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self {
            multi_select: false,
            max_visible_pills: 1,
            placeholder: "Type to filter...".to_owned(),
        }
    }
}

impl ComboboxConfig {
    /// Single-select defaults.
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// Multi-select defaults.
    #[must_use]
    pub fn multi() -> Self {
        Self {
            multi_select: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn max_visible_pills(mut self, max: usize) -> Self {
        self.max_visible_pills = max;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

/// Summary of the multi-select pills to render in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pills<'a, T> {
    /// Nothing selected, or single-select mode.
    None,
    /// Only a "N selected" count.
    Count(usize),
    /// Up to the configured number of pills, then `+overflow`.
    Items { shown: Vec<&'a T>, overflow: usize },
}

/// Combobox state over an owned item list.
#[derive(Debug, Clone)]
pub struct Combobox<T> {
    items: Vec<T>,
    config: ComboboxConfig,
    input: String,
    /// Item indices passing the filter, ascending.
    filtered: Vec<usize>,
    /// Position within `filtered`.
    highlighted: Option<usize>,
    /// Selected item indices in selection order.
    selected: Vec<usize>,
}

impl<T: ComboboxItem> Combobox<T> {
    /// Create a combobox with every item listed and nothing selected.
    #[must_use]
    pub fn new(items: Vec<T>, config: ComboboxConfig) -> Self {
        let filtered = (0..items.len()).collect();
        Self {
            items,
            config,
            input: String::new(),
            filtered,
            highlighted: None,
            selected: Vec::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn config(&self) -> &ComboboxConfig {
        &self.config
    }

    #[must_use]
    pub fn is_multi_select(&self) -> bool {
        self.config.multi_select
    }

    /// Current input text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text and refilter.
    ///
    /// The first matching row is highlighted; nothing is when no item
    /// matches.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.refilter();
        self.highlighted = if self.filtered.is_empty() { None } else { Some(0) };
    }

    fn refilter(&mut self) {
        let query = self.input.trim().to_lowercase();
        if query.is_empty() {
            self.filtered = (0..self.items.len()).collect();
            return;
        }
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| contains_ignore_case(&item.search_text(), &query))
            .map(|(index, _)| index)
            .collect();
    }

    fn reset_input(&mut self) {
        self.input.clear();
        self.filtered = (0..self.items.len()).collect();
        self.highlighted = if self.filtered.is_empty() { None } else { Some(0) };
    }

    /// Number of rows passing the filter.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Item indices passing the filter, in item order.
    #[must_use]
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

    /// Items passing the filter, in item order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(|&index| &self.items[index])
    }

    /// Highlighted row position within the filtered list.
    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// The item under the highlight.
    #[must_use]
    pub fn highlighted_item(&self) -> Option<&T> {
        let index = *self.filtered.get(self.highlighted?)?;
        self.items.get(index)
    }

    /// Highlight a filtered row. Out-of-range rows are ignored.
    pub fn highlight(&mut self, row: usize) -> bool {
        if row >= self.filtered.len() {
            return false;
        }
        self.highlighted = Some(row);
        true
    }

    /// Move the highlight down, wrapping to the first row.
    pub fn highlight_next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            self.highlighted = None;
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(row) => (row + 1) % len,
            None => 0,
        });
    }

    /// Move the highlight up, wrapping to the last row.
    pub fn highlight_previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            self.highlighted = None;
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(0) | None => len - 1,
            Some(row) => row - 1,
        });
    }

    /// Whether the item at `index` is selected.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Select or deselect the item at `index`.
    ///
    /// Multi-select flips membership, then clears the input so the full list
    /// shows again. Single-select replaces the selection and writes the
    /// item's text into the input. Returns `false` for out-of-range indices.
    pub fn toggle(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        if self.config.multi_select {
            if let Some(position) = self.selected.iter().position(|&i| i == index) {
                self.selected.remove(position);
            } else {
                self.selected.push(index);
            }
            self.reset_input();
        } else {
            self.input = item.display_text().into_owned();
            self.selected.clear();
            self.selected.push(index);
            self.refilter();
            self.highlighted = self
                .filtered
                .iter()
                .position(|&i| i == index)
                .or(if self.filtered.is_empty() { None } else { Some(0) });
        }
        #[cfg(feature = "tracing")]
        self.log_selection_change("toggle");
        true
    }

    /// Toggle the highlighted row, as on Enter.
    pub fn select_highlighted(&mut self) -> bool {
        let Some(index) = self.highlighted.and_then(|row| self.filtered.get(row).copied()) else {
            return false;
        };
        self.toggle(index)
    }

    /// Remove `index` from the selection (a pill's close action).
    pub fn deselect(&mut self, index: usize) -> bool {
        let Some(position) = self.selected.iter().position(|&i| i == index) else {
            return false;
        };
        self.selected.remove(position);
        #[cfg(feature = "tracing")]
        self.log_selection_change("deselect");
        true
    }

    /// Replace the selection without touching the input.
    ///
    /// Out-of-range and repeated indices are skipped; single-select keeps
    /// only the first valid index.
    pub fn set_selected(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.selected.clear();
        for index in indices {
            if index < self.items.len() && !self.selected.contains(&index) {
                self.selected.push(index);
                if !self.config.multi_select {
                    break;
                }
            }
        }
        #[cfg(feature = "tracing")]
        self.log_selection_change("set_selected");
    }

    /// Clear the selection. Single-select also clears the input.
    pub fn clear_all(&mut self) {
        self.selected.clear();
        if !self.config.multi_select {
            self.input.clear();
            self.refilter();
        }
        #[cfg(feature = "tracing")]
        self.log_selection_change("clear_all");
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Selected item indices, in selection order.
    #[must_use]
    pub fn selected_indices(&self) -> &[usize] {
        &self.selected
    }

    /// Selected items, in selection order.
    #[must_use]
    pub fn selected_items(&self) -> Vec<&T> {
        self.selected.iter().map(|&index| &self.items[index]).collect()
    }

    /// The single selected item (the first one in multi-select).
    #[must_use]
    pub fn selected_item(&self) -> Option<&T> {
        self.selected.first().map(|&index| &self.items[index])
    }

    /// Pills to render for the current selection.
    #[must_use]
    pub fn pills(&self) -> Pills<'_, T> {
        if !self.config.multi_select || self.selected.is_empty() {
            return Pills::None;
        }
        let max = self.config.max_visible_pills;
        if max == 0 {
            return Pills::Count(self.selected.len());
        }
        let shown: Vec<&T> = self
            .selected
            .iter()
            .take(max)
            .map(|&index| &self.items[index])
            .collect();
        let overflow = self.selected.len() - shown.len();
        Pills::Items { shown, overflow }
    }

    #[cfg(feature = "tracing")]
    fn log_selection_change(&self, action: &str) {
        tracing::debug!(
            message = "combobox.selection",
            action,
            selected_count = self.selected.len(),
            filter_active = !self.input.trim().is_empty()
        );
    }
}
