#![forbid(unsafe_code)]

//! Tri-state permission flags.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Which permission a flag describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FlagKind {
    /// Read access.
    Read,
    /// Write access. Implies read.
    Write,
}

impl FlagKind {
    /// Both kinds, read first.
    pub const ALL: [FlagKind; 2] = [FlagKind::Read, FlagKind::Write];

    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checkbox-like value: fully checked, fully unchecked, or indeterminate.
///
/// When `indeterminate` is set the flag summarizes mixed descendants and
/// `checked` records whether at least one descendant is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionFlag {
    pub checked: bool,
    pub indeterminate: bool,
}

impl PermissionFlag {
    /// Fully checked.
    pub const CHECKED: Self = Self {
        checked: true,
        indeterminate: false,
    };

    /// Fully unchecked. Also the value of any absent entry.
    pub const UNCHECKED: Self = Self {
        checked: false,
        indeterminate: false,
    };

    /// Mixed descendants, at least one of them checked.
    pub const MIXED: Self = Self {
        checked: true,
        indeterminate: true,
    };

    /// A determinate flag with the given value.
    #[inline]
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::CHECKED } else { Self::UNCHECKED }
    }

    #[inline]
    #[must_use]
    pub const fn is_fully_checked(self) -> bool {
        self.checked && !self.indeterminate
    }

    #[inline]
    #[must_use]
    pub const fn is_fully_unchecked(self) -> bool {
        !self.checked && !self.indeterminate
    }

    /// Indeterminate, as shown for a parent with differing children.
    #[inline]
    #[must_use]
    pub const fn is_mixed(self) -> bool {
        self.indeterminate
    }

    /// Checked or indeterminate.
    #[inline]
    #[must_use]
    pub const fn is_partially_checked(self) -> bool {
        self.checked || self.indeterminate
    }

    /// Aggregate a parent flag from its direct children.
    ///
    /// Fully checked iff every child is fully checked, fully unchecked iff
    /// every child is fully unchecked, otherwise indeterminate with `checked`
    /// set when any child is checked or indeterminate. An empty child list
    /// aggregates to fully unchecked.
    #[must_use]
    pub fn aggregate(children: impl IntoIterator<Item = PermissionFlag>) -> Self {
        let mut all_checked = true;
        let mut all_unchecked = true;
        let mut any_checked = false;
        for child in children {
            all_checked &= child.is_fully_checked();
            all_unchecked &= child.is_fully_unchecked();
            any_checked |= child.is_partially_checked();
        }
        if all_unchecked {
            Self::UNCHECKED
        } else if all_checked {
            Self::CHECKED
        } else {
            Self {
                checked: any_checked,
                indeterminate: true,
            }
        }
    }
}

/// The read and write flags of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePermissions {
    pub read: PermissionFlag,
    pub write: PermissionFlag,
}

impl NodePermissions {
    /// Both flags unchecked.
    pub const NONE: Self = Self {
        read: PermissionFlag::UNCHECKED,
        write: PermissionFlag::UNCHECKED,
    };

    /// Determinate flags from plain booleans.
    #[must_use]
    pub const fn from_flat(flat: FlatPermissions) -> Self {
        Self {
            read: PermissionFlag::from_bool(flat.read),
            write: PermissionFlag::from_bool(flat.write),
        }
    }

    /// Drop indeterminacy, keeping `checked`.
    #[must_use]
    pub const fn flatten(self) -> FlatPermissions {
        FlatPermissions {
            read: self.read.checked,
            write: self.write.checked,
        }
    }

    /// Get the flag of the given kind.
    #[inline]
    #[must_use]
    pub const fn flag(&self, kind: FlagKind) -> PermissionFlag {
        match kind {
            FlagKind::Read => self.read,
            FlagKind::Write => self.write,
        }
    }
}

impl Index<FlagKind> for NodePermissions {
    type Output = PermissionFlag;

    fn index(&self, kind: FlagKind) -> &PermissionFlag {
        match kind {
            FlagKind::Read => &self.read,
            FlagKind::Write => &self.write,
        }
    }
}

impl IndexMut<FlagKind> for NodePermissions {
    fn index_mut(&mut self, kind: FlagKind) -> &mut PermissionFlag {
        match kind {
            FlagKind::Read => &mut self.read,
            FlagKind::Write => &mut self.write,
        }
    }
}

/// Boolean-only permissions, the shape exchanged with stores and sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatPermissions {
    #[cfg_attr(feature = "serde", serde(default))]
    pub read: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub write: bool,
}

impl FlatPermissions {
    #[must_use]
    pub const fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }
}
