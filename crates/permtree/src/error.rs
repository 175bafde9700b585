#![forbid(unsafe_code)]

//! Unified error type for PermTree.
//!
//! Each crate keeps its own typed error so callers can match on what they
//! care about. [`Error`] wraps them all for applications that just want `?`.

use std::fmt;

use permtree_core::{EngineError, HierarchyError};
#[cfg(feature = "session")]
use permtree_session::{ConfigError, SessionError, StoreError};

/// Top-level error type for PermTree applications.
#[derive(Debug)]
pub enum Error {
    /// A hierarchy could not be indexed.
    Hierarchy(HierarchyError),
    /// An edit named an unknown node.
    Engine(EngineError),
    /// A catalog failed to load or validate.
    #[cfg(feature = "session")]
    Config(ConfigError),
    /// A sink or store refused a save.
    #[cfg(feature = "session")]
    Store(StoreError),
    /// A session operation failed.
    #[cfg(feature = "session")]
    Session(SessionError),
}

/// Standard result type for PermTree APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Hierarchy(_) => "hierarchy",
            Self::Engine(_) => "engine",
            #[cfg(feature = "session")]
            Self::Config(_) => "config",
            #[cfg(feature = "session")]
            Self::Store(_) => "store",
            #[cfg(feature = "session")]
            Self::Session(_) => "session",
        }
    }

    /// Whether editing can continue after this error.
    ///
    /// Rejected edits, saves, and selections leave state untouched. Broken
    /// hierarchies and catalogs mean there is nothing to edit.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Hierarchy(_) => false,
            Self::Engine(_) => true,
            #[cfg(feature = "session")]
            Self::Config(_) => false,
            #[cfg(feature = "session")]
            Self::Store(_) => true,
            #[cfg(feature = "session")]
            Self::Session(SessionError::EmptyCatalog) => false,
            #[cfg(feature = "session")]
            Self::Session(_) => true,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchy(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "{e}"),
            #[cfg(feature = "session")]
            Self::Config(e) => write!(f, "{e}"),
            #[cfg(feature = "session")]
            Self::Store(e) => write!(f, "{e}"),
            #[cfg(feature = "session")]
            Self::Session(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hierarchy(e) => Some(e),
            Self::Engine(e) => Some(e),
            #[cfg(feature = "session")]
            Self::Config(e) => Some(e),
            #[cfg(feature = "session")]
            Self::Store(e) => Some(e),
            #[cfg(feature = "session")]
            Self::Session(e) => Some(e),
        }
    }
}

impl From<HierarchyError> for Error {
    fn from(err: HierarchyError) -> Self {
        Self::Hierarchy(err)
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

#[cfg(feature = "session")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "session")]
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

#[cfg(feature = "session")]
impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}
