#![forbid(unsafe_code)]

//! Catalog configuration: hierarchies, subjects, and roles as data.
//!
//! A [`CatalogConfig`] is loaded from TOML or JSON, checked with
//! [`CatalogConfig::validate`], and turned into an indexed [`Catalog`] with
//! [`CatalogConfig::build`].
//!
//! # Loading
//!
//! ```toml
//! roles = ["admin", "viewer"]
//!
//! [[hierarchies]]
//! key = "project"
//! name = "Projects"
//! nodes = [{ id = "q4", label = "Q4 Planning" }]
//!
//! [[subjects]]
//! id = "user-viewer"
//! name = "Viewer User"
//! roles = ["viewer"]
//!
//! [subjects.permissions.project]
//! q4 = { read = true, write = false }
//! ```
//!
//! ```rust,ignore
//! let catalog = CatalogConfig::from_toml_file("catalog.toml")?.build()?;
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use permtree_core::{Hierarchy, HierarchyError, Node, PermissionSnapshot};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw configuration
// ---------------------------------------------------------------------------

/// Serializable catalog description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Every role a subject may hold.
    pub roles: Vec<String>,
    /// Hierarchies in display order.
    pub hierarchies: Vec<HierarchyConfig>,
    /// Subjects in display order.
    pub subjects: Vec<SubjectConfig>,
}

/// One named hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// A subject with its roles and stored permissions per hierarchy key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionSnapshot>,
}

impl CatalogConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Check cross-references between roles, hierarchies, and subjects.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid. Node ids are checked later by [`Self::build`]; snapshot
    /// entries for unknown node ids are allowed.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut roles = HashSet::new();
        for role in &self.roles {
            if role.is_empty() {
                errors.push("roles: empty role name".to_owned());
            } else if !roles.insert(role.as_str()) {
                errors.push(format!("roles: duplicate role '{role}'"));
            }
        }

        let mut keys = HashSet::new();
        for hierarchy in &self.hierarchies {
            if hierarchy.key.is_empty() {
                errors.push(format!("hierarchies: '{}' has an empty key", hierarchy.name));
            } else if !keys.insert(hierarchy.key.as_str()) {
                errors.push(format!("hierarchies: duplicate key '{}'", hierarchy.key));
            }
        }

        let mut ids = HashSet::new();
        for subject in &self.subjects {
            if subject.id.is_empty() {
                errors.push(format!("subjects: '{}' has an empty id", subject.name));
            } else if !ids.insert(subject.id.as_str()) {
                errors.push(format!("subjects: duplicate id '{}'", subject.id));
            }
            for role in &subject.roles {
                if !roles.contains(role.as_str()) {
                    errors.push(format!("subjects.{}: unknown role '{role}'", subject.id));
                }
            }
            for key in subject.permissions.keys() {
                if !keys.contains(key.as_str()) {
                    errors.push(format!(
                        "subjects.{}: permissions for unknown hierarchy '{key}'",
                        subject.id
                    ));
                }
            }
        }

        errors
    }

    /// Validate and index every hierarchy.
    pub fn build(self) -> Result<Catalog, ConfigError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        let hierarchies = self
            .hierarchies
            .into_iter()
            .map(|config| {
                let hierarchy = Hierarchy::new(config.nodes).map_err(|source| {
                    ConfigError::Hierarchy {
                        key: config.key.clone(),
                        source,
                    }
                })?;
                Ok(CatalogHierarchy {
                    key: config.key,
                    name: config.name,
                    hierarchy: Arc::new(hierarchy),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let subjects = self
            .subjects
            .into_iter()
            .map(|config| Subject {
                id: config.id,
                name: config.name,
                roles: config.roles,
                permissions: config.permissions,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            message = "catalog.built",
            roles = self.roles.len(),
            hierarchies = hierarchies.len(),
            subjects = subjects.len()
        );

        Ok(Catalog {
            roles: self.roles,
            hierarchies,
            subjects,
        })
    }
}

// ---------------------------------------------------------------------------
// Indexed catalog
// ---------------------------------------------------------------------------

/// A hierarchy ready for editing.
#[derive(Debug, Clone)]
pub struct CatalogHierarchy {
    pub key: String,
    pub name: String,
    pub hierarchy: Arc<Hierarchy>,
}

/// A subject whose permissions are edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Stored permissions per hierarchy key.
    pub permissions: BTreeMap<String, PermissionSnapshot>,
}

/// Validated catalog with indexed hierarchies.
#[derive(Debug, Clone)]
pub struct Catalog {
    roles: Vec<String>,
    hierarchies: Vec<CatalogHierarchy>,
    subjects: Vec<Subject>,
}

impl Catalog {
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    #[must_use]
    pub fn hierarchies(&self) -> &[CatalogHierarchy] {
        &self.hierarchies
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Look up a hierarchy by key.
    #[must_use]
    pub fn hierarchy(&self, key: &str) -> Option<&CatalogHierarchy> {
        self.hierarchies.iter().find(|h| h.key == key)
    }

    /// Look up a subject by id.
    #[must_use]
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading or building a catalog.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse or serialize error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
    /// A hierarchy failed to index.
    Hierarchy {
        key: String,
        source: HierarchyError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
            Self::Hierarchy { key, source } => write!(f, "hierarchy '{key}': {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
            Self::Hierarchy { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
