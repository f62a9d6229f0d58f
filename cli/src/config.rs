//! Configuration for the ujquery CLI
//!
//! Handles loading `ujquery.toml`: the index, output format, query subset and
//! field overrides layered over the user journey field set.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ujquery_core::catalog::{self, CATALOG, DEFAULT_INDEX, NamedQuery};
use ujquery_core::journey::user_journey_registry;
use ujquery_core::{FieldSet, FieldSpec, K8sApiId, K8sAuditFieldSet};

pub const CONFIG_FILE: &str = "ujquery.toml";

// ============================================================================
// Format
// ============================================================================

/// How queries are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Titled, indented, split at stages
    #[default]
    Pretty,
    /// Query text only, NUL separated
    Machine,
}

impl Format {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Machine => "machine",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Config
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub index: Option<String>,

    #[serde(default)]
    pub format: Option<Format>,

    /// Catalog names to print; all of them when absent
    #[serde(default)]
    pub queries: Option<Vec<String>>,

    /// Overrides of the global field set, by output field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSpec>,
}

impl Config {
    /// Load from the default config file, if there is one
    pub fn load() -> Result<Self, Error> {
        match Self::load_from(Path::new(CONFIG_FILE)) {
            Err(Error::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load from specific path, which must exist
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| Error::Parse(path.into(), e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        for name in self.queries.iter().flatten() {
            if catalog::find(name).is_none() {
                return Err(Error::UnknownQuery(name.clone()));
            }
        }
        Ok(())
    }

    /// The index to search, falling back to the built-in default
    pub fn index(&self) -> &str {
        self.index.as_deref().unwrap_or(DEFAULT_INDEX)
    }

    pub fn format(&self) -> Format {
        self.format.unwrap_or_default()
    }

    /// The configured field overrides as a field set
    pub fn field_set(&self) -> FieldSet {
        self.fields
            .iter()
            .map(|(name, spec)| (name.as_str(), spec.clone()))
            .collect()
    }

    /// The user journey registry with the field overrides layered on top of
    /// its global entry
    pub fn registry(&self) -> K8sAuditFieldSet {
        let registry = user_journey_registry();
        if self.fields.is_empty() {
            return registry;
        }
        registry.extend_api(K8sApiId::default(), &self.field_set())
    }

    /// Catalog entries selected by `queries`, in catalog order
    pub fn selected_queries(&self) -> Vec<&'static NamedQuery> {
        match &self.queries {
            None => CATALOG.iter().collect(),
            Some(names) => CATALOG
                .iter()
                .filter(|q| names.iter().any(|n| n == q.name))
                .collect(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("unknown query '{0}' in queries")]
    UnknownQuery(String),
}

pub type ConfigError = Error;

// ============================================================================
// Tests
// ============================================================================
