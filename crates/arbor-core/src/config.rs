use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use arbor_util::errors::{ArborError, ArborResult};

use crate::artifact_type::{ArtifactType, DefaultTypeRegistry};
use crate::dependency::Scope;

/// Configuration loaded from `arbor.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArborConfig {
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Repository id to Maven-layout directory.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    /// Additional artifact types, keyed by type name.
    #[serde(default)]
    pub types: BTreeMap<String, TypeEntry>,
}

/// Traversal and conflict-resolution settings from `[resolver]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Expand the children of optional dependencies too.
    #[serde(default, rename = "include-optional")]
    pub include_optional: bool,

    #[serde(default, rename = "tie-break")]
    pub tie_break: TieBreak,
}

/// How to pick a winner among occurrences of one conflict key found at the
/// same depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The occurrence declared first in depth-first order.
    #[default]
    FirstDeclared,
    /// The occurrence with the highest version; declaration order breaks
    /// remaining ties.
    HighestVersion,
}

/// An artifact type declared under `[types.<name>]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Defaults to the type name.
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub scope: Option<Scope>,
}

impl ArborConfig {
    /// Load configuration from a file.
    pub fn from_path(path: &Path) -> ArborResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ArborError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content)
    }

    /// Load from `path` when it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> ArborResult<Self> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse_toml(content: &str) -> ArborResult<Self> {
        toml::from_str(content).map_err(|e| ArborError::Config {
            message: format!("Failed to parse arbor.toml: {e}"),
        })
    }

    /// The stock Maven types plus every type configured under `[types]`.
    pub fn type_registry(&self) -> DefaultTypeRegistry {
        let mut registry = DefaultTypeRegistry::new();
        for (name, entry) in &self.types {
            let extension = entry.extension.as_deref().unwrap_or(name);
            let mut artifact_type = ArtifactType::new(name, extension, &entry.classifier);
            artifact_type.default_scope = entry.scope;
            registry.add(artifact_type);
        }
        registry
    }
}
