//! Dependency management: version, scope, optionality and exclusion
//! overrides that flow down the tree.

use std::collections::HashMap;

use arbor_core::artifact_type::ArtifactTypeRegistry;
use arbor_core::coordinate::ConflictKey;
use arbor_core::dependency::{Dependency, ManagedDependency, Scope};
use tracing::debug;

/// Managed entries in effect for one subtree, keyed by conflict key.
#[derive(Debug, Clone, Default)]
pub struct Management {
    entries: HashMap<ConflictKey, ManagedDependency>,
}

/// What management replaced on a dependency, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Premanaged {
    pub version: Option<String>,
    pub scope: Option<Scope>,
    pub optional: Option<bool>,
}

impl Management {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries from a single list; later duplicates of a key are ignored.
    pub fn from_list(list: &[ManagedDependency], types: &dyn ArtifactTypeRegistry) -> Self {
        let mut management = Self::new();
        for managed in list {
            management
                .entries
                .entry(managed_key(managed, types))
                .or_insert_with(|| managed.clone());
        }
        management
    }

    /// A copy of `self` with `own` layered on top; `own` wins per key.
    pub fn overridden_by(&self, own: &[ManagedDependency], types: &dyn ArtifactTypeRegistry) -> Self {
        let mut merged = self.clone();
        for (key, managed) in Self::from_list(own, types).entries {
            merged.entries.insert(key, managed);
        }
        merged
    }

    pub fn get(&self, key: &ConflictKey) -> Option<&ManagedDependency> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the entry for `dependency` in place.
    ///
    /// `dependency.scope` must already hold its effective declared scope.
    /// Below depth 1 every managed field overrides the declared one. Direct
    /// dependencies keep what they declare and only take a managed version
    /// or scope where none is declared.
    pub fn apply(&self, dependency: &mut Dependency, declared_scope: Option<Scope>, depth: usize) -> Premanaged {
        let mut premanaged = Premanaged::default();
        let Some(managed) = self.entries.get(&dependency.coordinate.key()) else {
            return premanaged;
        };

        if depth <= 1 {
            if dependency.coordinate.version.is_empty() {
                if let Some(version) = &managed.version {
                    dependency.coordinate.version = version.clone();
                }
            }
            if declared_scope.is_none() {
                if let Some(scope) = managed.scope {
                    dependency.scope = Some(scope);
                }
            }
            return premanaged;
        }

        if let Some(version) = &managed.version {
            if *version != dependency.coordinate.version {
                premanaged.version = Some(std::mem::replace(
                    &mut dependency.coordinate.version,
                    version.clone(),
                ));
            }
        }
        if let Some(scope) = managed.scope {
            if Some(scope) != dependency.scope {
                premanaged.scope = dependency.scope.replace(scope);
            }
        }
        if let Some(optional) = managed.optional {
            if optional != dependency.optional {
                premanaged.optional = Some(dependency.optional);
                dependency.optional = optional;
            }
        }
        for exclusion in &managed.exclusions {
            if !dependency.exclusions.contains(exclusion) {
                dependency.exclusions.push(exclusion.clone());
            }
        }

        if premanaged != Premanaged::default() {
            debug!(
                dependency = %dependency.coordinate,
                premanaged_version = ?premanaged.version,
                premanaged_scope = ?premanaged.scope,
                "applied dependency management"
            );
        }
        premanaged
    }
}

fn managed_key(managed: &ManagedDependency, types: &dyn ArtifactTypeRegistry) -> ConflictKey {
    let artifact_type = types.resolve(managed.type_name.as_deref().unwrap_or("jar"));
    let classifier = if managed.classifier.is_empty() {
        artifact_type.classifier
    } else {
        managed.classifier.clone()
    };
    ConflictKey {
        group: managed.group.clone(),
        artifact: managed.artifact.clone(),
        extension: artifact_type.extension,
        classifier,
    }
}
