//! Collaborator interfaces the resolver calls into.
//!
//! Exactly one implementation of each is chosen by the caller and passed in
//! explicitly; nothing here is selected at runtime.

use arbor_util::errors::ArborResult;
use serde::{Deserialize, Serialize};

use crate::coordinate::{ConflictKey, Coordinate};
use crate::dependency::{Dependency, ManagedDependency};
use crate::version::VersionConstraint;

/// A repository a descriptor or version listing was obtained from.
///
/// Two repositories are the same repository when their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.trim_end_matches('/').to_string(),
        }
    }
}

/// The declared dependencies and dependency management of one artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDescriptor {
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<ManagedDependency>,
    pub repositories: Vec<RemoteRepository>,
}

impl ArtifactDescriptor {
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self {
            dependencies,
            ..Self::default()
        }
    }

    pub fn with_managed(mut self, managed: Vec<ManagedDependency>) -> Self {
        self.managed_dependencies = managed;
        self
    }

    pub fn with_repository(mut self, repository: RemoteRepository) -> Self {
        self.repositories.push(repository);
        self
    }
}

/// Source of dependency metadata.
///
/// Implementations fail with `ArborError::MetadataUnavailable` when the
/// descriptor cannot be read or parsed.
pub trait MetadataProvider: Send + Sync {
    fn read_descriptor(&self, coordinate: &Coordinate) -> ArborResult<ArtifactDescriptor>;
}

/// Picks a concrete version for a range.
///
/// Implementations fail with `ArborError::VersionRangeUnsatisfiable` when no
/// available version matches.
pub trait VersionRangeResolver: Send + Sync {
    fn highest_matching(
        &self,
        key: &ConflictKey,
        constraint: &VersionConstraint,
    ) -> ArborResult<String>;
}
