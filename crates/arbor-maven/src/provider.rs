//! Metadata provider and version-range resolver backed by Maven-layout
//! directories.

use std::collections::BTreeSet;
use std::fs;

use arbor_core::config::ArborConfig;
use arbor_core::coordinate::{ConflictKey, Coordinate};
use arbor_core::provider::{ArtifactDescriptor, MetadataProvider, VersionRangeResolver};
use arbor_core::version::VersionConstraint;
use arbor_util::errors::{ArborError, ArborResult};
use tracing::{debug, warn};

use crate::metadata;
use crate::pom::{self, Pom};
use crate::repository::LocalRepository;

/// Parent chains and BOM imports deeper than this are treated as broken.
const MAX_INHERITANCE_DEPTH: usize = 16;

/// Ordered list of local repositories; the first one holding a POM wins.
#[derive(Debug, Clone, Default)]
pub struct LocalRepositories {
    repos: Vec<LocalRepository>,
}

impl LocalRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repo: LocalRepository) -> Self {
        self.repos.push(repo);
        self
    }

    /// Repositories from the `[repositories]` table, in id order.
    pub fn from_config(config: &ArborConfig) -> Self {
        let repos = config
            .repositories
            .iter()
            .map(|(id, dir)| LocalRepository::new(id, dir))
            .collect();
        Self { repos }
    }

    pub fn repositories(&self) -> &[LocalRepository] {
        &self.repos
    }

    /// Find and parse the raw POM for a coordinate.
    fn find_pom(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> ArborResult<(Pom, &LocalRepository)> {
        for repo in &self.repos {
            let path = repo.pom_path(group, artifact, version);
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let pom = pom::parse_pom(&content)?;
            debug!(repo = %repo.id, path = %path.display(), "read POM");
            return Ok((pom, repo));
        }
        Err(ArborError::MetadataUnavailable {
            coordinate: format!("{group}:{artifact}:{version}"),
            message: "POM not found in any repository".to_string(),
        })
    }

    /// Load a POM with its parent chain applied, properties interpolated and
    /// BOM imports expanded into its dependency management.
    fn effective_pom(
        &self,
        group: &str,
        artifact: &str,
        version: &str,
        depth: usize,
    ) -> ArborResult<(Pom, &LocalRepository)> {
        if depth > MAX_INHERITANCE_DEPTH {
            return Err(ArborError::MetadataUnavailable {
                coordinate: format!("{group}:{artifact}:{version}"),
                message: "parent or import chain too deep".to_string(),
            });
        }
        let (mut pom, repo) = self.find_pom(group, artifact, version)?;

        if let Some(parent) = pom.parent.clone() {
            let (parent_pom, _) =
                self.effective_pom(&parent.group_id, &parent.artifact_id, &parent.version, depth + 1)?;
            pom.apply_parent(&parent_pom);
        }
        pom.resolve_properties();

        for bom in pom.bom_imports() {
            let Some(ref bom_version) = bom.version else {
                warn!(bom = %bom.artifact_id, "BOM import without version ignored");
                continue;
            };
            let (bom_pom, _) =
                self.effective_pom(&bom.group_id, &bom.artifact_id, bom_version, depth + 1)?;
            pom.merge_management(&bom_pom.dependency_management);
        }
        pom.remove_imports();

        Ok((pom, repo))
    }

    /// Every version of an artifact found across all repositories.
    fn available_versions(&self, group: &str, artifact: &str) -> ArborResult<BTreeSet<String>> {
        let mut versions = BTreeSet::new();
        for repo in &self.repos {
            let meta_path = repo.metadata_path(group, artifact);
            if meta_path.is_file() {
                let meta = metadata::parse_metadata(&fs::read_to_string(&meta_path)?)?;
                versions.extend(meta.versions);
                continue;
            }
            let dir = repo.artifact_dir(group, artifact);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    versions.insert(entry.file_name().to_string_lossy().to_string());
                }
            }
        }
        Ok(versions)
    }
}

impl MetadataProvider for LocalRepositories {
    fn read_descriptor(&self, coordinate: &Coordinate) -> ArborResult<ArtifactDescriptor> {
        let unavailable = |message: String| ArborError::MetadataUnavailable {
            coordinate: coordinate.to_string(),
            message,
        };

        let (pom, repo) = self
            .effective_pom(&coordinate.group, &coordinate.artifact, &coordinate.version, 0)
            .map_err(|e| match e {
                ArborError::MetadataUnavailable { .. } => e,
                other => unavailable(other.to_string()),
            })?;

        let mut dependencies = Vec::with_capacity(pom.dependencies.len());
        for dep in &pom.dependencies {
            let mut dep = dep.clone();
            if dep.version.is_none() {
                dep.version = pom.managed_version(&dep).map(str::to_string);
            }
            dependencies.push(dep.to_dependency().map_err(|e| unavailable(e.to_string()))?);
        }
        let managed = pom
            .dependency_management
            .iter()
            .map(|d| d.to_managed())
            .collect::<ArborResult<Vec<_>>>()
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(ArtifactDescriptor::new(dependencies)
            .with_managed(managed)
            .with_repository(repo.as_remote()))
    }
}

impl VersionRangeResolver for LocalRepositories {
    fn highest_matching(
        &self,
        key: &ConflictKey,
        constraint: &VersionConstraint,
    ) -> ArborResult<String> {
        let unsatisfiable = || ArborError::VersionRangeUnsatisfiable {
            key: key.to_string(),
            range: constraint.to_string(),
        };
        let versions = self
            .available_versions(&key.group, &key.artifact)
            .map_err(|e| {
                warn!(key = %key, error = %e, "failed to list versions");
                unsatisfiable()
            })?;
        constraint
            .highest_of(versions.iter().map(String::as_str))
            .map(|v| v.to_string())
            .ok_or_else(unsatisfiable)
    }
}
