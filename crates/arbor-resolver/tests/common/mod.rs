#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use arbor_core::artifact_type::DefaultTypeRegistry;
use arbor_core::config::ResolverSettings;
use arbor_core::coordinate::{ConflictKey, Coordinate};
use arbor_core::dependency::{Dependency, ManagedDependency};
use arbor_core::provider::{
    ArtifactDescriptor, MetadataProvider, RemoteRepository, VersionRangeResolver,
};
use arbor_core::version::VersionConstraint;
use arbor_resolver::{collect, CollectContext, CollectRequest, CollectResult};
use arbor_util::errors::{ArborError, ArborResult};

/// In-memory metadata source keyed by `group:artifact:version`.
#[derive(Default)]
pub struct MemoryRepository {
    descriptors: HashMap<String, ArtifactDescriptor>,
    versions: HashMap<String, Vec<String>>,
    unreadable: HashSet<String>,
    reads: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `coord` (`g:a:v`) with the given direct dependencies.
    pub fn artifact(self, coord: &str, dependencies: Vec<Dependency>) -> Self {
        self.descriptor(coord, ArtifactDescriptor::new(dependencies))
    }

    pub fn descriptor(mut self, coord: &str, descriptor: ArtifactDescriptor) -> Self {
        let parsed = Coordinate::parse(coord).unwrap();
        let descriptor = descriptor.with_repository(RemoteRepository::new("memory", "mem://repo"));
        self.versions
            .entry(format!("{}:{}", parsed.group, parsed.artifact))
            .or_default()
            .push(parsed.version.clone());
        self.descriptors.insert(
            format!("{}:{}:{}", parsed.group, parsed.artifact, parsed.version),
            descriptor,
        );
        self
    }

    pub fn with_managed(self, coord: &str, dependencies: Vec<Dependency>, managed: Vec<ManagedDependency>) -> Self {
        self.descriptor(coord, ArtifactDescriptor::new(dependencies).with_managed(managed))
    }

    /// Make reads of `coord` fail with an I/O error instead of a missing entry.
    pub fn unreadable(mut self, coord: &str) -> Self {
        self.unreadable.insert(coord.to_string());
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MetadataProvider for MemoryRepository {
    fn read_descriptor(&self, coordinate: &Coordinate) -> ArborResult<ArtifactDescriptor> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let key = format!(
            "{}:{}:{}",
            coordinate.group, coordinate.artifact, coordinate.version
        );
        if self.unreadable.contains(&key) {
            return Err(ArborError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("cannot read {key}"),
            )));
        }
        self.descriptors
            .get(&key)
            .cloned()
            .ok_or_else(|| ArborError::MetadataUnavailable {
                coordinate: coordinate.to_string(),
                message: "not in memory repository".to_string(),
            })
    }
}

impl VersionRangeResolver for MemoryRepository {
    fn highest_matching(
        &self,
        key: &ConflictKey,
        constraint: &VersionConstraint,
    ) -> ArborResult<String> {
        self.versions
            .get(&key.ga())
            .and_then(|versions| constraint.highest_of(versions.iter().map(String::as_str)))
            .map(|v| v.to_string())
            .ok_or_else(|| ArborError::VersionRangeUnsatisfiable {
                key: key.to_string(),
                range: constraint.to_string(),
            })
    }
}

pub fn dep(coord: &str) -> Dependency {
    Dependency::parse(coord).unwrap()
}

pub fn root() -> Coordinate {
    Coordinate::parse("com.example:app:1.0").unwrap()
}

pub fn run(repo: &MemoryRepository, request: &CollectRequest) -> ArborResult<CollectResult> {
    run_with(repo, request, ResolverSettings::default())
}

pub fn run_with(
    repo: &MemoryRepository,
    request: &CollectRequest,
    settings: ResolverSettings,
) -> ArborResult<CollectResult> {
    let types = DefaultTypeRegistry::new();
    let ctx = CollectContext::new(repo, repo, &types).with_settings(settings);
    collect(request, &ctx)
}

/// Artifact names of a node's children, in order.
pub fn child_names(node: &arbor_resolver::DependencyNode) -> Vec<&str> {
    node.children
        .iter()
        .map(|c| c.coordinate.artifact.as_str())
        .collect()
}
