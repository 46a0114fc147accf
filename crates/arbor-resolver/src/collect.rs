//! Entry point: collect the transitive dependency tree of a request.

use arbor_core::artifact_type::ArtifactTypeRegistry;
use arbor_core::config::ResolverSettings;
use arbor_core::coordinate::Coordinate;
use arbor_core::dependency::{Dependency, ManagedDependency};
use arbor_core::provider::{MetadataProvider, RemoteRepository, VersionRangeResolver};
use arbor_util::errors::{ArborError, ArborResult};
use tracing::info;

use crate::builder::GraphBuilder;
use crate::conflict::{self, ConflictReport};
use crate::materialize::{self, DependencyNode};
use crate::selector::SelectorChain;

/// What to collect. All three request shapes reduce to one root, an
/// optional replacement list of direct dependencies, and extra management.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    root: Dependency,
    dependencies: Option<Vec<Dependency>>,
    managed: Vec<ManagedDependency>,
}

impl CollectRequest {
    /// Collect below a root dependency, reading its descriptor.
    pub fn from_dependency(root: Dependency) -> Self {
        Self {
            root,
            dependencies: None,
            managed: Vec::new(),
        }
    }

    /// Collect below a bare coordinate; type and scope take their defaults.
    pub fn from_coordinate(root: Coordinate) -> Self {
        Self::from_dependency(Dependency::new(root))
    }

    /// Collect for a root whose direct dependencies and management are
    /// supplied by the caller. The provider is never asked about the root.
    pub fn from_descriptor(
        root: Coordinate,
        dependencies: Vec<Dependency>,
        managed: Vec<ManagedDependency>,
    ) -> Self {
        Self {
            root: Dependency::new(root),
            dependencies: Some(dependencies),
            managed,
        }
    }

    /// Replace the root's own direct dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    /// Management applied across the whole tree, ahead of the root descriptor's.
    pub fn with_managed_dependencies(mut self, managed: Vec<ManagedDependency>) -> Self {
        self.managed = managed;
        self
    }

    pub fn root(&self) -> &Dependency {
        &self.root
    }
}

/// Collaborators and settings for one collection.
pub struct CollectContext<'a> {
    pub provider: &'a dyn MetadataProvider,
    pub ranges: &'a dyn VersionRangeResolver,
    pub types: &'a dyn ArtifactTypeRegistry,
    pub settings: ResolverSettings,
}

impl<'a> CollectContext<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        ranges: &'a dyn VersionRangeResolver,
        types: &'a dyn ArtifactTypeRegistry,
    ) -> Self {
        Self {
            provider,
            ranges,
            types,
            settings: ResolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A collected tree plus the recoverable failures met on the way.
#[derive(Debug)]
pub struct CollectResult {
    pub root: DependencyNode,
    /// Every repository contributing to the tree, deduplicated by id.
    pub repositories: Vec<RemoteRepository>,
    /// Subtrees left out because their metadata or version could not be
    /// obtained. Each failing coordinate appears once.
    pub errors: Vec<ArborError>,
    pub conflicts: ConflictReport,
}

impl CollectResult {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Build, resolve and materialize the dependency tree for `request`.
///
/// Malformed requests and failures concerning the root abort with an error.
/// Failures below the root only drop the affected subtree and are listed in
/// [`CollectResult::errors`].
pub fn collect(request: &CollectRequest, ctx: &CollectContext<'_>) -> ArborResult<CollectResult> {
    let selectors = SelectorChain::standard(&ctx.settings);
    let built = GraphBuilder::new(ctx.provider, ctx.ranges, ctx.types, selectors).build(
        &request.root,
        request.dependencies.as_deref(),
        &request.managed,
    )?;

    let resolved = conflict::resolve(built.graph, ctx.settings.tie_break)?;
    let (root, repositories) = materialize::materialize(&resolved);

    info!(
        root = %root.coordinate,
        dependencies = root.descendant_count(),
        conflicts = resolved.conflicts.len(),
        errors = built.errors.len(),
        "collected dependencies"
    );

    Ok(CollectResult {
        root,
        repositories,
        errors: built.errors,
        conflicts: resolved.conflicts,
    })
}
