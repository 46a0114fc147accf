//! Depth-first construction of the unresolved dependency graph.
//!
//! Starting at the root, every declared dependency is typed, managed,
//! filtered through the selector chain, pinned to a concrete version and
//! then expanded with its own descriptor. Each occurrence becomes its own
//! node; nothing is deduplicated here.

use std::rc::Rc;

use arbor_core::artifact_type::ArtifactTypeRegistry;
use arbor_core::dependency::{Dependency, ManagedDependency, Scope};
use arbor_core::provider::{ArtifactDescriptor, MetadataProvider, VersionRangeResolver};
use arbor_core::version::VersionConstraint;
use arbor_util::errors::{ArborError, ArborResult};
use petgraph::graph::NodeIndex;
use tracing::{debug, info, warn};

use crate::cache::DescriptorCache;
use crate::graph::{GraphNode, UnresolvedGraph};
use crate::management::{Management, Premanaged};
use crate::selector::SelectorChain;

/// The unresolved graph plus every recoverable failure met while building it.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: UnresolvedGraph,
    pub errors: Vec<ArborError>,
}

/// A declared dependency after type resolution and management.
struct Candidate {
    dependency: Dependency,
    premanaged: Premanaged,
}

pub struct GraphBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    ranges: &'a dyn VersionRangeResolver,
    types: &'a dyn ArtifactTypeRegistry,
    selectors: SelectorChain,
    cache: DescriptorCache,
    errors: Vec<ArborError>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        ranges: &'a dyn VersionRangeResolver,
        types: &'a dyn ArtifactTypeRegistry,
        selectors: SelectorChain,
    ) -> Self {
        Self {
            provider,
            ranges,
            types,
            selectors,
            cache: DescriptorCache::new(),
            errors: Vec::new(),
        }
    }

    /// Build the graph below `root`.
    ///
    /// With `direct` set, those dependencies replace the root's own
    /// descriptor and the provider is never asked about the root. `managed`
    /// takes precedence over the root descriptor's dependency management.
    /// Any failure concerning the root itself is returned as an error.
    pub fn build(
        mut self,
        root: &Dependency,
        direct: Option<&[Dependency]>,
        managed: &[ManagedDependency],
    ) -> ArborResult<BuildOutput> {
        validate_root(root, direct)?;

        let Candidate { mut dependency, .. } = self.prepare(root, 0, &Management::new());
        let version_constraint = self.select_version(&mut dependency)?;

        let descriptor = match direct {
            Some(list) => Rc::new(ArtifactDescriptor::new(list.to_vec())),
            None => self
                .cache
                .fetch(&dependency.coordinate, self.provider)?
                .ok_or_else(|| ArborError::MetadataUnavailable {
                    coordinate: dependency.coordinate.to_string(),
                    message: "descriptor read failed earlier".to_string(),
                })?,
        };

        let management = Management::from_list(&descriptor.managed_dependencies, self.types)
            .overridden_by(managed, self.types);

        let scope = dependency.scope.unwrap_or_default();
        let root_label = dependency.coordinate.to_string();
        let mut graph = UnresolvedGraph::new(GraphNode {
            dependency,
            scope,
            depth: 0,
            premanaged_version: None,
            premanaged_scope: None,
            premanaged_optional: None,
            version_constraint,
            repositories: descriptor.repositories.clone(),
        });

        let root_idx = graph.root();
        let mut stack = vec![root_idx];
        self.expand(&mut graph, &descriptor.dependencies, &management, &mut stack)?;

        info!(
            root = %root_label,
            nodes = graph.len(),
            errors = self.errors.len(),
            cache_hits = self.cache.hits(),
            "built dependency graph"
        );

        Ok(BuildOutput {
            graph,
            errors: self.errors,
        })
    }

    /// Attach and recursively expand the children of the node on top of `stack`.
    ///
    /// Recoverable failures drop the offending subtree and are collected;
    /// anything else aborts the build.
    fn expand(
        &mut self,
        graph: &mut UnresolvedGraph,
        children: &[Dependency],
        management: &Management,
        stack: &mut Vec<NodeIndex>,
    ) -> ArborResult<()> {
        let Some(&parent) = stack.last() else {
            return Ok(());
        };
        let depth = graph.node(parent).depth + 1;

        for (position, declared) in children.iter().enumerate() {
            let Candidate {
                mut dependency,
                premanaged,
            } = self.prepare(declared, depth, management);
            let key = dependency.coordinate.key();

            if stack.iter().any(|&idx| graph.node(idx).key() == key) {
                debug!(dependency = %dependency.coordinate, "skipping dependency cycle");
                continue;
            }

            let ancestors: Vec<&GraphNode> = stack.iter().map(|&idx| graph.node(idx)).collect();
            if let Some(selector) = self.selectors.rejected_by(&dependency, &ancestors) {
                debug!(dependency = %dependency.coordinate, selector, "dependency not selected");
                continue;
            }

            let version_constraint = match self.select_version(&mut dependency) {
                Ok(constraint) => constraint,
                Err(e) if e.is_recoverable() => {
                    warn!(dependency = %key, error = %e, "omitting dependency");
                    self.errors.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let descriptor = match self.cache.fetch(&dependency.coordinate, self.provider) {
                Ok(Some(descriptor)) => descriptor,
                Ok(None) => continue,
                Err(e) if e.is_recoverable() => {
                    warn!(dependency = %dependency.coordinate, error = %e, "omitting dependency");
                    self.errors.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let scope = dependency.scope.unwrap_or_default();
            let provided = scope == Scope::Provided;
            let idx = graph.add_child(
                parent,
                GraphNode {
                    dependency,
                    scope,
                    depth,
                    premanaged_version: premanaged.version,
                    premanaged_scope: premanaged.scope,
                    premanaged_optional: premanaged.optional,
                    version_constraint,
                    repositories: descriptor.repositories.clone(),
                },
                position,
            );

            if provided {
                debug!(dependency = %graph.node(idx), "provided dependency is not expanded");
                continue;
            }

            let own;
            let child_management = if descriptor.managed_dependencies.is_empty() {
                management
            } else {
                own = management.overridden_by(&descriptor.managed_dependencies, self.types);
                &own
            };

            stack.push(idx);
            let expanded = self.expand(graph, &descriptor.dependencies, child_management, stack);
            stack.pop();
            expanded?;
        }
        Ok(())
    }

    /// Fill in extension and classifier from the artifact type, settle the
    /// declared scope, then apply management.
    fn prepare(&self, declared: &Dependency, depth: usize, management: &Management) -> Candidate {
        let mut dependency = declared.clone();
        let artifact_type = self
            .types
            .resolve(dependency.type_name.as_deref().unwrap_or("jar"));

        if dependency.coordinate.extension.is_empty() {
            dependency.coordinate.extension = artifact_type.extension.clone();
        }
        if dependency.coordinate.classifier.is_empty() {
            dependency.coordinate.classifier = artifact_type.classifier.clone();
        }

        let declared_scope = dependency.scope;
        dependency.scope = Some(
            declared_scope
                .or(artifact_type.default_scope)
                .unwrap_or_default(),
        );

        let premanaged = management.apply(&mut dependency, declared_scope, depth);
        Candidate {
            dependency,
            premanaged,
        }
    }

    /// Pin a range to the highest matching version.
    ///
    /// Returns the original range when one was declared.
    fn select_version(&self, dependency: &mut Dependency) -> ArborResult<Option<String>> {
        let declared = dependency.coordinate.version.clone();
        if declared.is_empty() {
            return Err(ArborError::MetadataUnavailable {
                coordinate: dependency.coordinate.to_string(),
                message: "no version declared or managed".to_string(),
            });
        }
        if !VersionConstraint::is_range(&declared) {
            return Ok(None);
        }

        let key = dependency.coordinate.key();
        let constraint =
            VersionConstraint::parse(&declared).ok_or_else(|| ArborError::VersionRangeUnsatisfiable {
                key: key.to_string(),
                range: declared.clone(),
            })?;
        let selected = self.ranges.highest_matching(&key, &constraint)?;
        debug!(dependency = %key, range = %declared, version = %selected, "selected version from range");
        dependency.coordinate.version = selected;
        Ok(Some(declared))
    }
}

/// Reject malformed input before any metadata is read.
fn validate_root(root: &Dependency, direct: Option<&[Dependency]>) -> ArborResult<()> {
    root.coordinate.validate()?;
    if root.coordinate.version.trim().is_empty() {
        return Err(ArborError::Validation {
            message: format!("root {} has no version", root.coordinate),
        });
    }
    for dependency in direct.unwrap_or_default() {
        dependency.coordinate.validate()?;
    }
    Ok(())
}
