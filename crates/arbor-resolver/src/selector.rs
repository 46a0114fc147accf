//! Dependency selectors: predicates that decide whether a candidate child
//! is attached to the graph at all.
//!
//! Selectors see the candidate after management and type resolution, plus
//! the chain of ancestors from the root down to the prospective parent.

use arbor_core::config::ResolverSettings;
use arbor_core::dependency::{Dependency, Scope};

use crate::graph::GraphNode;

pub trait DependencySelector {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// `ancestors[0]` is the root, the last element is the candidate's parent.
    fn accept(&self, candidate: &Dependency, ancestors: &[&GraphNode]) -> bool;
}

/// Rejects candidates matched by an exclusion on any ancestor, the root included.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExclusionSelector;

impl DependencySelector for ExclusionSelector {
    fn name(&self) -> &'static str {
        "exclusion"
    }

    fn accept(&self, candidate: &Dependency, ancestors: &[&GraphNode]) -> bool {
        let key = candidate.coordinate.key();
        !ancestors
            .iter()
            .flat_map(|a| a.dependency.exclusions.iter())
            .any(|e| e.matches(&key))
    }
}

/// Cuts the subtree below optional dependencies.
///
/// Optional direct dependencies are kept; only their own children are
/// dropped. With `include_optional` nothing is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalSelector {
    pub include_optional: bool,
}

impl DependencySelector for OptionalSelector {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn accept(&self, _candidate: &Dependency, ancestors: &[&GraphNode]) -> bool {
        self.include_optional || !ancestors.iter().skip(1).any(|a| a.optional())
    }
}

/// Drops test-scoped dependencies of dependencies.
///
/// A test-scoped candidate survives at depth 1 and 2 so that a direct
/// dependency's own test dependencies still reach conflict resolution,
/// where the test scope keeps them off the compile path.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectScopeSelector;

impl DependencySelector for DirectScopeSelector {
    fn name(&self) -> &'static str {
        "scope"
    }

    fn accept(&self, candidate: &Dependency, ancestors: &[&GraphNode]) -> bool {
        let parent_depth = ancestors.len().saturating_sub(1);
        !(candidate.scope == Some(Scope::Test) && parent_depth >= 2)
    }
}

/// Ordered conjunction of selectors; the first rejection short-circuits.
pub struct SelectorChain {
    selectors: Vec<Box<dyn DependencySelector>>,
}

impl SelectorChain {
    pub fn new() -> Self {
        Self {
            selectors: Vec::new(),
        }
    }

    /// Exclusion, optional and scope selectors, configured from settings.
    pub fn standard(settings: &ResolverSettings) -> Self {
        Self::new()
            .with(ExclusionSelector)
            .with(OptionalSelector {
                include_optional: settings.include_optional,
            })
            .with(DirectScopeSelector)
    }

    pub fn with(mut self, selector: impl DependencySelector + 'static) -> Self {
        self.selectors.push(Box::new(selector));
        self
    }

    /// Name of the first selector rejecting the candidate, if any.
    pub fn rejected_by(&self, candidate: &Dependency, ancestors: &[&GraphNode]) -> Option<&'static str> {
        self.selectors
            .iter()
            .find(|s| !s.accept(candidate, ancestors))
            .map(|s| s.name())
    }

    pub fn accept(&self, candidate: &Dependency, ancestors: &[&GraphNode]) -> bool {
        self.rejected_by(candidate, ancestors).is_none()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl Default for SelectorChain {
    fn default() -> Self {
        Self::standard(&ResolverSettings::default())
    }
}
