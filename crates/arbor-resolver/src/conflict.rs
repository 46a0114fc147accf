//! Conflict resolution over the unresolved graph: nearest wins, scopes
//! derived along the winning path, optionality settled per conflict key.

use std::collections::HashMap;
use std::fmt;

use arbor_core::config::TieBreak;
use arbor_core::coordinate::ConflictKey;
use arbor_core::dependency::Scope;
use arbor_core::version::MavenVersion;
use arbor_util::errors::{ArborError, ArborResult};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, info};

use crate::graph::UnresolvedGraph;

/// A report of all version conflicts encountered during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A single version conflict where multiple versions of the same artifact
/// were requested but only one was resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionConflict {
    pub group: String,
    pub artifact: String,
    pub requested: String,
    pub resolved: String,
    pub reason: String,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(
                f,
                "  {}:{} requested {} but resolved {} ({})",
                c.group, c.artifact, c.requested, c.resolved, c.reason
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} -> {} ({})",
            self.group, self.artifact, self.requested, self.resolved, self.reason
        )
    }
}

/// Final scope and optionality of a surviving node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub scope: Scope,
    pub optional: bool,
}

/// The unresolved graph annotated with the winner of every conflict key.
#[derive(Debug)]
pub struct ResolvedGraph {
    graph: UnresolvedGraph,
    resolutions: HashMap<NodeIndex, Resolution>,
    pub conflicts: ConflictReport,
}

impl ResolvedGraph {
    pub fn graph(&self) -> &UnresolvedGraph {
        &self.graph
    }

    /// `Some` for the root and for every winning node.
    pub fn resolution(&self, idx: NodeIndex) -> Option<Resolution> {
        self.resolutions.get(&idx).copied()
    }

    pub fn is_winner(&self, idx: NodeIndex) -> bool {
        self.resolutions.contains_key(&idx)
    }

    /// Surviving nodes, root included.
    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }
}

/// Scope of a dependency reached through a parent with the given
/// effective scope.
pub fn derive_scope(parent: Scope, child: Scope) -> Scope {
    match (parent, child) {
        (Scope::Test, _) | (_, Scope::Test) => Scope::Test,
        (Scope::Compile, child) => child,
        (Scope::Runtime, _) => Scope::Runtime,
        (Scope::Provided | Scope::System, _) => parent,
    }
}

/// Pick one winner per conflict key, level by level.
///
/// Only live nodes compete: the root's children and the children of
/// winners. Children of provided nodes never become live. Among live
/// occurrences of a key the shallowest wins; ties at one depth are broken
/// by `tie_break`.
pub fn resolve(graph: UnresolvedGraph, tie_break: TieBreak) -> ArborResult<ResolvedGraph> {
    let root = graph.root();
    let root_node = graph.node(root);

    let mut resolutions = HashMap::new();
    resolutions.insert(
        root,
        Resolution {
            scope: root_node.scope,
            optional: root_node.optional(),
        },
    );

    let mut winners: HashMap<ConflictKey, NodeIndex> = HashMap::new();
    let mut occurrences: HashMap<ConflictKey, Vec<NodeIndex>> = HashMap::new();
    let mut path_optional: HashMap<NodeIndex, bool> = HashMap::new();
    let mut conflicts = ConflictReport::new();
    let mut level = graph.children(root);

    while !level.is_empty() {
        // group this level's occurrences by key, keeping first-seen order
        let mut groups: Vec<(ConflictKey, Vec<NodeIndex>)> = Vec::new();
        let mut slots: HashMap<ConflictKey, usize> = HashMap::new();
        for &idx in &level {
            let node = graph.node(idx);
            let inherited = graph
                .parent(idx)
                .and_then(|p| path_optional.get(&p).copied())
                .unwrap_or(false);
            path_optional.insert(idx, inherited || node.optional());

            let key = node.key();
            occurrences.entry(key.clone()).or_default().push(idx);
            match slots.get(&key) {
                Some(&slot) => groups[slot].1.push(idx),
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push((key, vec![idx]));
                }
            }
        }

        for (key, members) in groups {
            let winner = match winners.get(&key) {
                Some(&earlier) => earlier,
                None => {
                    let winner = pick_winner(&graph, &members, tie_break).ok_or_else(|| {
                        ArborError::ConflictInvariant {
                            message: format!("no candidate left for {key}"),
                        }
                    })?;
                    let scope = effective_scope(&graph, &resolutions, winner)?;
                    resolutions.insert(
                        winner,
                        Resolution {
                            scope,
                            optional: false,
                        },
                    );
                    winners.insert(key, winner);
                    winner
                }
            };
            for &loser in members.iter().filter(|&&m| m != winner) {
                record_conflict(&graph, winner, loser, tie_break, &mut conflicts);
            }
        }

        let mut next = Vec::new();
        for &idx in &level {
            if resolutions.contains_key(&idx) && graph.node(idx).scope != Scope::Provided {
                next.extend(graph.children(idx));
            }
        }
        level = next;
    }

    for (key, winner) in &winners {
        let optional = occurrences
            .get(key)
            .map(|all| all.iter().all(|idx| path_optional.get(idx).copied().unwrap_or(false)))
            .unwrap_or(false);
        if let Some(resolution) = resolutions.get_mut(winner) {
            resolution.optional = optional;
        }
    }

    info!(
        nodes = graph.len(),
        winners = winners.len(),
        conflicts = conflicts.len(),
        "resolved dependency conflicts"
    );

    Ok(ResolvedGraph {
        graph,
        resolutions,
        conflicts,
    })
}

fn pick_winner(graph: &UnresolvedGraph, members: &[NodeIndex], tie_break: TieBreak) -> Option<NodeIndex> {
    match tie_break {
        TieBreak::FirstDeclared => members.first().copied(),
        TieBreak::HighestVersion => {
            let version = |idx: NodeIndex| MavenVersion::parse(&graph.node(idx).coordinate().version);
            members.iter().copied().fold(None, |best, idx| match best {
                Some(b) if version(idx) <= version(b) => Some(b),
                _ => Some(idx),
            })
        }
    }
}

fn effective_scope(
    graph: &UnresolvedGraph,
    resolutions: &HashMap<NodeIndex, Resolution>,
    winner: NodeIndex,
) -> ArborResult<Scope> {
    let declared = graph.node(winner).scope;
    let parent = graph
        .parent(winner)
        .ok_or_else(|| ArborError::ConflictInvariant {
            message: format!("{} has no parent", graph.node(winner)),
        })?;
    if parent == graph.root() {
        return Ok(declared);
    }
    let parent_scope = resolutions
        .get(&parent)
        .map(|r| r.scope)
        .ok_or_else(|| ArborError::ConflictInvariant {
            message: format!("parent of {} did not survive", graph.node(winner)),
        })?;
    Ok(derive_scope(parent_scope, declared))
}

fn record_conflict(
    graph: &UnresolvedGraph,
    winner: NodeIndex,
    loser: NodeIndex,
    tie_break: TieBreak,
    conflicts: &mut ConflictReport,
) {
    let won = graph.node(winner);
    let lost = graph.node(loser);
    if won.coordinate().version == lost.coordinate().version {
        return;
    }
    let reason = if won.depth < lost.depth {
        format!("nearest wins (depth {} vs {})", won.depth, lost.depth)
    } else {
        match tie_break {
            TieBreak::FirstDeclared => format!("first declared wins (depth {})", won.depth),
            TieBreak::HighestVersion => format!("highest version wins (depth {})", won.depth),
        }
    };
    debug!(dependency = %lost.coordinate(), resolved = %won.coordinate().version, %reason, "version conflict");
    conflicts.add(VersionConflict {
        group: lost.coordinate().group.clone(),
        artifact: lost.coordinate().artifact.clone(),
        requested: lost.coordinate().version.clone(),
        resolved: won.coordinate().version.clone(),
        reason,
    });
}
