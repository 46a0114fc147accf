//! Transitive dependency collection: depth-first graph building through
//! pluggable metadata providers, Maven-compatible nearest-wins conflict
//! resolution with scope and optionality propagation, and materialization
//! into an owned tree.

pub mod builder;
pub mod cache;
pub mod collect;
pub mod conflict;
pub mod graph;
pub mod management;
pub mod materialize;
pub mod selector;

pub use collect::{collect, CollectContext, CollectRequest, CollectResult};
pub use materialize::DependencyNode;
