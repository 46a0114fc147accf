//! Shared utilities for arbor.
//!
//! This crate provides the cross-cutting error type used by all other arbor
//! crates, so collaborators and the resolver agree on which failures are
//! recoverable.

pub mod errors;
