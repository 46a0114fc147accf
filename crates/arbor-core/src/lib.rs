//! Core data types for arbor.
//!
//! This crate defines the values that flow through dependency collection:
//! coordinates and conflict keys, declared and managed dependencies, scopes,
//! Maven version ordering and ranges, artifact types, configuration, and the
//! collaborator traits a resolver consults for metadata.
//!
//! This crate is intentionally free of network I/O.

pub mod artifact_type;
pub mod config;
pub mod coordinate;
pub mod dependency;
pub mod provider;
pub mod version;
