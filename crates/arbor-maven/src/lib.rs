//! Maven repository metadata: POM parsing, `maven-metadata.xml` version
//! listings, and a metadata provider over Maven-layout directories.

pub mod metadata;
pub mod pom;
pub mod provider;
pub mod repository;
