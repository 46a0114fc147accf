//! Maven repository layout on the local filesystem.

use std::path::{Path, PathBuf};

use arbor_core::provider::RemoteRepository;

/// A directory laid out like a Maven repository.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    pub id: String,
    pub root: PathBuf,
}

impl LocalRepository {
    pub fn new(id: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.to_string(),
            root: root.into(),
        }
    }

    /// Standard Maven layout path for a given coordinate.
    ///
    /// `org.jetbrains.kotlinx:kotlinx-coroutines-core:1.8.0` becomes
    /// `org/jetbrains/kotlinx/kotlinx-coroutines-core/1.8.0`
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
    }

    /// Directory holding every version of an artifact.
    pub fn artifact_dir(&self, group: &str, artifact: &str) -> PathBuf {
        self.root.join(group.replace('.', "/")).join(artifact)
    }

    /// Path to the POM file for a given coordinate.
    pub fn pom_path(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
        self.root
            .join(Self::coordinate_path(group, artifact, version))
            .join(format!("{artifact}-{version}.pom"))
    }

    /// Path to the artifact-level `maven-metadata.xml` (version listing).
    pub fn metadata_path(&self, group: &str, artifact: &str) -> PathBuf {
        self.artifact_dir(group, artifact).join("maven-metadata.xml")
    }

    /// This repository as a provenance reference.
    pub fn as_remote(&self) -> RemoteRepository {
        RemoteRepository::new(&self.id, &file_url(&self.root))
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
