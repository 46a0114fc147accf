//! Artifact coordinates and the version-less conflict key.

use std::fmt;

use arbor_util::errors::{ArborError, ArborResult};
use serde::{Deserialize, Serialize};

/// Immutable artifact coordinate.
///
/// An empty `classifier` means "no classifier". An empty `extension` means the
/// extension has not been resolved from the artifact type yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub extension: String,
}

impl Coordinate {
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier: String::new(),
            extension: String::new(),
        }
    }

    /// Parse `group:artifact:version`, `group:artifact:extension:version` or
    /// `group:artifact:extension:classifier:version`.
    pub fn parse(s: &str) -> ArborResult<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let coord = match parts.as_slice() {
            [g, a, v] => Self::new(g, a, v),
            [g, a, e, v] => Self::new(g, a, v).with_extension(e),
            [g, a, e, c, v] => Self::new(g, a, v).with_extension(e).with_classifier(c),
            _ => {
                return Err(ArborError::Validation {
                    message: format!("malformed coordinate '{s}'"),
                })
            }
        };
        coord.validate()?;
        Ok(coord)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = classifier.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Reject coordinates missing a group or artifact, or containing
    /// separators inside a field.
    pub fn validate(&self) -> ArborResult<()> {
        for (field, value) in [("group", &self.group), ("artifact", &self.artifact)] {
            if value.trim().is_empty() {
                return Err(ArborError::Validation {
                    message: format!("coordinate {self} has an empty {field}"),
                });
            }
        }
        // ranges may contain spaces, so the version only rejects ':'
        let fields = [&self.group, &self.artifact, &self.classifier, &self.extension];
        if self.version.contains(':')
            || fields
                .iter()
                .any(|f| f.contains(':') || f.contains(char::is_whitespace))
        {
            return Err(ArborError::Validation {
                message: format!("coordinate field contains ':' or whitespace in {self}"),
            });
        }
        Ok(())
    }

    /// Version-less identity used for conflict grouping.
    pub fn key(&self) -> ConflictKey {
        ConflictKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            extension: self.extension.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if !self.extension.is_empty() || !self.classifier.is_empty() {
            write!(f, ":{}", self.extension)?;
        }
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// `(group, artifact, extension, classifier)`: two nodes with the same key
/// compete for a single slot in the resolved graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictKey {
    pub group: String,
    pub artifact: String,
    pub extension: String,
    pub classifier: String,
}

impl ConflictKey {
    /// The `group:artifact` pair alone.
    pub fn ga(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        Ok(())
    }
}
