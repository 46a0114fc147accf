use std::fmt;
use std::str::FromStr;

use arbor_util::errors::ArborError;
use serde::{Deserialize, Serialize};

use crate::coordinate::{ConflictKey, Coordinate};

/// Maven-compatible dependency scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ArborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "runtime" => Ok(Self::Runtime),
            "provided" => Ok(Self::Provided),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            other => Err(ArborError::Validation {
                message: format!("unknown dependency scope '{other}'"),
            }),
        }
    }
}

/// A transitive dependency to exclude. Any field may be the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exclusion {
    pub group: String,
    pub artifact: String,
    #[serde(default = "wildcard")]
    pub classifier: String,
    #[serde(default = "wildcard")]
    pub extension: String,
}

fn wildcard() -> String {
    "*".to_string()
}

impl Exclusion {
    /// Exclude every classifier and extension of `group:artifact`.
    pub fn new(group: &str, artifact: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            classifier: wildcard(),
            extension: wildcard(),
        }
    }

    pub fn matches(&self, key: &ConflictKey) -> bool {
        fn field(pattern: &str, value: &str) -> bool {
            pattern == "*" || pattern == value
        }
        field(&self.group, &key.group)
            && field(&self.artifact, &key.artifact)
            && field(&self.classifier, &key.classifier)
            && field(&self.extension, &key.extension)
    }
}

/// A declared dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub coordinate: Coordinate,
    /// Artifact type name such as `jar` or `test-jar`; `None` means `jar`.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// Declared scope; `None` defers to the type's default, then `compile`.
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            type_name: None,
            scope: None,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// Shorthand for `Dependency::new(Coordinate::parse(s)?)`.
    pub fn parse(s: &str) -> Result<Self, ArborError> {
        Coordinate::parse(s).map(Self::new)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_type(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinate)?;
        if let Some(scope) = self.scope {
            write!(f, " ({scope})")?;
        }
        if self.optional {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}

/// A dependency-management entry: overrides applied to any dependency with
/// the same conflict key before it is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDependency {
    pub group: String,
    pub artifact: String,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(default)]
    pub exclusions: Vec<Exclusion>,
}

impl ManagedDependency {
    pub fn new(group: &str, artifact: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            type_name: None,
            classifier: String::new(),
            version: None,
            scope: None,
            optional: None,
            exclusions: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn with_type(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = classifier.to_string();
        self
    }

    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }
}
