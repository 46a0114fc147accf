//! Artifact types: mapping a declared `type` onto extension, classifier and
//! default scope.

use std::collections::HashMap;

use crate::dependency::Scope;

/// The file extension and classifier a dependency type stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactType {
    pub id: String,
    pub extension: String,
    pub classifier: String,
    pub default_scope: Option<Scope>,
}

impl ArtifactType {
    pub fn new(id: &str, extension: &str, classifier: &str) -> Self {
        Self {
            id: id.to_string(),
            extension: extension.to_string(),
            classifier: classifier.to_string(),
            default_scope: None,
        }
    }

    pub fn with_default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = Some(scope);
        self
    }
}

/// Lookup of known artifact types.
pub trait ArtifactTypeRegistry: Send + Sync {
    fn get(&self, type_name: &str) -> Option<ArtifactType>;

    /// Resolve a type, synthesizing one for unknown names: the type name
    /// becomes the extension and the classifier stays empty.
    fn resolve(&self, type_name: &str) -> ArtifactType {
        self.get(type_name)
            .unwrap_or_else(|| ArtifactType::new(type_name, type_name, ""))
    }
}

/// Registry pre-populated with the stock Maven artifact types.
#[derive(Debug, Clone)]
pub struct DefaultTypeRegistry {
    types: HashMap<String, ArtifactType>,
}

impl DefaultTypeRegistry {
    pub fn new() -> Self {
        let stock = [
            ArtifactType::new("pom", "pom", ""),
            ArtifactType::new("jar", "jar", ""),
            ArtifactType::new("maven-plugin", "jar", ""),
            ArtifactType::new("bundle", "jar", ""),
            ArtifactType::new("ejb", "jar", ""),
            ArtifactType::new("ejb-client", "jar", "client"),
            ArtifactType::new("test-jar", "jar", "tests"),
            ArtifactType::new("javadoc", "jar", "javadoc"),
            ArtifactType::new("java-source", "jar", "sources"),
            ArtifactType::new("war", "war", ""),
            ArtifactType::new("ear", "ear", ""),
            ArtifactType::new("rar", "rar", ""),
            ArtifactType::new("par", "par", ""),
        ];
        let mut registry = Self {
            types: HashMap::new(),
        };
        for t in stock {
            registry.add(t);
        }
        registry
    }

    /// Register or replace a type.
    pub fn add(&mut self, artifact_type: ArtifactType) {
        self.types.insert(artifact_type.id.clone(), artifact_type);
    }
}

impl Default for DefaultTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactTypeRegistry for DefaultTypeRegistry {
    fn get(&self, type_name: &str) -> Option<ArtifactType> {
        self.types.get(type_name).cloned()
    }
}
