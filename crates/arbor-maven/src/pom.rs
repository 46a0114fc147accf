//! POM file parsing: dependency declarations, parent inheritance, property
//! interpolation, BOM imports.

use std::collections::BTreeMap;

use arbor_core::coordinate::Coordinate;
use arbor_core::dependency::{Dependency, Exclusion, ManagedDependency, Scope};
use arbor_util::errors::{ArborError, ArborResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed POM (Project Object Model) file.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,

    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone, Default)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A dependency declared in a POM file, before conversion to a core
/// [`Dependency`].
#[derive(Debug, Clone, Default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<bool>,
    pub classifier: Option<String>,
    pub type_: Option<String>,
    pub exclusions: Vec<PomExclusion>,
}

/// An exclusion within a dependency declaration.
#[derive(Debug, Clone, Default)]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: Option<String>,
}

impl PomDependency {
    fn type_or_jar(&self) -> &str {
        self.type_.as_deref().unwrap_or("jar")
    }

    fn classifier_or_empty(&self) -> &str {
        self.classifier.as_deref().unwrap_or("")
    }

    /// Whether `other` names the same managed artifact.
    fn same_artifact(&self, other: &PomDependency) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.type_or_jar() == other.type_or_jar()
            && self.classifier_or_empty() == other.classifier_or_empty()
    }

    fn is_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.type_or_jar() == "pom"
    }

    fn parsed_scope(&self) -> ArborResult<Option<Scope>> {
        self.scope.as_deref().map(str::parse).transpose()
    }

    fn core_exclusions(&self) -> Vec<Exclusion> {
        self.exclusions
            .iter()
            .map(|e| Exclusion::new(&e.group_id, e.artifact_id.as_deref().unwrap_or("*")))
            .collect()
    }

    /// Convert to a core dependency. The version must already be known.
    pub fn to_dependency(&self) -> ArborResult<Dependency> {
        let version = self.version.as_deref().unwrap_or_default();
        let mut coordinate = Coordinate::new(&self.group_id, &self.artifact_id, version);
        if let Some(ref classifier) = self.classifier {
            coordinate = coordinate.with_classifier(classifier);
        }
        Ok(Dependency {
            coordinate,
            type_name: self.type_.clone(),
            scope: self.parsed_scope()?,
            optional: self.optional.unwrap_or(false),
            exclusions: self.core_exclusions(),
        })
    }

    /// Convert a `<dependencyManagement>` entry to a core managed dependency.
    pub fn to_managed(&self) -> ArborResult<ManagedDependency> {
        Ok(ManagedDependency {
            group: self.group_id.clone(),
            artifact: self.artifact_id.clone(),
            type_name: self.type_.clone(),
            classifier: self.classifier_or_empty().to_string(),
            version: self.version.clone(),
            scope: self.parsed_scope()?,
            optional: self.optional,
            exclusions: self.core_exclusions(),
        })
    }
}

impl Pom {
    /// Effective group ID (falls back to parent).
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Effective version (falls back to parent).
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// Resolve `${property}` references in a string using POM properties
    /// and built-in project variables. Unknown references are left as-is.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        let mut cursor = 0;
        // bounded so self-referencing properties cannot loop forever
        for _ in 0..64 {
            let Some(start) = result[cursor..].find("${").map(|i| i + cursor) else {
                break;
            };
            let Some(len) = result[start..].find('}') else {
                break;
            };
            let key = &result[start + 2..start + len];
            match self.resolve_property(key) {
                Some(value) => result.replace_range(start..start + len + 1, &value),
                None => cursor = start + len + 1,
            }
        }
        result
    }

    fn resolve_property(&self, key: &str) -> Option<String> {
        match key {
            "project.groupId" | "pom.groupId" => self.effective_group_id().map(str::to_string),
            "project.artifactId" | "pom.artifactId" => self.artifact_id.clone(),
            "project.version" | "pom.version" => self.effective_version().map(str::to_string),
            "project.packaging" | "pom.packaging" => self.packaging.clone(),
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            _ => self.properties.get(key).cloned(),
        }
    }

    /// Interpolate all property references in dependencies and dependency management.
    pub fn resolve_properties(&mut self) {
        let snapshot = self.clone();
        let interpolate_opt = |value: &mut Option<String>| {
            if let Some(v) = value.as_mut() {
                *v = snapshot.interpolate(v);
            }
        };
        for dep in self
            .dependencies
            .iter_mut()
            .chain(self.dependency_management.iter_mut())
        {
            dep.group_id = snapshot.interpolate(&dep.group_id);
            dep.artifact_id = snapshot.interpolate(&dep.artifact_id);
            interpolate_opt(&mut dep.version);
            interpolate_opt(&mut dep.scope);
            interpolate_opt(&mut dep.classifier);
            interpolate_opt(&mut dep.type_);
        }
    }

    /// Merge a parent POM's properties, dependencies and dependency
    /// management into this POM. Entries declared here win.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(str::to_string);
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(str::to_string);
        }
        for dep in &parent.dependencies {
            if !self.dependencies.iter().any(|d| d.same_artifact(dep)) {
                self.dependencies.push(dep.clone());
            }
        }
        self.merge_management(&parent.dependency_management);
    }

    /// Add management entries for artifacts not managed here yet.
    pub fn merge_management(&mut self, entries: &[PomDependency]) {
        for dm in entries {
            if !self.dependency_management.iter().any(|d| d.same_artifact(dm)) {
                self.dependency_management.push(dm.clone());
            }
        }
    }

    /// Look up a version from dependency management for a dependency.
    pub fn managed_version(&self, dep: &PomDependency) -> Option<&str> {
        self.dependency_management
            .iter()
            .find(|d| !d.is_import() && d.same_artifact(dep))
            .and_then(|d| d.version.as_deref())
    }

    /// BOM imports from dependency management
    /// (entries with `scope = "import"` and `type = "pom"`).
    pub fn bom_imports(&self) -> Vec<PomDependency> {
        self.dependency_management
            .iter()
            .filter(|d| d.is_import())
            .cloned()
            .collect()
    }

    /// Drop BOM import entries once they have been expanded.
    pub fn remove_imports(&mut self) {
        self.dependency_management.retain(|d| !d.is_import());
    }
}

/// Parse a POM XML string into a `Pom` struct.
pub fn parse_pom(xml: &str) -> ArborResult<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pom = Pom::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    let mut dep: Option<PomDependency> = None;
    let mut exclusion: Option<PomExclusion> = None;
    let mut parent: Option<ParentRef> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                text.clear();
                match path.join(">").as_str() {
                    "project>dependencies>dependency"
                    | "project>dependencyManagement>dependencies>dependency" => {
                        dep = Some(PomDependency::default());
                    }
                    "project>parent" => parent = Some(ParentRef::default()),
                    ctx if ctx.ends_with(">dependency>exclusions>exclusion") && dep.is_some() => {
                        exclusion = Some(PomExclusion::default());
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                text = e
                    .unescape()
                    .map_err(|err| ArborError::Pom {
                        message: format!("Failed to parse POM XML: {err}"),
                    })?
                    .to_string();
            }
            Ok(Event::End(_)) => {
                let ctx = path.join(">");
                let leaf = path.last().map(String::as_str).unwrap_or_default();

                if path.len() == 3 && path[1] == "properties" {
                    pom.properties.insert(leaf.to_string(), text.clone());
                }

                if let Some(ref mut excl) = exclusion {
                    match leaf {
                        "groupId" => excl.group_id = text.clone(),
                        "artifactId" => excl.artifact_id = Some(text.clone()),
                        _ => {}
                    }
                    if ctx.ends_with(">exclusion") {
                        if let (Some(excl), Some(d)) = (exclusion.take(), dep.as_mut()) {
                            d.exclusions.push(excl);
                        }
                    }
                } else if let Some(ref mut d) = dep {
                    if ctx[..ctx.len() - leaf.len()].ends_with("dependency>") {
                        match leaf {
                            "groupId" => d.group_id = text.clone(),
                            "artifactId" => d.artifact_id = text.clone(),
                            "version" => d.version = Some(text.clone()),
                            "scope" => d.scope = Some(text.clone()),
                            "optional" => d.optional = Some(text.trim() == "true"),
                            "classifier" => d.classifier = Some(text.clone()),
                            "type" => d.type_ = Some(text.clone()),
                            _ => {}
                        }
                    }
                    match ctx.as_str() {
                        "project>dependencies>dependency" => {
                            pom.dependencies.extend(dep.take());
                        }
                        "project>dependencyManagement>dependencies>dependency" => {
                            pom.dependency_management.extend(dep.take());
                        }
                        _ => {}
                    }
                }

                if let Some(ref mut p) = parent {
                    match ctx.as_str() {
                        "project>parent>groupId" => p.group_id = text.clone(),
                        "project>parent>artifactId" => p.artifact_id = text.clone(),
                        "project>parent>version" => p.version = text.clone(),
                        "project>parent" => pom.parent = parent.take(),
                        _ => {}
                    }
                }

                match ctx.as_str() {
                    "project>groupId" => pom.group_id = Some(text.clone()),
                    "project>artifactId" => pom.artifact_id = Some(text.clone()),
                    "project>version" => pom.version = Some(text.clone()),
                    "project>packaging" => pom.packaging = Some(text.clone()),
                    _ => {}
                }

                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ArborError::Pom {
                    message: format!("Failed to parse POM XML: {e}"),
                });
            }
            _ => {}
        }
    }

    if pom.artifact_id.is_none() {
        return Err(ArborError::Pom {
            message: "POM has no <artifactId>".to_string(),
        });
    }

    Ok(pom)
}
