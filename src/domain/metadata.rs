//! Resolved component and artifact descriptors
//!
//! These are produced by a repository; the coordination layer only reads
//! their identity fields.

use super::{AttributeContainer, ModuleComponentIdentifier};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of artifact a component publishes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    /// Main binary archive
    #[default]
    Jar,
    /// Source archive
    Sources,
    /// Javadoc archive
    Javadoc,
    /// Maven POM descriptor
    Pom,
    /// Ivy descriptor
    Ivy,
}

impl ArtifactType {
    /// File extension used for this type
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactType::Jar | ArtifactType::Sources | ArtifactType::Javadoc => "jar",
            ArtifactType::Pom => "pom",
            ArtifactType::Ivy => "xml",
        }
    }

    /// Classifier implied by the type, if any
    pub fn default_classifier(&self) -> Option<&'static str> {
        match self {
            ArtifactType::Sources => Some("sources"),
            ArtifactType::Javadoc => Some("javadoc"),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Jar => "jar",
            ArtifactType::Sources => "sources",
            ArtifactType::Javadoc => "javadoc",
            ArtifactType::Pom => "pom",
            ArtifactType::Ivy => "ivy",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jar" => Ok(ArtifactType::Jar),
            "sources" | "source" => Ok(ArtifactType::Sources),
            "javadoc" => Ok(ArtifactType::Javadoc),
            "pom" => Ok(ArtifactType::Pom),
            "ivy" => Ok(ArtifactType::Ivy),
            _ => Err(ConfigError::InvalidArtifactType {
                value: s.to_string(),
            }),
        }
    }
}

/// Opaque token naming the physical repository that produced a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSource {
    repository_id: String,
}

impl ModuleSource {
    pub fn new(repository_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
        }
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }
}

/// Identity of one artifact of a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentArtifactIdentifier {
    /// Owning component
    pub component: ModuleComponentIdentifier,
    /// Artifact base name
    pub name: String,
    /// Artifact type
    pub artifact_type: ArtifactType,
    /// Optional classifier (e.g., "sources", "linux-x86_64")
    pub classifier: Option<String>,
}

impl ComponentArtifactIdentifier {
    pub fn new(
        component: ModuleComponentIdentifier,
        name: impl Into<String>,
        artifact_type: ArtifactType,
        classifier: Option<String>,
    ) -> Self {
        Self {
            component,
            name: name.into(),
            artifact_type,
            classifier,
        }
    }

    /// File name following the `name-version[-classifier].ext` convention
    pub fn file_name(&self) -> String {
        let artifact_type = self.artifact_type;
        let classifier = self
            .classifier
            .as_deref()
            .or(artifact_type.default_classifier());
        match classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.name,
                self.component.version,
                c,
                artifact_type.extension()
            ),
            None => format!(
                "{}-{}.{}",
                self.name,
                self.component.version,
                artifact_type.extension()
            ),
        }
    }
}

impl fmt::Display for ComponentArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name(), self.component)
    }
}

/// Descriptor of one published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentArtifactMetadata {
    /// Artifact identity, including the owning component
    pub id: ComponentArtifactIdentifier,
    /// Task paths that must run before the artifact is usable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_dependencies: Vec<String>,
}

impl ComponentArtifactMetadata {
    pub fn new(id: ComponentArtifactIdentifier) -> Self {
        Self {
            id,
            build_dependencies: Vec::new(),
        }
    }

    /// Adds build dependencies (builder pattern)
    pub fn with_build_dependencies(mut self, tasks: Vec<String>) -> Self {
        self.build_dependencies = tasks;
        self
    }

    /// Identifier of the component that owns this artifact
    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        &self.id.component
    }

    pub fn artifact_type(&self) -> ArtifactType {
        self.id.artifact_type
    }
}

/// A variant: a named, attribute-keyed group of artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMetadata {
    pub name: String,
    pub attributes: AttributeContainer,
    pub artifacts: Vec<ComponentArtifactMetadata>,
}

/// Resolved metadata of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResolveMetadata {
    /// Component identity
    pub id: ModuleComponentIdentifier,
    /// Repository that produced this metadata
    pub source: ModuleSource,
    /// Whether the component may change without a version bump
    #[serde(default)]
    pub changing: bool,
    /// Published variants
    pub variants: Vec<VariantMetadata>,
}

impl ComponentResolveMetadata {
    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        &self.id
    }

    /// All artifacts across variants, first occurrence wins
    pub fn artifacts(&self) -> Vec<&ComponentArtifactMetadata> {
        let mut seen = std::collections::HashSet::new();
        self.variants
            .iter()
            .flat_map(|v| v.artifacts.iter())
            .filter(|a| seen.insert(&a.id))
            .collect()
    }

    /// Variant by name
    pub fn variant(&self, name: &str) -> Option<&VariantMetadata> {
        self.variants.iter().find(|v| v.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component() -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new("org.example", "core", "1.0.0")
    }

    fn artifact(name: &str, t: ArtifactType) -> ComponentArtifactMetadata {
        ComponentArtifactMetadata::new(ComponentArtifactIdentifier::new(
            component(),
            name,
            t,
            None,
        ))
    }

    #[test]
    fn test_artifact_type_parse() {
        assert_eq!("jar".parse::<ArtifactType>().unwrap(), ArtifactType::Jar);
        assert_eq!("Sources".parse::<ArtifactType>().unwrap(), ArtifactType::Sources);
        assert_eq!("ivy".parse::<ArtifactType>().unwrap(), ArtifactType::Ivy);
        assert!("zip".parse::<ArtifactType>().is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(artifact("core", ArtifactType::Jar).id.file_name(), "core-1.0.0.jar");
        assert_eq!(
            artifact("core", ArtifactType::Sources).id.file_name(),
            "core-1.0.0-sources.jar"
        );
        assert_eq!(artifact("core", ArtifactType::Pom).id.file_name(), "core-1.0.0.pom");
        let native = ComponentArtifactIdentifier::new(
            component(),
            "core",
            ArtifactType::Jar,
            Some("linux-x86_64".to_string()),
        );
        assert_eq!(native.file_name(), "core-1.0.0-linux-x86_64.jar");
    }

    #[test]
    fn test_artifact_display_includes_component() {
        let display = format!("{}", artifact("core", ArtifactType::Jar).id);
        assert_eq!(display, "core-1.0.0.jar (org.example:core:1.0.0)");
    }

    #[test]
    fn test_artifact_component_id() {
        let a = artifact("core", ArtifactType::Jar);
        assert_eq!(a.component_id(), &component());
        assert_eq!(a.artifact_type(), ArtifactType::Jar);
    }

    #[test]
    fn test_component_artifacts_deduplicated_across_variants() {
        let jar = artifact("core", ArtifactType::Jar);
        let metadata = ComponentResolveMetadata {
            id: component(),
            source: ModuleSource::new("local"),
            changing: false,
            variants: vec![
                VariantMetadata {
                    name: "api".to_string(),
                    attributes: AttributeContainer::empty().with("usage", "api"),
                    artifacts: vec![jar.clone()],
                },
                VariantMetadata {
                    name: "runtime".to_string(),
                    attributes: AttributeContainer::empty().with("usage", "runtime"),
                    artifacts: vec![jar.clone(), artifact("core", ArtifactType::Sources)],
                },
            ],
        };
        assert_eq!(metadata.artifacts().len(), 2);
        assert!(metadata.variant("runtime").is_some());
        assert!(metadata.variant("missing").is_none());
    }

    #[test]
    fn test_module_source() {
        let source = ModuleSource::new("central");
        assert_eq!(source.repository_id(), "central");
    }
}
