//! Module coordinates: resolved identifiers, requested selectors and the
//! per-request metadata that travels with them

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a resolvable module component (group, name, version)
///
/// This is the key the coordination layer serializes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleComponentIdentifier {
    /// Module group (e.g., "org.apache.commons")
    pub group: String,
    /// Module name (e.g., "commons-lang3")
    pub name: String,
    /// Concrete version, or the version constraint when synthesized from a selector
    pub version: String,
}

impl ModuleComponentIdentifier {
    /// Creates a new identifier
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for ModuleComponentIdentifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, name, version) = split_coordinate(s)?;
        Ok(Self::new(group, name, version))
    }
}

/// A requested module: group, name and a version constraint that has not
/// been resolved yet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleVersionSelector {
    /// Module group
    pub group: String,
    /// Module name
    pub name: String,
    /// Version constraint (an exact version, or `+` for the latest)
    pub version: String,
}

impl ModuleVersionSelector {
    /// Creates a new selector
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identifier synthesized from group, name and the raw constraint
    ///
    /// No resolved identifier exists while candidate versions are listed, so
    /// this stands in as the coordination key for that step.
    pub fn to_component_id(&self) -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new(&self.group, &self.name, &self.version)
    }

    /// Returns true if the constraint asks for the latest available version
    pub fn is_latest(&self) -> bool {
        self.version == "+" || self.version == "latest"
    }
}

impl fmt::Display for ModuleVersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for ModuleVersionSelector {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (group, name, version) = split_coordinate(s)?;
        Ok(Self::new(group, name, version))
    }
}

fn split_coordinate(s: &str) -> Result<(&str, &str, &str), ConfigError> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    match parts.as_slice() {
        [group, name, version]
            if !group.is_empty() && !name.is_empty() && !version.is_empty() =>
        {
            Ok((*group, *name, *version))
        }
        _ => Err(ConfigError::InvalidCoordinate {
            value: s.to_string(),
        }),
    }
}

/// A dependency declaration as seen by the repository layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMetadata {
    /// The requested module
    pub requested: ModuleVersionSelector,
    /// Excluded modules, as `group:name` patterns (`*` matches any part)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Why this dependency was declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DependencyMetadata {
    /// Creates dependency metadata for a selector with no hints
    pub fn new(requested: ModuleVersionSelector) -> Self {
        Self {
            requested,
            excludes: Vec::new(),
            reason: None,
        }
    }

    /// Returns the requested selector
    pub fn requested(&self) -> &ModuleVersionSelector {
        &self.requested
    }
}

/// Caller-supplied overrides forwarded untouched to the repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentOverrideMetadata {
    /// Whether the component is expected to change without a version bump
    #[serde(default)]
    pub changing: bool,
    /// Explicit artifact requested instead of the default one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Client module supplying metadata inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_module: Option<String>,
}

impl ComponentOverrideMetadata {
    /// Overrides that request nothing special
    pub fn none() -> Self {
        Self::default()
    }

    /// Marks the component as changing (builder pattern)
    pub fn with_changing(mut self, changing: bool) -> Self {
        self.changing = changing;
        self
    }

    /// Requests an explicit artifact (builder pattern)
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }
}
