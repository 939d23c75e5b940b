//! Resolved, downloadable artifacts

use super::{ComponentArtifactIdentifier, ModuleComponentIdentifier};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Describes what must be built before an artifact can be consumed
pub trait TaskDependency: fmt::Debug + Send + Sync {
    /// Paths of the tasks this artifact depends on
    fn task_paths(&self) -> Vec<String>;
}

/// Shared handle to a build dependency description
pub type BuildDependencies = Arc<dyn TaskDependency>;

/// Fixed list of task paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTaskDependency {
    tasks: Vec<String>,
}

impl StaticTaskDependency {
    pub fn new(tasks: Vec<String>) -> Self {
        Self { tasks }
    }

    /// A dependency on nothing
    pub fn none() -> Self {
        Self::default()
    }
}

impl TaskDependency for StaticTaskDependency {
    fn task_paths(&self) -> Vec<String> {
        self.tasks.clone()
    }
}

/// A resolved artifact: identity, local file and build dependencies
///
/// Equality and hashing use the artifact identity only, so the same artifact
/// reached through two variants collapses to one set member.
#[derive(Clone)]
pub struct ResolvedArtifact {
    id: ComponentArtifactIdentifier,
    file: PathBuf,
    build_dependencies: BuildDependencies,
}

impl ResolvedArtifact {
    pub fn new(
        id: ComponentArtifactIdentifier,
        file: impl Into<PathBuf>,
        build_dependencies: BuildDependencies,
    ) -> Self {
        Self {
            id,
            file: file.into(),
            build_dependencies,
        }
    }

    pub fn id(&self) -> &ComponentArtifactIdentifier {
        &self.id
    }

    /// Identifier of the owning component
    pub fn component_id(&self) -> &ModuleComponentIdentifier {
        &self.id.component
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The build dependency handle attached to this artifact
    pub fn build_dependencies(&self) -> BuildDependencies {
        Arc::clone(&self.build_dependencies)
    }
}

impl PartialEq for ResolvedArtifact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ResolvedArtifact {}

impl Hash for ResolvedArtifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedArtifact")
            .field("id", &self.id)
            .field("file", &self.file)
            .finish()
    }
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
