//! Resolution summary types
//!
//! Provides structures for tracking resolution results per component and for
//! the whole run.

use super::{BuildDependencies, ModuleComponentIdentifier, ModuleVersionSelector};
use crate::artifact_set::ResolvedArtifactSet;
use crate::error::ResolveError;
use crate::repository::StatsSnapshot;
use std::collections::BTreeSet;
use std::fmt;

/// Artifacts resolved for one named variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArtifacts {
    /// Variant name as published by the component
    pub name: String,
    pub artifacts: ResolvedArtifactSet,
}

impl VariantArtifacts {
    pub fn new(name: impl Into<String>, artifacts: ResolvedArtifactSet) -> Self {
        Self {
            name: name.into(),
            artifacts,
        }
    }
}

/// Resolution result for a single requested module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentResolution {
    /// What was asked for
    pub requested: ModuleVersionSelector,
    /// The component the request resolved to
    pub id: ModuleComponentIdentifier,
    /// Whether the component may change without a version bump
    pub changing: bool,
    /// Artifact sets, one per selected variant
    pub variants: Vec<VariantArtifacts>,
}

impl ComponentResolution {
    /// Creates a new ComponentResolution with no variants
    pub fn new(requested: ModuleVersionSelector, id: ModuleComponentIdentifier) -> Self {
        Self {
            requested,
            id,
            changing: false,
            variants: Vec::new(),
        }
    }

    /// Sets the changing flag (builder pattern)
    pub fn with_changing(mut self, changing: bool) -> Self {
        self.changing = changing;
        self
    }

    /// Adds a variant's artifact set
    pub fn add_variant(&mut self, variant: VariantArtifacts) {
        self.variants.push(variant);
    }

    /// Returns the number of artifacts across all variants
    pub fn artifact_count(&self) -> usize {
        self.variants.iter().map(|v| v.artifacts.len()).sum()
    }

    /// Build dependency handles of every artifact, one per artifact per variant
    pub fn build_dependencies(&self) -> Vec<BuildDependencies> {
        let mut dependencies = Vec::new();
        for variant in &self.variants {
            variant.artifacts.collect_build_dependencies(&mut dependencies);
        }
        dependencies
    }

    /// Distinct task paths behind the build dependencies, sorted
    pub fn task_paths(&self) -> Vec<String> {
        self.build_dependencies()
            .iter()
            .flat_map(|d| d.task_paths())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A requested module that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorFailure {
    pub requested: ModuleVersionSelector,
    pub error: ResolveError,
}

impl SelectorFailure {
    pub fn new(requested: ModuleVersionSelector, error: ResolveError) -> Self {
        Self { requested, error }
    }
}

impl fmt::Display for SelectorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.requested, self.error)
    }
}

/// Overall summary of one resolution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Name of the repository resolved against
    pub repository: String,
    /// Successfully resolved components, in request order
    pub components: Vec<ComponentResolution>,
    /// Requests that failed, in request order
    pub failures: Vec<SelectorFailure>,
    /// Remote call statistics, when the repository keeps them
    pub stats: Option<StatsSnapshot>,
}

impl ResolutionSummary {
    /// Creates a new, empty ResolutionSummary
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            components: Vec::new(),
            failures: Vec::new(),
            stats: None,
        }
    }

    /// Adds a resolved component
    pub fn add_component(&mut self, component: ComponentResolution) {
        self.components.push(component);
    }

    /// Adds a failed request
    pub fn add_failure(&mut self, failure: SelectorFailure) {
        self.failures.push(failure);
    }

    /// Attaches remote call statistics (builder pattern)
    pub fn with_stats(mut self, stats: StatsSnapshot) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Returns the number of requests processed
    pub fn total_requests(&self) -> usize {
        self.components.len() + self.failures.len()
    }

    /// Returns the number of artifacts across all components
    pub fn total_artifacts(&self) -> usize {
        self.components.iter().map(|c| c.artifact_count()).sum()
    }

    /// Returns true if any request failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns true if nothing was resolved
    pub fn is_total_failure(&self) -> bool {
        self.components.is_empty() && self.has_failures()
    }
}
