//! Result sinks populated by repository operations
//!
//! Every repository call receives a fresh, caller-owned sink and records its
//! outcome there instead of returning a value. Sinks are never shared between
//! calls, so nothing is cached across guarded operations.

use crate::domain::{ComponentArtifactMetadata, ComponentResolveMetadata};
use crate::error::ResolveError;
use std::path::PathBuf;

/// Outcome recorded in a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome<T> {
    /// Nothing recorded yet
    Unresolved,
    /// The operation succeeded
    Resolved(T),
    /// The repository definitively does not have the subject
    Missing,
    /// The operation failed
    Failed(ResolveError),
}

/// A mutable sink for one repository call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildableResult<T> {
    outcome: ResolveOutcome<T>,
}

impl<T> Default for BuildableResult<T> {
    fn default() -> Self {
        Self {
            outcome: ResolveOutcome::Unresolved,
        }
    }
}

impl<T> BuildableResult<T> {
    /// A fresh, unresolved sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful outcome
    pub fn resolved(&mut self, value: T) {
        self.outcome = ResolveOutcome::Resolved(value);
    }

    /// Record that the subject does not exist
    pub fn missing(&mut self) {
        self.outcome = ResolveOutcome::Missing;
    }

    /// Record a failure
    pub fn failed(&mut self, error: ResolveError) {
        self.outcome = ResolveOutcome::Failed(error);
    }

    /// Returns true once any outcome was recorded
    pub fn has_result(&self) -> bool {
        !matches!(self.outcome, ResolveOutcome::Unresolved)
    }

    pub fn outcome(&self) -> &ResolveOutcome<T> {
        &self.outcome
    }

    /// The resolved value, if any
    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            ResolveOutcome::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// The recorded failure, if any
    pub fn failure(&self) -> Option<&ResolveError> {
        match &self.outcome {
            ResolveOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Convert into a `Result`, mapping missing and unresolved outcomes
    /// through `not_found`
    pub fn into_result(
        self,
        not_found: impl FnOnce() -> ResolveError,
    ) -> Result<T, ResolveError> {
        match self.outcome {
            ResolveOutcome::Resolved(v) => Ok(v),
            ResolveOutcome::Failed(e) => Err(e),
            ResolveOutcome::Missing | ResolveOutcome::Unresolved => Err(not_found()),
        }
    }
}

/// Candidate versions of a module
pub type VersionListingResult = BuildableResult<Vec<String>>;

/// Metadata of one component
pub type ComponentMetaDataResult = BuildableResult<ComponentResolveMetadata>;

/// All artifacts of one component
pub type ComponentArtifactsResult = BuildableResult<Vec<ComponentArtifactMetadata>>;

/// Artifacts of one component filtered by type
pub type ArtifactSetResult = BuildableResult<Vec<ComponentArtifactMetadata>>;

/// Local file of one artifact
pub type ArtifactResult = BuildableResult<PathBuf>;
