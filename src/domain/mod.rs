//! Core domain models for depcoord
//!
//! This module contains the types the coordination layer passes around:
//! - Module coordinates and requested selectors
//! - Variant attributes
//! - Component and artifact metadata produced by repositories
//! - Resolved artifacts with their build dependencies
//! - Per-component and per-run resolution summaries

mod artifact;
mod attributes;
mod identifier;
mod metadata;
mod summary;

pub use artifact::{BuildDependencies, ResolvedArtifact, StaticTaskDependency, TaskDependency};
pub use attributes::{parse_attribute, AttributeContainer, AttributeValue};
pub use identifier::{
    ComponentOverrideMetadata, DependencyMetadata, ModuleComponentIdentifier,
    ModuleVersionSelector,
};
pub use metadata::{
    ArtifactType, ComponentArtifactIdentifier, ComponentArtifactMetadata,
    ComponentResolveMetadata, ModuleSource, VariantMetadata,
};
pub use summary::{ComponentResolution, ResolutionSummary, SelectorFailure, VariantArtifacts};
