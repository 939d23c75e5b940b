//! Repository capabilities and their implementations
//!
//! This module provides:
//! - The `RepositoryAccess` capability every repository exposes
//! - `CoordinatingRepository`, which serializes remote calls per component
//! - `InMemoryRepository`, a descriptor-backed repository with simulated latency

mod coordinating;
mod memory;

pub use coordinating::{CoordinatingAccess, CoordinatingRepository};
pub use memory::{
    compare_versions, InMemoryRepository, RemoteStats, RepositoryDescriptor, StatsSnapshot,
};

use crate::domain::{
    ArtifactType, ComponentArtifactMetadata, ComponentOverrideMetadata, ComponentResolveMetadata,
    DependencyMetadata, ModuleComponentIdentifier, ModuleSource,
};
use crate::result::{
    ArtifactResult, ArtifactSetResult, ComponentArtifactsResult, ComponentMetaDataResult,
    VersionListingResult,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Operations a repository performs on behalf of the resolution engine
///
/// Every call records its outcome into the supplied sink rather than
/// returning it.
#[async_trait]
pub trait RepositoryAccess: Send + Sync {
    /// List the candidate versions of the requested module
    async fn list_module_versions(
        &self,
        dependency: &DependencyMetadata,
        result: &mut VersionListingResult,
    );

    /// Resolve the metadata of one component
    async fn resolve_component_meta_data(
        &self,
        id: &ModuleComponentIdentifier,
        request: &ComponentOverrideMetadata,
        result: &mut ComponentMetaDataResult,
    );

    /// Resolve every artifact of a component
    async fn resolve_artifacts(
        &self,
        component: &ComponentResolveMetadata,
        result: &mut ComponentArtifactsResult,
    );

    /// Resolve the artifacts of a component that have the given type
    async fn resolve_artifacts_with_type(
        &self,
        component: &ComponentResolveMetadata,
        artifact_type: ArtifactType,
        result: &mut ArtifactSetResult,
    );

    /// Resolve one artifact to a local file
    async fn resolve_artifact(
        &self,
        artifact: &ComponentArtifactMetadata,
        source: &ModuleSource,
        result: &mut ArtifactResult,
    );
}

/// A repository with a cheap local view and a remote view
pub trait ModuleComponentRepository: Send + Sync {
    /// Unique id of this repository
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str;

    /// Access that does not leave the machine
    fn local_access(&self) -> Arc<dyn RepositoryAccess>;

    /// Access that may reach the network
    fn remote_access(&self) -> Arc<dyn RepositoryAccess>;
}
