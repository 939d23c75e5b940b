//! Coordinating decorator for repository access
//!
//! Wraps a repository's remote access so that concurrent calls about the same
//! component never overlap, while calls about different components run in
//! parallel. Arguments and sinks are forwarded untouched and failures come
//! back exactly as the delegate recorded them.

use super::{ModuleComponentRepository, RepositoryAccess};
use crate::domain::{
    ArtifactType, ComponentArtifactMetadata, ComponentOverrideMetadata, ComponentResolveMetadata,
    DependencyMetadata, ModuleComponentIdentifier, ModuleSource,
};
use crate::guard::KeyedGuard;
use crate::result::{
    ArtifactResult, ArtifactSetResult, ComponentArtifactsResult, ComponentMetaDataResult,
    VersionListingResult,
};
use async_trait::async_trait;
use std::sync::Arc;

/// `RepositoryAccess` that runs every call under a per-component guard
pub struct CoordinatingAccess {
    delegate: Arc<dyn RepositoryAccess>,
    guard: Arc<KeyedGuard<ModuleComponentIdentifier>>,
}

impl CoordinatingAccess {
    pub fn new(
        delegate: Arc<dyn RepositoryAccess>,
        guard: Arc<KeyedGuard<ModuleComponentIdentifier>>,
    ) -> Self {
        Self { delegate, guard }
    }
}

#[async_trait]
impl RepositoryAccess for CoordinatingAccess {
    async fn list_module_versions(
        &self,
        dependency: &DependencyMetadata,
        result: &mut VersionListingResult,
    ) {
        // No resolved identifier exists yet; key on the requested coordinates.
        let key = dependency.requested().to_component_id();
        tracing::debug!(key = %key, "guarded list_module_versions");
        self.guard
            .guard_by_key(key, move || {
                self.delegate.list_module_versions(dependency, result)
            })
            .await;
    }

    async fn resolve_component_meta_data(
        &self,
        id: &ModuleComponentIdentifier,
        request: &ComponentOverrideMetadata,
        result: &mut ComponentMetaDataResult,
    ) {
        tracing::debug!(key = %id, "guarded resolve_component_meta_data");
        self.guard
            .guard_by_key(id.clone(), move || {
                self.delegate.resolve_component_meta_data(id, request, result)
            })
            .await;
    }

    async fn resolve_artifacts(
        &self,
        component: &ComponentResolveMetadata,
        result: &mut ComponentArtifactsResult,
    ) {
        let key = component.component_id().clone();
        tracing::debug!(key = %key, "guarded resolve_artifacts");
        self.guard
            .guard_by_key(key, move || self.delegate.resolve_artifacts(component, result))
            .await;
    }

    async fn resolve_artifacts_with_type(
        &self,
        component: &ComponentResolveMetadata,
        artifact_type: ArtifactType,
        result: &mut ArtifactSetResult,
    ) {
        let key = component.component_id().clone();
        tracing::debug!(key = %key, %artifact_type, "guarded resolve_artifacts_with_type");
        self.guard
            .guard_by_key(key, move || {
                self.delegate
                    .resolve_artifacts_with_type(component, artifact_type, result)
            })
            .await;
    }

    async fn resolve_artifact(
        &self,
        artifact: &ComponentArtifactMetadata,
        source: &ModuleSource,
        result: &mut ArtifactResult,
    ) {
        let key = artifact.component_id().clone();
        tracing::debug!(key = %key, artifact = %artifact.id, "guarded resolve_artifact");
        self.guard
            .guard_by_key(key, move || {
                self.delegate.resolve_artifact(artifact, source, result)
            })
            .await;
    }
}

/// A repository whose remote access is coordinated and whose local access
/// is passed through unchanged
pub struct CoordinatingRepository {
    delegate: Arc<dyn ModuleComponentRepository>,
    local: Arc<dyn RepositoryAccess>,
    remote: Arc<dyn RepositoryAccess>,
}

impl CoordinatingRepository {
    /// Wrap `delegate`, serializing its remote calls through `guard`
    ///
    /// Repositories that share a guard are serialized against each other for
    /// the same component.
    pub fn new(
        delegate: Arc<dyn ModuleComponentRepository>,
        guard: Arc<KeyedGuard<ModuleComponentIdentifier>>,
    ) -> Self {
        let local = delegate.local_access();
        let remote: Arc<dyn RepositoryAccess> =
            Arc::new(CoordinatingAccess::new(delegate.remote_access(), guard));
        Self {
            delegate,
            local,
            remote,
        }
    }
}

impl ModuleComponentRepository for CoordinatingRepository {
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn local_access(&self) -> Arc<dyn RepositoryAccess> {
        Arc::clone(&self.local)
    }

    fn remote_access(&self) -> Arc<dyn RepositoryAccess> {
        Arc::clone(&self.remote)
    }
}
