//! Resolution orchestrator for coordinating a whole resolution run
//!
//! This module provides:
//! - Workflow coordination: list versions → select → metadata → artifacts → files
//! - Concurrent resolution of requested modules, bounded by a worker limit
//! - Local-first lookups with coordinated remote fallback
//! - Error collection with partial continuation

use crate::artifact_set::ResolvedArtifactSet;
use crate::cli::{CliArgs, DEFAULT_WORKERS};
use crate::domain::{
    ArtifactType, AttributeContainer, ComponentArtifactIdentifier, ComponentArtifactMetadata,
    ComponentOverrideMetadata, ComponentResolution, ComponentResolveMetadata, DependencyMetadata,
    ModuleComponentIdentifier, ModuleVersionSelector, ResolutionSummary, ResolvedArtifact,
    SelectorFailure, StaticTaskDependency, VariantArtifacts,
};
use crate::error::{ConfigError, ResolveError};
use crate::guard::KeyedGuard;
use crate::progress::Progress;
use crate::repository::{CoordinatingRepository, ModuleComponentRepository};
use crate::result::{
    ArtifactResult, ArtifactSetResult, ComponentArtifactsResult, ComponentMetaDataResult,
    VersionListingResult,
};
use futures::future::try_join_all;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of requested modules resolved at once
    pub workers: usize,
    /// Restrict artifacts to one type
    pub artifact_type: Option<ArtifactType>,
    /// Keep only variants carrying all of these attributes
    pub variant_filter: AttributeContainer,
    /// Per-module time limit, measured once a worker slot is held
    pub timeout: Option<Duration>,
    /// Show a progress bar
    pub show_progress: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            artifact_type: None,
            variant_filter: AttributeContainer::empty(),
            timeout: None,
            show_progress: false,
        }
    }
}

impl OrchestratorConfig {
    /// Build the configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 {
            return Err(ConfigError::InvalidWorkers {
                value: args.workers,
            });
        }
        Ok(Self {
            workers: args.workers,
            artifact_type: args.artifact_type,
            variant_filter: args.variant_filter(),
            timeout: args.timeout.map(Duration::from_secs),
            show_progress: !args.quiet && !args.json,
        })
    }
}

/// Orchestrator for coordinating resolution runs
///
/// Remote calls go through a `CoordinatingRepository`, so concurrent requests
/// that touch the same component never overlap on the remote side.
#[derive(Clone)]
pub struct Orchestrator {
    repository: Arc<dyn ModuleComponentRepository>,
    guard: Arc<KeyedGuard<ModuleComponentIdentifier>>,
    semaphore: Arc<Semaphore>,
    config: Arc<OrchestratorConfig>,
}

impl Orchestrator {
    /// Create an orchestrator over `repository`
    pub fn new(repository: Arc<dyn ModuleComponentRepository>, config: OrchestratorConfig) -> Self {
        Self::with_guard(repository, Arc::new(KeyedGuard::new()), config)
    }

    /// Create an orchestrator sharing an existing guard
    pub fn with_guard(
        repository: Arc<dyn ModuleComponentRepository>,
        guard: Arc<KeyedGuard<ModuleComponentIdentifier>>,
        config: OrchestratorConfig,
    ) -> Self {
        let repository: Arc<dyn ModuleComponentRepository> =
            Arc::new(CoordinatingRepository::new(repository, Arc::clone(&guard)));
        Self {
            repository,
            guard,
            semaphore: Arc::new(Semaphore::new(config.workers.max(1))),
            config: Arc::new(config),
        }
    }

    /// The guard serializing remote calls
    pub fn guard(&self) -> &KeyedGuard<ModuleComponentIdentifier> {
        &self.guard
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Resolve every requested module
    ///
    /// Failures are recorded per request; the remaining requests still run.
    /// A panic inside a resolution task is propagated.
    pub async fn run(&self, requested: &[ModuleVersionSelector]) -> ResolutionSummary {
        let mut progress = Progress::new(self.config.show_progress);
        progress.start(requested.len() as u64, "Resolving modules");

        let mut tasks = JoinSet::new();
        for (index, selector) in requested.iter().cloned().enumerate() {
            let this = self.clone();
            tasks.spawn(async move {
                let outcome = this.resolve(&selector).await;
                (index, selector, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(requested.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    progress.set_message(&format!("Resolved {}", outcome.1));
                    progress.inc();
                    outcomes.push(outcome);
                }
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => tracing::warn!(error = %e, "resolution task cancelled"),
            }
        }
        progress.finish_and_clear();

        outcomes.sort_by_key(|(index, _, _)| *index);
        let mut summary = ResolutionSummary::new(self.repository.name());
        for (_, selector, outcome) in outcomes {
            match outcome {
                Ok(component) => {
                    tracing::info!(
                        requested = %selector,
                        component = %component.id,
                        artifacts = component.artifact_count(),
                        "resolved"
                    );
                    summary.add_component(component);
                }
                Err(error) => {
                    if error.is_not_found() {
                        tracing::info!(requested = %selector, error = %error, "not found");
                    } else {
                        tracing::warn!(requested = %selector, error = %error, "resolution failed");
                    }
                    summary.add_failure(SelectorFailure::new(selector, error));
                }
            }
        }
        summary
    }

    /// Resolve one requested module down to its variant artifact sets
    pub async fn resolve(
        &self,
        selector: &ModuleVersionSelector,
    ) -> Result<ComponentResolution, ResolveError> {
        let _permit = self.semaphore.acquire().await.map_err(|_| {
            ResolveError::remote_failure(
                selector.to_string(),
                self.repository.name(),
                "worker pool closed",
            )
        })?;

        // Dropping the timed-out future releases any component it holds.
        let work = self.resolve_component(selector);
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                ResolveError::timeout(selector.to_string(), self.repository.name())
            })?,
            None => work.await,
        }
    }

    async fn resolve_component(
        &self,
        selector: &ModuleVersionSelector,
    ) -> Result<ComponentResolution, ResolveError> {
        let id = self.select_version(selector).await?;
        let metadata = self.resolve_metadata(&id).await?;
        let listed = self.resolve_component_artifacts(&metadata).await?;

        let variants: Vec<_> = metadata
            .variants
            .iter()
            .filter(|v| v.attributes.contains_all(&self.config.variant_filter))
            .collect();

        // Each distinct artifact is fetched once even when several variants
        // publish it.
        let mut pending: IndexMap<&ComponentArtifactIdentifier, &ComponentArtifactMetadata> =
            IndexMap::new();
        for variant in &variants {
            for artifact in &variant.artifacts {
                if listed.contains_key(&artifact.id) {
                    pending.entry(&artifact.id).or_insert(artifact);
                }
            }
        }
        let files = try_join_all(
            pending
                .values()
                .map(|artifact| self.resolve_file(artifact, &metadata)),
        )
        .await?;
        let resolved: HashMap<&ComponentArtifactIdentifier, ResolvedArtifact> =
            pending.keys().copied().zip(files).collect();

        let mut component =
            ComponentResolution::new(selector.clone(), id).with_changing(metadata.changing);
        for variant in variants {
            let artifacts = variant
                .artifacts
                .iter()
                .filter_map(|a| resolved.get(&a.id).cloned());
            component.add_variant(VariantArtifacts::new(
                &variant.name,
                ResolvedArtifactSet::for_variant(variant.attributes.clone(), artifacts),
            ));
        }
        Ok(component)
    }

    /// List candidate versions and pick the requested one
    async fn select_version(
        &self,
        selector: &ModuleVersionSelector,
    ) -> Result<ModuleComponentIdentifier, ResolveError> {
        let not_found = || ResolveError::module_not_found(selector.to_string(), self.repository.name());

        let dependency = DependencyMetadata::new(selector.clone());
        let mut listing = VersionListingResult::new();
        self.repository
            .remote_access()
            .list_module_versions(&dependency, &mut listing)
            .await;
        let versions = listing.into_result(not_found)?;

        let version = if selector.is_latest() {
            versions.last()
        } else {
            versions.iter().find(|v| **v == selector.version)
        };
        version
            .map(|v| ModuleComponentIdentifier::new(&selector.group, &selector.name, v))
            .ok_or_else(not_found)
    }

    async fn resolve_metadata(
        &self,
        id: &ModuleComponentIdentifier,
    ) -> Result<ComponentResolveMetadata, ResolveError> {
        let request = ComponentOverrideMetadata::none();
        let mut result = ComponentMetaDataResult::new();
        self.repository
            .local_access()
            .resolve_component_meta_data(id, &request, &mut result)
            .await;
        if result.has_result() {
            tracing::debug!(component = %id, "metadata found locally");
        } else {
            self.repository
                .remote_access()
                .resolve_component_meta_data(id, &request, &mut result)
                .await;
        }
        result.into_result(|| ResolveError::component_not_found(id.to_string(), self.repository.name()))
    }

    /// Artifacts the component offers, restricted to the configured type
    async fn resolve_component_artifacts(
        &self,
        component: &ComponentResolveMetadata,
    ) -> Result<HashMap<ComponentArtifactIdentifier, ComponentArtifactMetadata>, ResolveError> {
        let artifacts = match self.config.artifact_type {
            Some(artifact_type) => {
                let mut result = ArtifactSetResult::new();
                self.repository
                    .local_access()
                    .resolve_artifacts_with_type(component, artifact_type, &mut result)
                    .await;
                if !result.has_result() {
                    self.repository
                        .remote_access()
                        .resolve_artifacts_with_type(component, artifact_type, &mut result)
                        .await;
                }
                result
            }
            None => {
                let mut result = ComponentArtifactsResult::new();
                self.repository
                    .local_access()
                    .resolve_artifacts(component, &mut result)
                    .await;
                if !result.has_result() {
                    self.repository
                        .remote_access()
                        .resolve_artifacts(component, &mut result)
                        .await;
                }
                result
            }
        };
        let artifacts = artifacts.into_result(|| {
            ResolveError::component_not_found(component.id.to_string(), self.repository.name())
        })?;
        Ok(artifacts.into_iter().map(|a| (a.id.clone(), a)).collect())
    }

    async fn resolve_file(
        &self,
        artifact: &ComponentArtifactMetadata,
        component: &ComponentResolveMetadata,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let mut result = ArtifactResult::new();
        self.repository
            .local_access()
            .resolve_artifact(artifact, &component.source, &mut result)
            .await;
        if !result.has_result() {
            self.repository
                .remote_access()
                .resolve_artifact(artifact, &component.source, &mut result)
                .await;
        }
        let file = result.into_result(|| {
            ResolveError::artifact_not_found(artifact.id.to_string(), self.repository.name())
        })?;
        Ok(ResolvedArtifact::new(
            artifact.id.clone(),
            file,
            Arc::new(StaticTaskDependency::new(artifact.build_dependencies.clone())),
        ))
    }
}
