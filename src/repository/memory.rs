//! In-memory repository backed by a TOML descriptor
//!
//! The remote view simulates network latency and keeps call statistics,
//! including the highest number of overlapping remote calls seen for a single
//! component. The local view only answers for modules marked `cached`.
//!
//! Descriptor format:
//!
//! ```toml
//! [repository]
//! name = "fixture"
//! latency_ms = 20
//!
//! [[module]]
//! group = "org.example"
//! name = "core"
//! version = "1.0.0"
//!
//! [[module.variant]]
//! name = "runtime"
//! attributes = { "org.gradle.usage" = "java-runtime" }
//!
//! [[module.variant.artifact]]
//! type = "jar"
//! build_dependencies = [":core:jar"]
//! ```

use super::{ModuleComponentRepository, RepositoryAccess};
use crate::domain::{
    ArtifactType, AttributeContainer, ComponentArtifactIdentifier, ComponentArtifactMetadata,
    ComponentOverrideMetadata, ComponentResolveMetadata, DependencyMetadata,
    ModuleComponentIdentifier, ModuleSource, VariantMetadata,
};
use crate::error::{ConfigError, ResolveError};
use crate::result::{
    ArtifactResult, ArtifactSetResult, ComponentArtifactsResult, ComponentMetaDataResult,
    VersionListingResult,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default directory artifact paths are resolved against
const DEFAULT_ROOT: &str = "repository";

/// Parsed repository descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDescriptor>,
}

/// `[repository]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    /// Repository name, also used as its id
    #[serde(default = "default_repository_name")]
    pub name: String,
    /// Simulated latency of every remote call
    #[serde(default)]
    pub latency_ms: u64,
    /// Directory artifact files live under
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_repository_name() -> String {
    "memory".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            name: default_repository_name(),
            latency_ms: 0,
            root: default_root(),
        }
    }
}

/// `[[module]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub group: String,
    pub name: String,
    pub version: String,
    /// Available without a remote call
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub changing: bool,
    /// Remote metadata requests for this module fail with this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantDescriptor>,
}

/// `[[module.variant]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub name: String,
    #[serde(default)]
    pub attributes: AttributeContainer,
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ArtifactDescriptor>,
}

/// `[[module.variant.artifact]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Base name, defaults to the module name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub artifact_type: ArtifactType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Explicit file path, relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub build_dependencies: Vec<String>,
    /// The metadata lists this artifact but its file is absent
    #[serde(default)]
    pub missing: bool,
}

impl RepositoryDescriptor {
    /// Parse a descriptor from TOML text
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let descriptor: Self = toml::from_str(content)
            .map_err(|e| ConfigError::parse_error(origin, e.to_string()))?;

        let mut seen = HashSet::new();
        for module in &descriptor.modules {
            let id = module.id();
            if !seen.insert(id.clone()) {
                return Err(ConfigError::parse_error(
                    origin,
                    format!("duplicate module '{}'", id),
                ));
            }
        }
        Ok(descriptor)
    }

    /// Read and parse a descriptor file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        Self::parse(&content, path)
    }
}

impl ModuleDescriptor {
    fn id(&self) -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new(&self.group, &self.name, &self.version)
    }

    fn to_metadata(
        &self,
        source: &ModuleSource,
        request: &ComponentOverrideMetadata,
    ) -> ComponentResolveMetadata {
        let id = self.id();
        let variants = self
            .variants
            .iter()
            .map(|variant| VariantMetadata {
                name: variant.name.clone(),
                attributes: variant.attributes.clone(),
                artifacts: variant
                    .artifacts
                    .iter()
                    .map(|a| {
                        let name = a.name.clone().unwrap_or_else(|| self.name.clone());
                        ComponentArtifactMetadata::new(ComponentArtifactIdentifier::new(
                            id.clone(),
                            name,
                            a.artifact_type,
                            a.classifier.clone(),
                        ))
                        .with_build_dependencies(a.build_dependencies.clone())
                    })
                    .filter(|a| {
                        request
                            .artifact
                            .as_ref()
                            .is_none_or(|wanted| &a.id.name == wanted)
                    })
                    .collect(),
            })
            .collect();

        ComponentResolveMetadata {
            id,
            source: source.clone(),
            changing: self.changing || request.changing,
            variants,
        }
    }

    fn find_artifact(&self, id: &ComponentArtifactIdentifier) -> Option<&ArtifactDescriptor> {
        self.variants
            .iter()
            .flat_map(|v| v.artifacts.iter())
            .find(|a| {
                a.name.as_deref().unwrap_or(&self.name) == id.name
                    && a.artifact_type == id.artifact_type
                    && a.classifier == id.classifier
            })
    }
}

/// Counters for remote calls
#[derive(Debug, Default)]
pub struct RemoteStats {
    listings: AtomicUsize,
    metadata: AtomicUsize,
    artifact_listings: AtomicUsize,
    artifacts: AtomicUsize,
    max_overlap: AtomicUsize,
    active: Mutex<HashMap<ModuleComponentIdentifier, usize>>,
}

/// Point-in-time copy of `RemoteStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Version listings
    pub listings: usize,
    /// Metadata requests
    pub metadata: usize,
    /// Plain and typed artifact listings
    pub artifact_listings: usize,
    /// Single artifact requests
    pub artifacts: usize,
    /// Most remote calls seen in flight at once for a single component
    pub max_overlap: usize,
}

impl StatsSnapshot {
    pub fn total_calls(&self) -> usize {
        self.listings + self.metadata + self.artifact_listings + self.artifacts
    }
}

impl RemoteStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            listings: self.listings.load(Ordering::SeqCst),
            metadata: self.metadata.load(Ordering::SeqCst),
            artifact_listings: self.artifact_listings.load(Ordering::SeqCst),
            artifacts: self.artifacts.load(Ordering::SeqCst),
            max_overlap: self.max_overlap.load(Ordering::SeqCst),
        }
    }

    fn enter(&self, key: &ModuleComponentIdentifier) {
        let mut active = self.active.lock();
        let count = active.entry(key.clone()).or_default();
        *count += 1;
        self.max_overlap.fetch_max(*count, Ordering::SeqCst);
    }

    fn exit(&self, key: &ModuleComponentIdentifier) {
        let mut active = self.active.lock();
        if let Some(count) = active.get_mut(key) {
            *count -= 1;
            if *count == 0 {
                active.remove(key);
            }
        }
    }
}

/// Shared by the local and remote views
struct RepositoryState {
    settings: RepositorySettings,
    modules: HashMap<ModuleComponentIdentifier, ModuleDescriptor>,
    stats: RemoteStats,
}

impl RepositoryState {
    fn source(&self) -> ModuleSource {
        ModuleSource::new(&self.settings.name)
    }

    fn versions_of(&self, group: &str, name: &str, cached_only: bool) -> Vec<String> {
        let mut versions: Vec<String> = self
            .modules
            .values()
            .filter(|m| m.group == group && m.name == name && (!cached_only || m.cached))
            .map(|m| m.version.clone())
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    fn artifact_path(&self, module: &ModuleDescriptor, artifact: &ComponentArtifactMetadata) -> PathBuf {
        let explicit = module.find_artifact(&artifact.id).and_then(|a| a.file.clone());
        match explicit {
            Some(file) => self.settings.root.join(file),
            None => {
                let mut path = self.settings.root.clone();
                for part in module.group.split('.') {
                    path.push(part);
                }
                path.push(&module.name);
                path.push(&module.version);
                path.push(artifact.id.file_name());
                path
            }
        }
    }

    fn artifacts_of(
        component: &ComponentResolveMetadata,
        artifact_type: Option<ArtifactType>,
    ) -> Vec<ComponentArtifactMetadata> {
        component
            .artifacts()
            .into_iter()
            .filter(|a| artifact_type.is_none_or(|t| a.artifact_type() == t))
            .cloned()
            .collect()
    }

    fn resolve_file(
        &self,
        artifact: &ComponentArtifactMetadata,
        source: &ModuleSource,
        result: &mut ArtifactResult,
    ) {
        if source.repository_id() != self.settings.name {
            result.failed(ResolveError::remote_failure(
                artifact.id.to_string(),
                &self.settings.name,
                format!("artifact belongs to repository '{}'", source.repository_id()),
            ));
            return;
        }
        let module = match self.modules.get(artifact.component_id()) {
            Some(m) => m,
            None => {
                result.missing();
                return;
            }
        };
        match module.find_artifact(&artifact.id) {
            Some(a) if !a.missing => result.resolved(self.artifact_path(module, artifact)),
            _ => result.missing(),
        }
    }
}

/// Compare two version strings numerically part by part
///
/// Numeric parts compare as numbers, anything else lexically. When all shared
/// parts are equal, an extra numeric part makes a version greater and an
/// extra qualifier (`rc1`, `beta`) makes it smaller, so `1.0-rc1 < 1.0 < 1.0.1`.
pub fn compare_versions(a: &str, b: &str) -> CmpOrdering {
    let parts = |s: &str| -> Vec<String> { s.split(['.', '-']).map(str::to_string).collect() };
    let parts_a = parts(a);
    let parts_b = parts(b);

    for (pa, pb) in parts_a.iter().zip(parts_b.iter()) {
        let ord = match (pa.parse::<u64>(), pb.parse::<u64>()) {
            (Ok(na), Ok(nb)) => na.cmp(&nb),
            _ => pa.cmp(pb),
        };
        if ord != CmpOrdering::Equal {
            return ord;
        }
    }

    let extra = |longer: &[String], shorter: &[String]| match longer.get(shorter.len()) {
        Some(part) if part.parse::<u64>().is_err() => CmpOrdering::Less,
        _ => CmpOrdering::Greater,
    };
    match parts_a.len().cmp(&parts_b.len()) {
        CmpOrdering::Greater => extra(&parts_a[..], &parts_b[..]),
        CmpOrdering::Less => extra(&parts_b[..], &parts_a[..]).reverse(),
        CmpOrdering::Equal => CmpOrdering::Equal,
    }
}

/// Remote view: latency, statistics and injected failures
struct RemoteAccess {
    state: Arc<RepositoryState>,
}

impl RemoteAccess {
    async fn call(&self, key: &ModuleComponentIdentifier, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.state.stats.enter(key);
        // Leaves the overlap table even if the caller is cancelled mid-call.
        let _exit = ExitOnDrop {
            stats: &self.state.stats,
            key,
        };
        if self.state.settings.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.state.settings.latency_ms)).await;
        }
    }
}

struct ExitOnDrop<'a> {
    stats: &'a RemoteStats,
    key: &'a ModuleComponentIdentifier,
}

impl Drop for ExitOnDrop<'_> {
    fn drop(&mut self) {
        self.stats.exit(self.key);
    }
}

#[async_trait]
impl RepositoryAccess for RemoteAccess {
    async fn list_module_versions(
        &self,
        dependency: &DependencyMetadata,
        result: &mut VersionListingResult,
    ) {
        let requested = dependency.requested();
        self.call(&requested.to_component_id(), &self.state.stats.listings)
            .await;
        let versions = self
            .state
            .versions_of(&requested.group, &requested.name, false);
        tracing::debug!(
            repository = %self.state.settings.name,
            module = %requested,
            versions = versions.len(),
            "listed module versions"
        );
        if versions.is_empty() {
            result.missing();
        } else {
            result.resolved(versions);
        }
    }

    async fn resolve_component_meta_data(
        &self,
        id: &ModuleComponentIdentifier,
        request: &ComponentOverrideMetadata,
        result: &mut ComponentMetaDataResult,
    ) {
        self.call(id, &self.state.stats.metadata).await;
        match self.state.modules.get(id) {
            Some(module) => match &module.fail {
                Some(message) => {
                    tracing::debug!(repository = %self.state.settings.name, component = %id, "injected failure");
                    result.failed(ResolveError::remote_failure(
                        id.to_string(),
                        &self.state.settings.name,
                        message,
                    ));
                }
                None => result.resolved(module.to_metadata(&self.state.source(), request)),
            },
            None => result.missing(),
        }
    }

    async fn resolve_artifacts(
        &self,
        component: &ComponentResolveMetadata,
        result: &mut ComponentArtifactsResult,
    ) {
        self.call(component.component_id(), &self.state.stats.artifact_listings)
            .await;
        result.resolved(RepositoryState::artifacts_of(component, None));
    }

    async fn resolve_artifacts_with_type(
        &self,
        component: &ComponentResolveMetadata,
        artifact_type: ArtifactType,
        result: &mut ArtifactSetResult,
    ) {
        self.call(component.component_id(), &self.state.stats.artifact_listings)
            .await;
        result.resolved(RepositoryState::artifacts_of(component, Some(artifact_type)));
    }

    async fn resolve_artifact(
        &self,
        artifact: &ComponentArtifactMetadata,
        source: &ModuleSource,
        result: &mut ArtifactResult,
    ) {
        self.call(artifact.component_id(), &self.state.stats.artifacts)
            .await;
        self.state.resolve_file(artifact, source, result);
    }
}

/// Local view: answers for cached modules only and leaves the sink
/// unresolved otherwise
struct LocalAccess {
    state: Arc<RepositoryState>,
}

impl LocalAccess {
    fn is_cached(&self, id: &ModuleComponentIdentifier) -> bool {
        self.state.modules.get(id).is_some_and(|m| m.cached)
    }
}

#[async_trait]
impl RepositoryAccess for LocalAccess {
    async fn list_module_versions(
        &self,
        dependency: &DependencyMetadata,
        result: &mut VersionListingResult,
    ) {
        let requested = dependency.requested();
        let versions = self
            .state
            .versions_of(&requested.group, &requested.name, true);
        if !versions.is_empty() {
            result.resolved(versions);
        }
    }

    async fn resolve_component_meta_data(
        &self,
        id: &ModuleComponentIdentifier,
        request: &ComponentOverrideMetadata,
        result: &mut ComponentMetaDataResult,
    ) {
        if let Some(module) = self.state.modules.get(id).filter(|m| m.cached) {
            result.resolved(module.to_metadata(&self.state.source(), request));
        }
    }

    async fn resolve_artifacts(
        &self,
        component: &ComponentResolveMetadata,
        result: &mut ComponentArtifactsResult,
    ) {
        if self.is_cached(component.component_id()) {
            result.resolved(RepositoryState::artifacts_of(component, None));
        }
    }

    async fn resolve_artifacts_with_type(
        &self,
        component: &ComponentResolveMetadata,
        artifact_type: ArtifactType,
        result: &mut ArtifactSetResult,
    ) {
        if self.is_cached(component.component_id()) {
            result.resolved(RepositoryState::artifacts_of(component, Some(artifact_type)));
        }
    }

    async fn resolve_artifact(
        &self,
        artifact: &ComponentArtifactMetadata,
        source: &ModuleSource,
        result: &mut ArtifactResult,
    ) {
        if self.is_cached(artifact.component_id()) {
            self.state.resolve_file(artifact, source, result);
        }
    }
}

/// Repository holding every module of a descriptor in memory
pub struct InMemoryRepository {
    state: Arc<RepositoryState>,
    local: Arc<LocalAccess>,
    remote: Arc<RemoteAccess>,
}

impl InMemoryRepository {
    pub fn new(descriptor: RepositoryDescriptor) -> Self {
        let modules = descriptor
            .modules
            .into_iter()
            .map(|m| (m.id(), m))
            .collect();
        let state = Arc::new(RepositoryState {
            settings: descriptor.repository,
            modules,
            stats: RemoteStats::default(),
        });
        Self {
            local: Arc::new(LocalAccess {
                state: Arc::clone(&state),
            }),
            remote: Arc::new(RemoteAccess {
                state: Arc::clone(&state),
            }),
            state,
        }
    }

    /// Load a repository from a descriptor file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(RepositoryDescriptor::from_file(path)?))
    }

    /// Remote call statistics so far
    pub fn stats(&self) -> StatsSnapshot {
        self.state.stats.snapshot()
    }

    /// Number of modules known to the repository
    pub fn module_count(&self) -> usize {
        self.state.modules.len()
    }
}

impl ModuleComponentRepository for InMemoryRepository {
    fn id(&self) -> &str {
        &self.state.settings.name
    }

    fn name(&self) -> &str {
        &self.state.settings.name
    }

    fn local_access(&self) -> Arc<dyn RepositoryAccess> {
        self.local.clone()
    }

    fn remote_access(&self) -> Arc<dyn RepositoryAccess> {
        self.remote.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModuleVersionSelector;

    const DESCRIPTOR: &str = r#"
[repository]
name = "fixture"
root = "/repo"

[[module]]
group = "org.example"
name = "core"
version = "1.0.0"
cached = true

[[module.variant]]
name = "runtime"
attributes = { "org.gradle.usage" = "java-runtime" }

[[module.variant.artifact]]
type = "jar"
build_dependencies = [":core:jar"]

[[module.variant]]
name = "sources"
attributes = { "org.gradle.docstype" = "sources" }

[[module.variant.artifact]]
type = "sources"
missing = true

[[module]]
group = "org.example"
name = "core"
version = "1.10.0"

[[module]]
group = "org.example"
name = "core"
version = "1.2.0"

[[module]]
group = "org.example"
name = "broken"
version = "0.1"
fail = "HTTP 503"
"#;

    fn repository() -> InMemoryRepository {
        let descriptor = RepositoryDescriptor::parse(DESCRIPTOR, Path::new("test.toml")).unwrap();
        InMemoryRepository::new(descriptor)
    }

    fn id(name: &str, version: &str) -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new("org.example", name, version)
    }

    async fn metadata(repo: &InMemoryRepository, id: &ModuleComponentIdentifier) -> ComponentMetaDataResult {
        let mut result = ComponentMetaDataResult::new();
        repo.remote_access()
            .resolve_component_meta_data(id, &ComponentOverrideMetadata::none(), &mut result)
            .await;
        result
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.2.0", "1.10.0"), CmpOrdering::Less);
        assert_eq!(compare_versions("2.0", "1.9.9"), CmpOrdering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.1"), CmpOrdering::Less);
        assert_eq!(compare_versions("1.0.0", "1.0.0"), CmpOrdering::Equal);
        assert_eq!(compare_versions("1.0-beta", "1.0-alpha"), CmpOrdering::Greater);
        assert_eq!(compare_versions("1.0-rc1", "1.0"), CmpOrdering::Less);
        assert_eq!(compare_versions("1.0", "1.0-rc1"), CmpOrdering::Greater);
        assert_eq!(compare_versions("1.0.1", "1.0-rc1"), CmpOrdering::Greater);
        assert_eq!(compare_versions("1.0.1", "1.0"), CmpOrdering::Greater);
    }

    #[test]
    fn test_parse_descriptor() {
        let repo = repository();
        assert_eq!(repo.module_count(), 4);
        assert_eq!(repo.id(), "fixture");
        assert_eq!(repo.name(), "fixture");
    }

    #[test]
    fn test_parse_descriptor_rejects_duplicate_modules() {
        let content = r#"
[[module]]
group = "org.example"
name = "core"
version = "1.0"

[[module]]
group = "org.example"
name = "core"
version = "1.0"
cached = true
"#;
        let err = RepositoryDescriptor::parse(content, Path::new("dup.toml")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("dup.toml"));
        assert!(msg.contains("duplicate module 'org.example:core:1.0'"));
    }

    #[test]
    fn test_parse_descriptor_invalid() {
        let err = RepositoryDescriptor::parse("[[module]]\nname = 1", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = RepositoryDescriptor::parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(descriptor.repository.name, "memory");
        assert_eq!(descriptor.repository.latency_ms, 0);
        assert!(descriptor.modules.is_empty());
    }

    #[tokio::test]
    async fn test_remote_lists_versions_in_order() {
        let repo = repository();
        let dependency =
            DependencyMetadata::new(ModuleVersionSelector::new("org.example", "core", "+"));
        let mut result = VersionListingResult::new();
        repo.remote_access()
            .list_module_versions(&dependency, &mut result)
            .await;
        assert_eq!(
            result.value(),
            Some(&vec![
                "1.0.0".to_string(),
                "1.2.0".to_string(),
                "1.10.0".to_string()
            ])
        );
        assert_eq!(repo.stats().listings, 1);
    }

    #[tokio::test]
    async fn test_remote_listing_unknown_module_is_missing() {
        let repo = repository();
        let dependency =
            DependencyMetadata::new(ModuleVersionSelector::new("org.example", "nope", "+"));
        let mut result = VersionListingResult::new();
        repo.remote_access()
            .list_module_versions(&dependency, &mut result)
            .await;
        assert!(result.has_result());
        assert!(result.value().is_none());
    }

    #[tokio::test]
    async fn test_remote_metadata() {
        let repo = repository();
        let result = metadata(&repo, &id("core", "1.0.0")).await;
        let component = result.value().unwrap();
        assert_eq!(component.source, ModuleSource::new("fixture"));
        assert_eq!(component.variants.len(), 2);
        assert_eq!(component.artifacts().len(), 2);
        assert_eq!(
            component.variants[0].artifacts[0].build_dependencies,
            vec![":core:jar"]
        );
        assert_eq!(repo.stats().metadata, 1);
    }

    #[tokio::test]
    async fn test_remote_metadata_missing_and_failed() {
        let repo = repository();
        let missing = metadata(&repo, &id("core", "9.9")).await;
        assert!(missing.has_result());
        assert!(missing.value().is_none());
        assert!(missing.failure().is_none());

        let failed = metadata(&repo, &id("broken", "0.1")).await;
        assert!(failed.failure().unwrap().to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_override_artifact_restricts_metadata() {
        let repo = repository();
        let mut result = ComponentMetaDataResult::new();
        repo.remote_access()
            .resolve_component_meta_data(
                &id("core", "1.0.0"),
                &ComponentOverrideMetadata::none()
                    .with_artifact("other")
                    .with_changing(true),
                &mut result,
            )
            .await;
        let component = result.value().unwrap();
        assert!(component.artifacts().is_empty());
        assert!(component.changing);
    }

    #[tokio::test]
    async fn test_remote_artifacts_and_typed_artifacts() {
        let repo = repository();
        let component = metadata(&repo, &id("core", "1.0.0")).await.value().cloned().unwrap();

        let mut all = ComponentArtifactsResult::new();
        repo.remote_access().resolve_artifacts(&component, &mut all).await;
        assert_eq!(all.value().map(Vec::len), Some(2));

        let mut sources = ArtifactSetResult::new();
        repo.remote_access()
            .resolve_artifacts_with_type(&component, ArtifactType::Sources, &mut sources)
            .await;
        assert_eq!(sources.value().map(Vec::len), Some(1));

        let mut poms = ArtifactSetResult::new();
        repo.remote_access()
            .resolve_artifacts_with_type(&component, ArtifactType::Pom, &mut poms)
            .await;
        assert_eq!(poms.value().map(Vec::len), Some(0));
        assert_eq!(repo.stats().artifact_listings, 3);
    }

    #[tokio::test]
    async fn test_remote_artifact_file() {
        let repo = repository();
        let component = metadata(&repo, &id("core", "1.0.0")).await.value().cloned().unwrap();
        let jar = component.variants[0].artifacts[0].clone();
        let sources = component.variants[1].artifacts[0].clone();

        let mut file = ArtifactResult::new();
        repo.remote_access()
            .resolve_artifact(&jar, &component.source, &mut file)
            .await;
        assert_eq!(
            file.value(),
            Some(&PathBuf::from("/repo/org/example/core/1.0.0/core-1.0.0.jar"))
        );

        let mut absent = ArtifactResult::new();
        repo.remote_access()
            .resolve_artifact(&sources, &component.source, &mut absent)
            .await;
        assert!(absent.has_result());
        assert!(absent.value().is_none());

        let mut foreign = ArtifactResult::new();
        repo.remote_access()
            .resolve_artifact(&jar, &ModuleSource::new("elsewhere"), &mut foreign)
            .await;
        assert!(foreign.failure().is_some());
    }

    #[tokio::test]
    async fn test_local_answers_only_for_cached_modules() {
        let repo = repository();
        let local = repo.local_access();

        let mut cached = ComponentMetaDataResult::new();
        local
            .resolve_component_meta_data(
                &id("core", "1.0.0"),
                &ComponentOverrideMetadata::none(),
                &mut cached,
            )
            .await;
        assert!(cached.value().is_some());

        let mut uncached = ComponentMetaDataResult::new();
        local
            .resolve_component_meta_data(
                &id("core", "1.2.0"),
                &ComponentOverrideMetadata::none(),
                &mut uncached,
            )
            .await;
        assert!(!uncached.has_result());

        let dependency =
            DependencyMetadata::new(ModuleVersionSelector::new("org.example", "core", "+"));
        let mut versions = VersionListingResult::new();
        local.list_module_versions(&dependency, &mut versions).await;
        assert_eq!(versions.value(), Some(&vec!["1.0.0".to_string()]));

        assert_eq!(repo.stats().total_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stats_record_overlap_without_coordination() {
        let descriptor = RepositoryDescriptor::parse(
            "[repository]\nlatency_ms = 30\n[[module]]\ngroup = \"g\"\nname = \"n\"\nversion = \"1\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        let repo = Arc::new(InMemoryRepository::new(descriptor));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                let mut r = ComponentMetaDataResult::new();
                repo.remote_access()
                    .resolve_component_meta_data(
                        &ModuleComponentIdentifier::new("g", "n", "1"),
                        &ComponentOverrideMetadata::none(),
                        &mut r,
                    )
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = repo.stats();
        assert_eq!(stats.metadata, 4);
        assert!(stats.max_overlap > 1);
    }
}
