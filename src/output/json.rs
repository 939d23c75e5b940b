//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of resolution results
//! - Structured per-component, per-variant artifact information

use super::{CollectArtifacts, OutputFormatter, Verbosity};
use crate::domain::{
    ArtifactType, AttributeContainer, ComponentResolution, ResolutionSummary, ResolvedArtifact,
};
use crate::repository::StatsSnapshot;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Repository resolved against
    repository: &'a str,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-component results
    components: Vec<JsonComponent<'a>>,
    /// Failed requests
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<JsonFailure>,
    /// Remote call statistics (only in verbose mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<StatsSnapshot>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    requested: usize,
    resolved: usize,
    failed: usize,
    artifacts: usize,
}

/// JSON representation of a resolved component
#[derive(Serialize)]
struct JsonComponent<'a> {
    /// Requested coordinate
    requested: String,
    /// Resolved coordinate
    id: String,
    changing: bool,
    variants: Vec<JsonVariant<'a>>,
    /// Distinct build dependency task paths
    #[serde(skip_serializing_if = "Vec::is_empty")]
    build_dependencies: Vec<String>,
}

/// JSON representation of a variant
#[derive(Serialize)]
struct JsonVariant<'a> {
    name: &'a str,
    /// Variant attributes, absent for an empty set
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a AttributeContainer>,
    artifacts: Vec<JsonArtifact>,
}

/// JSON representation of a resolved artifact
#[derive(Serialize)]
struct JsonArtifact {
    /// File name following repository conventions
    name: String,
    #[serde(rename = "type")]
    artifact_type: ArtifactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<String>,
    /// Local file
    file: String,
}

/// JSON representation of a failed request
#[derive(Serialize)]
struct JsonFailure {
    requested: String,
    error: String,
}

impl JsonArtifact {
    fn from_resolved(artifact: &ResolvedArtifact) -> Self {
        let id = artifact.id();
        Self {
            name: id.file_name(),
            artifact_type: id.artifact_type,
            classifier: id.classifier.clone(),
            file: artifact.file().display().to_string(),
        }
    }
}

impl JsonFormatter {
    /// Convert a component result to its JSON representation
    fn component_to_json<'a>(&self, component: &'a ComponentResolution) -> JsonComponent<'a> {
        let variants = component
            .variants
            .iter()
            .map(|variant| JsonVariant {
                name: &variant.name,
                attributes: variant.artifacts.variant(),
                artifacts: CollectArtifacts::of(variant)
                    .iter()
                    .map(JsonArtifact::from_resolved)
                    .collect(),
            })
            .collect();

        JsonComponent {
            requested: component.requested.to_string(),
            id: component.id.to_string(),
            changing: component.changing,
            variants,
            build_dependencies: component.task_paths(),
        }
    }

    fn write_json<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, summary: &ResolutionSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            repository: &summary.repository,
            summary: JsonSummary {
                requested: summary.total_requests(),
                resolved: summary.components.len(),
                failed: summary.failures.len(),
                artifacts: summary.total_artifacts(),
            },
            components: summary
                .components
                .iter()
                .map(|c| self.component_to_json(c))
                .collect(),
            failures: summary
                .failures
                .iter()
                .map(|f| JsonFailure {
                    requested: f.requested.to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
            stats: if self.verbosity == Verbosity::Verbose {
                summary.stats
            } else {
                None
            },
        };

        self.write_json(&output, writer)
    }

    fn format_component(
        &self,
        component: &ComponentResolution,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(&self.component_to_json(component), writer)
    }
}
