//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-component listing of variants and their artifacts
//! - Failed requests with their reasons
//! - Build dependencies and remote call statistics in verbose mode

use super::{CollectArtifacts, OutputFormatter, Verbosity};
use crate::domain::{ComponentResolution, ResolutionSummary, VariantArtifacts};
use crate::repository::StatsSnapshot;
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(
        &self,
        summary: &ResolutionSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let line = format!(
            "Resolved {} of {} modules from {} ({} artifacts)",
            summary.components.len(),
            summary.total_requests(),
            summary.repository,
            summary.total_artifacts()
        );
        if summary.has_failures() {
            writeln!(writer, "{}", self.paint(&line, |s| s.yellow().bold()))
        } else {
            writeln!(writer, "{}", self.paint(&line, |s| s.green().bold()))
        }
    }

    fn format_variant(
        &self,
        variant: &VariantArtifacts,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let attributes = variant
            .artifacts
            .variant()
            .map(|a| format!(" {}", a))
            .unwrap_or_default();
        writeln!(
            writer,
            "  {}{}",
            self.paint(&variant.name, |s| s.cyan()),
            self.paint(&attributes, |s| s.dimmed())
        )?;

        let artifacts = CollectArtifacts::of(variant);
        if artifacts.is_empty() {
            return writeln!(writer, "    {}", self.paint("(no artifacts)", |s| s.dimmed()));
        }

        let width = artifacts
            .iter()
            .map(|a| a.id().file_name().len())
            .max()
            .unwrap_or(0);
        for artifact in &artifacts {
            let name = format!("{:width$}", artifact.id().file_name(), width = width);
            writeln!(
                writer,
                "    {}  {}",
                self.paint(&name, |s| s.bright_white()),
                self.paint(&artifact.file().display().to_string(), |s| s.dimmed())
            )?;
        }
        Ok(())
    }

    fn format_stats(&self, stats: &StatsSnapshot, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer)?;
        writeln!(
            writer,
            "Remote calls: {} (listings {}, metadata {}, artifact listings {}, artifacts {})",
            stats.total_calls(),
            stats.listings,
            stats.metadata,
            stats.artifact_listings,
            stats.artifacts
        )?;
        writeln!(
            writer,
            "Max concurrent remote calls per component: {}",
            stats.max_overlap
        )
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, summary: &ResolutionSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        self.format_header(summary, writer)?;

        if self.verbosity != Verbosity::Quiet {
            for component in &summary.components {
                writeln!(writer)?;
                self.format_component(component, writer)?;
            }
        }

        if summary.has_failures() {
            writeln!(writer)?;
            writeln!(writer, "{}", self.paint("Failed:", |s| s.red().bold()))?;
            for failure in &summary.failures {
                writeln!(
                    writer,
                    "  {} {}",
                    self.paint("✗", |s| s.red()),
                    failure
                )?;
            }
        }

        if self.verbosity == Verbosity::Verbose {
            if let Some(stats) = &summary.stats {
                self.format_stats(stats, writer)?;
            }
        }

        Ok(())
    }

    fn format_component(
        &self,
        component: &ComponentResolution,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let changing = if component.changing { " (changing)" } else { "" };
        writeln!(
            writer,
            "{} {} {}{}",
            component.requested,
            self.paint("→", |s| s.dimmed()),
            self.paint(&component.id.to_string(), |s| s.bold()),
            changing
        )?;

        for variant in &component.variants {
            self.format_variant(variant, writer)?;
        }

        if self.verbosity == Verbosity::Verbose {
            let tasks = component.task_paths();
            if !tasks.is_empty() {
                writeln!(writer, "  build dependencies: {}", tasks.join(", "))?;
            }
        }

        Ok(())
    }
}
