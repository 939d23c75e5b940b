//! CLI argument parsing module for depcoord

use crate::domain::{
    parse_attribute, ArtifactType, AttributeContainer, AttributeValue, ModuleVersionSelector,
};
use crate::error::ConfigError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Default number of selectors resolved at once
pub const DEFAULT_WORKERS: usize = 8;

fn parse_selector(s: &str) -> Result<ModuleVersionSelector, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

fn parse_artifact_type(s: &str) -> Result<ArtifactType, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

fn parse_variant(s: &str) -> Result<(String, AttributeValue), String> {
    parse_attribute(s).map_err(|e| e.to_string())
}

/// Resolve modules concurrently against a repository
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depcoord",
    version,
    about = "Resolve module artifacts with per-component coordination of remote calls"
)]
pub struct CliArgs {
    /// Modules to resolve as group:name:version ('+' for the latest version)
    #[arg(value_name = "COORDINATES", required = true, value_parser = parse_selector)]
    pub coordinates: Vec<ModuleVersionSelector>,

    /// Repository descriptor (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub repository: PathBuf,

    /// Maximum number of modules resolved at once
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Only resolve artifacts of this type (jar, sources, javadoc, pom, ivy)
    #[arg(short = 't', long = "type", value_name = "TYPE", value_parser = parse_artifact_type)]
    pub artifact_type: Option<ArtifactType>,

    /// Keep only variants carrying this attribute (key=value, can be specified multiple times)
    #[arg(long = "variant", value_name = "KEY=VALUE", action = ArgAction::Append, value_parser = parse_variant)]
    pub variants: Vec<(String, AttributeValue)>,

    /// Give up on a module after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CliArgs {
    /// Attribute filter built from the --variant options
    pub fn variant_filter(&self) -> AttributeContainer {
        self.variants.iter().cloned().collect()
    }

    /// Check if any variant filter is specified
    pub fn has_variant_filter(&self) -> bool {
        !self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> CliArgs {
        let mut all = vec!["depcoord", "--repository", "repo.toml"];
        all.extend(args);
        CliArgs::parse_from(all)
    }

    #[test]
    fn test_default_args() {
        let args = parse(&["org.example:core:1.0"]);
        assert_eq!(args.repository, PathBuf::from("repo.toml"));
        assert_eq!(
            args.coordinates,
            vec![ModuleVersionSelector::new("org.example", "core", "1.0")]
        );
        assert_eq!(args.workers, DEFAULT_WORKERS);
        assert!(args.artifact_type.is_none());
        assert!(args.variants.is_empty());
        assert!(!args.has_variant_filter());
        assert!(args.timeout.is_none());
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_multiple_coordinates() {
        let args = parse(&["a:b:1", "a:c:+", "a:b:1"]);
        assert_eq!(args.coordinates.len(), 3);
        assert!(args.coordinates[1].is_latest());
    }

    #[test]
    fn test_invalid_coordinate() {
        let result = CliArgs::try_parse_from(["depcoord", "-r", "repo.toml", "not-a-coordinate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_coordinates_required() {
        let result = CliArgs::try_parse_from(["depcoord", "-r", "repo.toml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repository_required() {
        let result = CliArgs::try_parse_from(["depcoord", "a:b:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeout() {
        let args = parse(&["--timeout", "30", "a:b:1"]);
        assert_eq!(args.timeout, Some(30));
    }

    #[test]
    fn test_workers() {
        let args = parse(&["--workers", "2", "a:b:1"]);
        assert_eq!(args.workers, 2);

        let args = parse(&["-w", "16", "a:b:1"]);
        assert_eq!(args.workers, 16);
    }

    #[test]
    fn test_artifact_type() {
        let args = parse(&["--type", "sources", "a:b:1"]);
        assert_eq!(args.artifact_type, Some(ArtifactType::Sources));

        let result =
            CliArgs::try_parse_from(["depcoord", "-r", "repo.toml", "--type", "zip", "a:b:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_variant_filters() {
        let args = parse(&[
            "--variant",
            "org.gradle.usage=java-runtime",
            "--variant",
            "org.gradle.jvm.version=17",
            "a:b:1",
        ]);
        assert!(args.has_variant_filter());
        let filter = args.variant_filter();
        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter.get("org.gradle.usage"),
            Some(&AttributeValue::from("java-runtime"))
        );
        assert_eq!(
            filter.get("org.gradle.jvm.version"),
            Some(&AttributeValue::Int(17))
        );
    }

    #[test]
    fn test_invalid_variant_filter() {
        let result =
            CliArgs::try_parse_from(["depcoord", "-r", "repo.toml", "--variant", "usage", "a:b:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_flags() {
        let args = parse(&["--json", "--verbose", "a:b:1"]);
        assert!(args.json);
        assert!(args.verbose);

        let args = parse(&["-q", "a:b:1"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result =
            CliArgs::try_parse_from(["depcoord", "-r", "repo.toml", "-q", "-v", "a:b:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = CliArgs::try_parse_from(["depcoord", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
