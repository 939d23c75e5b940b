//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ResolveError: failures recorded by a repository into a result sink
//! - ConfigError: issues with CLI options or the repository descriptor

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Resolution related errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures a repository records into a result sink
///
/// Cloneable so that a populated sink can be inspected more than once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No versions of the requested module exist
    #[error("module '{selector}' not found in {repository}")]
    ModuleNotFound {
        selector: String,
        repository: String,
    },

    /// No metadata for the requested component
    #[error("component '{component}' not found in {repository}")]
    ComponentNotFound {
        component: String,
        repository: String,
    },

    /// Artifact could not be located
    #[error("artifact '{artifact}' not found in {repository}")]
    ArtifactNotFound {
        artifact: String,
        repository: String,
    },

    /// The remote repository reported a failure
    #[error("could not resolve '{subject}' from {repository}: {message}")]
    RemoteFailure {
        subject: String,
        repository: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while resolving '{subject}' from {repository}")]
    Timeout {
        subject: String,
        repository: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Coordinate is not `group:name:version`
    #[error("invalid coordinate '{value}': expected 'group:name:version'")]
    InvalidCoordinate { value: String },

    /// Attribute filter is not `key=value`
    #[error("invalid attribute '{value}': expected 'key=value'")]
    InvalidAttribute { value: String },

    /// Unknown artifact type
    #[error("invalid artifact type '{value}': expected 'jar', 'sources', 'javadoc', 'pom', or 'ivy'")]
    InvalidArtifactType { value: String },

    /// Worker count out of range
    #[error("invalid worker count {value}: must be at least 1")]
    InvalidWorkers { value: usize },

    /// Failed to read the repository descriptor
    #[error("failed to read repository descriptor {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the repository descriptor
    #[error("failed to parse repository descriptor {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

impl ResolveError {
    /// Creates a new ModuleNotFound error
    pub fn module_not_found(selector: impl Into<String>, repository: impl Into<String>) -> Self {
        ResolveError::ModuleNotFound {
            selector: selector.into(),
            repository: repository.into(),
        }
    }

    /// Creates a new ComponentNotFound error
    pub fn component_not_found(
        component: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        ResolveError::ComponentNotFound {
            component: component.into(),
            repository: repository.into(),
        }
    }

    /// Creates a new ArtifactNotFound error
    pub fn artifact_not_found(artifact: impl Into<String>, repository: impl Into<String>) -> Self {
        ResolveError::ArtifactNotFound {
            artifact: artifact.into(),
            repository: repository.into(),
        }
    }

    /// Creates a new RemoteFailure error
    pub fn remote_failure(
        subject: impl Into<String>,
        repository: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ResolveError::RemoteFailure {
            subject: subject.into(),
            repository: repository.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(subject: impl Into<String>, repository: impl Into<String>) -> Self {
        ResolveError::Timeout {
            subject: subject.into(),
            repository: repository.into(),
        }
    }

    /// Returns true if the error means the subject simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::ModuleNotFound { .. }
                | ResolveError::ComponentNotFound { .. }
                | ResolveError::ArtifactNotFound { .. }
        )
    }
}

impl ConfigError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_module_not_found() {
        let err = ResolveError::module_not_found("org.example:core:1.+", "local");
        let msg = format!("{}", err);
        assert!(msg.contains("module 'org.example:core:1.+' not found"));
        assert!(msg.contains("local"));
    }

    #[test]
    fn test_resolve_error_component_not_found() {
        let err = ResolveError::component_not_found("org.example:core:1.0", "central");
        let msg = format!("{}", err);
        assert!(msg.contains("component 'org.example:core:1.0' not found"));
    }

    #[test]
    fn test_resolve_error_remote_failure() {
        let err = ResolveError::remote_failure("org.example:core:1.0", "central", "HTTP 503");
        let msg = format!("{}", err);
        assert!(msg.contains("could not resolve"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn test_resolve_error_timeout() {
        let err = ResolveError::timeout("org.example:core:1.0", "central");
        let msg = format!("{}", err);
        assert!(msg.contains("timeout"));
        assert!(msg.contains("central"));
    }

    #[test]
    fn test_resolve_error_is_not_found() {
        assert!(ResolveError::artifact_not_found("core.jar", "local").is_not_found());
        assert!(ResolveError::module_not_found("a:b:c", "local").is_not_found());
        assert!(!ResolveError::timeout("a:b:c", "local").is_not_found());
        assert!(!ResolveError::remote_failure("a:b:c", "local", "boom").is_not_found());
    }

    #[test]
    fn test_resolve_error_clone_eq() {
        let err = ResolveError::timeout("a:b:c", "local");
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_config_error_invalid_coordinate() {
        let err = ConfigError::InvalidCoordinate {
            value: "just-a-name".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("invalid coordinate"));
        assert!(msg.contains("just-a-name"));
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::parse_error("/path/to/repo.toml", "missing field `group`");
        let msg = format!("{}", err);
        assert!(msg.contains("failed to parse repository descriptor"));
        assert!(msg.contains("missing field"));
    }

    #[test]
    fn test_app_error_from_resolve_error() {
        let app_err: AppError = ResolveError::module_not_found("a:b:c", "local").into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("module 'a:b:c' not found"));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::InvalidWorkers { value: 0 }.into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("invalid worker count 0"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ResolveError::timeout("a:b:c", "local");
        let debug = format!("{:?}", err);
        assert!(debug.contains("Timeout"));
    }
}
