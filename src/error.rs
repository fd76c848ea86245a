//! Error types for the command buildpack
//!
//! All modules use `BuildpackResult<T>` as their return type. Phase-level
//! failures (what the lifecycle sees as an exit code) are `PhaseFailure`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildpack operations
pub type BuildpackResult<T> = Result<T, BuildpackError>;

/// All errors that can occur while detecting or building
#[derive(Error, Debug)]
pub enum BuildpackError {
    // Input errors
    #[error("{key} metadata of incorrect type: {value}")]
    MetadataType { key: String, value: String },

    #[error("Invalid metadata in {path}: {reason}")]
    MetadataInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    // Dependency errors
    #[error("No valid dependencies for {id}, {constraint}, and {stack} in [{candidates}]")]
    DependencyNotFound {
        id: String,
        constraint: String,
        stack: String,
        candidates: String,
    },

    #[error("Ambiguous dependencies for {id}, {constraint}, and {stack}: {count} entries at version {version}")]
    DependencyAmbiguous {
        id: String,
        constraint: String,
        stack: String,
        version: String,
        count: usize,
    },

    #[error("Invalid version constraint {constraint:?} for {id}: {reason}")]
    VersionConstraint {
        id: String,
        constraint: String,
        reason: String,
    },

    #[error("Artifact for {id} {version} not found; searched {searched}")]
    ArtifactNotFound {
        id: String,
        version: String,
        searched: String,
    },

    #[error("Unsupported artifact uri for {id}: {uri}")]
    ArtifactUri { id: String, uri: String },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // Layer errors
    #[error("Failed to extract {archive} to {destination}: {source}")]
    Extract {
        archive: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layer name '{0}': must not contain path separators or '..'")]
    LayerName(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl BuildpackError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error stems from user-supplied input rather than the
    /// filesystem or the buildpack itself
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            Self::MetadataType { .. }
                | Self::MetadataInvalid { .. }
                | Self::ConfigInvalid { .. }
                | Self::PlanInvalid { .. }
                | Self::DependencyNotFound { .. }
                | Self::DependencyAmbiguous { .. }
                | Self::VersionConstraint { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MetadataType { .. } => {
                Some("The build plan entry riff-invoker-command must carry a string `command` in its metadata")
            }
            Self::DependencyNotFound { .. } => {
                Some("Check [[metadata.dependencies]] in buildpack.toml against CNB_STACK_ID")
            }
            Self::ArtifactNotFound { .. } => {
                Some("Populate the buildpack's dependency-cache directory before building offline")
            }
            _ => None,
        }
    }
}

/// Phase-level failure classification reported to the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    /// A component could not be constructed from the build plan
    ComponentInitialization,
    /// A component was constructed but failed to contribute
    ComponentContribution,
    /// Filesystem or other internal failure
    ComponentInternal,
}

impl FailureCode {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ComponentInitialization => 105,
            Self::ComponentContribution => 106,
            Self::ComponentInternal => 107,
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ComponentInitialization => "component initialization",
            Self::ComponentContribution => "component contribution",
            Self::ComponentInternal => "component internal",
        };
        write!(f, "{}", name)
    }
}

/// A phase aborted with a classified failure
#[derive(Error, Debug)]
#[error("{code} failure: {source}")]
pub struct PhaseFailure {
    pub code: FailureCode,
    #[source]
    pub source: BuildpackError,
}

impl PhaseFailure {
    pub fn new(code: FailureCode, source: BuildpackError) -> Self {
        Self { code, source }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        self.code.exit_code()
    }
}
