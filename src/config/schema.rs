//! Buildpack descriptor schema
//!
//! The descriptor lives at `<buildpack>/buildpack.toml`.

use crate::catalog::Dependency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root descriptor structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackDescriptor {
    /// Buildpack identity
    pub buildpack: BuildpackInfo,

    /// Stacks the buildpack declares support for
    pub stacks: Vec<StackInfo>,

    /// Buildpack-specific metadata, including the dependency catalog
    pub metadata: BuildpackMetadata,
}

/// `[buildpack]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackInfo {
    /// Buildpack id, e.g. `io.projectriff.command`
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Buildpack version
    pub version: String,
}

impl Default for BuildpackInfo {
    fn default() -> Self {
        Self {
            id: "io.projectriff.command".to_string(),
            name: "riff Command Function Buildpack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `[[stacks]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackInfo {
    pub id: String,
}

/// `[metadata]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildpackMetadata {
    /// Dependencies this buildpack can contribute
    pub dependencies: Vec<Dependency>,

    /// Version constraint used when the build plan does not name one
    pub default_versions: BTreeMap<String, String>,
}
