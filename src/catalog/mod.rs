//! Dependency catalog
//!
//! Versioned, stack-scoped dependency descriptors declared in
//! `buildpack.toml` under `[[metadata.dependencies]]`, and selection of the
//! single best match for a build.

pub mod source;

pub use source::{ArtifactSource, DependencyCache};

use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::Identifiable;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Constraint used when neither the plan nor the descriptor names one
const ANY_VERSION: &str = "*";

/// A named, versioned artifact scoped to a set of stacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Dependency id, matched against build plan entry names
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Semantic version of the artifact
    pub version: Version,

    /// Where the artifact is published
    pub uri: String,

    /// SHA-256 of the artifact, hex encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    /// Stacks the artifact runs on
    #[serde(default)]
    pub stacks: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
}

/// License of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Dependency {
    /// Whether this dependency may be used on the given stack
    pub fn supports(&self, stack: &str) -> bool {
        self.stacks.iter().any(|s| s == stack)
    }

    /// Artifact file name, the last path segment of the uri
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

impl Identifiable for Dependency {
    fn identity(&self) -> (String, String) {
        (self.id.clone(), self.version.to_string())
    }
}

/// The set of dependencies a buildpack can contribute
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dependencies: Vec<Dependency>,
    default_versions: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(dependencies: Vec<Dependency>, default_versions: BTreeMap<String, String>) -> Self {
        Self {
            dependencies,
            default_versions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Constraint to resolve with, falling back to `default_versions` and
    /// then to any version
    fn constraint_for<'a>(&'a self, id: &str, constraint: &'a str) -> &'a str {
        let constraint = constraint.trim();
        if !constraint.is_empty() {
            return constraint;
        }
        self.default_versions
            .get(id)
            .map(|v| v.as_str())
            .unwrap_or(ANY_VERSION)
    }

    /// Select the best dependency for `id` on `stack`.
    ///
    /// A bare version such as `1.2.3` matches that version only; any other
    /// constraint picks the highest version satisfying it. Two descriptors
    /// sharing the winning version are rejected rather than picked between.
    pub fn best(&self, id: &str, constraint: &str, stack: &str) -> BuildpackResult<Dependency> {
        let constraint = self.constraint_for(id, constraint);

        let candidates: Vec<&Dependency> = self
            .dependencies
            .iter()
            .filter(|d| d.id == id && d.supports(stack))
            .collect();

        let winning = match Version::parse(constraint) {
            Ok(exact) => candidates.iter().map(|d| &d.version).find(|v| **v == exact),
            Err(_) => {
                let requirement = VersionReq::parse(constraint).map_err(|e| {
                    BuildpackError::VersionConstraint {
                        id: id.to_string(),
                        constraint: constraint.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                candidates
                    .iter()
                    .map(|d| &d.version)
                    .filter(|v| requirement.matches(v))
                    .max()
            }
        };

        let Some(winning) = winning else {
            let versions: Vec<String> = candidates.iter().map(|d| d.version.to_string()).collect();
            return Err(BuildpackError::DependencyNotFound {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: stack.to_string(),
                candidates: versions.join(", "),
            });
        };

        let matches: Vec<&Dependency> = candidates
            .iter()
            .copied()
            .filter(|d| &d.version == winning)
            .collect();
        Self::single(id, constraint, stack, &matches)
    }

    fn single(
        id: &str,
        constraint: &str,
        stack: &str,
        matches: &[&Dependency],
    ) -> BuildpackResult<Dependency> {
        match matches {
            [dependency] => {
                debug!(
                    "Selected {} {} for constraint {:?} on {}",
                    dependency.id, dependency.version, constraint, stack
                );
                Ok((*dependency).clone())
            }
            _ => Err(BuildpackError::DependencyAmbiguous {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: stack.to_string(),
                version: matches
                    .first()
                    .map(|d| d.version.to_string())
                    .unwrap_or_default(),
                count: matches.len(),
            }),
        }
    }
}
