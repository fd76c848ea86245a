//! Build plan files
//!
//! Detection writes a [`DetectPlan`] (what this buildpack provides and
//! requires). The build phase receives a [`BuildpackPlan`] holding the
//! entries the lifecycle resolved for this buildpack.

use crate::error::{BuildpackError, BuildpackResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Plan written by a passing detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectPlan {
    #[serde(default)]
    pub provides: Vec<Provided>,

    #[serde(default)]
    pub requires: Vec<Required>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provided {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Required {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default)]
    pub metadata: toml::Table,
}

impl DetectPlan {
    /// A plan that provides `name` and requires it back with `metadata`
    pub fn self_satisfying(name: &str, metadata: toml::Table) -> Self {
        Self {
            provides: vec![Provided {
                name: name.to_string(),
            }],
            requires: vec![Required {
                name: name.to_string(),
                version: String::new(),
                metadata,
            }],
        }
    }

    pub fn write(&self, path: &Path) -> BuildpackResult<()> {
        let content = toml::to_string(self)?;
        fs::write(path, content)
            .map_err(|e| BuildpackError::io(format!("writing plan {}", path.display()), e))
    }

    pub fn read(path: &Path) -> BuildpackResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BuildpackError::io(format!("reading plan {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| BuildpackError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Plan handed to the build phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlan {
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
}

/// A resolved requirement for this buildpack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub metadata: toml::Table,
}

impl BuildpackPlan {
    /// Load the plan, an absent file being an empty plan
    pub fn load(path: &Path) -> BuildpackResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("reading plan {}", path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| BuildpackError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn write(&self, path: &Path) -> BuildpackResult<()> {
        let content = toml::to_string(self)?;
        fs::write(path, content)
            .map_err(|e| BuildpackError::io(format!("writing plan {}", path.display()), e))
    }

    /// All entries named `name` merged into one, `None` if there are none.
    ///
    /// Later entries win: the last non-empty version is kept and metadata
    /// keys from later entries replace earlier ones.
    pub fn shallow_merged(&self, name: &str) -> Option<PlanEntry> {
        let mut entries = self.entries.iter().filter(|e| e.name == name);
        let mut merged = entries.next()?.clone();

        for entry in entries {
            if !entry.version.is_empty() {
                merged.version = entry.version.clone();
            }
            for (key, value) in &entry.metadata {
                merged.metadata.insert(key.clone(), value.clone());
            }
        }

        Some(merged)
    }
}
