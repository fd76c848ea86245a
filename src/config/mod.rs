//! Configuration management for the buildpack
//!
//! The buildpack's own configuration is its `buildpack.toml` descriptor.
//! Everything else arrives through CLI arguments and `CNB_*` variables.

pub mod schema;

pub use schema::BuildpackDescriptor;

use crate::catalog::Catalog;
use crate::error::{BuildpackError, BuildpackResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor file name inside the buildpack directory
pub const DESCRIPTOR_FILE: &str = "buildpack.toml";

/// Directory of pre-fetched dependency artifacts inside the buildpack
pub const DEPENDENCY_CACHE_DIR: &str = "dependency-cache";

/// Configuration manager
pub struct ConfigManager {
    buildpack_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at the buildpack directory
    pub fn new(buildpack_dir: impl Into<PathBuf>) -> Self {
        Self {
            buildpack_dir: buildpack_dir.into(),
        }
    }

    /// Get the buildpack directory
    pub fn buildpack_dir(&self) -> &Path {
        &self.buildpack_dir
    }

    /// Get the descriptor path
    pub fn descriptor_path(&self) -> PathBuf {
        self.buildpack_dir.join(DESCRIPTOR_FILE)
    }

    /// Get the offline dependency cache path
    pub fn dependency_cache_dir(&self) -> PathBuf {
        self.buildpack_dir.join(DEPENDENCY_CACHE_DIR)
    }

    /// Load the descriptor, using defaults if not present
    pub fn load(&self) -> BuildpackResult<BuildpackDescriptor> {
        let path = self.descriptor_path();
        if !path.exists() {
            debug!("Descriptor {} not found, using defaults", path.display());
            return Ok(BuildpackDescriptor::default());
        }

        self.load_from_file(&path)
    }

    /// Load the descriptor from a specific file
    pub fn load_from_file(&self, path: &Path) -> BuildpackResult<BuildpackDescriptor> {
        let content = fs::read_to_string(path)
            .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| BuildpackError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the dependency catalog declared by the descriptor
    pub fn catalog(&self) -> BuildpackResult<Catalog> {
        let descriptor = self.load()?;
        debug!(
            "Loaded {} dependencies from {} {}",
            descriptor.metadata.dependencies.len(),
            descriptor.buildpack.id,
            descriptor.buildpack.version
        );
        Ok(Catalog::new(
            descriptor.metadata.dependencies,
            descriptor.metadata.default_versions,
        ))
    }
}
