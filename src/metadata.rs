//! Application and function metadata
//!
//! Function metadata is read from `riff.toml` at the application root.

use crate::error::{BuildpackError, BuildpackResult};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Function metadata file name
pub const METADATA_FILE: &str = "riff.toml";

/// The application being built
#[derive(Debug, Clone)]
pub struct Application {
    root: PathBuf,
}

impl Application {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file under the application root. Leading root and prefix
    /// components are dropped, so `/bin/sh` resolves to `<root>/bin/sh`.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {}
                other => path.push(other),
            }
        }
        path
    }
}

/// Parsed `riff.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Path of the function artifact, relative to the application root
    pub artifact: String,
}

impl Metadata {
    /// Load metadata from the application, the empty default if absent
    pub fn load(application: &Application) -> BuildpackResult<Self> {
        let path = application.root().join(METADATA_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("reading {}", path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&content).map_err(|e| BuildpackError::MetadataInvalid {
            path,
            reason: e.to_string(),
        })
    }
}
