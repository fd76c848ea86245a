//! Artifact retrieval for catalog dependencies
//!
//! Artifacts are never downloaded here. They are looked up in the
//! buildpack's offline cache (`dependency-cache/<sha256>/<file>`) or read
//! from `file://` uris, and verified against the descriptor's SHA-256.

use crate::catalog::Dependency;
use crate::error::{BuildpackError, BuildpackResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates the artifact of a resolved dependency on the local filesystem
pub trait ArtifactSource {
    fn artifact(&self, dependency: &Dependency) -> BuildpackResult<PathBuf>;
}

/// Offline dependency cache shipped alongside the buildpack
#[derive(Debug, Clone)]
pub struct DependencyCache {
    root: PathBuf,
}

impl DependencyCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache path for a dependency, if it carries a checksum
    fn cached_path(&self, dependency: &Dependency) -> Option<PathBuf> {
        dependency
            .sha256
            .as_ref()
            .map(|sha| self.root.join(sha).join(dependency.file_name()))
    }
}

impl ArtifactSource for DependencyCache {
    fn artifact(&self, dependency: &Dependency) -> BuildpackResult<PathBuf> {
        let mut searched = Vec::new();

        if let Some(path) = self.cached_path(dependency) {
            if path.is_file() {
                debug!("Using cached artifact {}", path.display());
                verify_checksum(&path, dependency.sha256.as_deref())?;
                return Ok(path);
            }
            searched.push(path.display().to_string());
        }

        match dependency.uri.strip_prefix("file://") {
            Some(local) => {
                let path = PathBuf::from(local);
                if path.is_file() {
                    debug!("Using local artifact {}", path.display());
                    verify_checksum(&path, dependency.sha256.as_deref())?;
                    return Ok(path);
                }
                searched.push(path.display().to_string());
            }
            None if searched.is_empty() => {
                return Err(BuildpackError::ArtifactUri {
                    id: dependency.id.clone(),
                    uri: dependency.uri.clone(),
                });
            }
            None => {}
        }

        Err(BuildpackError::ArtifactNotFound {
            id: dependency.id.clone(),
            version: dependency.version.to_string(),
            searched: searched.join(", "),
        })
    }
}

/// Hash a file's contents using SHA256, hex encoded
pub fn sha256_file(path: &Path) -> BuildpackResult<String> {
    let mut file = File::open(path)
        .map_err(|e| BuildpackError::io(format!("opening {}", path.display()), e))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;

    Ok(hex::encode(hasher.finalize()))
}

fn verify_checksum(path: &Path, expected: Option<&str>) -> BuildpackResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(BuildpackError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }

    debug!("Checksum verified: {}", expected);
    Ok(())
}
