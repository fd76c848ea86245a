//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat};

use crate::error::{BuildpackError, BuildpackResult};
use std::path::{Path, PathBuf};

/// Absolute application directory, defaulting to the working directory
pub fn resolve_app_dir(app: Option<&Path>) -> BuildpackResult<PathBuf> {
    let dir = match app {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| BuildpackError::io("getting current directory", e))?,
    };

    std::path::absolute(&dir)
        .map_err(|e| BuildpackError::io(format!("resolving {}", dir.display()), e))
}

/// Buildpack directory: the explicit one, else the parent of the directory
/// holding this binary (`<buildpack>/bin/<binary>`)
pub fn resolve_buildpack_dir(explicit: Option<&Path>) -> BuildpackResult<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let exe = std::env::current_exe()
        .map_err(|e| BuildpackError::io("locating buildpack binary", e))?;
    Ok(exe
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
