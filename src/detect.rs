//! Executable detection
//!
//! The buildpack applies when `riff.toml` names an artifact that is a
//! regular file with the owner-execute bit set.

use crate::error::{BuildpackError, BuildpackResult};
use crate::metadata::{Application, Metadata};
use crate::plan::DetectPlan;
use std::fs;
use std::io::ErrorKind;
use tracing::debug;

/// Build plan entry naming the command invoker
pub const DEPENDENCY: &str = "riff-invoker-command";

/// Metadata key carrying the executable path
pub const COMMAND: &str = "command";

/// Owner-execute permission bit
const EXECUTABLE: u32 = 0o100;

/// Result of detection
#[derive(Debug, Clone, PartialEq)]
pub enum DetectOutcome {
    /// The buildpack applies; the plan is to be published
    Pass(DetectPlan),
    /// The buildpack does not apply
    Fail,
}

impl DetectOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }
}

/// Detect whether the configured artifact can run as a command
pub fn detect(application: &Application, metadata: &Metadata) -> BuildpackResult<DetectOutcome> {
    if metadata.artifact.is_empty() {
        return Ok(DetectOutcome::Fail);
    }

    let path = application.resolve(&metadata.artifact);

    let info = match fs::metadata(&path) {
        Ok(info) => info,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Artifact {} does not exist", path.display());
            return Ok(DetectOutcome::Fail);
        }
        Err(e) => return Err(BuildpackError::io(format!("stat {}", path.display()), e)),
    };

    if !is_executable(&info) {
        debug!(
            "Disregarding {:?} for the 'command' invoker, as it does not have executable permission",
            path
        );
        return Ok(DetectOutcome::Fail);
    }

    let mut requirement = toml::Table::new();
    requirement.insert(
        COMMAND.to_string(),
        toml::Value::String(metadata.artifact.clone()),
    );

    Ok(DetectOutcome::Pass(DetectPlan::self_satisfying(
        DEPENDENCY,
        requirement,
    )))
}

#[cfg(unix)]
fn is_executable(info: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    info.is_file() && info.permissions().mode() & EXECUTABLE == EXECUTABLE
}

#[cfg(not(unix))]
fn is_executable(info: &fs::Metadata) -> bool {
    let _ = EXECUTABLE;
    info.is_file()
}
