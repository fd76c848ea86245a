//! Application launch metadata
//!
//! Written to `<layers>/launch.toml`; tells the launcher which command runs
//! for each process type.

use serde::{Deserialize, Serialize};

/// Process types every function image exposes
pub const PROCESS_TYPES: [&str; 2] = ["function", "web"];

/// Launch metadata for the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default)]
    pub processes: Vec<Process>,
}

/// A process type and the command that starts it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "type")]
    pub kind: String,

    pub command: String,

    /// Exec the command directly instead of through a shell
    #[serde(default)]
    pub direct: bool,
}

impl LaunchMetadata {
    /// `function` and `web` processes, both running `command` through the
    /// shell
    pub fn for_command(command: &str) -> Self {
        Self {
            processes: PROCESS_TYPES
                .iter()
                .map(|kind| Process {
                    kind: (*kind).to_string(),
                    command: command.to_string(),
                    direct: false,
                })
                .collect(),
        }
    }

    /// Command for a process type
    pub fn command(&self, kind: &str) -> Option<&str> {
        self.processes
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.command.as_str())
    }
}
