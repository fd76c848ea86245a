//! Raw-command contribution
//!
//! Points `FUNCTION_URI` at the detected executable for the launch
//! environment.

use crate::buildpack::Build;
use crate::detect::{COMMAND, DEPENDENCY};
use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::{Contribution, Identifiable, Layer, LayerFlags};
use crate::metadata::Application;
use crate::plan::BuildpackPlan;
use serde::{Deserialize, Serialize};

/// Launch environment variable naming the function executable
pub const FUNCTION_URI: &str = "FUNCTION_URI";

/// Layer holding the function's launch environment
pub const LAYER: &str = "command-function";

/// Layer marker for the command function; keyed on the path only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMarker {
    #[serde(rename = "type")]
    pub kind: String,
    pub executable: String,
}

impl CommandMarker {
    pub fn new(executable: &str) -> Self {
        Self {
            kind: "Command".to_string(),
            executable: executable.to_string(),
        }
    }
}

impl Identifiable for CommandMarker {
    fn identity(&self) -> (String, String) {
        (self.kind.clone(), self.executable.clone())
    }
}

/// The `command` capability read from the build plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequirement {
    pub executable: String,
}

impl CommandRequirement {
    /// `None` if the plan has no command invoker entry; an error if the
    /// entry's `command` is not a string
    pub fn from_plan(plan: &BuildpackPlan) -> BuildpackResult<Option<Self>> {
        let Some(entry) = plan.shallow_merged(DEPENDENCY) else {
            return Ok(None);
        };

        match entry.metadata.get(COMMAND) {
            Some(toml::Value::String(executable)) => Ok(Some(Self {
                executable: executable.clone(),
            })),
            other => Err(BuildpackError::MetadataType {
                key: COMMAND.to_string(),
                value: other
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<nil>".to_string()),
            }),
        }
    }
}

/// The function to be executed
#[derive(Debug, Clone)]
pub struct Function {
    application: Application,
    executable: String,
    layer: Layer,
}

impl Function {
    /// Create a contributor if the plan carries the command capability
    pub fn new(build: &Build) -> BuildpackResult<Option<Self>> {
        let Some(requirement) = CommandRequirement::from_plan(&build.plan)? else {
            return Ok(None);
        };

        Ok(Some(Self {
            application: build.application.clone(),
            executable: requirement.executable,
            layer: build.layers.layer(LAYER)?,
        }))
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Contribute the launch environment
    pub fn contribute(&self) -> BuildpackResult<Contribution> {
        let uri = self.application.resolve(&self.executable);

        self.layer.contribute(
            &CommandMarker::new(&self.executable),
            |layer| layer.override_launch_env(FUNCTION_URI, &uri.to_string_lossy()),
            LayerFlags::LAUNCH,
        )
    }
}
