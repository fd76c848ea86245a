//! Top-level detect and build orchestration

use crate::catalog::{ArtifactSource, Catalog};
use crate::contribute::{Function, Invoker};
use crate::detect::{detect, DetectOutcome};
use crate::error::{FailureCode, PhaseFailure};
use crate::layer::Layers;
use crate::metadata::{Application, Metadata};
use crate::plan::BuildpackPlan;
use tracing::debug;

/// Everything a build-phase contributor may consult
pub struct Build {
    pub application: Application,
    pub layers: Layers,
    pub plan: BuildpackPlan,
    pub stack: String,
    pub catalog: Catalog,
    pub artifacts: Box<dyn ArtifactSource>,
}

/// The command function buildpack
#[derive(Debug, Clone, Copy, Default)]
pub struct Buildpack;

impl Buildpack {
    pub fn id(&self) -> &'static str {
        "command"
    }

    /// Run detection; I/O faults are internal failures
    pub fn detect(
        &self,
        application: &Application,
        metadata: &Metadata,
    ) -> Result<DetectOutcome, PhaseFailure> {
        detect(application, metadata)
            .map_err(|e| PhaseFailure::new(FailureCode::ComponentInternal, e))
    }

    /// Run every applicable contributor in order
    pub fn build(&self, build: &Build) -> Result<(), PhaseFailure> {
        let initialization = |e| PhaseFailure::new(FailureCode::ComponentInitialization, e);
        let contribution = |e| PhaseFailure::new(FailureCode::ComponentContribution, e);

        match Function::new(build).map_err(initialization)? {
            Some(function) => {
                function.contribute().map_err(contribution)?;
            }
            None => debug!("No command function in build plan"),
        }

        match Invoker::new(build).map_err(initialization)? {
            Some(invoker) => {
                invoker.contribute().map_err(contribution)?;
            }
            None => debug!("No command invoker in build plan"),
        }

        Ok(())
    }
}
