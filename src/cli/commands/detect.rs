//! Detect phase - decide whether the buildpack applies

use super::{FAIL_STATUS_CODE, PASS_STATUS_CODE};
use crate::buildpack::Buildpack;
use crate::cli::args::DetectArgs;
use crate::cli::resolve_app_dir;
use crate::detect::DetectOutcome;
use crate::error::{FailureCode, PhaseFailure};
use crate::metadata::{Application, Metadata};
use tracing::{debug, info};

/// Execute the detect phase, returning the process exit code
pub fn execute(args: DetectArgs) -> Result<u8, PhaseFailure> {
    let internal = |e| PhaseFailure::new(FailureCode::ComponentInternal, e);

    let application = Application::new(resolve_app_dir(args.app.as_deref()).map_err(internal)?);
    debug!("Application: {}", application.root().display());

    let metadata = Metadata::load(&application).map_err(internal)?;

    match Buildpack.detect(&application, &metadata)? {
        DetectOutcome::Pass(plan) => {
            plan.write(&args.plan).map_err(internal)?;
            info!("Detected executable {}", metadata.artifact);
            Ok(PASS_STATUS_CODE)
        }
        DetectOutcome::Fail => Ok(FAIL_STATUS_CODE),
    }
}
