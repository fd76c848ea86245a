//! Build phase - contribute function layers

use super::PASS_STATUS_CODE;
use crate::buildpack::{Build, Buildpack};
use crate::catalog::DependencyCache;
use crate::cli::args::BuildArgs;
use crate::cli::resolve_app_dir;
use crate::config::ConfigManager;
use crate::error::{FailureCode, PhaseFailure};
use crate::layer::Layers;
use crate::metadata::Application;
use crate::plan::BuildpackPlan;
use std::path::Path;
use tracing::debug;

/// Execute the build phase, returning the process exit code
pub fn execute(args: BuildArgs, buildpack_dir: &Path) -> Result<u8, PhaseFailure> {
    let initialization = |e| PhaseFailure::new(FailureCode::ComponentInitialization, e);

    let application =
        Application::new(resolve_app_dir(args.app.as_deref()).map_err(initialization)?);
    let config = ConfigManager::new(buildpack_dir);
    let catalog = config.catalog().map_err(initialization)?;
    let plan = BuildpackPlan::load(&args.plan).map_err(initialization)?;

    debug!(
        "Building {} on {} with {} plan entries",
        application.root().display(),
        args.stack,
        plan.entries.len()
    );

    let build = Build {
        application,
        layers: Layers::new(args.layers),
        plan,
        stack: args.stack,
        catalog,
        artifacts: Box::new(DependencyCache::new(config.dependency_cache_dir())),
    };

    Buildpack.build(&build)?;
    Ok(PASS_STATUS_CODE)
}
