//! Command invoker contribution
//!
//! Resolves the invoker from the dependency catalog, expands it into a
//! launch layer and registers the `function` and `web` processes.

use crate::archive::extract_tar_gz;
use crate::buildpack::Build;
use crate::catalog::{ArtifactSource, Dependency};
use crate::detect::DEPENDENCY;
use crate::error::BuildpackResult;
use crate::layer::{Contribution, LaunchMetadata, Layer, LayerFlags, Layers};
use crate::plan::BuildpackPlan;
use tracing::info;

/// Entry point shipped in the invoker archive
pub const INVOKER_COMMAND: &str = "command-function-invoker";

/// The invoker dependency capability read from the build plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerRequirement {
    /// Version constraint, empty for the catalog default
    pub version: String,
}

impl InvokerRequirement {
    pub fn from_plan(plan: &BuildpackPlan) -> Option<Self> {
        plan.shallow_merged(DEPENDENCY).map(|entry| Self {
            version: entry.version,
        })
    }
}

/// The command invoker contributed by the buildpack
pub struct Invoker<'a> {
    dependency: Dependency,
    layer: Layer,
    layers: &'a Layers,
    artifacts: &'a dyn ArtifactSource,
}

impl<'a> Invoker<'a> {
    /// Create a contributor if the plan carries the invoker capability
    pub fn new(build: &'a Build) -> BuildpackResult<Option<Self>> {
        let Some(requirement) = InvokerRequirement::from_plan(&build.plan) else {
            return Ok(None);
        };

        let dependency = build
            .catalog
            .best(DEPENDENCY, &requirement.version, &build.stack)?;
        let layer = build.layers.layer(&dependency.id)?;

        Ok(Some(Self {
            dependency,
            layer,
            layers: &build.layers,
            artifacts: build.artifacts.as_ref(),
        }))
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Contribute the invoker to launch and write the launch metadata
    pub fn contribute(&self) -> BuildpackResult<Contribution> {
        let contribution = self.layer.contribute(
            &self.dependency,
            |layer| {
                let artifact = self.artifacts.artifact(&self.dependency)?;
                let bin = layer.root().join("bin");
                info!(
                    "Expanding {} {} to {}",
                    self.dependency.id,
                    self.dependency.version,
                    bin.display()
                );
                extract_tar_gz(&artifact, &bin)
            },
            LayerFlags::LAUNCH,
        )?;

        self.layers
            .write_launch_metadata(&LaunchMetadata::for_command(INVOKER_COMMAND))?;

        Ok(contribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::write_tgz;
    use crate::buildpack::tests::{build_context, invoker_dependency};
    use crate::catalog::Catalog;
    use crate::error::BuildpackError;
    use crate::plan::PlanEntry;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn invoker_plan(version: &str) -> BuildpackPlan {
        BuildpackPlan {
            entries: vec![PlanEntry {
                name: DEPENDENCY.to_string(),
                version: version.to_string(),
                ..PlanEntry::default()
            }],
        }
    }

    fn with_stub_invoker(temp: &TempDir, version: &str, plan: BuildpackPlan) -> Build {
        let archive = temp.path().join(format!("stub-invoker-{}.tgz", version));
        write_tgz(
            &archive,
            &[
                ("fixture-marker", 0o644, ""),
                (INVOKER_COMMAND, 0o755, "#!/bin/sh\n"),
            ],
        );

        let mut build = build_context(temp, plan);
        build.catalog = Catalog::new(vec![invoker_dependency(version, &archive)], BTreeMap::new());
        build
    }

    #[test]
    fn returns_invoker_if_plan_exists() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", invoker_plan(""));

        let invoker = Invoker::new(&build).unwrap();
        assert!(invoker.is_some());
    }

    #[test]
    fn returns_none_if_plan_does_not_exist() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", BuildpackPlan::default());

        assert!(Invoker::new(&build).unwrap().is_none());
    }

    #[test]
    fn unresolvable_version_errors() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", invoker_plan("1.0.0"));

        let err = Invoker::new(&build).err().unwrap();
        assert!(matches!(err, BuildpackError::DependencyNotFound { .. }));
    }

    #[test]
    fn contributes_invoker_to_launch() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", invoker_plan("0.0.7"));

        let invoker = Invoker::new(&build).unwrap().unwrap();
        assert_eq!(invoker.contribute().unwrap(), Contribution::Contributed);

        let layer = build.layers.layer(DEPENDENCY).unwrap();
        let metadata = layer.metadata().unwrap().unwrap();
        assert!(!metadata.build && !metadata.cache && metadata.launch);
        assert!(layer.root().join("bin").join("fixture-marker").is_file());

        let launch = build.layers.read_launch_metadata().unwrap().unwrap();
        assert_eq!(launch, LaunchMetadata::for_command(INVOKER_COMMAND));
    }

    #[test]
    fn same_version_reuses_layer_but_rewrites_launch_metadata() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", invoker_plan(""));

        Invoker::new(&build).unwrap().unwrap().contribute().unwrap();
        fs::remove_file(build.layers.launch_metadata_path()).unwrap();
        fs::write(
            build.layers.layer(DEPENDENCY).unwrap().root().join("kept"),
            "",
        )
        .unwrap();

        let result = Invoker::new(&build).unwrap().unwrap().contribute().unwrap();
        assert_eq!(result, Contribution::Reused);
        assert!(build
            .layers
            .layer(DEPENDENCY)
            .unwrap()
            .root()
            .join("kept")
            .exists());
        assert!(build.layers.read_launch_metadata().unwrap().is_some());
    }

    #[test]
    fn new_version_repopulates_layer() {
        let temp = TempDir::new().unwrap();
        let first = with_stub_invoker(&temp, "0.0.7", invoker_plan(""));
        Invoker::new(&first).unwrap().unwrap().contribute().unwrap();

        let second = with_stub_invoker(&temp, "0.0.8", invoker_plan(""));
        let invoker = Invoker::new(&second).unwrap().unwrap();
        assert_eq!(invoker.dependency().version.to_string(), "0.0.8");
        assert_eq!(invoker.contribute().unwrap(), Contribution::Contributed);

        let recorded: Dependency = second
            .layers
            .layer(DEPENDENCY)
            .unwrap()
            .metadata()
            .unwrap()
            .unwrap()
            .marker()
            .unwrap();
        assert_eq!(recorded.version.to_string(), "0.0.8");
    }

    #[test]
    fn corrupt_artifact_fails_contribution() {
        let temp = TempDir::new().unwrap();
        let build = with_stub_invoker(&temp, "0.0.7", invoker_plan(""));
        fs::write(temp.path().join("stub-invoker-0.0.7.tgz"), b"garbage").unwrap();

        let invoker = Invoker::new(&build).unwrap().unwrap();
        let err = invoker.contribute().unwrap_err();
        assert!(matches!(err, BuildpackError::Extract { .. }));
        assert!(build.layers.read_launch_metadata().unwrap().is_none());
    }
}
