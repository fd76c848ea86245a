//! Layer directories and the at-most-once contribution protocol

use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::env::{EnvModifier, EnvScope, Environment};
use crate::layer::launch::LaunchMetadata;
use crate::layer::manifest::LayerMetadata;
use crate::layer::Identifiable;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::ops::BitOr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Launch metadata file name inside the layers directory
pub const LAUNCH_METADATA_FILE: &str = "launch.toml";

/// Lifecycle flags of a layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerFlags {
    pub build: bool,
    pub cache: bool,
    pub launch: bool,
}

impl LayerFlags {
    pub const BUILD: Self = Self {
        build: true,
        cache: false,
        launch: false,
    };

    pub const CACHE: Self = Self {
        build: false,
        cache: true,
        launch: false,
    };

    pub const LAUNCH: Self = Self {
        build: false,
        cache: false,
        launch: true,
    };

    /// Whether the layer's contents outlive this build, either restored
    /// from the cache or reused from the previous image
    pub fn persists(&self) -> bool {
        self.cache || self.launch
    }
}

impl BitOr for LayerFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            build: self.build || rhs.build,
            cache: self.cache || rhs.cache,
            launch: self.launch || rhs.launch,
        }
    }
}

/// What a call to [`Layer::contribute`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Recorded marker matched; existing contents kept
    Reused,
    /// Layer was cleared and populated
    Contributed,
}

/// The lifecycle's layers directory
#[derive(Debug, Clone)]
pub struct Layers {
    root: PathBuf,
}

impl Layers {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle on the named layer; nothing is created until contribution
    pub fn layer(&self, name: &str) -> BuildpackResult<Layer> {
        validate_layer_name(name)?;
        Ok(Layer {
            name: name.to_string(),
            root: self.root.join(name),
            metadata_path: self.root.join(format!("{}.toml", name)),
        })
    }

    pub fn launch_metadata_path(&self) -> PathBuf {
        self.root.join(LAUNCH_METADATA_FILE)
    }

    /// Write the application's launch metadata
    pub fn write_launch_metadata(&self, metadata: &LaunchMetadata) -> BuildpackResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            BuildpackError::io(format!("creating layers directory {}", self.root.display()), e)
        })?;

        let path = self.launch_metadata_path();
        let content = toml::to_string(metadata)?;
        fs::write(&path, content)
            .map_err(|e| BuildpackError::io(format!("writing {}", path.display()), e))?;

        debug!("Wrote launch metadata to {}", path.display());
        Ok(())
    }

    /// Read the application's launch metadata, `None` if not yet written
    pub fn read_launch_metadata(&self) -> BuildpackResult<Option<LaunchMetadata>> {
        let path = self.launch_metadata_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BuildpackError::io(format!("reading {}", path.display()), e)),
        }
    }
}

/// Validate that a layer name is safe (no path traversal)
fn validate_layer_name(name: &str) -> BuildpackResult<()> {
    if name.is_empty()
        || name == "."
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0')
    {
        return Err(BuildpackError::LayerName(name.to_string()));
    }
    Ok(())
}

/// A single layer: its directory and its metadata file
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    root: PathBuf,
    metadata_path: PathBuf,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The layer's `<name>.toml` file
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Currently recorded metadata, if any
    pub fn metadata(&self) -> BuildpackResult<Option<LayerMetadata>> {
        LayerMetadata::from_file(&self.metadata_path)
    }

    /// Identity of the recorded marker, if one is recorded and decodes as `M`
    fn recorded_identity<M>(&self) -> BuildpackResult<Option<(String, String)>>
    where
        M: Identifiable + DeserializeOwned,
    {
        let metadata = match self.metadata() {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return Ok(None),
            Err(BuildpackError::TomlParse(e)) => {
                debug!("{}: ignoring unreadable layer metadata: {}", self.name, e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(metadata.marker::<M>().map(|m| m.identity()))
    }

    /// Populate the layer for `marker`, unless it was already populated for
    /// an equal marker and its contents persist between builds.
    ///
    /// On a miss the directory is cleared and the recorded metadata removed
    /// before `populate` runs; the new metadata is written only once
    /// `populate` succeeds, so a failed population is retried next build.
    pub fn contribute<M, F>(
        &self,
        marker: &M,
        populate: F,
        flags: LayerFlags,
    ) -> BuildpackResult<Contribution>
    where
        M: Identifiable + Serialize + DeserializeOwned,
        F: FnOnce(&Layer) -> BuildpackResult<()>,
    {
        let expected = marker.identity();

        if flags.persists() {
            if let Some(recorded) = self.recorded_identity::<M>()? {
                if recorded == expected {
                    info!("{}: Reusing cached layer", self.name);
                    return Ok(Contribution::Reused);
                }
                debug!(
                    "{}: marker changed from {:?} to {:?}",
                    self.name, recorded, expected
                );
            }
        }

        info!("{}: Contributing to layer", self.name);
        self.reset()?;
        populate(self)?;

        LayerMetadata::new(marker, flags)?.write(&self.metadata_path)?;
        Ok(Contribution::Contributed)
    }

    /// Remove previous contents and metadata, leaving an empty directory
    fn reset(&self) -> BuildpackResult<()> {
        match fs::remove_file(&self.metadata_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("removing {}", self.metadata_path.display()),
                    e,
                ))
            }
        }

        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                BuildpackError::io(format!("removing layer {}", self.root.display()), e)
            })?;
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| BuildpackError::io(format!("creating layer {}", self.root.display()), e))
    }

    /// Record an environment variable exported by this layer
    pub fn write_env(
        &self,
        scope: EnvScope,
        name: &str,
        modifier: EnvModifier,
        value: &str,
    ) -> BuildpackResult<()> {
        Environment::write(&self.root, scope, name, modifier, value)?;
        debug!(
            "{}: {} {} {} = {}",
            self.name,
            scope,
            modifier.suffix(),
            name,
            value
        );
        Ok(())
    }

    /// Override an environment variable at launch
    pub fn override_launch_env(&self, name: &str, value: &str) -> BuildpackResult<()> {
        self.write_env(EnvScope::Launch, name, EnvModifier::Override, value)
    }

    /// Override an environment variable for subsequent build steps
    pub fn override_build_env(&self, name: &str, value: &str) -> BuildpackResult<()> {
        self.write_env(EnvScope::Build, name, EnvModifier::Override, value)
    }

    /// Override an environment variable at both build and launch
    pub fn override_shared_env(&self, name: &str, value: &str) -> BuildpackResult<()> {
        self.write_env(EnvScope::Shared, name, EnvModifier::Override, value)
    }

    /// Set an environment variable at launch unless already set
    pub fn default_launch_env(&self, name: &str, value: &str) -> BuildpackResult<()> {
        self.write_env(EnvScope::Launch, name, EnvModifier::Default, value)
    }

    /// Prepend a path entry to a `:`-delimited variable at launch
    pub fn append_path_launch_env(&self, name: &str, value: &str) -> BuildpackResult<()> {
        self.write_env(EnvScope::Launch, name, EnvModifier::Prepend, value)?;
        self.write_env(EnvScope::Launch, name, EnvModifier::Delimiter, ":")
    }

    /// Environment recorded by this layer for `scope`
    pub fn read_env(&self, scope: EnvScope) -> BuildpackResult<Environment> {
        Environment::read(&self.root, scope)
    }
}
