//! Layer metadata parsing
//!
//! Each layer has a `<layers>/<name>.toml` file describing its lifecycle
//! flags and the marker it was last populated for.

use crate::error::{BuildpackError, BuildpackResult};
use crate::layer::contribute::LayerFlags;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parsed layer metadata from `<name>.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// Exported to the launch image
    #[serde(default)]
    pub launch: bool,

    /// Visible to subsequent buildpacks
    #[serde(default)]
    pub build: bool,

    /// Restored on the next build
    #[serde(default)]
    pub cache: bool,

    /// Serialized identity marker
    #[serde(default)]
    pub metadata: toml::Table,
}

impl LayerMetadata {
    /// Build metadata recording `marker` under `flags`
    pub fn new<M: Serialize>(marker: &M, flags: LayerFlags) -> BuildpackResult<Self> {
        let metadata = match toml::Value::try_from(marker)? {
            toml::Value::Table(table) => table,
            other => {
                let mut table = toml::Table::new();
                table.insert("value".to_string(), other);
                table
            }
        };

        Ok(Self {
            launch: flags.launch,
            build: flags.build,
            cache: flags.cache,
            metadata,
        })
    }

    /// Lifecycle flags recorded in this metadata
    pub fn flags(&self) -> LayerFlags {
        LayerFlags {
            build: self.build,
            cache: self.cache,
            launch: self.launch,
        }
    }

    /// Decode the recorded marker, `None` if it does not fit `M`
    pub fn marker<M: DeserializeOwned>(&self) -> Option<M> {
        toml::Value::Table(self.metadata.clone()).try_into().ok()
    }

    /// Read metadata from disk, `None` if the file does not exist
    pub fn from_file(path: &Path) -> BuildpackResult<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(BuildpackError::io(
                    format!("reading layer metadata {}", path.display()),
                    e,
                ))
            }
        };
        Self::parse(&content).map(Some)
    }

    /// Parse metadata from a TOML string
    pub fn parse(content: &str) -> BuildpackResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write metadata to disk
    pub fn write(&self, path: &Path) -> BuildpackResult<()> {
        let content = toml::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            BuildpackError::io(format!("writing layer metadata {}", path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Marker {
        #[serde(rename = "type")]
        kind: String,
        executable: String,
    }

    const COMMAND_LAYER: &str = r#"
launch = true
build = false
cache = false

[metadata]
type = "Command"
executable = "test-file"
"#;

    #[test]
    fn parse_command_layer() {
        let metadata = LayerMetadata::parse(COMMAND_LAYER).unwrap();
        assert_eq!(metadata.flags(), LayerFlags::LAUNCH);

        let marker: Marker = metadata.marker().unwrap();
        assert_eq!(marker.kind, "Command");
        assert_eq!(marker.executable, "test-file");
    }

    #[test]
    fn empty_optional_fields() {
        let metadata = LayerMetadata::parse("").unwrap();
        assert_eq!(metadata.flags(), LayerFlags::default());
        assert!(metadata.metadata.is_empty());
        assert!(metadata.marker::<Marker>().is_none());
    }

    #[test]
    fn write_then_read_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("command-function.toml");
        let marker = Marker {
            kind: "Command".to_string(),
            executable: "bin/fn".to_string(),
        };

        LayerMetadata::new(&marker, LayerFlags::LAUNCH | LayerFlags::CACHE)
            .unwrap()
            .write(&path)
            .unwrap();

        let read = LayerMetadata::from_file(&path).unwrap().unwrap();
        assert!(read.launch && read.cache && !read.build);
        assert_eq!(read.marker::<Marker>(), Some(marker));
    }

    #[test]
    fn missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(LayerMetadata::from_file(&temp.path().join("absent.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_file_errors() {
        assert!(LayerMetadata::parse("launch = \"yes\"").is_err());
    }
}
