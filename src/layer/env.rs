//! Layer environment files
//!
//! A layer exports environment through files named `<VAR>.<modifier>` in
//! `env/` (build and launch), `env.build/` or `env.launch/`. The file
//! content is the value.

use crate::error::{BuildpackError, BuildpackResult};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Which phase an environment variable applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope {
    /// Both build and launch
    Shared,
    Build,
    Launch,
}

impl EnvScope {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Shared => "env",
            Self::Build => "env.build",
            Self::Launch => "env.launch",
        }
    }
}

impl fmt::Display for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shared => "shared",
            Self::Build => "build",
            Self::Launch => "launch",
        };
        write!(f, "{}", name)
    }
}

/// How a recorded value combines with the inherited environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvModifier {
    Override,
    Default,
    Append,
    Prepend,
    /// Delimiter used by `Append` and `Prepend`
    Delimiter,
}

impl EnvModifier {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Default => "default",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Delimiter => "delim",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "override" => Some(Self::Override),
            "default" => Some(Self::Default),
            "append" => Some(Self::Append),
            "prepend" => Some(Self::Prepend),
            "delim" => Some(Self::Delimiter),
            _ => None,
        }
    }
}

/// A single recorded variable operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub modifier: EnvModifier,
    pub value: String,
}

/// Environment recorded by a layer for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, Vec<EnvVar>>,
}

impl Environment {
    /// Write `<dir>/<scope>/<name>.<modifier>`
    pub fn write(
        layer_root: &Path,
        scope: EnvScope,
        name: &str,
        modifier: EnvModifier,
        value: &str,
    ) -> BuildpackResult<()> {
        validate_var_name(name)?;

        let dir = layer_root.join(scope.dir_name());
        fs::create_dir_all(&dir)
            .map_err(|e| BuildpackError::io(format!("creating {}", dir.display()), e))?;

        let path = dir.join(format!("{}.{}", name, modifier.suffix()));
        fs::write(&path, value)
            .map_err(|e| BuildpackError::io(format!("writing {}", path.display()), e))
    }

    /// Read every recorded variable for `scope`. A missing directory is an
    /// empty environment; files without a known modifier are skipped.
    pub fn read(layer_root: &Path, scope: EnvScope) -> BuildpackResult<Self> {
        let dir = layer_root.join(scope.dir_name());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(BuildpackError::io(format!("reading {}", dir.display()), e)),
        };

        let mut env = Self::default();
        for entry in entries {
            let entry =
                entry.map_err(|e| BuildpackError::io(format!("reading {}", dir.display()), e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some((name, suffix)) = file_name.rsplit_once('.') else {
                continue;
            };
            let Some(modifier) = EnvModifier::from_suffix(suffix) else {
                continue;
            };

            let value = fs::read_to_string(&path)
                .map_err(|e| BuildpackError::io(format!("reading {}", path.display()), e))?;
            env.vars
                .entry(name.to_string())
                .or_default()
                .push(EnvVar { modifier, value });
        }

        for ops in env.vars.values_mut() {
            ops.sort_by_key(|op| op.modifier.suffix());
        }
        Ok(env)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Names of the recorded variables, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// First value-bearing operation recorded for `name`
    pub fn get(&self, name: &str) -> Option<&EnvVar> {
        self.vars
            .get(name)?
            .iter()
            .find(|op| op.modifier != EnvModifier::Delimiter)
    }

    /// Apply the recorded operations on top of `base`
    pub fn apply_to(&self, base: &mut BTreeMap<String, String>) {
        for (name, ops) in &self.vars {
            let delim = ops
                .iter()
                .find(|op| op.modifier == EnvModifier::Delimiter)
                .map(|op| op.value.as_str())
                .unwrap_or("");

            for op in ops {
                match op.modifier {
                    EnvModifier::Override => {
                        base.insert(name.clone(), op.value.clone());
                    }
                    EnvModifier::Default => {
                        base.entry(name.clone()).or_insert_with(|| op.value.clone());
                    }
                    EnvModifier::Append => {
                        let joined = match base.get(name) {
                            Some(current) if !current.is_empty() => {
                                format!("{}{}{}", current, delim, op.value)
                            }
                            _ => op.value.clone(),
                        };
                        base.insert(name.clone(), joined);
                    }
                    EnvModifier::Prepend => {
                        let joined = match base.get(name) {
                            Some(current) if !current.is_empty() => {
                                format!("{}{}{}", op.value, delim, current)
                            }
                            _ => op.value.clone(),
                        };
                        base.insert(name.clone(), joined);
                    }
                    EnvModifier::Delimiter => {}
                }
            }
        }
    }
}

fn validate_var_name(name: &str) -> BuildpackResult<()> {
    if name.is_empty() || name.contains(['/', '\\', '=', '\0']) {
        return Err(BuildpackError::io(
            format!("invalid environment variable name {:?}", name),
            std::io::Error::from(ErrorKind::InvalidInput),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_uses_scope_directory_and_suffix() {
        let temp = TempDir::new().unwrap();
        Environment::write(
            temp.path(),
            EnvScope::Launch,
            "FUNCTION_URI",
            EnvModifier::Override,
            "/workspace/fn",
        )
        .unwrap();

        let path = temp.path().join("env.launch").join("FUNCTION_URI.override");
        assert_eq!(fs::read_to_string(path).unwrap(), "/workspace/fn");
    }

    #[test]
    fn read_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(Environment::read(temp.path(), EnvScope::Build)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn read_skips_unknown_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("env");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("README"), "ignored").unwrap();
        fs::write(dir.join("JAVA_OPTS.bogus"), "ignored").unwrap();
        fs::write(dir.join("LANG.default"), "C.UTF-8").unwrap();

        let env = Environment::read(temp.path(), EnvScope::Shared).unwrap();
        assert_eq!(env.names().collect::<Vec<_>>(), vec!["LANG"]);
    }

    #[test]
    fn apply_reconstructs_environment() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let scope = EnvScope::Launch;
        Environment::write(root, scope, "FUNCTION_URI", EnvModifier::Override, "/app/fn").unwrap();
        Environment::write(root, scope, "LANG", EnvModifier::Default, "C.UTF-8").unwrap();
        Environment::write(root, scope, "PATH", EnvModifier::Prepend, "/layer/bin").unwrap();
        Environment::write(root, scope, "PATH", EnvModifier::Delimiter, ":").unwrap();

        let mut base = BTreeMap::new();
        base.insert("FUNCTION_URI".to_string(), "old".to_string());
        base.insert("LANG".to_string(), "en_US.UTF-8".to_string());
        base.insert("PATH".to_string(), "/usr/bin".to_string());

        Environment::read(root, scope).unwrap().apply_to(&mut base);

        assert_eq!(base["FUNCTION_URI"], "/app/fn");
        assert_eq!(base["LANG"], "en_US.UTF-8");
        assert_eq!(base["PATH"], "/layer/bin:/usr/bin");
    }

    #[test]
    fn invalid_names_rejected() {
        let temp = TempDir::new().unwrap();
        for name in ["", "A/B", "A=B"] {
            assert!(Environment::write(
                temp.path(),
                EnvScope::Shared,
                name,
                EnvModifier::Override,
                "x"
            )
            .is_err());
        }
    }
}
