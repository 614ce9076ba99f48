//! Project configuration: an optional `zima.toml` next to the
//! entrypoint script, mirroring the teacher's `seqc::config` extension
//! points but as a plain on-disk file rather than a compile-time
//! builder — this driver has no linker stage to plug external symbols
//! into.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ProjectConfig {
    /// The script `run` executes when invoked with no explicit path.
    pub entrypoint: Option<PathBuf>,
    /// Additional search paths a future `import`-by-path resolver
    /// would consult (spec.md's `import` only loads builtin modules
    /// today; this is forward-declared config surface for scripts that
    /// `import` each other by file).
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Default `sqlite` database path scripts can assume when they
    /// `new sqlite()` with no argument of their own.
    pub sqlite_default: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read zima.toml: {e}"),
            ConfigError::Parse(msg) => write!(f, "could not parse zima.toml: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ProjectConfig {
    /// Load `zima.toml` from `dir`, if present. Absence is not an
    /// error — most scripts are run directly by path with no project
    /// file at all.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join("zima.toml");
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
        let config: ProjectConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProjectConfig::load_from_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parses_entrypoint_and_include_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("zima.toml"),
            "entrypoint = \"main.zima\"\ninclude_paths = [\"lib\"]\n",
        )
        .unwrap();
        let config = ProjectConfig::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.entrypoint, Some(PathBuf::from("main.zima")));
        assert_eq!(config.include_paths, vec![PathBuf::from("lib")]);
    }
}
