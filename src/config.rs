//! Harness configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults, an
//! optional YAML file, then command-line flags (applied in `cli`).
//!
//! ```yaml
//! interpreter: ./target/release/sparv
//! test_dir: ./test
//! build: [cargo, build, --release]
//! extension: sparv
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use termcolor::ColorChoice;

use crate::errors::HarnessError;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sparv-harness.yaml";

const DEFAULT_INTERPRETER: &str = "sparv";
const DEFAULT_TEST_DIR: &str = "./test";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Interpreter executable, resolved through `PATH` when it has no directory part.
    pub interpreter: PathBuf,
    /// Directory whose direct entries are the sample files.
    pub test_dir: PathBuf,
    /// Program and arguments run once before discovery.
    pub build: Option<Vec<String>>,
    /// Keep only files with this extension (no leading dot).
    pub extension: Option<String>,
    /// Keep only files whose name contains this substring.
    pub filter: Option<String>,
    /// Set from `--color`; not read from the file.
    #[serde(skip, default = "default_color")]
    pub color: ColorChoice,
}

/// `Auto` when stdout is a terminal, `Never` otherwise.
fn default_color() -> ColorChoice {
    if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            build: None,
            extension: None,
            filter: None,
            color: default_color(),
        }
    }
}

impl HarnessConfig {
    /// Parses a configuration from YAML text. Missing keys keep their defaults.
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, HarnessError> {
        // An empty file deserializes as null, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &text)
    }

    /// Loads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, HarnessError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "using configuration file");
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    pub fn color_choice(&self) -> ColorChoice {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config =
            HarnessConfig::from_yaml(Path::new("h.yaml"), "interpreter: ./bin/sparv\n").unwrap();
        assert_eq!(config.interpreter, PathBuf::from("./bin/sparv"));
        assert_eq!(config.test_dir, PathBuf::from(DEFAULT_TEST_DIR));
        assert_eq!(config.build, None);
    }

    #[test]
    fn build_command_is_a_list() {
        let yaml = "build: [cargo, build, --release]\nextension: sparv\n";
        let config = HarnessConfig::from_yaml(Path::new("h.yaml"), yaml).unwrap();
        assert_eq!(
            config.build,
            Some(vec![
                "cargo".to_string(),
                "build".to_string(),
                "--release".to_string()
            ])
        );
        assert_eq!(config.extension.as_deref(), Some("sparv"));
    }

    #[test]
    fn empty_file_is_default() {
        let config = HarnessConfig::from_yaml(Path::new("h.yaml"), "\n").unwrap();
        assert_eq!(config.interpreter, PathBuf::from(DEFAULT_INTERPRETER));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = HarnessConfig::from_yaml(Path::new("h.yaml"), "interpeter: x\n").unwrap_err();
        assert!(matches!(err, HarnessError::ConfigParse { .. }));
    }
}
