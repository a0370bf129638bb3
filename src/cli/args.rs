//! Command-line arguments for the harness.
//!
//! Every flag is optional. Unset flags fall back to the configuration file,
//! then to the built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

use crate::config::HarnessConfig;

#[derive(Debug, Parser)]
#[command(
    name = "sparv-harness",
    version,
    about = "Run annotated Sparv samples through the interpreter and check their output."
)]
pub struct HarnessArgs {
    /// Interpreter executable to test [default: sparv]
    #[arg(short, long)]
    pub interpreter: Option<PathBuf>,

    /// Directory containing the sample files [default: ./test]
    #[arg(short = 'd', long)]
    pub test_dir: Option<PathBuf>,

    /// YAML configuration file [default: sparv-harness.yaml, if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command that builds the interpreter, run once before testing
    #[arg(short, long, value_name = "CMD")]
    pub build: Option<String>,

    /// Only run files with this extension
    #[arg(short, long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Only run files whose name contains this text
    #[arg(short, long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// When to color the report
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto)]
    pub color: ColorWhen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl HarnessArgs {
    /// Overrides `config` with every flag that was given.
    pub fn apply(self, config: &mut HarnessConfig) {
        if let Some(interpreter) = self.interpreter {
            config.interpreter = interpreter;
        }
        if let Some(test_dir) = self.test_dir {
            config.test_dir = test_dir;
        }
        if let Some(build) = self.build {
            config.build = Some(build.split_whitespace().map(str::to_string).collect());
        }
        if self.extension.is_some() {
            config.extension = self.extension;
        }
        if self.filter.is_some() {
            config.filter = self.filter;
        }
        match self.color {
            ColorWhen::Auto => {}
            ColorWhen::Always => config.color = ColorChoice::Always,
            ColorWhen::Never => config.color = ColorChoice::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = HarnessArgs::parse_from([
            "sparv-harness",
            "-i",
            "./sparv",
            "--test-dir",
            "samples",
            "--build",
            "cargo build  --release",
            "--color",
            "never",
        ]);
        let mut config = HarnessConfig {
            extension: Some("sparv".to_string()),
            ..HarnessConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(config.interpreter, PathBuf::from("./sparv"));
        assert_eq!(config.test_dir, PathBuf::from("samples"));
        assert_eq!(
            config.build,
            Some(vec![
                "cargo".to_string(),
                "build".to_string(),
                "--release".to_string()
            ])
        );
        assert_eq!(config.extension.as_deref(), Some("sparv"));
        assert_eq!(config.color, ColorChoice::Never);
    }

    #[test]
    fn always_forces_color() {
        let args = HarnessArgs::parse_from(["sparv-harness", "--color", "always"]);
        let mut config = HarnessConfig {
            color: ColorChoice::Never,
            ..HarnessConfig::default()
        };
        args.apply(&mut config);
        assert_eq!(config.color_choice(), ColorChoice::Always);
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let args = HarnessArgs::parse_from(["sparv-harness"]);
        let mut config = HarnessConfig::default();
        let before = config.clone();
        args.apply(&mut config);
        assert_eq!(config, before);
    }
}
