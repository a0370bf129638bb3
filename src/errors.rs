//! Error types for the harness.
//!
//! Every failure the harness can hit is a [`HarnessError`] variant. Setup
//! failures (configuration, build, discovery) end the run and are rendered
//! through `miette::Report`. Per-file failures (an unreadable sample, an
//! interpreter that cannot be started) are caught by the runner and turned
//! into a failed test case instead.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("could not read configuration file '{}'", path.display())]
    #[diagnostic(code(harness::config::read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in '{}'", path.display())]
    #[diagnostic(
        code(harness::config::parse),
        help("expected a YAML mapping with keys: interpreter, test_dir, build, extension, filter")
    )]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("build command is empty")]
    #[diagnostic(code(harness::build::empty))]
    BuildEmpty,

    #[error("could not run build command `{command}`")]
    #[diagnostic(code(harness::build::spawn))]
    BuildSpawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("build command `{command}` failed ({status})")]
    #[diagnostic(code(harness::build::failed))]
    BuildFailed {
        command: String,
        status: ExitStatus,
        #[help]
        stderr: Option<String>,
    },

    #[error("cannot read test directory '{}'", dir.display())]
    #[diagnostic(
        code(harness::discovery),
        help("point --test-dir at an existing directory of sample files")
    )]
    Discovery {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("test directory '{}' is not a directory", dir.display())]
    #[diagnostic(code(harness::discovery))]
    NotADirectory { dir: PathBuf },

    #[error("could not read test file '{}'", path.display())]
    #[diagnostic(code(harness::test_file))]
    ReadTestFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not start interpreter '{}'", interpreter.display())]
    #[diagnostic(
        code(harness::interpreter),
        help("check that the interpreter is built and the path given with --interpreter is executable")
    )]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },
}
