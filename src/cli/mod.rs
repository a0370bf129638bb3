//! The harness command-line interface.
//!
//! Exit codes: `0` when every test passed, `1` when any test failed, `2` when
//! the run could not start (bad configuration, failed build, unreadable test
//! directory).

use std::process::ExitCode;

use clap::Parser;
use termcolor::{StandardStream, WriteColor};

use crate::cli::args::HarnessArgs;
use crate::config::HarnessConfig;
use crate::errors::HarnessError;
use crate::harness::{self, RunSummary};

pub mod args;
pub mod output;

/// Exit code for failures that stop the run before any test executes.
pub const SETUP_ERROR_EXIT: u8 = 2;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = HarnessArgs::parse();
    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(e) => return report_setup_error(e),
    };

    let mut stdout = StandardStream::stdout(config.color_choice());
    match run_with_config(&config, &mut stdout) {
        Ok(summary) => summary.exit_code(),
        Err(e) => report_setup_error(e),
    }
}

/// Layers the configuration file under the command-line flags.
pub fn resolve_config(args: HarnessArgs) -> Result<HarnessConfig, HarnessError> {
    let mut config = HarnessConfig::discover(args.config.as_deref())?;
    args.apply(&mut config);
    Ok(config)
}

pub fn run_with_config(
    config: &HarnessConfig,
    out: &mut impl WriteColor,
) -> Result<RunSummary, HarnessError> {
    tracing::debug!(
        interpreter = %config.interpreter.display(),
        test_dir = %config.test_dir.display(),
        "starting run"
    );
    harness::run_suite(config, out)
}

fn report_setup_error(error: HarnessError) -> ExitCode {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
    ExitCode::from(SETUP_ERROR_EXIT)
}
