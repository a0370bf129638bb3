pub use crate::config::HarnessConfig;
pub use crate::errors::HarnessError;
pub use crate::harness::{
    compare, discover, extract_expectations, invoke, run_suite, run_test, CapturedOutput,
    Mismatch, RunSummary, TestCase, TestOutcome, TestReport,
};

pub mod cli;
pub mod config;
pub mod errors;
pub mod harness;
