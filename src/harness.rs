//! Conformance harness core: discovery, expectation extraction, interpreter
//! invocation, positional comparison and the sequential run loop.
//!
//! A run is strictly linear:
//!
//! 1. **Build** (optional): run the configured build command once.
//! 2. **Discovery**: list the direct entries of the test directory.
//! 3. Per file, **Invoke → Compare → Report**, one file at a time.
//! 4. **Summary**: print totals and hand back a [`RunSummary`].
//!
//! The interpreter is a black box. It is expected to print
//! `Running: <path>`, then one line per `// expected: ` annotation in the
//! sample, then `successfully ran program`. Anything on stderr is a failure.
//! Its exit status is never consulted.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use once_cell::sync::Lazy;
use regex::Regex;
use termcolor::WriteColor;
use walkdir::WalkDir;

use crate::cli::output;
use crate::config::HarnessConfig;
use crate::errors::HarnessError;

/// Comment marker plus tag introducing one expected stdout line.
pub const EXPECTATION_TAG: &str = "// expected: ";
/// Prefix of the first line a conforming interpreter prints.
pub const HEADER_PREFIX: &str = "Running: ";
/// Last line a conforming interpreter prints after a clean run.
pub const TRAILER: &str = "successfully ran program";

// `.` stops at `\n`, so each capture runs to the end of its physical line.
static EXPECTATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{}(.*)", regex::escape(EXPECTATION_TAG)))
        .unwrap_or_else(|e| unreachable!("expectation pattern is a valid regex: {e}"))
});

// ============================================================================
// TEST CASES - Expectation extraction
// ============================================================================

/// Collects the payload of every `// expected: ` annotation, top to bottom.
///
/// The scan is purely textual: it does not know whether the tag sits in a
/// comment or a string literal of the sample language.
pub fn extract_expectations(source: &str) -> Vec<String> {
    EXPECTATION_PATTERN
        .captures_iter(source)
        .map(|caps| {
            let line = caps.get(1).map_or("", |m| m.as_str());
            line.strip_suffix('\r').unwrap_or(line).to_string()
        })
        .collect()
}

/// One sample file and the stdout lines it annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub path: PathBuf,
    pub expected_lines: Vec<String>,
}

impl TestCase {
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            path: path.into(),
            expected_lines: extract_expectations(source),
        }
    }

    /// Reads the sample in full; the handle is closed before this returns.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let source = fs::read_to_string(path).map_err(|source| HarnessError::ReadTestFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, &source))
    }

    /// The header line the interpreter must print for this file.
    pub fn header(&self) -> String {
        format!("{HEADER_PREFIX}{}", self.path.display())
    }

    /// Header, every annotation in file order, trailer.
    pub fn expected_sequence(&self) -> Vec<String> {
        let mut sequence = Vec::with_capacity(self.expected_lines.len() + 2);
        sequence.push(self.header());
        sequence.extend(self.expected_lines.iter().cloned());
        sequence.push(TRAILER.to_string());
        sequence
    }
}

// ============================================================================
// INVOCATION - Running the interpreter
// ============================================================================

/// Everything the interpreter wrote, decoded lossily as UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Runs `<interpreter> <file>` to completion and captures both streams.
///
/// Blocks until the process exits; there is no timeout.
#[tracing::instrument(skip_all, fields(file = %file.display()))]
pub fn invoke(interpreter: &Path, file: &Path) -> Result<CapturedOutput, HarnessError> {
    let output = Command::new(interpreter)
        .arg(file)
        .output()
        .map_err(|source| HarnessError::Spawn {
            interpreter: interpreter.to_path_buf(),
            source,
        })?;
    tracing::debug!(
        status = %output.status,
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "interpreter exited"
    );
    Ok(CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

// ============================================================================
// COMPARISON - Positional diff with a missing sentinel
// ============================================================================

/// One reason a test case failed its output check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Expected and actual stdout differ at `index`. `None` means that side
    /// ran out of lines, which is distinct from an empty line.
    Line {
        index: usize,
        expected: Option<String>,
        actual: Option<String>,
    },
    /// A line the interpreter wrote to stderr. Never expected.
    Stderr(String),
}

/// Pairs `expected` with the captured stdout index by index, then appends
/// every stderr line as an unconditional mismatch.
pub fn compare(expected: &[String], captured: &CapturedOutput) -> Vec<Mismatch> {
    let actual: Vec<&str> = captured.stdout.lines().collect();
    let len = expected.len().max(actual.len());

    let mut mismatches: Vec<Mismatch> = (0..len)
        .filter_map(|index| {
            let exp = expected.get(index).map(String::as_str);
            let act = actual.get(index).copied();
            (exp != act).then(|| Mismatch::Line {
                index,
                expected: exp.map(str::to_string),
                actual: act.map(str::to_string),
            })
        })
        .collect();

    mismatches.extend(
        captured
            .stderr
            .lines()
            .map(|line| Mismatch::Stderr(line.to_string())),
    );
    mismatches
}

// ============================================================================
// RESULTS - Per-file outcomes and run totals
// ============================================================================

#[derive(Debug)]
pub enum TestOutcome {
    Passed,
    /// Output disagreed; all mismatches of the file, in order.
    Mismatched(Vec<Mismatch>),
    /// The sample could not be read or the interpreter could not be started.
    Errored(HarnessError),
}

#[derive(Debug)]
pub struct TestReport {
    pub path: PathBuf,
    pub outcome: TestOutcome,
}

impl TestReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, TestOutcome::Passed)
    }
}

/// Pass/fail totals for one harness run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &TestReport) {
        if report.passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total_tests(&self) -> usize {
        self.passed + self.failed
    }

    /// `0` when everything passed (including an empty run), `1` otherwise.
    pub fn exit_status(&self) -> u8 {
        u8::from(self.has_failures())
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

// ============================================================================
// RUN LOOP
// ============================================================================

/// Lists the sample files directly inside `dir`, sorted by path.
///
/// Subdirectories are skipped. `extension` and `filter` narrow the list when
/// set; with neither, every file in the directory is a candidate. Only a
/// missing or unreadable `dir` is an error: an entry that cannot be inspected
/// (a dangling symlink, say) stays a candidate and fails when it is loaded.
pub fn discover(
    dir: &Path,
    extension: Option<&str>,
    filter: Option<&str>,
) -> Result<Vec<PathBuf>, HarnessError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(HarnessError::Discovery {
                    dir: dir.to_path_buf(),
                    source,
                });
            }
            Err(source) => {
                let Some(path) = source.path() else {
                    return Err(HarnessError::Discovery {
                        dir: dir.to_path_buf(),
                        source,
                    });
                };
                tracing::debug!(entry = %path.display(), error = %source, "keeping unreadable entry");
                if is_wanted(path, extension, filter) {
                    files.push(path.to_path_buf());
                }
                continue;
            }
        };
        if entry.depth() == 0 {
            if !entry.file_type().is_dir() {
                return Err(HarnessError::NotADirectory {
                    dir: dir.to_path_buf(),
                });
            }
            continue;
        }
        if !entry.file_type().is_file() {
            tracing::debug!(entry = %entry.path().display(), "skipping non-file entry");
            continue;
        }
        if is_wanted(entry.path(), extension, filter) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn is_wanted(path: &Path, extension: Option<&str>, filter: Option<&str>) -> bool {
    if extension.is_some_and(|ext| path.extension().map_or(true, |e| e != ext)) {
        return false;
    }
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    filter.map_or(true, |f| name.contains(f))
}

/// Runs the configured build command, failing the run if it does not succeed.
#[tracing::instrument(skip_all)]
pub fn run_build(command: &[String]) -> Result<(), HarnessError> {
    let (program, args) = command.split_first().ok_or(HarnessError::BuildEmpty)?;
    let rendered = command.join(" ");
    tracing::info!(command = %rendered, "building interpreter");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| HarnessError::BuildSpawn {
            command: rendered.clone(),
            source,
        })?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(HarnessError::BuildFailed {
        command: rendered,
        status: output.status,
        stderr: (!stderr.is_empty()).then_some(stderr),
    })
}

/// Loads, runs and compares a single sample. Never fails: read and spawn
/// errors become an [`TestOutcome::Errored`] report.
pub fn run_test(interpreter: &Path, path: &Path) -> TestReport {
    let outcome = match TestCase::load(path).and_then(|case| {
        let captured = invoke(interpreter, &case.path)?;
        Ok(compare(&case.expected_sequence(), &captured))
    }) {
        Ok(mismatches) if mismatches.is_empty() => TestOutcome::Passed,
        Ok(mismatches) => TestOutcome::Mismatched(mismatches),
        Err(e) => TestOutcome::Errored(e),
    };
    TestReport {
        path: path.to_path_buf(),
        outcome,
    }
}

/// Full run: optional build, discovery, every sample in order, summary.
///
/// Only setup failures come back as `Err`; a failing sample is reported to
/// `out` immediately and counted.
#[tracing::instrument(skip_all, fields(test_dir = %config.test_dir.display()))]
pub fn run_suite(
    config: &HarnessConfig,
    out: &mut impl WriteColor,
) -> Result<RunSummary, HarnessError> {
    if let Some(build) = &config.build {
        run_build(build)?;
    }

    let files = discover(
        &config.test_dir,
        config.extension.as_deref(),
        config.filter.as_deref(),
    )?;
    if files.is_empty() {
        tracing::warn!("no test files found");
    }

    let mut summary = RunSummary::default();
    for path in &files {
        output::print_progress(out, path);
        let report = run_test(&config.interpreter, path);
        if !report.passed() {
            output::print_failure(out, &report);
        }
        summary.record(&report);
    }

    output::print_summary(out, &summary);
    Ok(summary)
}
