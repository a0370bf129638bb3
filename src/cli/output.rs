//! Handles all user-facing report output.
//!
//! Progress lines, failure diagnostics and the final summary are written
//! here and nowhere else. Everything goes through `WriteColor`, so the same
//! code drives a colored terminal and a plain in-memory buffer in tests.
//! Write errors on the report stream are ignored; the verdict still comes
//! back through the exit code.

use std::path::Path;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::harness::{Mismatch, RunSummary, TestOutcome, TestReport};

/// Placeholder shown for a side of a line pair that ran out of lines.
pub const MISSING: &str = "<missing>";

// ============================================================================
// PER-FILE OUTPUT
// ============================================================================

pub fn print_progress(out: &mut impl WriteColor, path: &Path) {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let _ = writeln!(out, "running file {name}");
}

/// Prints the banner for a failed file followed by one line per problem.
pub fn print_failure(out: &mut impl WriteColor, report: &TestReport) {
    let _ = writeln!(out);
    write_colored(
        out,
        Color::Red,
        &format!("Error in test(s): '{}'", report.path.display()),
    );

    match &report.outcome {
        TestOutcome::Passed => {}
        TestOutcome::Mismatched(mismatches) => {
            for mismatch in mismatches {
                write_colored(out, Color::Red, &describe_mismatch(mismatch));
            }
        }
        TestOutcome::Errored(error) => {
            write_colored(out, Color::Red, &describe_error(error));
        }
    }
}

pub fn describe_mismatch(mismatch: &Mismatch) -> String {
    match mismatch {
        Mismatch::Line {
            expected, actual, ..
        } => format!(
            "Expected: {}, Actual: {}",
            expected.as_deref().unwrap_or(MISSING),
            actual.as_deref().unwrap_or(MISSING)
        ),
        Mismatch::Stderr(line) => format!("Unexpected stderr: {line}"),
    }
}

fn describe_error(error: &dyn std::error::Error) -> String {
    match error.source() {
        Some(cause) => format!("{error}: {cause}"),
        None => error.to_string(),
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

pub fn print_summary(out: &mut impl WriteColor, summary: &RunSummary) {
    let _ = writeln!(out, "\n___Test results___");
    write_colored(out, Color::Green, &format!("Ok: {}", summary.passed));

    if summary.has_failures() {
        write_colored(out, Color::Red, &format!("Err: {}", summary.failed));
        write_colored(out, Color::Red, "Error(s) occurred in tests!");
    } else {
        let _ = writeln!(out, "Err: {}", summary.failed);
        write_colored(out, Color::Green, "All tests Ok!");
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_colored(out: &mut impl WriteColor, color: Color, text: &str) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(color)).set_intense(true));
    let _ = write!(out, "{text}");
    let _ = out.reset();
    let _ = writeln!(out);
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use termcolor::Buffer;

    use super::*;
    use crate::errors::HarnessError;

    fn rendered(buffer: Buffer) -> String {
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn line_mismatch_shows_missing_placeholder() {
        let text = describe_mismatch(&Mismatch::Line {
            index: 2,
            expected: Some("successfully ran program".to_string()),
            actual: None,
        });
        assert_eq!(text, "Expected: successfully ran program, Actual: <missing>");
    }

    #[test]
    fn stderr_mismatch_has_its_own_label() {
        let text = describe_mismatch(&Mismatch::Stderr("warning: deprecated".to_string()));
        assert_eq!(text, "Unexpected stderr: warning: deprecated");
    }

    #[test]
    fn failure_banner_names_file() {
        let mut buffer = Buffer::no_color();
        let report = TestReport {
            path: PathBuf::from("./test/f.spv"),
            outcome: TestOutcome::Mismatched(vec![Mismatch::Line {
                index: 1,
                expected: Some("42".to_string()),
                actual: Some("43".to_string()),
            }]),
        };
        print_failure(&mut buffer, &report);
        assert_eq!(
            rendered(buffer),
            "\nError in test(s): './test/f.spv'\nExpected: 42, Actual: 43\n"
        );
    }

    #[test]
    fn spawn_error_is_distinct_from_mismatch() {
        let mut buffer = Buffer::no_color();
        let report = TestReport {
            path: PathBuf::from("f.spv"),
            outcome: TestOutcome::Errored(HarnessError::Spawn {
                interpreter: PathBuf::from("./nope"),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            }),
        };
        print_failure(&mut buffer, &report);
        let text = rendered(buffer);
        assert!(text.contains("could not start interpreter './nope': not found"));
        assert!(!text.contains("Expected:"));
    }

    #[test]
    fn summary_for_clean_run() {
        let mut buffer = Buffer::no_color();
        print_summary(&mut buffer, &RunSummary { passed: 3, failed: 0 });
        assert_eq!(
            rendered(buffer),
            "\n___Test results___\nOk: 3\nErr: 0\nAll tests Ok!\n"
        );
    }

    #[test]
    fn summary_with_failures() {
        let mut buffer = Buffer::no_color();
        print_summary(&mut buffer, &RunSummary { passed: 1, failed: 2 });
        let text = rendered(buffer);
        assert!(text.contains("Err: 2\nError(s) occurred in tests!\n"));
        assert!(!text.contains("All tests Ok!"));
    }

    #[test]
    fn progress_uses_file_name() {
        let mut buffer = Buffer::no_color();
        print_progress(&mut buffer, Path::new("./test/loops.spv"));
        assert_eq!(rendered(buffer), "running file loops.spv\n");
    }
}
