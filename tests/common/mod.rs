//! Shared fixtures for the integration tests.
//!
//! Samples are tiny shell scripts so that `/bin/sh` can stand in for the
//! interpreter: `sh <file>` runs the sample with `$0` set to the path it was
//! given, which is exactly what a conforming interpreter echoes in its header.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Shell stand-in for the interpreter.
pub const SHELL: &str = "sh";

pub const HEADER: &str = r#"echo "Running: $0""#;
pub const TRAILER: &str = r#"echo "successfully ran program""#;

pub fn test_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A sample that behaves like a conforming interpreter run: header, each
/// `(printed, annotated)` pair as `echo printed # // expected: annotated`,
/// then the trailer.
pub fn sample(lines: &[(&str, &str)]) -> String {
    let mut text = format!("{HEADER}\n");
    for (printed, annotated) in lines {
        text.push_str(&format!("echo '{printed}' # // expected: {annotated}\n"));
    }
    text.push_str(TRAILER);
    text.push('\n');
    text
}

/// A sample whose output matches its own annotations.
pub fn passing_sample(values: &[&str]) -> String {
    sample(&values.iter().map(|v| (*v, *v)).collect::<Vec<_>>())
}
