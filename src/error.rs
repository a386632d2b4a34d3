//! Error types for covtrack.
//!
//! Most failures during analysis are recorded as data on the report (see
//! [`crate::analyze::AnalysisWarning`] and [`crate::execute::RunOutcome`]).
//! The types here cover the few places where an operation genuinely fails.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating a project configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("compiling pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("compiling glob {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Errors raised while invoking the external test harness.
///
/// These never escape the executor: they are folded into a
/// [`crate::execute::TestRunResult`] so one bad test file cannot stop the
/// rest of the analysis.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("test command is empty")]
    EmptyCommand,
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("test execution timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("waiting for test process: {0}")]
    Wait(#[source] std::io::Error),
    #[error("building process runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Errors raised while writing a test skeleton.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("source file {0} not found")]
    SourceNotFound(PathBuf),
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
