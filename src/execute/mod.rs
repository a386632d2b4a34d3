//! Execution of the external test harness.
//!
//! This module provides:
//! - `TestExecutor` trait: runs a project's tests, optionally scoped to one file
//! - `HarnessRunner`: the process-backed executor (`dart test ... --reporter expanded`)
//! - `reduce_output`: turns captured output into pass/fail counts
//!
//! Execution failures are data. A timeout or a missing toolchain produces a
//! `TestRunResult` with zero cases and an explanation in `raw_output`.

mod harness;
mod process;
mod reduce;

pub use harness::{HarnessRunner, ALL_TESTS_SUBJECT};
pub use process::{run_with_timeout, CommandSpec, ProcessOutput, ScopedProcess};
pub use reduce::{reduce_output, OutputMarkers};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a harness invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The process ran to completion (its tests may still have failed)
    Completed,
    /// The process was killed after exceeding the timeout
    TimedOut,
    /// The process could not be started or waited on
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::TimedOut => write!(f, "timed out"),
            RunOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one harness invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRunResult {
    /// Test file name, or "all_tests" for a whole-suite run
    pub subject_file: String,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub failed_cases: usize,
    /// Captured stdout followed by stderr, or a description of the failure
    pub raw_output: String,
    /// Lines the tests printed that are not harness progress output
    pub incidental_output_lines: Vec<String>,
    pub outcome: RunOutcome,
}

impl TestRunResult {
    /// A result for an invocation that produced no usable output.
    pub fn unexecuted(subject: &str, outcome: RunOutcome, message: String) -> Self {
        Self {
            subject_file: subject.to_string(),
            total_cases: 0,
            passed_cases: 0,
            failed_cases: 0,
            raw_output: message,
            incidental_output_lines: Vec::new(),
            outcome,
        }
    }

    /// Percentage of cases that passed; 0 when nothing ran.
    pub fn pass_rate(&self) -> f64 {
        pass_rate(self.passed_cases, self.total_cases)
    }
}

/// `passed / total * 100`, defined as 0 when `total` is 0.
pub fn pass_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    passed as f64 / total as f64 * 100.0
}

/// Runs a project's tests.
pub trait TestExecutor {
    /// Run the suite from `project_root`, scoped to `test_file` when given.
    ///
    /// Never fails: problems are reported through the returned result.
    fn run(&self, project_root: &Path, test_file: Option<&Path>) -> TestRunResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        assert_eq!(pass_rate(3, 4), 75.0);
        assert_eq!(pass_rate(0, 0), 0.0);
        assert_eq!(pass_rate(2, 2), 100.0);
    }

    #[test]
    fn test_unexecuted_has_no_cases() {
        let result = TestRunResult::unexecuted(
            "a_test.dart",
            RunOutcome::TimedOut,
            "Test execution timed out after 60s".to_string(),
        );
        assert_eq!(result.total_cases, 0);
        assert_eq!(result.pass_rate(), 0.0);
        assert!(result.raw_output.contains("timed out"));
    }
}
