//! Core types for coverage reports.

use serde::{Deserialize, Serialize};

use crate::execute::{pass_rate, TestRunResult};
use crate::parser::{CodeUnit, TestCase};

/// Category of a degraded input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A project, source or test directory does not exist
    InputNotFound,
    /// A file could not be read or decoded
    UnreadableFile,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::InputNotFound => write!(f, "input not found"),
            WarningKind::UnreadableFile => write!(f, "unreadable file"),
        }
    }
}

/// Something the analysis could not process. The rest of the report is
/// still valid; this part of it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub kind: WarningKind,
    /// Path relative to the project root
    pub path: String,
    pub message: String,
}

/// A source file without its conventional test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingTestFile {
    pub source_file: String,
    pub expected_test_file: String,
}

/// A testable unit no test case appears to exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingUnitTest {
    pub source_file: String,
    pub unit: CodeUnit,
}

/// File-level coverage by naming convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Source file names in discovery order
    pub source_files: Vec<String>,
    /// Test file names in discovery order
    pub test_files: Vec<String>,
    /// Source files whose test file exists
    pub covered_files: Vec<String>,
    pub missing_test_files: Vec<MissingTestFile>,
}

impl FileCoverage {
    /// Percentage of source files that have a test file; 0 with no sources.
    pub fn coverage_percent(&self) -> f64 {
        pass_rate(self.covered_files.len(), self.source_files.len())
    }
}

/// Function-level coverage by inferred test targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCoverage {
    pub total_units: usize,
    pub excluded_units: usize,
    /// `total_units - excluded_units`
    pub testable_units: usize,
    pub missing_unit_tests: Vec<MissingUnitTest>,
}

/// Units recovered from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInventory {
    pub file: String,
    pub units: Vec<CodeUnit>,
}

/// Test cases recovered from one test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInventory {
    pub file: String,
    pub cases: Vec<TestCase>,
}

/// Totals across the per-file test runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Test cases declared across all test files
    pub declared_cases: usize,
    /// Number of per-file harness invocations counted below
    pub runs: usize,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub failed_cases: usize,
    /// `passed / total * 100`, 0 when nothing ran
    pub pass_rate: f64,
}

impl ExecutionSummary {
    /// Sum the given runs.
    pub fn from_runs<'a, I>(runs: I, declared_cases: usize) -> Self
    where
        I: IntoIterator<Item = &'a TestRunResult>,
    {
        let mut summary = Self {
            declared_cases,
            ..Default::default()
        };
        for run in runs {
            summary.runs += 1;
            summary.total_cases += run.total_cases;
            summary.passed_cases += run.passed_cases;
            summary.failed_cases += run.failed_cases;
        }
        summary.pass_rate = pass_rate(summary.passed_cases, summary.total_cases);
        summary
    }
}

/// The complete result of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Project root as given
    pub project: String,
    /// When the report was produced (RFC 3339). Not set by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_date: Option<String>,
    pub files: FileCoverage,
    pub units: UnitCoverage,
    /// Units per source file, in discovery order
    pub sources: Vec<SourceInventory>,
    /// Test cases per test file, in discovery order
    pub tests: Vec<TestInventory>,
    /// Per-file runs in discovery order, then the whole-suite run if any
    pub test_runs: Vec<TestRunResult>,
    pub execution: ExecutionSummary,
    pub warnings: Vec<AnalysisWarning>,
}

impl CoverageReport {
    /// Whether the test harness was run at all.
    pub fn executed(&self) -> bool {
        !self.test_runs.is_empty()
    }

    /// Missing unit tests grouped by source file, in report order.
    pub fn missing_units_by_file(&self) -> Vec<(&str, Vec<&CodeUnit>)> {
        let mut groups: Vec<(&str, Vec<&CodeUnit>)> = Vec::new();
        for missing in &self.units.missing_unit_tests {
            match groups.last_mut() {
                Some((file, units)) if *file == missing.source_file => units.push(&missing.unit),
                _ => groups.push((missing.source_file.as_str(), vec![&missing.unit])),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::RunOutcome;
    use crate::parser::UnitKind;

    fn run(subject: &str, passed: usize, failed: usize) -> TestRunResult {
        TestRunResult {
            subject_file: subject.to_string(),
            total_cases: passed + failed,
            passed_cases: passed,
            failed_cases: failed,
            raw_output: String::new(),
            incidental_output_lines: vec![],
            outcome: RunOutcome::Completed,
        }
    }

    fn unit(name: &str) -> CodeUnit {
        CodeUnit {
            name: name.to_string(),
            kind: UnitKind::Function,
            enclosing_type: None,
            declared_at_line: 1,
            signature: format!("void {}() {{", name),
            excluded: false,
        }
    }

    #[test]
    fn test_execution_summary() {
        let runs = [run("a_test.dart", 3, 1), run("b_test.dart", 2, 0)];
        let summary = ExecutionSummary::from_runs(&runs, 7);
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.total_cases, 6);
        assert_eq!(summary.passed_cases, 5);
        assert_eq!(summary.failed_cases, 1);
        assert_eq!(summary.declared_cases, 7);
        assert!((summary.pass_rate - 83.333).abs() < 0.01);
    }

    #[test]
    fn test_execution_summary_empty() {
        let summary = ExecutionSummary::from_runs(&Vec::<TestRunResult>::new(), 0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn test_file_coverage_percent() {
        let files = FileCoverage {
            source_files: vec!["a.dart".into(), "b.dart".into()],
            covered_files: vec!["a.dart".into()],
            ..Default::default()
        };
        assert_eq!(files.coverage_percent(), 50.0);
        assert_eq!(FileCoverage::default().coverage_percent(), 0.0);
    }

    #[test]
    fn test_missing_units_grouped_by_file() {
        let report = CoverageReport {
            units: UnitCoverage {
                missing_unit_tests: vec![
                    MissingUnitTest { source_file: "a.dart".into(), unit: unit("one") },
                    MissingUnitTest { source_file: "a.dart".into(), unit: unit("two") },
                    MissingUnitTest { source_file: "b.dart".into(), unit: unit("three") },
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        let groups = report.missing_units_by_file();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "a.dart");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].name, "three");
    }
}
