//! Progress tracking for covtrack.
//!
//! Summarises file-level and function-level coverage into a tier, a
//! progress bar and the list of test files still to write. Test execution
//! results are not considered.

use serde::{Deserialize, Serialize};

use crate::analyze::{CoverageReport, MissingTestFile};
use crate::execute::pass_rate;

/// Tier thresholds on file coverage percentage.
pub mod tiers {
    pub const EXCELLENT_MIN: f64 = 80.0;
    pub const GOOD_MIN: f64 = 50.0;
    pub const GETTING_STARTED_MIN: f64 = 25.0;
}

/// Width of the progress bar in the progress view.
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// How far along a project's test files are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    Complete,
    Excellent,
    Good,
    GettingStarted,
    Starting,
}

impl ProgressTier {
    pub fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= 100.0 => ProgressTier::Complete,
            p if p >= tiers::EXCELLENT_MIN => ProgressTier::Excellent,
            p if p >= tiers::GOOD_MIN => ProgressTier::Good,
            p if p >= tiers::GETTING_STARTED_MIN => ProgressTier::GettingStarted,
            _ => ProgressTier::Starting,
        }
    }

    /// Headline shown for this tier.
    pub fn headline(&self) -> &'static str {
        match self {
            ProgressTier::Complete => "Every source file has a test file.",
            ProgressTier::Excellent => "Excellent progress, almost there.",
            ProgressTier::Good => "Good work, solid progress.",
            ProgressTier::GettingStarted => "Getting started, keep adding tests.",
            ProgressTier::Starting => "Starting point, time to build those tests.",
        }
    }
}

impl std::fmt::Display for ProgressTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressTier::Complete => write!(f, "complete"),
            ProgressTier::Excellent => write!(f, "excellent"),
            ProgressTier::Good => write!(f, "good"),
            ProgressTier::GettingStarted => write!(f, "getting started"),
            ProgressTier::Starting => write!(f, "starting"),
        }
    }
}

/// Excluded-unit count for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExclusions {
    pub file: String,
    pub excluded: usize,
    pub total: usize,
}

/// Coverage progress for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub project: String,
    pub source_files: usize,
    pub test_files: Vec<String>,
    pub covered_files: usize,
    pub file_coverage: f64,
    pub tier: ProgressTier,
    pub total_units: usize,
    pub testable_units: usize,
    pub excluded_units: usize,
    /// Share of declared units that count toward coverage; `None` when no
    /// unit is testable
    pub testable_share: Option<f64>,
    /// Files with at least one excluded unit, in discovery order
    pub exclusions: Vec<FileExclusions>,
    pub missing: Vec<MissingTestFile>,
}

impl ProgressSummary {
    pub fn from_report(report: &CoverageReport) -> Self {
        let units = &report.units;
        let file_coverage = report.files.coverage_percent();

        let testable_share = if units.testable_units == 0 {
            None
        } else {
            Some(pass_rate(
                units.testable_units,
                units.testable_units + units.excluded_units,
            ))
        };

        let exclusions = report
            .sources
            .iter()
            .filter_map(|source| {
                let excluded = source.units.iter().filter(|u| u.excluded).count();
                (excluded > 0).then(|| FileExclusions {
                    file: source.file.clone(),
                    excluded,
                    total: source.units.len(),
                })
            })
            .collect();

        Self {
            project: report.project.clone(),
            source_files: report.files.source_files.len(),
            test_files: report.files.test_files.clone(),
            covered_files: report.files.covered_files.len(),
            file_coverage,
            tier: ProgressTier::from_percent(file_coverage),
            total_units: units.total_units,
            testable_units: units.testable_units,
            excluded_units: units.excluded_units,
            testable_share,
            exclusions,
            missing: report.files.missing_test_files.clone(),
        }
    }
}

/// Render `[████░░░░] 42.0%` with `floor(width * percent / 100)` filled cells.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((width as f64) * clamped / 100.0).floor() as usize;
    format!(
        "[{}{}] {:.1}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent
    )
}
