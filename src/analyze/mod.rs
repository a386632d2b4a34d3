//! Project-wide coverage analysis.
//!
//! The `Analyzer` discovers source and test files, parses each of them,
//! pairs sources with tests by file name, matches units against inferred
//! test targets and runs the test harness. The result is one
//! `CoverageReport`.

mod coverage;
mod discover;
mod engine;
mod types;

pub use coverage::{file_coverage, unit_coverage};
pub use discover::{discover_sources, discover_tests, Discovered};
pub use engine::Analyzer;
pub use types::{
    AnalysisWarning, CoverageReport, ExecutionSummary, FileCoverage, MissingTestFile,
    MissingUnitTest, SourceInventory, TestInventory, UnitCoverage, WarningKind,
};
