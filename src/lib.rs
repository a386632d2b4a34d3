//! Covtrack - test coverage tracker.
//!
//! Covtrack measures how well a project's tests cover its source without
//! instrumenting anything. It pairs source files with test files by name,
//! recovers declared units and test cases with heuristic parsers, matches
//! them through a one-word inference, and runs the project's own test
//! harness to collect pass/fail counts.
//!
//! # Architecture
//!
//! - `parser`: structure recovery for source files and test declarations
//! - `execute`: bounded external test runs and output reduction
//! - `analyze`: the pipeline producing a `CoverageReport`
//! - `report`: text, JSON, console and progress rendering
//! - `scaffold`: skeleton test files for uncovered sources
//! - `progress`: progress tiers and bars
//! - `config`: YAML project configuration

pub mod analyze;
pub mod cli;
pub mod config;
pub mod error;
pub mod execute;
pub mod parser;
pub mod progress;
pub mod report;
pub mod scaffold;

pub use analyze::{Analyzer, AnalysisWarning, CoverageReport, WarningKind};
pub use config::{ParserSettings, ProjectConfig};
pub use error::{ConfigError, ExecError, ScaffoldError};
pub use execute::{HarnessRunner, RunOutcome, TestExecutor, TestRunResult};
pub use parser::{CodeUnit, ParserConfig, StructureParser, TestCase, TestDeclarationParser, UnitKind};
pub use progress::{ProgressSummary, ProgressTier};
pub use scaffold::{ConfirmOverwrite, ScaffoldOutcome, Scaffolder};
