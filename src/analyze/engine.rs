//! Analysis pipeline that orchestrates parsing, coverage and execution.

use globset::GlobSet;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::discover::{discover_sources, discover_tests, file_name};
use super::{
    file_coverage, unit_coverage, AnalysisWarning, CoverageReport, ExecutionSummary,
    SourceInventory, TestInventory, WarningKind,
};
use crate::config::ProjectConfig;
use crate::error::ConfigError;
use crate::execute::{HarnessRunner, TestExecutor, TestRunResult};
use crate::parser::{ParserConfig, StructureParser, TestDeclarationParser};

/// Runs a full coverage analysis over one project.
pub struct Analyzer {
    root: PathBuf,
    config: ProjectConfig,
    parser_config: ParserConfig,
    excluded: GlobSet,
    executor: Box<dyn TestExecutor>,
    execute: bool,
    full_suite: bool,
}

impl Analyzer {
    /// Create an analyzer for the project at `root`.
    ///
    /// Fails only when the config's patterns or globs do not compile.
    pub fn new<P: AsRef<Path>>(root: P, config: ProjectConfig) -> Result<Self, ConfigError> {
        let parser_config = ParserConfig::new(&config.parser_settings())?;
        let excluded = config.excluded_matcher()?;
        let executor = Box::new(HarnessRunner::from_config(&config));
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            config,
            parser_config,
            excluded,
            executor,
            execute: true,
            full_suite: false,
        })
    }

    /// Replace the test executor.
    pub fn with_executor<E: TestExecutor + 'static>(mut self, executor: E) -> Self {
        self.executor = Box::new(executor);
        self
    }

    /// Set whether to skip running the test harness.
    pub fn skip_execution(mut self, skip: bool) -> Self {
        self.execute = !skip;
        self
    }

    /// Set whether to also run the whole suite once without a subject file.
    pub fn run_full_suite(mut self, full: bool) -> Self {
        self.full_suite = full;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Run the pipeline.
    ///
    /// Never fails. Inputs that could not be processed are recorded in
    /// `warnings` and contribute nothing to the totals.
    pub fn run(&self) -> CoverageReport {
        let mut warnings = Vec::new();

        let sources = discover_sources(&self.root, &self.config, &self.excluded);
        let tests = discover_tests(&self.root, &self.config);
        warnings.extend(sources.warning);
        warnings.extend(tests.warning);
        info!(
            sources = sources.files.len(),
            tests = tests.files.len(),
            "discovered project files"
        );

        let (source_inventory, source_warnings) = self.parse_sources(&sources.files);
        let (test_inventory, test_warnings) = self.parse_tests(&tests.files);
        warnings.extend(source_warnings);
        warnings.extend(test_warnings);

        let source_names: Vec<String> = source_inventory.iter().map(|s| s.file.clone()).collect();
        let test_names: Vec<String> = test_inventory.iter().map(|t| t.file.clone()).collect();
        let files = file_coverage(&source_names, &test_names, &self.config);
        let units = unit_coverage(&source_inventory, &test_inventory, &self.config);

        let test_runs = if self.execute {
            self.execute_tests(&tests.files)
        } else {
            Vec::new()
        };
        let per_file = test_runs.len() - usize::from(self.execute && self.full_suite);
        let declared: usize = test_inventory.iter().map(|t| t.cases.len()).sum();
        let execution = ExecutionSummary::from_runs(&test_runs[..per_file], declared);

        CoverageReport {
            project: self.root.display().to_string(),
            analysis_date: None,
            files,
            units,
            sources: source_inventory,
            tests: test_inventory,
            test_runs,
            execution,
            warnings,
        }
    }

    fn parse_sources(&self, paths: &[PathBuf]) -> (Vec<SourceInventory>, Vec<AnalysisWarning>) {
        let parser = StructureParser::new(&self.parser_config);
        let root = self.root.as_path();
        let parsed: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let file = file_name(path);
                match parser.parse_file(path) {
                    Ok(structure) => {
                        debug!(file = %file, units = structure.units.len(), "parsed source");
                        (SourceInventory { file, units: structure.units }, None)
                    }
                    Err(e) => {
                        let warning = unreadable(root, path, &e);
                        (SourceInventory { file, units: Vec::new() }, Some(warning))
                    }
                }
            })
            .collect();
        split(parsed)
    }

    fn parse_tests(&self, paths: &[PathBuf]) -> (Vec<TestInventory>, Vec<AnalysisWarning>) {
        let parser = TestDeclarationParser::new(&self.parser_config);
        let root = self.root.as_path();
        let parsed: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let file = file_name(path);
                match parser.parse_file(path) {
                    Ok(cases) => {
                        debug!(file = %file, cases = cases.len(), "parsed tests");
                        (TestInventory { file, cases }, None)
                    }
                    Err(e) => {
                        let warning = unreadable(root, path, &e);
                        (TestInventory { file, cases: Vec::new() }, Some(warning))
                    }
                }
            })
            .collect();
        split(parsed)
    }

    /// Run each test file in turn, then the whole suite if requested.
    fn execute_tests(&self, paths: &[PathBuf]) -> Vec<TestRunResult> {
        let mut runs: Vec<TestRunResult> = paths
            .iter()
            .map(|path| {
                info!(file = %file_name(path), "running tests");
                self.executor.run(&self.root, Some(path))
            })
            .collect();
        if self.full_suite {
            info!("running full test suite");
            runs.push(self.executor.run(&self.root, None));
        }
        runs
    }
}

fn unreadable(root: &Path, path: &Path, error: &std::io::Error) -> AnalysisWarning {
    warn!(file = %path.display(), error = %error, "skipping unreadable file");
    AnalysisWarning {
        kind: WarningKind::UnreadableFile,
        path: path.strip_prefix(root).unwrap_or(path).display().to_string(),
        message: error.to_string(),
    }
}

fn split<T>(parsed: Vec<(T, Option<AnalysisWarning>)>) -> (Vec<T>, Vec<AnalysisWarning>) {
    let mut items = Vec::with_capacity(parsed.len());
    let mut warnings = Vec::new();
    for (item, warning) in parsed {
        items.push(item);
        warnings.extend(warning);
    }
    (items, warnings)
}
