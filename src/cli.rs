//! Command-line interface for covtrack.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::analyze::{Analyzer, CoverageReport};
use crate::config::ProjectConfig;
use crate::progress::ProgressSummary;
use crate::report;
use crate::scaffold::{AlwaysOverwrite, ConfirmOverwrite, ScaffoldOutcome, Scaffolder};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Report file names written into the project root by default.
const DEFAULT_TEXT_REPORT: &str = "test_analysis_report.txt";
const DEFAULT_JSON_REPORT: &str = "test_analysis_report.json";

/// Test coverage tracker.
///
/// Covtrack pairs each source file with its conventional test file, finds
/// the functions, methods, getters and setters that no declared test seems
/// to exercise, runs the test harness per test file, and writes a report.
#[derive(Parser)]
#[command(name = "covtrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze test coverage and write a report
    Analyze(AnalyzeArgs),
    /// Generate skeleton test files for source files
    #[command(visible_alias = "generate")]
    Scaffold(ScaffoldArgs),
    /// Show file-level test progress
    Progress(ProgressArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report file (default: <PROJECT>/test_analysis_report.txt or .json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Skip running the test harness
    #[arg(long)]
    pub no_run: bool,

    /// Also run the whole suite once
    #[arg(long)]
    pub full_suite: bool,

    /// Do not print the console summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the scaffold command.
#[derive(Parser)]
pub struct ScaffoldArgs {
    /// Source file name inside the source directory (e.g. math_utils.dart)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub file: Option<String>,

    /// Generate skeletons for every source file without a test file
    #[arg(short, long)]
    pub all: bool,

    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overwrite existing test files without asking
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the progress command.
#[derive(Parser)]
pub struct ProgressArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Asks on stdin before overwriting.
pub struct StdinConfirm;

impl ConfirmOverwrite for StdinConfirm {
    fn confirm(&mut self, path: &Path) -> bool {
        print!("Test file {} already exists. Overwrite? (y/N): ", path.display());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

/// Check the project directory and load its config.
///
/// Returns the exit code to stop with when either is unusable.
fn load_project(project: &Path, config: Option<&Path>) -> Result<ProjectConfig, i32> {
    if !project.is_dir() {
        eprintln!("Error: project directory {:?} not found", project);
        return Err(EXIT_FAILED);
    }
    ProjectConfig::load(project, config).map_err(|e| {
        eprintln!("Error: {}", e);
        EXIT_ERROR
    })
}

fn now_rfc3339() -> Option<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .ok()
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if args.format != "text" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'text' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = match load_project(&args.project, args.config.as_deref()) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let analyzer = match Analyzer::new(&args.project, config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut report = analyzer
        .skip_execution(args.no_run)
        .run_full_suite(args.full_suite)
        .run();
    report.analysis_date = now_rfc3339();

    let output = write_report(args, &report)?;

    if !args.quiet {
        report::write_pretty(&report, Some(&output.display().to_string()));
    }

    Ok(EXIT_SUCCESS)
}

fn write_report(args: &AnalyzeArgs, report: &CoverageReport) -> anyhow::Result<PathBuf> {
    let (content, default_name) = match args.format.as_str() {
        "json" => (report::render_json(report)?, DEFAULT_JSON_REPORT),
        _ => (report::render_text(report), DEFAULT_TEXT_REPORT),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.project.join(default_name));
    std::fs::write(&output, content)
        .with_context(|| format!("writing report to {}", output.display()))?;
    Ok(output)
}

/// Run the scaffold command.
pub fn run_scaffold(args: &ScaffoldArgs) -> anyhow::Result<i32> {
    let config = match load_project(&args.project, args.config.as_deref()) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let scaffolder = match Scaffolder::new(&args.project, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let mut confirm: Box<dyn ConfirmOverwrite> = if args.force {
        Box::new(AlwaysOverwrite)
    } else {
        Box::new(StdinConfirm)
    };

    match &args.file {
        Some(file) => match scaffolder.scaffold_file(file, confirm.as_mut()) {
            Ok(outcome) => {
                print_outcome(&outcome);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(EXIT_FAILED)
            }
        },
        None => scaffold_all(&scaffolder, confirm.as_mut()),
    }
}

fn scaffold_all(scaffolder: &Scaffolder, confirm: &mut dyn ConfirmOverwrite) -> anyhow::Result<i32> {
    let results = match scaffolder.scaffold_missing(confirm) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_FAILED);
        }
    };

    if results.is_empty() {
        println!("All source files already have test files.");
        return Ok(EXIT_SUCCESS);
    }

    let mut failed = false;
    let mut created = 0;
    for (name, result) in &results {
        match result {
            Ok(outcome) => {
                if matches!(outcome, ScaffoldOutcome::Created(_)) {
                    created += 1;
                }
                print_outcome(outcome);
            }
            Err(e) => {
                failed = true;
                eprintln!("✗ {}: {}", name, e);
            }
        }
    }
    println!("Created {} of {} test skeletons.", created, results.len());

    if failed {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn print_outcome(outcome: &ScaffoldOutcome) {
    match outcome {
        ScaffoldOutcome::Created(path) => println!("✓ Created {}", path.display()),
        ScaffoldOutcome::Skipped(path) => println!("- Skipped {}", path.display()),
    }
}

/// Run the progress command.
pub fn run_progress(args: &ProgressArgs) -> anyhow::Result<i32> {
    let config = match load_project(&args.project, args.config.as_deref()) {
        Ok(c) => c,
        Err(code) => return Ok(code),
    };

    let analyzer = match Analyzer::new(&args.project, config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let report = analyzer.skip_execution(true).run();
    let summary = ProgressSummary::from_report(&report);
    print!("{}", report::render_progress(&summary));

    Ok(EXIT_SUCCESS)
}
