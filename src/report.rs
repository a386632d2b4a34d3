//! Output formatting for covtrack results.
//!
//! Supports:
//! - Text: the sectioned analysis report written to disk
//! - JSON: the full `CoverageReport` for programmatic consumption
//! - Pretty: a short coloured summary for the terminal
//! - Progress: the progress-tracker view

use colored::*;

use crate::analyze::CoverageReport;
use crate::parser::CodeUnit;
use crate::progress::{progress_bar, ProgressSummary, ProgressTier, DEFAULT_BAR_WIDTH};

const RULE_WIDTH: usize = 80;
const SECTION_WIDTH: usize = 40;
/// Missing pairs listed before the progress view summarises the rest.
const MAX_LISTED_MISSING: usize = 5;

// =============================================================================
// Text Format
// =============================================================================

/// Render the full text report.
///
/// Sections appear in a fixed order. Output depends only on `report`.
pub fn render_text(report: &CoverageReport) -> String {
    let mut out = Vec::new();

    out.push("=".repeat(RULE_WIDTH));
    out.push("TEST COVERAGE ANALYSIS REPORT".to_string());
    out.push("=".repeat(RULE_WIDTH));
    if let Some(date) = &report.analysis_date {
        out.push(format!("Generated on: {}", date));
    }
    out.push(format!("Project Directory: {}", report.project));
    out.push(String::new());

    write_summary_section(&mut out, report);
    write_missing_files_section(&mut out, report);
    write_missing_units_section(&mut out, report);
    write_execution_section(&mut out, report);
    write_inventory_section(&mut out, report);
    write_warnings_section(&mut out, report);
    write_recommendations_section(&mut out, report);

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn section(out: &mut Vec<String>, title: &str) {
    out.push(title.to_string());
    out.push("-".repeat(SECTION_WIDTH));
}

fn write_summary_section(out: &mut Vec<String>, report: &CoverageReport) {
    let exec = &report.execution;
    section(out, "SUMMARY");
    out.push(format!("Source Files: {}", report.files.source_files.len()));
    out.push(format!("Test Files: {}", report.files.test_files.len()));
    out.push(format!(
        "Covered Files: {} ({:.1}%)",
        report.files.covered_files.len(),
        report.files.coverage_percent()
    ));
    out.push(format!("Total Functions/Methods: {}", report.units.total_units));
    out.push(format!(
        "Testable Functions/Methods: {} ({} excluded)",
        report.units.testable_units, report.units.excluded_units
    ));
    out.push(format!("Total Test Cases: {}", exec.declared_cases));
    if report.executed() {
        out.push(format!(
            "Test Execution Results: {}/{} passed",
            exec.passed_cases, exec.total_cases
        ));
        out.push(format!("Overall Pass Rate: {:.1}%", exec.pass_rate));
    } else {
        out.push("Test Execution Results: not run".to_string());
    }
    out.push(String::new());
}

fn write_missing_files_section(out: &mut Vec<String>, report: &CoverageReport) {
    section(out, "MISSING TEST FILES");
    if report.files.missing_test_files.is_empty() {
        out.push("All source files have corresponding test files".to_string());
    }
    for missing in &report.files.missing_test_files {
        out.push(format!(
            "✗ {} -> Missing: {}",
            missing.source_file, missing.expected_test_file
        ));
    }
    out.push(String::new());
}

fn write_missing_units_section(out: &mut Vec<String>, report: &CoverageReport) {
    section(out, "MISSING UNIT TESTS");
    let groups = report.missing_units_by_file();
    if groups.is_empty() {
        out.push("All functions have corresponding tests".to_string());
    }
    for (file, units) in groups {
        out.push(format!("{}:", file));
        for unit in units {
            out.push(format!("  ✗ {}", describe_unit(unit)));
        }
    }
    out.push(String::new());
}

fn write_execution_section(out: &mut Vec<String>, report: &CoverageReport) {
    section(out, "TEST EXECUTION DETAILS");
    if !report.executed() {
        out.push("Tests were not executed".to_string());
    }
    for run in &report.test_runs {
        out.push(format!("{}:", run.subject_file));
        out.push(format!("  Outcome: {}", run.outcome));
        out.push(format!("  Tests Run: {}", run.total_cases));
        out.push(format!("  Passed: {}", run.passed_cases));
        out.push(format!("  Failed: {}", run.failed_cases));
        out.push(format!("  Pass Rate: {:.1}%", run.pass_rate()));
        if run.total_cases == 0 && !run.raw_output.is_empty() {
            out.push(format!("  Output: {}", first_line(&run.raw_output)));
        }
        if !run.incidental_output_lines.is_empty() {
            out.push("  Print Output:".to_string());
            for line in &run.incidental_output_lines {
                out.push(format!("    {}", line));
            }
        }
    }
    out.push(String::new());
}

fn write_inventory_section(out: &mut Vec<String>, report: &CoverageReport) {
    section(out, "UNIT INVENTORY");
    for source in report.sources.iter().filter(|s| !s.units.is_empty()) {
        out.push(format!("{}:", source.file));
        for unit in &source.units {
            let marker = if unit.excluded { " (no test)" } else { "" };
            out.push(format!("  - {}{}", describe_unit(unit), marker));
        }
    }
    out.push(String::new());
}

fn write_warnings_section(out: &mut Vec<String>, report: &CoverageReport) {
    if report.warnings.is_empty() {
        return;
    }
    section(out, "WARNINGS");
    for warning in &report.warnings {
        out.push(format!("! {} ({}): {}", warning.path, warning.kind, warning.message));
    }
    out.push(String::new());
}

fn write_recommendations_section(out: &mut Vec<String>, report: &CoverageReport) {
    section(out, "RECOMMENDATIONS");
    for (i, rec) in recommendations(report).iter().enumerate() {
        out.push(format!("{}. {}", i + 1, rec));
    }
}

/// `function: add [line 3]`, `method: add (in Calculator) [line 7]`.
fn describe_unit(unit: &CodeUnit) -> String {
    let owner = unit
        .enclosing_type
        .as_ref()
        .map(|t| format!(" (in {})", t))
        .unwrap_or_default();
    format!("{}: {}{} [line {}]", unit.kind, unit.name, owner, unit.declared_at_line)
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

/// Suggested next steps, derived only from the report.
///
/// The pass-rate suggestion is only made when tests were executed. A run
/// with execution skipped (`analyze --no-run`, `progress`) has a pass rate
/// of 0 that says nothing about the suite.
pub fn recommendations(report: &CoverageReport) -> Vec<String> {
    let mut recs = Vec::new();

    let missing_files = report.files.missing_test_files.len();
    if missing_files > 0 {
        recs.push(format!(
            "Create {} missing test files to achieve full coverage",
            missing_files
        ));
    }

    let missing_units = report.units.missing_unit_tests.len();
    if missing_units > 0 {
        recs.push(format!(
            "Add tests for {} untested functions/methods",
            missing_units
        ));
    }

    let rate = report.execution.pass_rate;
    if report.executed() && rate < 100.0 {
        recs.push(format!(
            "Fix failing tests to improve pass rate from {:.1}% to 100%",
            rate
        ));
    }

    if recs.is_empty() {
        recs.push("Excellent! Your test coverage is complete.".to_string());
    }
    recs
}

// =============================================================================
// JSON Format
// =============================================================================

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &CoverageReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Print a short coloured summary of `report` to stdout.
pub fn write_pretty(report: &CoverageReport, report_path: Option<&str>) {
    println!();
    print!("  ");
    print!("{}", "covtrack".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Project: ".dimmed());
    println!("{}", report.project);
    if let Some(path) = report_path {
        print!("  {}", "Report:  ".dimmed());
        println!("{}", path);
    }
    println!();

    let files = &report.files;
    print!("  Files:  ");
    write_colored_percent(files.coverage_percent());
    println!(
        "  {}",
        format!(
            "({}/{} source files have tests)",
            files.covered_files.len(),
            files.source_files.len()
        )
        .dimmed()
    );

    let units = &report.units;
    let tested = units.testable_units.saturating_sub(units.missing_unit_tests.len());
    print!("  Units:  ");
    write_colored_percent(crate::execute::pass_rate(tested, units.testable_units));
    println!(
        "  {}",
        format!(
            "({}/{} testable units, {} excluded)",
            tested, units.testable_units, units.excluded_units
        )
        .dimmed()
    );

    if report.executed() {
        let exec = &report.execution;
        print!("  Tests:  ");
        write_colored_percent(exec.pass_rate);
        println!(
            "  {}",
            format!("({}/{} passed)", exec.passed_cases, exec.total_cases).dimmed()
        );
    }
    println!();

    if !report.warnings.is_empty() {
        println!("  {} ({}):", "Warnings".yellow(), report.warnings.len());
        for warning in &report.warnings {
            println!("    {} {}", warning.path.blue(), warning.message.dimmed());
        }
        println!();
    }

    for rec in recommendations(report) {
        println!("  {} {}", "→".cyan(), rec);
    }
    println!();
}

fn write_colored_percent(p: f64) {
    let text = format!("{:>5.1}%", p);
    match p {
        p if p >= 100.0 => print!("{}", text.green().bold()),
        p if p >= 80.0 => print!("{}", text.green()),
        p if p >= 50.0 => print!("{}", text.yellow()),
        _ => print!("{}", text.red()),
    }
}

// =============================================================================
// Progress Format
// =============================================================================

/// Render the progress-tracker view.
pub fn render_progress(summary: &ProgressSummary) -> String {
    let mut out = Vec::new();

    out.push("TEST PROGRESS TRACKER".to_string());
    out.push("=".repeat(50));
    out.push(format!("Project: {}", summary.project));
    out.push(String::new());

    section(&mut out, "CURRENT STATUS");
    out.push(format!("Source Files: {}", summary.source_files));
    out.push(format!("Test Files: {}", summary.test_files.len()));
    out.push(format!("Covered Files: {}", summary.covered_files));
    out.push(format!("Missing Tests: {}", summary.missing.len()));
    out.push(String::new());

    section(&mut out, "TEST COVERAGE PROGRESS");
    out.push(progress_bar(summary.file_coverage, DEFAULT_BAR_WIDTH));
    out.push(summary.tier.headline().to_string());
    if summary.tier != ProgressTier::Complete {
        out.push(format!("{} more test files needed", summary.missing.len()));
    }
    out.push(String::new());

    section(&mut out, "UNIT COVERAGE");
    out.push(format!("Total Units: {}", summary.total_units));
    out.push(format!("Testable Units: {}", summary.testable_units));
    out.push(format!("Excluded Units: {}", summary.excluded_units));
    match summary.testable_share {
        Some(share) => out.push(format!("Testable Share: {:.1}%", share)),
        None => out.push("Testable Share: n/a".to_string()),
    }
    for entry in &summary.exclusions {
        out.push(format!(
            "  {}: {} of {} excluded",
            entry.file, entry.excluded, entry.total
        ));
    }
    out.push(String::new());

    if !summary.missing.is_empty() {
        section(&mut out, "MISSING TEST FILES");
        for missing in summary.missing.iter().take(MAX_LISTED_MISSING) {
            out.push(format!(
                "✗ {} -> Create: {}",
                missing.source_file, missing.expected_test_file
            ));
        }
        if summary.missing.len() > MAX_LISTED_MISSING {
            out.push(format!(
                "... and {} more",
                summary.missing.len() - MAX_LISTED_MISSING
            ));
        }
        out.push(String::new());
    }

    if !summary.test_files.is_empty() {
        section(&mut out, "EXISTING TEST FILES");
        for file in &summary.test_files {
            out.push(format!("✓ {}", file));
        }
        out.push(String::new());
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}
