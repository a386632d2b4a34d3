//! Reduction of captured harness output to pass/fail counts.

use regex::Regex;

use super::{ProcessOutput, RunOutcome, TestRunResult};

/// Markers recognised in harness output.
#[derive(Debug, Clone)]
pub struct OutputMarkers {
    pub success_glyph: char,
    pub failure_glyph: char,
    /// Phrase printed when the whole run succeeded
    pub success_phrase: String,
    /// Matches a literal test declaration, counted when no glyphs appear
    pub declaration: Regex,
    /// Lines containing any of these are harness output, not test prints
    pub harness_words: Vec<String>,
    /// Trimmed lines starting with any of these are build noise
    pub noise_prefixes: Vec<String>,
}

impl Default for OutputMarkers {
    fn default() -> Self {
        Self {
            success_glyph: '✓',
            failure_glyph: '✗',
            success_phrase: "All tests passed".to_string(),
            declaration: Regex::new(r"test\s*\(").expect("declaration pattern compiles"),
            harness_words: vec!["test".into(), "passed".into(), "failed".into()],
            noise_prefixes: vec!["+".into(), "Building".into()],
        }
    }
}

/// Reduce one invocation's output to a result.
///
/// Glyphs in stdout are counted first. With no glyphs, an apparently
/// successful run (zero exit code or the success phrase) counts the test
/// declarations echoed in the output as passed, and failing that assumes a
/// single passing case.
pub fn reduce_output(subject: &str, output: &ProcessOutput, markers: &OutputMarkers) -> TestRunResult {
    let stdout = output.stdout.as_str();
    let combined = format!("{}{}", output.stdout, output.stderr);

    let mut passed = stdout.matches(markers.success_glyph).count();
    let failed = stdout.matches(markers.failure_glyph).count();
    let mut total = passed + failed;

    if total == 0 && (output.success() || stdout.contains(&markers.success_phrase)) {
        let declared = markers.declaration.find_iter(&combined).count();
        passed = declared.max(1);
        total = passed;
    }

    TestRunResult {
        subject_file: subject.to_string(),
        total_cases: total,
        passed_cases: passed,
        failed_cases: failed,
        incidental_output_lines: incidental_lines(stdout, markers),
        raw_output: combined,
        outcome: RunOutcome::Completed,
    }
}

/// Lines the tests printed themselves, in output order.
fn incidental_lines(stdout: &str, markers: &OutputMarkers) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| {
            !line.contains(markers.success_glyph)
                && !line.contains(markers.failure_glyph)
                && !markers.harness_words.iter().any(|w| line.contains(w.as_str()))
        })
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !markers.noise_prefixes.iter().any(|p| line.starts_with(p.as_str()))
        })
        .map(str::to_string)
        .collect()
}
