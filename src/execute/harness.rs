//! Process-backed test executor.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use super::{reduce_output, run_with_timeout, CommandSpec, OutputMarkers, RunOutcome, TestExecutor, TestRunResult};
use crate::config::ProjectConfig;
use crate::error::ExecError;

/// Subject name used for a whole-suite run.
pub const ALL_TESTS_SUBJECT: &str = "all_tests";

/// Runs the project's test harness as a child process.
///
/// The command line is `<test_command...> [subject] <reporter_args...>`,
/// executed from the project root.
#[derive(Debug, Clone)]
pub struct HarnessRunner {
    command: Vec<String>,
    reporter_args: Vec<String>,
    timeout: Duration,
    markers: OutputMarkers,
}

impl HarnessRunner {
    pub fn new(command: Vec<String>, reporter_args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command,
            reporter_args,
            timeout,
            markers: OutputMarkers::default(),
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.test_command(), config.reporter_args(), config.timeout())
    }

    pub fn with_markers(mut self, markers: OutputMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Build the command line for one invocation.
    ///
    /// `test_file` is passed relative to `project_root` when it lies inside it.
    pub fn command_for(&self, project_root: &Path, test_file: Option<&Path>) -> Result<CommandSpec, ExecError> {
        let (program, base_args) = self.command.split_first().ok_or(ExecError::EmptyCommand)?;

        let mut args = base_args.to_vec();
        if let Some(file) = test_file {
            let relative = file.strip_prefix(project_root).unwrap_or(file);
            args.push(relative.to_string_lossy().into_owned());
        }
        args.extend(self.reporter_args.iter().cloned());

        Ok(CommandSpec {
            program: program.clone(),
            args,
            working_dir: project_root.to_path_buf(),
        })
    }
}

impl TestExecutor for HarnessRunner {
    fn run(&self, project_root: &Path, test_file: Option<&Path>) -> TestRunResult {
        let subject = subject_name(test_file);

        let output = self
            .command_for(project_root, test_file)
            .and_then(|spec| run_with_timeout(&spec, self.timeout));

        match output {
            Ok(output) => {
                let result = reduce_output(&subject, &output, &self.markers);
                info!(
                    subject = %subject,
                    passed = result.passed_cases,
                    failed = result.failed_cases,
                    "test run finished"
                );
                result
            }
            Err(ExecError::Timeout(limit)) => TestRunResult::unexecuted(
                &subject,
                RunOutcome::TimedOut,
                format!("Test execution timed out after {}s", limit.as_secs()),
            ),
            Err(e) => {
                warn!(subject = %subject, error = %e, "test run failed");
                TestRunResult::unexecuted(
                    &subject,
                    RunOutcome::Failed,
                    format!("Error running tests: {}", e),
                )
            }
        }
    }
}

fn subject_name(test_file: Option<&Path>) -> String {
    test_file
        .and_then(|f| f.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ALL_TESTS_SUBJECT.to_string())
}
