//! Bounded execution of a single external process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::ExecError;

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl CommandSpec {
    /// The command as it would be typed in a shell, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything a finished process produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// An owned child process.
///
/// The child is killed if this handle is dropped before `finish` returns,
/// and `finish` reaps it on every path, so no process outlives the call.
pub struct ScopedProcess {
    child: Child,
}

impl ScopedProcess {
    /// Start `spec` with stdin closed and both output streams captured.
    pub fn spawn(spec: &CommandSpec) -> Result<Self, ExecError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: spec.program.clone(),
                source,
            })?;
        Ok(Self { child })
    }

    /// Wait for the process to exit, capturing its output, for at most `limit`.
    pub async fn finish(mut self, limit: Duration) -> Result<ProcessOutput, ExecError> {
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();

        let collected = {
            let child = &mut self.child;
            tokio::time::timeout(limit, async move {
                let (out, err, status) =
                    tokio::join!(read_stream(stdout), read_stream(stderr), child.wait());
                Ok::<_, std::io::Error>((out?, err?, status?))
            })
            .await
        };

        match collected {
            Ok(Ok((stdout, stderr, status))) => Ok(ProcessOutput {
                stdout,
                stderr,
                exit_code: status.code(),
            }),
            Ok(Err(e)) => {
                self.terminate().await;
                Err(ExecError::Wait(e))
            }
            Err(_) => {
                self.terminate().await;
                Err(ExecError::Timeout(limit))
            }
        }
    }

    async fn terminate(&mut self) {
        if let Err(e) = self.child.kill().await {
            // Already exited between the timeout firing and the kill.
            debug!(error = %e, "kill after failed wait");
        }
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<String> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Run `spec` to completion on a dedicated runtime, bounded by `limit`.
pub fn run_with_timeout(spec: &CommandSpec, limit: Duration) -> Result<ProcessOutput, ExecError> {
    if spec.program.is_empty() {
        return Err(ExecError::EmptyCommand);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ExecError::Runtime)?;

    debug!(command = %spec.display(), dir = %spec.working_dir.display(), "spawning");
    let result = runtime.block_on(async {
        let process = ScopedProcess::spawn(spec)?;
        process.finish(limit).await
    });

    if let Err(ExecError::Timeout(_)) = &result {
        warn!(command = %spec.display(), "test process timed out and was killed");
    }
    result
}
