//! Build/test runner
//!
//! Sole owner of external process invocation. Each attempt runs two phases
//! against the written package: a fast compile check, then the full test
//! run, each under its own hard deadline. Callers receive a tagged outcome
//! and never branch on raw exit codes. A phase that exceeds its deadline has
//! its process killed and reaped before the call returns.

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::CoachConfig;

/// Why a toolchain phase did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Compile check exited non-zero
    BuildFailed,
    /// Tests exited non-zero after a clean build
    TestFailed,
    /// Phase exceeded its deadline; the process was killed
    Timeout,
    /// The toolchain binary could not be located
    MissingTool,
    /// Spawning or communicating with the process failed unexpectedly
    ExecutionError,
}

/// Classification of a single toolchain phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Passed { output: String },
    Failed { kind: FailureKind, diagnostic: String },
}

impl PhaseOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, PhaseOutcome::Passed { .. })
    }
}

/// Capability seam for the external toolchain. The retry controller only
/// ever talks to this trait, which keeps subprocess semantics out of the
/// orchestration logic and lets tests inject scripted outcomes.
#[async_trait]
pub trait ToolchainRunner: Send + Sync {
    /// Compile-check the package without running tests.
    async fn check(&self, project_dir: &Path) -> PhaseOutcome;
    /// Build and execute the package's tests.
    async fn test(&self, project_dir: &Path) -> PhaseOutcome;
}

/// Raw result of running one external process to completion or failure.
#[derive(Debug)]
enum RawPhase {
    Completed {
        success: bool,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    MissingTool(String),
    SpawnFailed(String),
}

/// Cargo-backed implementation of [`ToolchainRunner`].
pub struct CargoRunner {
    program: String,
    check_timeout: Duration,
    test_timeout: Duration,
}

impl CargoRunner {
    pub fn new(program: String, check_timeout: Duration, test_timeout: Duration) -> Self {
        Self {
            program,
            check_timeout,
            test_timeout,
        }
    }

    pub fn from_config(config: &CoachConfig) -> Self {
        Self::new(
            config.cargo_bin.clone(),
            config.check_timeout(),
            config.test_timeout(),
        )
    }

    async fn run_phase(&self, args: &[&str], project_dir: &Path, deadline: Duration) -> RawPhase {
        let mut child = match Command::new(&self.program)
            .args(args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return RawPhase::MissingTool(format!("{} command not found", self.program));
            }
            Err(e) => {
                return RawPhase::SpawnFailed(format!(
                    "failed to spawn {}: {}",
                    self.program, e
                ));
            }
        };

        // Drain both pipes concurrently so a chatty compiler cannot block
        // on a full pipe buffer while we wait for exit.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_task = tokio::spawn(drain_pipe(stdout_pipe));
        let stderr_task = tokio::spawn(drain_pipe(stderr_pipe));

        match tokio::time::timeout(deadline, child.wait()).await {
            Err(_elapsed) => {
                // Deadline exceeded: kill and reap so nothing outlives us.
                let _ = child.start_kill();
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                RawPhase::TimedOut
            }
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                RawPhase::SpawnFailed(format!("failed waiting for {}: {}", self.program, e))
            }
            Ok(Ok(status)) => {
                let stdout = stdout_task.await.unwrap_or_default();
                let stderr = stderr_task.await.unwrap_or_default();
                RawPhase::Completed {
                    success: status.success(),
                    stdout,
                    stderr,
                }
            }
        }
    }

    fn classify(raw: RawPhase, phase: &str, deadline: Duration, fail_kind: FailureKind) -> PhaseOutcome {
        match raw {
            RawPhase::Completed {
                success,
                stdout,
                stderr,
            } => {
                if success {
                    PhaseOutcome::Passed {
                        output: format!("{}{}", stdout, stderr),
                    }
                } else {
                    let diagnostic = match fail_kind {
                        // Compile errors live on stderr; test failures need both streams.
                        FailureKind::BuildFailed => stderr,
                        _ => format!("{}{}", stdout, stderr),
                    };
                    PhaseOutcome::Failed {
                        kind: fail_kind,
                        diagnostic,
                    }
                }
            }
            RawPhase::TimedOut => PhaseOutcome::Failed {
                kind: FailureKind::Timeout,
                diagnostic: format!(
                    "{} phase timed out after {}s",
                    phase,
                    deadline.as_secs()
                ),
            },
            RawPhase::MissingTool(message) => PhaseOutcome::Failed {
                kind: FailureKind::MissingTool,
                diagnostic: message,
            },
            RawPhase::SpawnFailed(message) => PhaseOutcome::Failed {
                kind: FailureKind::ExecutionError,
                diagnostic: message,
            },
        }
    }
}

async fn drain_pipe<R>(pipe: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin + Send,
{
    let mut buf = Vec::new();
    if let Some(mut reader) = pipe {
        let _ = reader.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl ToolchainRunner for CargoRunner {
    async fn check(&self, project_dir: &Path) -> PhaseOutcome {
        let raw = self
            .run_phase(&["check"], project_dir, self.check_timeout)
            .await;
        Self::classify(raw, "check", self.check_timeout, FailureKind::BuildFailed)
    }

    async fn test(&self, project_dir: &Path) -> PhaseOutcome {
        let raw = self
            .run_phase(&["test"], project_dir, self.test_timeout)
            .await;
        Self::classify(raw, "test", self.test_timeout, FailureKind::TestFailed)
    }
}
