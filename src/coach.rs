//! Retry controller
//!
//! Drives the generate → extract → write → check → test loop for one
//! request. The loop is a fold over attempt ordinals threading an immutable
//! prior-diagnostic value: only build/test-phase diagnostics travel into the
//! next prompt. Extraction failures and service errors record an attempt but
//! thread nothing — an asymmetry inherited from the source pipeline and kept
//! visible here as an explicit branch.

use serde::Serialize;
use std::path::PathBuf;

use crate::artifact;
use crate::completion::CompletionBackend;
use crate::config::CoachConfig;
use crate::extract;
use crate::prompt;
use crate::text::{tail_chars, truncate_chars};
use crate::toolchain::{FailureKind, PhaseOutcome, ToolchainRunner};

/// Characters of the raw response kept as diagnostic when extraction fails.
const RESPONSE_PREVIEW_CHARS: usize = 200;
/// Characters of toolchain output threaded into the next prompt.
const ERROR_CONTEXT_TAIL_CHARS: usize = 1000;

/// One unit of work: a description plus its retry budget. Immutable.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub text: String,
    pub max_retries: u32,
    pub created_at: String,
}

impl Request {
    pub fn new(text: String, max_retries: u32) -> Self {
        Self {
            text,
            max_retries,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Where an attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    GenerationFailed,
    ExtractionFailed,
    BuildFailed,
    TestFailed,
    Passed,
}

/// One iteration of the loop. Append-only; a request owns its attempts in
/// chronological = ordinal order.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub ordinal: u32,
    pub status: AttemptStatus,
    /// Outcome classification from the toolchain, when one ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    pub diagnostic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Passed,
    Failed,
}

/// Terminal classification of a request. `retry_count` is the ordinal of
/// the last attempt actually executed, whatever its status.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Outcome {
    pub final_status: FinalStatus,
    pub retry_count: u32,
}

/// Persisted summary of one completed request.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub request: String,
    pub timestamp: String,
    pub attempts: Vec<Attempt>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResultRecord {
    pub fn passed(&self) -> bool {
        self.outcome.final_status == FinalStatus::Passed
    }
}

/// The orchestrator. Strictly sequential: one attempt at a time, each
/// depending on its predecessor's diagnostic.
pub struct Coach<B, R> {
    output_dir: PathBuf,
    backend: B,
    runner: R,
    kb_context: String,
    verbose: bool,
}

impl<B: CompletionBackend, R: ToolchainRunner> Coach<B, R> {
    pub fn new(
        config: &CoachConfig,
        backend: B,
        runner: R,
        kb_context: String,
        verbose: bool,
    ) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            backend,
            runner,
            kb_context,
            verbose,
        }
    }

    /// Runs the full loop for one request and returns its record. Never
    /// fails: every per-attempt error is captured into the attempt sequence.
    pub async fn run(&self, request: &Request) -> ResultRecord {
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut prior_diagnostic: Option<String> = None;

        for ordinal in 0..=request.max_retries {
            println!(
                "Attempt {} for request: {}...",
                ordinal + 1,
                truncate_chars(&request.text, 50)
            );

            let (attempt, next_diagnostic) = self
                .run_attempt(request, ordinal, prior_diagnostic.as_deref())
                .await;

            let passed = attempt.status == AttemptStatus::Passed;
            if passed {
                println!("✓ Success on attempt {}", ordinal + 1);
            } else {
                println!("✗ Failed attempt {}: {:?}", ordinal + 1, attempt.status);
            }

            attempts.push(attempt);
            if passed {
                break;
            }
            prior_diagnostic = next_diagnostic;
        }

        let outcome = match attempts.last() {
            Some(last) if last.status == AttemptStatus::Passed => Outcome {
                final_status: FinalStatus::Passed,
                retry_count: last.ordinal,
            },
            Some(last) => Outcome {
                final_status: FinalStatus::Failed,
                retry_count: last.ordinal,
            },
            // max_retries is unsigned, so the loop always runs at least once.
            None => Outcome {
                final_status: FinalStatus::Failed,
                retry_count: 0,
            },
        };

        ResultRecord {
            request: request.text.clone(),
            timestamp: request.created_at.clone(),
            attempts,
            outcome,
        }
    }

    /// Executes one attempt. Returns the attempt record plus the diagnostic
    /// to thread into the next prompt, if any.
    async fn run_attempt(
        &self,
        request: &Request,
        ordinal: u32,
        prior_diagnostic: Option<&str>,
    ) -> (Attempt, Option<String>) {
        let full_prompt = prompt::build_prompt(&request.text, prior_diagnostic, &self.kb_context);

        let response = match self.backend.complete(&full_prompt).await {
            Ok(text) => text,
            Err(e) => {
                return (
                    Attempt {
                        ordinal,
                        status: AttemptStatus::GenerationFailed,
                        kind: None,
                        diagnostic: format!("completion service error: {}", e),
                        artifact: None,
                    },
                    None,
                );
            }
        };

        let Some(code) = extract::extract_code(&response) else {
            // Keep a preview of what the model said, but thread nothing
            // forward: the next prompt starts clean.
            return (
                Attempt {
                    ordinal,
                    status: AttemptStatus::ExtractionFailed,
                    kind: None,
                    diagnostic: truncate_chars(&response, RESPONSE_PREVIEW_CHARS).to_string(),
                    artifact: None,
                },
                None,
            );
        };

        let written = match artifact::write_artifact(&self.output_dir, &request.text, &code) {
            Ok(artifact) => artifact,
            Err(e) => {
                let diagnostic = format!("failed to write artifact: {:#}", e);
                let threaded = tail_chars(&diagnostic, ERROR_CONTEXT_TAIL_CHARS).to_string();
                return (
                    Attempt {
                        ordinal,
                        status: AttemptStatus::BuildFailed,
                        kind: Some(FailureKind::ExecutionError),
                        diagnostic,
                        artifact: None,
                    },
                    Some(threaded),
                );
            }
        };

        if self.verbose {
            println!("Wrote artifact: {}", written.project_dir.display());
        }

        match self.runner.check(&written.project_dir).await {
            PhaseOutcome::Passed { .. } => {}
            PhaseOutcome::Failed { kind, diagnostic } => {
                let threaded = tail_chars(&diagnostic, ERROR_CONTEXT_TAIL_CHARS).to_string();
                return (
                    Attempt {
                        ordinal,
                        status: AttemptStatus::BuildFailed,
                        kind: Some(kind),
                        diagnostic,
                        artifact: Some(written.project_dir),
                    },
                    Some(threaded),
                );
            }
        }

        match self.runner.test(&written.project_dir).await {
            PhaseOutcome::Passed { output } => (
                Attempt {
                    ordinal,
                    status: AttemptStatus::Passed,
                    kind: None,
                    diagnostic: output,
                    artifact: Some(written.project_dir),
                },
                None,
            ),
            PhaseOutcome::Failed { kind, diagnostic } => {
                let threaded = tail_chars(&diagnostic, ERROR_CONTEXT_TAIL_CHARS).to_string();
                (
                    Attempt {
                        ordinal,
                        status: AttemptStatus::TestFailed,
                        kind: Some(kind),
                        diagnostic,
                        artifact: Some(written.project_dir),
                    },
                    Some(threaded),
                )
            }
        }
    }
}
