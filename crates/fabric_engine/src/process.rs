use std::process::Stdio;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use fabric_core::{ExecutionOutcome, ExecutionPlan, ExitKind, Stage};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::{PipePolicy, ProcessSettings};

/// Spawns external processes and captures what they produce.
///
/// Implementors provide [`ProcessRunner::run_with_input`]; single runs, pipes
/// and whole plans are layered on top of it.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run_with_input(&self, stage: &Stage, input: Option<&[u8]>) -> ExecutionOutcome;

    async fn run(&self, stage: &Stage) -> ExecutionOutcome {
        self.run_with_input(stage, None).await
    }

    /// Runs `producer` to completion, then feeds its stdout to `transform`.
    ///
    /// A producer that never ran (spawn failure, timeout) ends the pipe with
    /// its own outcome.
    async fn run_piped(
        &self,
        producer: &Stage,
        transform: &Stage,
        policy: PipePolicy,
    ) -> ExecutionOutcome {
        let first = self.run_with_input(producer, None).await;
        if first.is_aborted() {
            engine_warn!("Producer {} did not run: {}", producer.program, first.exit);
            return first;
        }
        if let ExitKind::NonZero(_) = first.exit {
            match policy {
                PipePolicy::AbortOnProducerFailure => {
                    engine_warn!("Producer {} failed ({}), aborting pipe", producer.program, first.exit);
                    return first;
                }
                PipePolicy::IgnoreProducerFailure => {
                    engine_warn!(
                        "Producer {} failed ({}), continuing with its output",
                        producer.program,
                        first.exit
                    );
                }
            }
        }
        self.run_with_input(transform, Some(first.stdout.as_bytes()))
            .await
    }

    async fn run_plan(&self, plan: &ExecutionPlan, policy: PipePolicy) -> ExecutionOutcome {
        match plan.stages.as_slice() {
            [stage] => self.run(stage).await,
            [producer, transform] => self.run_piped(producer, transform, policy).await,
            stages => ExecutionOutcome::spawn_failed(format!(
                "plans must have one or two stages, got {}",
                stages.len()
            )),
        }
    }
}

/// Runs stages as real child processes on the tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    timeout: Option<Duration>,
}

impl TokioProcessRunner {
    pub fn new(settings: &ProcessSettings) -> Self {
        Self {
            timeout: settings.timeout,
        }
    }
}

#[async_trait::async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run_with_input(&self, stage: &Stage, input: Option<&[u8]>) -> ExecutionOutcome {
        let mut command = Command::new(&stage.program);
        command
            .args(&stage.args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                engine_warn!("Failed to spawn {}: {}", stage.program, err);
                return ExecutionOutcome::spawn_failed(format!("{}: {}", stage.program, err));
            }
        };

        // Feed stdin from its own task so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            let data = input.to_vec();
            let program = stage.program.clone();
            tokio::spawn(async move {
                if let Err(err) = stdin.write_all(&data).await {
                    engine_debug!("{} closed stdin early: {}", program, err);
                }
                // Dropping `stdin` closes the pipe.
            });
        }

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => {
                    engine_warn!("{} timed out after {:?}", stage.program, limit);
                    return ExecutionOutcome::timed_out(limit, "", "");
                }
            },
            None => child.wait_with_output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(err) => {
                return ExecutionOutcome::spawn_failed(format!("{}: {}", stage.program, err));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        engine_debug!(
            "{} exited with {:?} (stdout {} bytes, stderr {} bytes)",
            stage.program,
            output.status.code(),
            stdout.len(),
            stderr.len()
        );
        if output.status.success() {
            ExecutionOutcome {
                exit: ExitKind::Success,
                stdout,
                stderr,
            }
        } else {
            ExecutionOutcome::failed(output.status.code(), stdout, stderr)
        }
    }
}
