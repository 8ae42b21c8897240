use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use fabric_core::{ExecutionOutcome, ExecutionPlan, StructuredRequest};
use serde_json::Value;

use crate::config::PipePolicy;
use crate::host::{HostCall, HostCallError, RUN_FABRIC_COMMAND};
use crate::process::ProcessRunner;

/// Structured host call first, direct process execution second.
pub struct ExecutionStrategy {
    host: Arc<dyn HostCall>,
    runner: Arc<dyn ProcessRunner>,
    pipe_policy: PipePolicy,
}

impl ExecutionStrategy {
    pub fn new(host: Arc<dyn HostCall>, runner: Arc<dyn ProcessRunner>, pipe_policy: PipePolicy) -> Self {
        Self {
            host,
            runner,
            pipe_policy,
        }
    }

    /// Runs `plan`. Every call tries the structured path afresh when the plan
    /// has one; any failure there falls back to spawning the stages directly,
    /// and the fallback's outcome is final.
    pub async fn execute(&self, plan: &ExecutionPlan) -> ExecutionOutcome {
        if let Some(request) = &plan.structured {
            match self.try_structured(request).await {
                Ok(outcome) => {
                    engine_info!("Structured {} call succeeded", RUN_FABRIC_COMMAND);
                    return outcome;
                }
                Err(err) => {
                    engine_warn!("Structured call failed, falling back to direct spawn: {}", err);
                }
            }
        }
        self.runner.run_plan(plan, self.pipe_policy).await
    }

    async fn try_structured(&self, request: &StructuredRequest) -> Result<ExecutionOutcome, HostCallError> {
        let args = match serde_json::to_value(request) {
            Ok(Value::Object(args)) => args,
            Ok(other) => {
                return Err(HostCallError::InvalidArguments {
                    name: RUN_FABRIC_COMMAND.to_string(),
                    message: format!("request serialized to {other}"),
                })
            }
            Err(err) => {
                return Err(HostCallError::InvalidArguments {
                    name: RUN_FABRIC_COMMAND.to_string(),
                    message: err.to_string(),
                })
            }
        };
        match self.host.call(RUN_FABRIC_COMMAND, args).await? {
            Value::String(stdout) => Ok(ExecutionOutcome::success(stdout)),
            other => Err(HostCallError::Failed(format!(
                "`{RUN_FABRIC_COMMAND}` returned {other} instead of output text"
            ))),
        }
    }
}
