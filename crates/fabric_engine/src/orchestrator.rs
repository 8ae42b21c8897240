use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, engine_warn};
use fabric_core::{
    legacy_notification, map_build_error, map_outcome, prepare, BuildError, ExecutionPlan,
    Notification, Operation, Platform, ResolvedPlatform, UserResult,
};
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::host::{self, HostCall, LocalHost};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::run_state::RunState;
use crate::secrets::{CURRENT_CONTEXT, DEFAULT_MODEL, DEFAULT_PATTERN};
use crate::strategy::ExecutionStrategy;

/// Reports which operating system the application runs on.
pub trait PlatformSource: Send + Sync {
    fn current_platform(&self) -> Platform;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl PlatformSource for HostPlatform {
    fn current_platform(&self) -> Platform {
        Platform::host()
    }
}

/// Side channel for the single-stage operations' alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Runs operations one pipeline at a time and normalizes their results.
pub struct Orchestrator {
    host: Arc<dyn HostCall>,
    strategy: ExecutionStrategy,
    platform: Arc<dyn PlatformSource>,
    run_state: RunState,
    // Queues concurrent calls so the busy flag never describes two pipelines.
    pipeline: Mutex<()>,
    tool_name: String,
}

impl Orchestrator {
    pub fn new(
        config: &EngineConfig,
        host: Arc<dyn HostCall>,
        runner: Arc<dyn ProcessRunner>,
        platform: Arc<dyn PlatformSource>,
        run_state: RunState,
    ) -> Self {
        Self {
            strategy: ExecutionStrategy::new(host.clone(), runner, config.process.pipe_policy),
            host,
            platform,
            run_state,
            pipeline: Mutex::new(()),
            tool_name: config.tool_name.clone(),
        }
    }

    /// Wires the local host facility, real processes and the compile-time platform.
    pub fn local(config: &EngineConfig) -> Self {
        let run_state = RunState::new();
        let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new(&config.process));
        let host = Arc::new(LocalHost::new(config, run_state.clone(), runner.clone()));
        Self::new(config, host, runner, Arc::new(HostPlatform), run_state)
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn host(&self) -> Arc<dyn HostCall> {
        self.host.clone()
    }

    /// Plans `operation` for the current platform after filling in the
    /// saved default pattern and model. Nothing is executed.
    pub async fn plan(
        &self,
        operation: Operation,
    ) -> Result<(ResolvedPlatform, ExecutionPlan), BuildError> {
        let operation = self.fill_defaults(operation).await;
        prepare(&operation, &self.platform.current_platform(), &self.tool_name)
    }

    /// Runs `operation` and returns its result as data.
    ///
    /// This is the convention of the two-stage operations.
    pub async fn run_pipeline(&self, operation: Operation) -> UserResult {
        let name = operation.name();
        let (resolved, plan) = match self.plan(operation).await {
            Ok(prepared) => prepared,
            Err(err) => {
                engine_info!("{} not started: {}", name, err);
                return map_build_error(&err);
            }
        };
        engine_info!(
            "{} on {}: {}",
            name,
            resolved.platform,
            plan.shell_line(&resolved.shell)
        );

        let outcome = {
            let _queued = self.pipeline.lock().await;
            self.run_state
                .run_exclusive(name, self.strategy.execute(&plan))
                .await
        };
        let result = map_outcome(&outcome);
        if result.is_failure() {
            engine_warn!("{} failed: {}", name, result.message());
        } else {
            engine_debug!("{} finished: {}", name, outcome.exit);
        }
        result
    }

    /// Runs `operation` and reports through `notifier` instead of returning.
    ///
    /// This is the convention of the single-stage legacy operations.
    pub async fn run_notifying(&self, operation: Operation, notifier: &dyn Notifier) {
        let result = self.run_pipeline(operation.clone()).await;
        match legacy_notification(&operation, &result) {
            Some(notification) => notifier.notify(notification),
            None => engine_info!("{} result: {}", operation.name(), result.message()),
        }
    }

    /// Routes `operation` to its call convention. `None` means the result
    /// went to `notifier`.
    pub async fn dispatch(&self, operation: Operation, notifier: &dyn Notifier) -> Option<UserResult> {
        if operation.is_legacy_single_stage() {
            self.run_notifying(operation, notifier).await;
            None
        } else {
            Some(self.run_pipeline(operation).await)
        }
    }

    /// Fills a blank pattern, model or context from the host's saved defaults.
    async fn fill_defaults(&self, mut operation: Operation) -> Operation {
        if let Some(args) = operation.pattern_args_mut() {
            if args.pattern().is_none() {
                args.pattern = self.saved_default(DEFAULT_PATTERN).await;
            }
            if args.model().is_none() {
                args.model = self.saved_default(DEFAULT_MODEL).await;
            }
            if args.context().is_none() {
                args.context = self.saved_default(CURRENT_CONTEXT).await;
            }
        }
        operation
    }

    async fn saved_default(&self, key: &str) -> Option<String> {
        match host::get_secret(self.host.as_ref(), key).await {
            Ok(value) if !value.trim().is_empty() => Some(value),
            Ok(_) => None,
            Err(err) => {
                engine_debug!("No saved {}: {}", key, err);
                None
            }
        }
    }
}
