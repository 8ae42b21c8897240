//! Fabric engine: process execution, host calls and pipeline orchestration.
mod config;
mod contexts;
mod engine;
mod host;
mod orchestrator;
mod persist;
mod process;
mod run_state;
mod secrets;
mod settings;
mod strategy;

pub use config::{default_config_dir, default_fabric_bin, EngineConfig, PipePolicy, ProcessSettings};
pub use contexts::{ContextError, ContextStore};
pub use engine::{EngineEvent, EngineHandle, EngineStopped};
pub use host::{
    call_args, get_models, get_patterns, get_secret, get_vendors, list_contexts, read_context,
    update_secret, CallArgs, HostCall, HostCallError, LocalHost, CREATE_CONTEXT, DELETE_CONTEXT,
    GET_IS_RUNNING, GET_MODELS, GET_PATTERNS, GET_SECRET, GET_SECRETS, GET_VENDORS, LIST_CONTEXTS,
    READ_CONTEXT, RESET_SECRET, RUN_FABRIC_COMMAND, SAVE_CONTEXT, SET_CURRENT_CONTEXT,
    SET_IS_RUNNING, UPDATE_SECRET,
};
pub use orchestrator::{HostPlatform, Notifier, Orchestrator, PlatformSource};
pub use persist::{ensure_config_dir, read_optional, AtomicFileWriter, PersistError};
pub use process::{ProcessRunner, TokioProcessRunner};
pub use run_state::{RunState, RunStateGuard};
pub use secrets::{
    EnvFileStore, SecretError, CURRENT_CONTEXT, DEFAULT_MODEL, DEFAULT_PATTERN, DEFAULT_VENDOR,
};
pub use settings::ModelSettings;
pub use strategy::ExecutionStrategy;
