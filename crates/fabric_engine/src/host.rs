use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info, timed};
use fabric_core::{
    map_outcome, parse_model_listing, parse_vendor_listing, resolve, ModelEntry, Platform, Stage,
    StructuredRequest, CONTEXT_FLAG, MODEL_FLAG, PATTERN_FLAG,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::contexts::{ContextError, ContextStore};
use crate::process::ProcessRunner;
use crate::run_state::RunState;
use crate::secrets::{EnvFileStore, SecretError, CURRENT_CONTEXT};

pub const GET_SECRET: &str = "get_secret";
pub const GET_SECRETS: &str = "get_secrets";
pub const UPDATE_SECRET: &str = "update_secret";
pub const RESET_SECRET: &str = "reset_secret";
pub const GET_VENDORS: &str = "get_vendors";
pub const GET_MODELS: &str = "get_models";
pub const GET_PATTERNS: &str = "get_patterns";
pub const GET_IS_RUNNING: &str = "get_is_running";
pub const SET_IS_RUNNING: &str = "set_is_running";
pub const RUN_FABRIC_COMMAND: &str = "run_fabric_command";
pub const LIST_CONTEXTS: &str = "list_contexts";
pub const CREATE_CONTEXT: &str = "create_context";
pub const READ_CONTEXT: &str = "read_context";
pub const SAVE_CONTEXT: &str = "save_context";
pub const DELETE_CONTEXT: &str = "delete_context";
pub const SET_CURRENT_CONTEXT: &str = "set_current_context";

pub type CallArgs = Map<String, Value>;

#[derive(Debug, Error)]
pub enum HostCallError {
    #[error("host call `{0}` is unavailable")]
    Unavailable(String),
    #[error("unknown host call `{0}`")]
    UnknownCall(String),
    #[error("invalid arguments for `{name}`: {message}")]
    InvalidArguments { name: String, message: String },
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Asynchronous call-by-name access to the application's privileged backend.
#[async_trait::async_trait]
pub trait HostCall: Send + Sync {
    async fn call(&self, name: &str, args: CallArgs) -> Result<Value, HostCallError>;
}

pub async fn get_secret(host: &dyn HostCall, key: &str) -> Result<String, HostCallError> {
    let value = host.call(GET_SECRET, call_args([("key", json!(key))])).await?;
    expect_string(GET_SECRET, value)
}

pub async fn update_secret(host: &dyn HostCall, key: &str, value: &str) -> Result<(), HostCallError> {
    host.call(UPDATE_SECRET, call_args([("key", json!(key)), ("value", json!(value))]))
        .await
        .map(|_| ())
}

pub async fn get_vendors(host: &dyn HostCall) -> Result<Vec<String>, HostCallError> {
    let value = host.call(GET_VENDORS, CallArgs::new()).await?;
    serde_json::from_value(value).map_err(|err| HostCallError::Failed(err.to_string()))
}

pub async fn get_models(host: &dyn HostCall) -> Result<Vec<ModelEntry>, HostCallError> {
    let value = host.call(GET_MODELS, CallArgs::new()).await?;
    serde_json::from_value(value).map_err(|err| HostCallError::Failed(err.to_string()))
}

pub async fn get_patterns(host: &dyn HostCall) -> Result<Vec<String>, HostCallError> {
    let value = host.call(GET_PATTERNS, CallArgs::new()).await?;
    serde_json::from_value(value).map_err(|err| HostCallError::Failed(err.to_string()))
}

pub async fn list_contexts(host: &dyn HostCall) -> Result<Vec<String>, HostCallError> {
    let value = host.call(LIST_CONTEXTS, CallArgs::new()).await?;
    serde_json::from_value(value).map_err(|err| HostCallError::Failed(err.to_string()))
}

pub async fn read_context(host: &dyn HostCall, title: &str) -> Result<String, HostCallError> {
    let value = host.call(READ_CONTEXT, call_args([("title", json!(title))])).await?;
    expect_string(READ_CONTEXT, value)
}

pub fn call_args<const N: usize>(pairs: [(&str, Value); N]) -> CallArgs {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn expect_string(name: &str, value: Value) -> Result<String, HostCallError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(HostCallError::Failed(format!(
            "`{name}` returned {other} instead of a string"
        ))),
    }
}

fn required_str<'a>(name: &str, args: &'a CallArgs, field: &str) -> Result<&'a str, HostCallError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| HostCallError::InvalidArguments {
            name: name.to_string(),
            message: format!("missing string `{field}`"),
        })
}

/// Host facility backed by the local filesystem and process table.
pub struct LocalHost {
    secrets: EnvFileStore,
    contexts: ContextStore,
    patterns_dir: PathBuf,
    fabric_bin: Option<PathBuf>,
    tool_name: String,
    platform: Platform,
    run_state: RunState,
    runner: Arc<dyn ProcessRunner>,
}

impl LocalHost {
    pub fn new(config: &EngineConfig, run_state: RunState, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            secrets: EnvFileStore::new(config.env_file()),
            contexts: ContextStore::new(config.contexts_dir()),
            patterns_dir: config.patterns_dir(),
            fabric_bin: config.resolved_fabric_bin(),
            tool_name: config.tool_name.clone(),
            platform: Platform::host(),
            run_state,
            runner,
        }
    }

    /// Resolves the listing executable for `platform` instead of this machine.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    async fn run_fabric_command(&self, args: CallArgs) -> Result<Value, HostCallError> {
        let request: StructuredRequest = serde_json::from_value(Value::Object(args)).map_err(|err| {
            HostCallError::InvalidArguments {
                name: RUN_FABRIC_COMMAND.to_string(),
                message: err.to_string(),
            }
        })?;

        let bin = match &self.fabric_bin {
            Some(bin) if bin.is_file() => bin,
            _ => return Err(HostCallError::Unavailable(RUN_FABRIC_COMMAND.to_string())),
        };
        engine_info!("Using fabric path: {:?}", bin);

        let mut argv = vec![
            request.flag,
            request.input,
            PATTERN_FLAG.to_string(),
            request.pattern,
        ];
        if let Some(model) = request.model {
            argv.extend([MODEL_FLAG.to_string(), model]);
        }
        if let Some(context) = request.context {
            argv.extend([CONTEXT_FLAG.to_string(), context]);
        }
        let stage = Stage::new(bin.to_string_lossy(), argv);

        let outcome = self.runner.run(&stage).await;
        if outcome.is_success() {
            Ok(Value::String(outcome.stdout))
        } else {
            Err(HostCallError::Failed(map_outcome(&outcome).message().to_string()))
        }
    }

    /// Stdout of `<tool> --listmodels`, with the tool named as on this platform.
    async fn model_listing(&self) -> Result<String, HostCallError> {
        let resolved = resolve(&self.platform, &self.tool_name)
            .map_err(|err| HostCallError::Failed(err.to_string()))?;
        let stage = Stage::new(resolved.executable, ["--listmodels"]);
        let outcome = self.runner.run(&stage).await;
        if outcome.is_success() {
            Ok(outcome.stdout)
        } else {
            Err(HostCallError::Failed(map_outcome(&outcome).message().to_string()))
        }
    }

    async fn list_vendors(&self) -> Result<Value, HostCallError> {
        let listing = self.model_listing().await?;
        Ok(json!(parse_vendor_listing(&listing)))
    }

    async fn list_models(&self) -> Result<Value, HostCallError> {
        let listing = self.model_listing().await?;
        Ok(json!(parse_model_listing(&listing)))
    }

    fn context_call(&self, name: &str, args: &CallArgs) -> Result<Value, HostCallError> {
        match name {
            LIST_CONTEXTS => Ok(json!(self.contexts.list()?)),
            CREATE_CONTEXT => {
                let path = self.contexts.create(required_str(name, args, "title")?)?;
                Ok(Value::String(path.to_string_lossy().into_owned()))
            }
            READ_CONTEXT => Ok(Value::String(
                self.contexts.read(required_str(name, args, "title")?)?,
            )),
            SAVE_CONTEXT => {
                let title = required_str(name, args, "title")?;
                let content = required_str(name, args, "content")?;
                self.contexts.save(title, content)?;
                Ok(Value::Null)
            }
            DELETE_CONTEXT => {
                self.contexts.delete(required_str(name, args, "title")?)?;
                Ok(Value::Null)
            }
            SET_CURRENT_CONTEXT => {
                let context = required_str(name, args, "context")?;
                if !context.is_empty() && !self.contexts.list()?.iter().any(|t| t == context) {
                    return Err(ContextError::NotFound(context.to_string()).into());
                }
                self.secrets.set(CURRENT_CONTEXT, context)?;
                Ok(Value::Null)
            }
            other => Err(HostCallError::UnknownCall(other.to_string())),
        }
    }

    fn list_patterns(&self) -> Result<Value, HostCallError> {
        let failed = |err: std::io::Error| {
            HostCallError::Failed(format!(
                "Could not read patterns directory {}: {err}",
                self.patterns_dir.display()
            ))
        };
        fs::create_dir_all(&self.patterns_dir).map_err(failed)?;
        let mut patterns: Vec<String> = fs::read_dir(&self.patterns_dir)
            .map_err(failed)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                if entry.file_type().ok()?.is_dir() {
                    entry.file_name().into_string().ok()
                } else {
                    None
                }
            })
            .collect();
        patterns.sort();
        Ok(json!(patterns))
    }
}

#[async_trait::async_trait]
impl HostCall for LocalHost {
    async fn call(&self, name: &str, args: CallArgs) -> Result<Value, HostCallError> {
        engine_debug!("host call {}", name);
        match name {
            GET_SECRET => {
                let key = required_str(name, &args, "key")?;
                Ok(Value::String(self.secrets.get(key)?))
            }
            GET_SECRETS => {
                let keys: Vec<String> = args
                    .get("keys")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|err| HostCallError::InvalidArguments {
                        name: name.to_string(),
                        message: err.to_string(),
                    })?
                    .unwrap_or_default();
                let found = self.secrets.get_many(&keys)?;
                Ok(Value::Array(
                    found
                        .into_iter()
                        .map(|(key, secret)| json!({ "name": key, "secret": secret }))
                        .collect(),
                ))
            }
            UPDATE_SECRET => {
                let key = required_str(name, &args, "key")?;
                let value = required_str(name, &args, "value")?;
                self.secrets.set(key, value)?;
                Ok(Value::Null)
            }
            RESET_SECRET => {
                let key = required_str(name, &args, "key")?;
                self.secrets.reset(key)?;
                Ok(Value::Null)
            }
            GET_VENDORS => self.list_vendors().await,
            GET_MODELS => self.list_models().await,
            LIST_CONTEXTS | CREATE_CONTEXT | READ_CONTEXT | SAVE_CONTEXT | DELETE_CONTEXT
            | SET_CURRENT_CONTEXT => self.context_call(name, &args),
            GET_PATTERNS => timed(GET_PATTERNS, || self.list_patterns()),
            GET_IS_RUNNING => Ok(Value::Bool(self.run_state.is_running())),
            SET_IS_RUNNING => {
                let value = args.get("value").and_then(Value::as_bool).ok_or_else(|| {
                    HostCallError::InvalidArguments {
                        name: name.to_string(),
                        message: "missing bool `value`".to_string(),
                    }
                })?;
                self.run_state.set(value);
                Ok(Value::Null)
            }
            RUN_FABRIC_COMMAND => self.run_fabric_command(args).await,
            other => Err(HostCallError::UnknownCall(other.to_string())),
        }
    }
}
