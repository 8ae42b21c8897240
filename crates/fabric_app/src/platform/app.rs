use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use fabric_core::{
    map_build_error, update, Action, AppState, AppViewModel, ModelEntry, Msg, NotificationLevel,
    Operation, UserResult,
};
use fabric_engine::{
    call_args, default_config_dir, get_patterns, list_contexts, read_context, EngineConfig,
    HostCall, HostCallError, ModelSettings, Orchestrator, PipePolicy, CREATE_CONTEXT,
    DELETE_CONTEXT, SAVE_CONTEXT, SET_CURRENT_CONTEXT,
};
use serde_json::json;
use tokio::runtime::Runtime;

use super::cli::{Cli, Command, ContextCommand};
use super::effects::EffectRunner;
use super::logging;
use super::persistence::{self, SessionState};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::initialize(cli.log, cli.verbose);

    let config = engine_config(&cli);
    let mut session = persistence::load_session(&config.config_dir);
    apply_overrides(&mut session, &cli);

    match cli.command.action() {
        Some((action, input)) => {
            let state = seeded_state(&session, input);
            if cli.dry_run {
                return print_plan(&state, action, &config);
            }
            let code = run_action(state, action, Orchestrator::local(&config));
            session.last_run_utc = Some(Utc::now());
            persistence::save_session(&config.config_dir, &session);
            Ok(code)
        }
        None => run_settings_command(&cli.command, &config),
    }
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::with_config_dir(
        cli.config_dir.clone().unwrap_or_else(default_config_dir),
    );
    config.fabric_bin = cli.fabric_bin.clone();
    config.process.timeout = cli.timeout();
    if cli.abort_on_producer_failure {
        config.process.pipe_policy = PipePolicy::AbortOnProducerFailure;
    }
    config
}

fn apply_overrides(session: &mut SessionState, cli: &Cli) {
    let selection = &cli.selection;
    if selection.pattern.is_some() {
        session.pattern = selection.pattern.clone();
    }
    if selection.model.is_some() {
        session.model = selection.model.clone();
    }
    if selection.context.is_some() {
        session.context = selection.context.clone();
    }
}

/// Feeds the remembered selections and the input text through the state machine.
fn seeded_state(session: &SessionState, input: &str) -> AppState {
    let msgs = [
        Msg::InputChanged(input.to_string()),
        Msg::PatternSelected(session.pattern.clone().unwrap_or_default()),
        Msg::ModelSelected(session.model.clone().unwrap_or_default()),
        Msg::ContextChanged(session.context.clone().unwrap_or_default()),
    ];
    msgs.into_iter().fold(AppState::new(), |state, msg| update(state, msg).0)
}

fn current_thread_runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn print_plan(state: &AppState, action: Action, config: &EngineConfig) -> anyhow::Result<ExitCode> {
    let Some(operation) = state.operation_for(action) else {
        eprintln!("Nothing to run: the input is blank.");
        return Ok(ExitCode::FAILURE);
    };
    Ok(match preview(operation, config)? {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(result) => {
            eprintln!("{}", result.message());
            ExitCode::FAILURE
        }
    })
}

/// The shell line `operation` would run once saved defaults are filled in.
fn preview(operation: Operation, config: &EngineConfig) -> anyhow::Result<Result<String, UserResult>> {
    let runtime = current_thread_runtime()?;
    let planned = runtime.block_on(Orchestrator::local(config).plan(operation));
    Ok(planned
        .map(|(resolved, plan)| plan.shell_line(&resolved.shell))
        .map_err(|err| map_build_error(&err)))
}

fn run_action(state: AppState, action: Action, orchestrator: Orchestrator) -> ExitCode {
    let runner = EffectRunner::new(orchestrator);
    let mut state = dispatch_msg(state, Msg::ActionTriggered(action), &runner);
    if !state.is_busy() {
        eprintln!("Nothing to run: the input is blank.");
        return ExitCode::FAILURE;
    }
    while state.is_busy() {
        if let Some(msg) = runner.next_msg(POLL_INTERVAL) {
            state = dispatch_msg(state, msg, &runner);
        }
    }
    report(&state.view())
}

fn dispatch_msg(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (mut state, effects) = update(state, msg);
    if state.consume_dirty() {
        let view = state.view();
        engine_info!(
            "view running={} output={} notifications={}",
            view.running,
            view.output.is_some(),
            view.notifications.len()
        );
    }
    runner.enqueue(effects);
    state
}

fn report(view: &AppViewModel) -> ExitCode {
    let mut failed = false;
    for notification in &view.notifications {
        match notification.level {
            NotificationLevel::Info => println!("{}", notification.message),
            NotificationLevel::Error => {
                failed = true;
                eprintln!("{}", notification.message);
            }
        }
    }
    if let Some(output) = &view.output {
        if view.output_is_error {
            failed = true;
            eprintln!("{output}");
        } else {
            println!("{output}");
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_settings_command(command: &Command, config: &EngineConfig) -> anyhow::Result<ExitCode> {
    let stdin_content = match command {
        Command::Contexts {
            command: ContextCommand::Save { content: None, .. },
        } => Some(std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?),
        _ => None,
    };
    let runtime = current_thread_runtime()?;
    let host = Orchestrator::local(config).host();
    let mut settings = ModelSettings::new(host.clone());

    let ok = runtime.block_on(async {
        match command {
            Command::Vendors => {
                settings.load_vendors().await;
                settings.load_default_vendor().await;
                for vendor in settings.vendors() {
                    let marker = if vendor == settings.current_vendor() { "*" } else { " " };
                    println!("{marker} {vendor}");
                }
                !settings.vendors().is_empty()
            }
            Command::Models => {
                settings.load_models().await;
                settings.load_default_model().await;
                for line in model_lines(settings.models(), settings.default_model()) {
                    println!("{line}");
                }
                !settings.models().is_empty()
            }
            Command::Contexts { command } => {
                match run_context_command(host.as_ref(), command, stdin_content.as_deref()).await {
                    Ok(()) => true,
                    Err(err) => {
                        eprintln!("{err}");
                        false
                    }
                }
            }
            Command::Patterns => match get_patterns(host.as_ref()).await {
                Ok(patterns) => {
                    for pattern in patterns {
                        println!("{pattern}");
                    }
                    true
                }
                Err(err) => {
                    eprintln!("{err}");
                    false
                }
            },
            Command::SetDefaultModel { model } => {
                settings.save_default_model(model).await;
                settings.default_model() == Some(model.as_str())
            }
            Command::SetDefaultVendor { vendor } => {
                settings.load_default_vendor().await;
                settings.save_default_vendor(vendor).await;
                settings.current_vendor() == vendor
            }
            Command::ResetDefaults => {
                settings.reset_defaults().await;
                settings.default_model().is_none() && settings.current_vendor().is_empty()
            }
            other => {
                engine_warn!("{:?} is not a settings command", other);
                false
            }
        }
    });

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Models under their vendor heading, the saved default marked with `*`.
fn model_lines(models: &[ModelEntry], default_model: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut vendor: Option<&str> = None;
    for model in models {
        if vendor != Some(model.provider.as_str()) {
            vendor = Some(model.provider.as_str());
            lines.push(model.provider.clone());
        }
        let marker = if Some(model.name.as_str()) == default_model { "*" } else { " " };
        lines.push(format!("{marker} [{}] {}", model.id, model.name));
    }
    lines
}

async fn run_context_command(
    host: &dyn HostCall,
    command: &ContextCommand,
    stdin_content: Option<&str>,
) -> Result<(), HostCallError> {
    match command {
        ContextCommand::List => {
            for title in list_contexts(host).await? {
                println!("{title}");
            }
        }
        ContextCommand::Create { title } => {
            let path = host
                .call(CREATE_CONTEXT, call_args([("title", json!(title))]))
                .await?;
            println!("Created {}", path.as_str().unwrap_or(title.as_str()));
        }
        ContextCommand::Show { title } => print!("{}", read_context(host, title).await?),
        ContextCommand::Save { title, content } => {
            let content = content.as_deref().or(stdin_content).unwrap_or_default();
            host.call(
                SAVE_CONTEXT,
                call_args([("title", json!(title)), ("content", json!(content))]),
            )
            .await?;
        }
        ContextCommand::Delete { title } => {
            host.call(DELETE_CONTEXT, call_args([("title", json!(title))]))
                .await?;
        }
        ContextCommand::Use { title } => {
            let context = title.as_deref().unwrap_or_default();
            host.call(SET_CURRENT_CONTEXT, call_args([("context", json!(context))]))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{Notification, PatternArgs};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn session(pattern: &str) -> SessionState {
        SessionState {
            pattern: Some(pattern.to_string()),
            ..SessionState::default()
        }
    }

    #[test]
    fn seeded_state_carries_selection_and_input() {
        let state = seeded_state(&session("summarize"), "https://example.com");
        let view = state.view();
        assert_eq!(view.input, "https://example.com");
        assert_eq!(view.pattern.as_deref(), Some("summarize"));
        assert!(!state.is_busy());
    }

    #[test]
    fn cli_selection_overrides_the_session() {
        let cli = <Cli as clap::Parser>::try_parse_from([
            "fabric-app",
            "run-pattern",
            "--pattern",
            "extract_wisdom",
        ])
        .unwrap();
        let mut remembered = session("summarize");
        remembered.model = Some("llama3".into());

        apply_overrides(&mut remembered, &cli);

        assert_eq!(remembered.pattern.as_deref(), Some("extract_wisdom"));
        assert_eq!(remembered.model.as_deref(), Some("llama3"));
    }

    #[test]
    fn failed_output_exits_with_failure() {
        let view = AppViewModel {
            output: Some("Error: model not found".into()),
            output_is_error: true,
            ..AppViewModel::default()
        };
        assert_eq!(report(&view), ExitCode::FAILURE);
    }

    #[test]
    fn info_notifications_exit_successfully() {
        let state = update(
            AppState::new(),
            Msg::Notified(Notification::info("Command executed successfully. Output: ok")),
        )
        .0;
        let state = update(state, Msg::RunFinished(None)).0;
        assert_eq!(report(&state.view()), ExitCode::SUCCESS);

        let failed = update(
            AppState::new(),
            Msg::RunFinished(Some(UserResult::Failed("Error: boom".into()))),
        )
        .0;
        assert_eq!(report(&failed.view()), ExitCode::FAILURE);
    }

    #[test]
    fn dry_run_uses_the_saved_default_pattern() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "DEFAULT_PATTERN=summarize\n").unwrap();
        let config = EngineConfig::with_config_dir(dir.path().to_path_buf());

        let line = preview(Operation::RunPattern(PatternArgs::default()), &config).unwrap();

        assert_eq!(line, Ok("fabric --pattern summarize".to_string()));
    }

    #[test]
    fn dry_run_without_any_pattern_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::with_config_dir(dir.path().to_path_buf());

        let line = preview(Operation::RunPattern(PatternArgs::default()), &config).unwrap();

        assert_eq!(line, Err(UserResult::NoPatternSelected));
    }

    #[test]
    fn models_are_listed_under_their_vendor() {
        let entry = |id, name: &str, provider: &str| ModelEntry {
            id,
            name: name.to_string(),
            provider: provider.to_string(),
        };
        let models = [
            entry(1, "gpt-4o", "OpenAI"),
            entry(2, "gpt-4o-mini", "OpenAI"),
            entry(3, "llama3", "Ollama"),
        ];

        assert_eq!(
            model_lines(&models, Some("llama3")),
            vec![
                "OpenAI",
                "  [1] gpt-4o",
                "  [2] gpt-4o-mini",
                "Ollama",
                "* [3] llama3",
            ]
        );
    }
}
