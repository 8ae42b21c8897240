use fabric_core::{
    update, Action, AppState, Effect, Msg, Notification, Operation, PatternArgs, UserResult,
};

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn with_selection(input: &str, pattern: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::InputChanged(input.to_string()));
    let (state, _) = update(state, Msg::PatternSelected(pattern.to_string()));
    state
}

#[test]
fn action_dispatches_operation_from_current_selection() {
    init_logging();
    let state = with_selection("  http://x  ", "summarize");
    let (state, _) = update(state, Msg::ModelSelected("gpt-4o".into()));

    let (_state, effects) = update(state, Msg::ActionTriggered(Action::ScrapeUrlThenPattern));

    assert_eq!(
        effects,
        vec![Effect::Dispatch(Operation::ScrapeUrlThenPattern {
            url: "http://x".into(),
            args: PatternArgs::new("summarize").with_model("gpt-4o"),
        })]
    );
}

#[test]
fn blank_input_does_not_dispatch_input_actions() {
    init_logging();
    let state = with_selection("   ", "summarize");

    let (state, effects) = update(state, Msg::ActionTriggered(Action::SearchQuestion));
    assert!(effects.is_empty());

    // Clipboard and plain pattern runs do not read the input box.
    let (_state, effects) = update(state, Msg::ActionTriggered(Action::ClipboardThenPattern));
    assert_eq!(effects.len(), 1);
}

#[test]
fn triggers_are_rejected_while_a_run_is_in_flight() {
    init_logging();
    let state = with_selection("question", "summarize");

    let (state, first) = update(state, Msg::ActionTriggered(Action::SearchQuestionThenPattern));
    assert_eq!(first.len(), 1);

    // Second click before the engine has even published the busy flag.
    let (state, second) = update(state, Msg::ActionTriggered(Action::SearchQuestion));
    assert!(second.is_empty());

    let (state, _) = update(state, Msg::RunStateChanged(true));
    let (state, third) = update(state, Msg::ActionTriggered(Action::RunPattern));
    assert!(third.is_empty());
    assert_eq!(state.view().rejected_triggers, 2);

    let (state, _) = update(state, Msg::RunStateChanged(false));
    let (state, _) = update(
        state,
        Msg::RunFinished(Some(UserResult::Output("answer".into()))),
    );
    let (_state, fourth) = update(state, Msg::ActionTriggered(Action::RunPattern));
    assert_eq!(fourth.len(), 1);
}

#[test]
fn finished_run_updates_output_and_error_flag() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ActionTriggered(Action::RunPattern));

    let (mut state, _) = update(
        state,
        Msg::RunFinished(Some(UserResult::Failed("Error: model not found".into()))),
    );

    let view = state.view();
    assert_eq!(view.output.as_deref(), Some("Error: model not found"));
    assert!(view.output_is_error);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn notifications_accumulate_for_legacy_operations() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Notified(Notification::info("Please select a pattern first.")),
    );
    let (state, _) = update(state, Msg::RunFinished(None));

    let view = state.view();
    assert_eq!(view.notifications.len(), 1);
    assert_eq!(view.output, None);
}

#[test]
fn noop_changes_nothing() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn stopped_engine_ends_the_pending_run() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::ActionTriggered(Action::RunPattern));
    let (state, _) = update(state, Msg::RunStateChanged(true));
    assert!(state.is_busy());

    let (state, effects) = update(state, Msg::EngineStopped("Engine stopped".into()));

    assert!(effects.is_empty());
    assert!(!state.is_busy());
    let view = state.view();
    assert_eq!(view.output.as_deref(), Some("Engine stopped"));
    assert!(view.output_is_error);
}
