use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::PatternSelected(pattern) => {
            state.set_pattern(pattern);
            Vec::new()
        }
        Msg::ModelSelected(model) => {
            state.set_model(model);
            Vec::new()
        }
        Msg::ContextChanged(context) => {
            state.set_context(context);
            Vec::new()
        }
        Msg::ActionTriggered(action) => {
            // Reject rather than queue while a pipeline is in flight.
            if state.is_busy() {
                state.record_rejected();
                return (state, Vec::new());
            }
            match state.operation_for(action) {
                Some(operation) => {
                    state.mark_pending();
                    vec![Effect::Dispatch(operation)]
                }
                None => Vec::new(),
            }
        }
        Msg::RunStateChanged(running) => {
            state.set_running(running);
            Vec::new()
        }
        Msg::Notified(notification) => {
            state.push_notification(notification);
            Vec::new()
        }
        Msg::RunFinished(result) => {
            state.apply_result(result);
            Vec::new()
        }
        Msg::EngineStopped(reason) => {
            state.stop_engine(reason);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
