use crate::result::{Notification, UserResult};

/// User-facing actions, one per button in the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RunPattern,
    ScrapeUrl,
    SearchQuestion,
    ScrapeUrlThenPattern,
    SearchQuestionThenPattern,
    ClipboardThenPattern,
}

impl Action {
    /// Whether the action needs the text input (URL or question).
    pub fn consumes_input(self) -> bool {
        !matches!(self, Action::RunPattern | Action::ClipboardThenPattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL/question input box.
    InputChanged(String),
    /// User picked a pattern from the list.
    PatternSelected(String),
    /// User picked a model from the list.
    ModelSelected(String),
    /// User edited the context box.
    ContextChanged(String),
    /// User clicked one of the action buttons.
    ActionTriggered(Action),
    /// Engine published the busy flag.
    RunStateChanged(bool),
    /// Engine raised an alert for a single-stage operation.
    Notified(Notification),
    /// Engine finished an operation; `None` for the notifier convention.
    RunFinished(Option<UserResult>),
    /// Engine can no longer run anything; carries the reason.
    EngineStopped(String),
    /// Fallback for placeholder wiring.
    NoOp,
}
