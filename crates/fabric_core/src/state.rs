use crate::msg::Action;
use crate::operation::{Operation, PatternArgs};
use crate::result::{Notification, UserResult};
use crate::view_model::AppViewModel;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: String,
    pattern: Option<String>,
    model: Option<String>,
    context: Option<String>,
    running: bool,
    // Dispatched but not yet finished; covers the gap before the engine publishes.
    pending: bool,
    output: Option<String>,
    output_is_error: bool,
    notifications: Vec<Notification>,
    rejected_triggers: usize,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            input: self.input.clone(),
            pattern: self.pattern.clone(),
            model: self.model.clone(),
            context: self.context.clone(),
            running: self.running,
            output: self.output.clone(),
            output_is_error: self.output_is_error,
            notifications: self.notifications.clone(),
            rejected_triggers: self.rejected_triggers,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_busy(&self) -> bool {
        self.running || self.pending
    }

    pub fn pattern_args(&self) -> PatternArgs {
        PatternArgs {
            pattern: self.pattern.clone(),
            model: self.model.clone(),
            context: self.context.clone(),
        }
    }

    /// Builds the operation for `action` from the current selections.
    ///
    /// Returns `None` when the action needs the input box and it is blank.
    pub fn operation_for(&self, action: Action) -> Option<Operation> {
        let input = self.input.trim();
        if action.consumes_input() && input.is_empty() {
            return None;
        }
        let input = input.to_string();
        let operation = match action {
            Action::RunPattern => Operation::RunPattern(self.pattern_args()),
            Action::ScrapeUrl => Operation::ScrapeUrl { url: input },
            Action::SearchQuestion => Operation::SearchQuestion { question: input },
            Action::ScrapeUrlThenPattern => Operation::ScrapeUrlThenPattern {
                url: input,
                args: self.pattern_args(),
            },
            Action::SearchQuestionThenPattern => Operation::SearchQuestionThenPattern {
                question: input,
                args: self.pattern_args(),
            },
            Action::ClipboardThenPattern => Operation::ClipboardThenPattern(self.pattern_args()),
        };
        Some(operation)
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
        self.dirty = true;
    }

    pub(crate) fn set_pattern(&mut self, pattern: String) {
        self.pattern = optional(pattern);
        self.dirty = true;
    }

    pub(crate) fn set_model(&mut self, model: String) {
        self.model = optional(model);
        self.dirty = true;
    }

    pub(crate) fn set_context(&mut self, context: String) {
        self.context = optional(context);
        self.dirty = true;
    }

    pub(crate) fn mark_pending(&mut self) {
        self.pending = true;
        self.dirty = true;
    }

    pub(crate) fn record_rejected(&mut self) {
        self.rejected_triggers += 1;
        self.dirty = true;
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        if self.running != running {
            self.running = running;
            self.dirty = true;
        }
    }

    pub(crate) fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        self.dirty = true;
    }

    /// Drops any in-flight run and reports `reason` as its failure.
    pub(crate) fn stop_engine(&mut self, reason: String) {
        self.pending = false;
        self.running = false;
        self.output_is_error = true;
        self.output = Some(reason);
        self.dirty = true;
    }

    pub(crate) fn apply_result(&mut self, result: Option<UserResult>) {
        self.pending = false;
        if let Some(result) = result {
            self.output_is_error = result.is_failure();
            self.output = Some(result.message().to_string());
        }
        self.dirty = true;
    }
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
