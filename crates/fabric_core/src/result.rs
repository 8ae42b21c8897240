use crate::builder::BuildError;
use crate::operation::Operation;
use crate::outcome::{ExecutionOutcome, ExitKind};
use crate::platform::UnsupportedPlatform;

pub const NO_PATTERN_MESSAGE: &str = "Please select a pattern first.";
pub const EMPTY_OUTPUT_MESSAGE: &str = "Command executed successfully with no output.";

/// What the caller gets back from an orchestrated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResult {
    Output(String),
    /// Guarded short-circuit, not an error.
    NoPatternSelected,
    Failed(String),
}

impl UserResult {
    pub fn message(&self) -> &str {
        match self {
            UserResult::Output(text) | UserResult::Failed(text) => text,
            UserResult::NoPatternSelected => NO_PATTERN_MESSAGE,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, UserResult::Failed(_))
    }
}

/// Normalizes a completed process outcome.
pub fn map_outcome(outcome: &ExecutionOutcome) -> UserResult {
    match &outcome.exit {
        ExitKind::Success if outcome.stdout.is_empty() => {
            UserResult::Output(EMPTY_OUTPUT_MESSAGE.to_string())
        }
        ExitKind::Success => UserResult::Output(outcome.stdout.clone()),
        ExitKind::NonZero(code) => {
            let stderr = outcome.stderr.trim();
            if stderr.is_empty() {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                UserResult::Failed(format!("Error: fabric exited with status {code}"))
            } else {
                UserResult::Failed(format!("Error: {stderr}"))
            }
        }
        ExitKind::SpawnFailed(fault) => {
            UserResult::Failed(format!("Failed to execute fabric: {fault}"))
        }
        ExitKind::TimedOut(after) => {
            UserResult::Failed(format!("fabric timed out after {} ms", after.as_millis()))
        }
    }
}

pub fn map_build_error(error: &BuildError) -> UserResult {
    match error {
        BuildError::NoPatternSelected => UserResult::NoPatternSelected,
        BuildError::UnsupportedPlatform(err) => map_unsupported(err),
    }
}

pub fn map_unsupported(error: &UnsupportedPlatform) -> UserResult {
    UserResult::Failed(error.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// A user-facing alert raised by the side-channel call convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// The alert a single-stage operation raises for `result`, if any.
///
/// A successful URL scrape is only logged.
pub fn legacy_notification(operation: &Operation, result: &UserResult) -> Option<Notification> {
    match result {
        UserResult::NoPatternSelected => Some(Notification::info(NO_PATTERN_MESSAGE)),
        UserResult::Failed(message) => {
            Some(Notification::error(format!("Error running command: {message}")))
        }
        UserResult::Output(output) => match operation {
            Operation::RunPattern(_) => Some(Notification::info(format!(
                "Command executed successfully. Output: {output}"
            ))),
            Operation::SearchQuestion { .. } => Some(Notification::info(format!(
                "Question searched successfully. Output: {output}"
            ))),
            _ => None,
        },
    }
}
