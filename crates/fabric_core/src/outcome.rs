use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitKind {
    Success,
    NonZero(Option<i32>),
    /// The process could not be started at all.
    SpawnFailed(String),
    TimedOut(Duration),
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitKind::Success => write!(f, "success"),
            ExitKind::NonZero(Some(code)) => write!(f, "exit code {code}"),
            ExitKind::NonZero(None) => write!(f, "terminated by signal"),
            ExitKind::SpawnFailed(fault) => write!(f, "spawn failed: {fault}"),
            ExitKind::TimedOut(after) => write!(f, "timed out after {} ms", after.as_millis()),
        }
    }
}

/// Result of running a stage or a whole plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit: ExitKind,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit: ExitKind::Success,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit: ExitKind::NonZero(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn spawn_failed(fault: impl Into<String>) -> Self {
        Self {
            exit: ExitKind::SpawnFailed(fault.into()),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn timed_out(after: Duration, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit: ExitKind::TimedOut(after),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit == ExitKind::Success
    }

    /// Whether the process never produced a usable result (spawn failure or timeout).
    pub fn is_aborted(&self) -> bool {
        matches!(self.exit, ExitKind::SpawnFailed(_) | ExitKind::TimedOut(_))
    }
}
