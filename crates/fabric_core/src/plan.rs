use serde::{Deserialize, Serialize};

use crate::platform::ShellInvocation;

/// One external process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
}

impl Stage {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    pub fn shell_words(&self, shell: &ShellInvocation) -> String {
        self.argv()
            .into_iter()
            .map(|word| shell.quote(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Arguments for the host's structured `run_fabric_command` entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRequest {
    pub flag: String,
    pub input: String,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// One or two stages; with two, stage 1's stdout is stage 2's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub stages: Vec<Stage>,
    pub structured: Option<StructuredRequest>,
}

impl ExecutionPlan {
    pub fn single(stage: Stage) -> Self {
        Self {
            stages: vec![stage],
            structured: None,
        }
    }

    pub fn piped(producer: Stage, transform: Stage) -> Self {
        Self {
            stages: vec![producer, transform],
            structured: None,
        }
    }

    pub fn with_structured(mut self, request: StructuredRequest) -> Self {
        self.structured = Some(request);
        self
    }

    /// Renders the plan as a single shell command line.
    pub fn shell_line(&self, shell: &ShellInvocation) -> String {
        self.stages
            .iter()
            .map(|stage| stage.shell_words(shell))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
