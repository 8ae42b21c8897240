use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use fabric_core::Action;

use super::logging::LogDestination;

/// Desktop front-end for the fabric AI tool, driven from the command line.
#[derive(Debug, Parser)]
#[command(name = "fabric-app", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub selection: Selection,

    /// Kill a fabric stage that runs longer than this.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Stop a two-stage pipe when its first stage exits non-zero.
    #[arg(long, global = true)]
    pub abort_on_producer_failure: bool,

    /// Print the shell pipeline that would run instead of running it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Directory holding `.env`, `patterns/`, `contexts/` and the session file.
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// fabric binary used by the structured call path.
    #[arg(long, global = true, value_name = "PATH")]
    pub fabric_bin: Option<PathBuf>,
}

/// Overrides for the selections remembered from the previous session.
#[derive(Debug, Default, Args)]
pub struct Selection {
    #[arg(long, short, global = true)]
    pub pattern: Option<String>,

    #[arg(long, short, global = true)]
    pub model: Option<String>,

    #[arg(long, short, global = true)]
    pub context: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the selected pattern.
    RunPattern,
    /// Scrape a URL.
    Scrape { url: String },
    /// Ask a question through the search tool.
    Search { question: String },
    /// Scrape a URL and feed the page to the selected pattern.
    ScrapePattern { url: String },
    /// Search a question and feed the answer to the selected pattern.
    SearchPattern { question: String },
    /// Feed the clipboard contents to the selected pattern.
    ClipboardPattern,
    /// List the configured vendors.
    Vendors,
    /// List every vendor's models, marking the saved default.
    Models,
    /// Manage the markdown context files.
    Contexts {
        #[command(subcommand)]
        command: ContextCommand,
    },
    /// List the installed patterns.
    Patterns,
    SetDefaultModel { model: String },
    SetDefaultVendor { vendor: String },
    /// Clear the saved default model and vendor.
    ResetDefaults,
}

#[derive(Debug, Subcommand)]
pub enum ContextCommand {
    List,
    /// Create an empty context file.
    Create { title: String },
    /// Print a context file.
    Show { title: String },
    /// Replace a context's content; read from stdin when no content is given.
    Save {
        title: String,
        content: Option<String>,
    },
    Delete { title: String },
    /// Pass this context with every pattern run; no title clears it.
    Use { title: Option<String> },
}

impl Command {
    /// The front-end action this command triggers, with its input text.
    pub fn action(&self) -> Option<(Action, &str)> {
        let action = match self {
            Command::RunPattern => (Action::RunPattern, ""),
            Command::Scrape { url } => (Action::ScrapeUrl, url.as_str()),
            Command::Search { question } => (Action::SearchQuestion, question.as_str()),
            Command::ScrapePattern { url } => (Action::ScrapeUrlThenPattern, url.as_str()),
            Command::SearchPattern { question } => {
                (Action::SearchQuestionThenPattern, question.as_str())
            }
            Command::ClipboardPattern => (Action::ClipboardThenPattern, ""),
            _ => return None,
        };
        Some(action)
    }
}

impl Cli {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
