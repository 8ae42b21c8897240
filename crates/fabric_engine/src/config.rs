use std::path::PathBuf;
use std::time::Duration;

/// What a two-stage pipe does when the producer exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipePolicy {
    /// Log it and report the transform stage's outcome.
    #[default]
    IgnoreProducerFailure,
    /// Report the producer's outcome without starting the transform stage.
    AbortOnProducerFailure,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessSettings {
    /// `None` waits for the tool indefinitely.
    pub timeout: Option<Duration>,
    pub pipe_policy: PipePolicy,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tool_name: String,
    pub process: ProcessSettings,
    /// Holds `.env`, `patterns/`, `contexts/` and the front-end state file.
    pub config_dir: PathBuf,
    /// Binary used by the structured host call; `None` uses `~/go/bin/fabric`.
    pub fabric_bin: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tool_name: "fabric".to_string(),
            process: ProcessSettings::default(),
            config_dir: default_config_dir(),
            fabric_bin: None,
        }
    }
}

impl EngineConfig {
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            ..Self::default()
        }
    }

    pub fn env_file(&self) -> PathBuf {
        self.config_dir.join(".env")
    }

    pub fn patterns_dir(&self) -> PathBuf {
        self.config_dir.join("patterns")
    }

    pub fn contexts_dir(&self) -> PathBuf {
        self.config_dir.join("contexts")
    }

    pub fn resolved_fabric_bin(&self) -> Option<PathBuf> {
        self.fabric_bin.clone().or_else(default_fabric_bin)
    }
}

/// `~/.config/fabric`, or `./.config/fabric` when no home directory is known.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fabric")
}

/// Where `go install` puts the tool: `~/go/bin/fabric`.
pub fn default_fabric_bin() -> Option<PathBuf> {
    let name = if cfg!(windows) { "fabric.exe" } else { "fabric" };
    dirs::home_dir().map(|home| home.join("go").join("bin").join(name))
}
