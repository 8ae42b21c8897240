use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use engine_logging::{engine_error, engine_info, engine_warn};
use fabric_engine::{ensure_config_dir, AtomicFileWriter};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".fabric_app_state.ron";

/// Selections remembered between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct SessionState {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub last_run_utc: Option<DateTime<Utc>>,
}

/// Missing or unreadable state yields the defaults.
pub(crate) fn load_session(config_dir: &Path) -> SessionState {
    let path = config_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return SessionState::default();
        }
        Err(err) => {
            engine_warn!("Failed to read session state from {:?}: {}", path, err);
            return SessionState::default();
        }
    };

    match ron::from_str(&content) {
        Ok(state) => {
            engine_info!("Loaded session state from {:?}", path);
            state
        }
        Err(err) => {
            engine_warn!("Failed to parse session state from {:?}: {}", path, err);
            SessionState::default()
        }
    }
}

pub(crate) fn save_session(config_dir: &Path, state: &SessionState) {
    if let Err(err) = ensure_config_dir(config_dir) {
        engine_error!("Failed to ensure config dir {:?}: {}", config_dir, err);
        return;
    }

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(state, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize session state: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(PathBuf::from(config_dir));
    if let Err(err) = writer.write(STATE_FILENAME, &content) {
        engine_error!("Failed to write session state to {:?}: {}", config_dir, err);
    }
}
