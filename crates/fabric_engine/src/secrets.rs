use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use thiserror::Error;

use crate::persist::{read_optional, AtomicFileWriter, PersistError};

pub const DEFAULT_MODEL: &str = "DEFAULT_MODEL";
pub const DEFAULT_VENDOR: &str = "DEFAULT_VENDOR";
pub const DEFAULT_PATTERN: &str = "DEFAULT_PATTERN";
/// Context title passed with `-C` when an operation names none.
pub const CURRENT_CONTEXT: &str = "CURRENT_CONTEXT";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Key '{0}' not found in .env file")]
    NotFound(String),
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// `KEY=VALUE` settings file shared with the external tool.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn get(&self, key: &str) -> Result<String, SecretError> {
        let content = read_optional(&self.path)?.unwrap_or_default();
        lookup(&content, key).ok_or_else(|| SecretError::NotFound(key.to_string()))
    }

    /// Values for the keys that are present; missing keys are skipped.
    pub fn get_many(&self, keys: &[String]) -> Result<Vec<(String, String)>, SecretError> {
        let content = read_optional(&self.path)?.unwrap_or_default();
        Ok(keys
            .iter()
            .filter_map(|key| lookup(&content, key).map(|value| (key.clone(), value)))
            .collect())
    }

    /// Updates `key` in place, or appends it when absent.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        if key.is_empty() || key.contains('=') || key.contains('\n') {
            return Err(SecretError::InvalidKey(key.to_string()));
        }
        let content = read_optional(&self.path)?.unwrap_or_default();
        let prefix = format!("{key}=");
        let mut lines: Vec<String> = content.lines().map(String::from).collect();
        let entry = format!("{key}={}", value.replace('\n', " "));
        match lines.iter_mut().find(|line| line.starts_with(&prefix)) {
            Some(line) => *line = entry,
            None => lines.push(entry),
        }
        self.write_lines(&lines)?;
        engine_debug!("Updated {} in {:?}", key, self.path);
        Ok(())
    }

    /// Keeps the key but clears its value.
    pub fn reset(&self, key: &str) -> Result<(), SecretError> {
        self.set(key, "")
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), SecretError> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(".env");
        let content = lines.join("\n") + "\n";
        AtomicFileWriter::new(dir).write(filename, &content)?;
        Ok(())
    }
}

fn lookup(content: &str, key: &str) -> Option<String> {
    let prefix = format!("{key}=");
    content
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .map(ToOwned::to_owned)
}
