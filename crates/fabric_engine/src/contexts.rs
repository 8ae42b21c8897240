use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const CONTEXT_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Context file already exists: {0}")]
    AlreadyExists(String),
    #[error("Context file does not exist: {0}")]
    NotFound(String),
    #[error("invalid context title '{0}'")]
    InvalidTitle(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Markdown context files kept in one directory, addressed by title.
#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Titles of all `*.md` files, sorted. A missing directory lists nothing.
    pub fn list(&self) -> Result<Vec<String>, ContextError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut titles: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()?.to_str()? != CONTEXT_EXTENSION || !path.is_file() {
                    return None;
                }
                Some(path.file_stem()?.to_str()?.to_string())
            })
            .collect();
        titles.sort();
        Ok(titles)
    }

    /// Creates an empty context; an existing one is left untouched.
    pub fn create(&self, title: &str) -> Result<PathBuf, ContextError> {
        let path = self.path_for(title)?;
        if path.exists() {
            return Err(ContextError::AlreadyExists(title.to_string()));
        }
        let written = self.writer().write(&file_name(title), "")?;
        engine_info!("Created context file {:?}", written);
        Ok(written)
    }

    pub fn read(&self, title: &str) -> Result<String, ContextError> {
        let path = self.existing(title)?;
        Ok(fs::read_to_string(path)?)
    }

    /// Replaces the content of an existing context.
    pub fn save(&self, title: &str, content: &str) -> Result<(), ContextError> {
        self.existing(title)?;
        self.writer().write(&file_name(title), content)?;
        Ok(())
    }

    pub fn delete(&self, title: &str) -> Result<(), ContextError> {
        let path = self.existing(title)?;
        fs::remove_file(path)?;
        engine_info!("Deleted context {}", title);
        Ok(())
    }

    fn existing(&self, title: &str) -> Result<PathBuf, ContextError> {
        let path = self.path_for(title)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(ContextError::NotFound(title.to_string()))
        }
    }

    fn path_for(&self, title: &str) -> Result<PathBuf, ContextError> {
        let valid = !title.trim().is_empty()
            && !title.starts_with('.')
            && !title.contains(['/', '\\'])
            && Path::new(title).components().count() == 1;
        if valid {
            Ok(self.dir.join(file_name(title)))
        } else {
            Err(ContextError::InvalidTitle(title.to_string()))
        }
    }

    fn writer(&self) -> AtomicFileWriter {
        AtomicFileWriter::new(self.dir.clone())
    }
}

fn file_name(title: &str) -> String {
    format!("{title}.{CONTEXT_EXTENSION}")
}
