//! Durable history store: a directory keeping a copy of every document

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

/// A document retained in the history store
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Copy a document in, overwriting a previous copy of the same name
    pub fn retain(&self, document: &Path) -> io::Result<PathBuf> {
        let name = document.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", document.display()),
            )
        })?;

        self.ensure()?;
        let target = self.dir.join(name);
        fs::copy(document, &target)?;
        log::debug!("Retained {} in history", target.display());
        Ok(target)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Retained documents sorted by name; empty when the store does not exist
    pub fn list(&self) -> io::Result<Vec<HistoryEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(HistoryEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Local>::from),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Delete every retained document, returning how many were removed
    pub fn clear(&self) -> io::Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        log::info!("Cleared {} documents from {}", removed, self.dir.display());
        Ok(removed)
    }
}
