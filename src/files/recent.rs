//! Recent-files registry
//!
//! A bounded most-recent-first list of document paths, persisted to a plain
//! text side file with one absolute path per line. Every mutation rewrites
//! the side file; write failures are logged and never interrupt editing.

use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default side file name, resolved against the working directory.
pub const RECENT_FILES_NAME: &str = "recent_files.txt";

/// Default number of entries kept.
pub const MAX_RECENT_FILES: usize = 10;

/// Most-recent-first list of document paths.
#[derive(Debug, Clone)]
pub struct RecentFiles {
    /// Side file the list is persisted to
    store_path: PathBuf,
    /// Entries, most recent first
    entries: Vec<PathBuf>,
    /// Maximum number of entries
    capacity: usize,
}

impl RecentFiles {
    /// An empty registry backed by `store_path` (nothing is read).
    pub fn empty(store_path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            store_path: store_path.into(),
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Read the side file, dropping paths that no longer exist.
    ///
    /// A missing side file is not an error: the registry starts empty. An
    /// unreadable one is logged and treated the same way.
    pub fn load(store_path: impl Into<PathBuf>, capacity: usize) -> Self {
        let mut recent = Self::empty(store_path, capacity);

        let content = match fs::read_to_string(&recent.store_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No recent files list at {}, starting empty",
                    recent.store_path.display()
                );
                return recent;
            }
            Err(e) => {
                warn!(
                    "Failed to read recent files from {}: {}",
                    recent.store_path.display(),
                    e
                );
                return recent;
            }
        };

        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let path = PathBuf::from(line);
            if !path.exists() {
                debug!("Dropping missing recent file: {}", path.display());
                continue;
            }
            if !recent.entries.contains(&path) {
                recent.entries.push(path);
            }
        }
        recent.entries.truncate(recent.capacity);

        debug!("Loaded {} recent file(s)", recent.entries.len());
        recent
    }

    /// Entries in recency order.
    pub fn list(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    /// Move `path` to the front, evicting the oldest entry beyond capacity.
    pub fn add(&mut self, path: PathBuf) {
        self.entries.retain(|p| p != &path);
        self.entries.insert(0, path);
        self.entries.truncate(self.capacity);
        self.persist();
    }

    /// Remove `path`. Returns whether it was present.
    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p| p != path);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Write the list to the side file.
    pub fn save(&self) -> Result<()> {
        let mut content = String::new();
        for path in &self.entries {
            content.push_str(&path.to_string_lossy());
            content.push('\n');
        }
        fs::write(&self.store_path, content).map_err(|e| Error::FileWrite {
            path: self.store_path.clone(),
            source: e,
        })
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to persist recent files: {}", e);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
