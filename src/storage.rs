//! Local persistence for price history.
//!
//! One JSON file holds every route's history, keyed by route and
//! ordered oldest first:
//!
//! ```text
//! {
//!   "YYZ-LIS-one_way-CAD": [
//!     { "checked_at": "...", "currency": "CAD", "deeplink": null, "price": 512.3, "provider": "amadeus" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::model::HistoryEntry;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

type HistoryFile = BTreeMap<String, Vec<HistoryEntry>>;

/// File-based price history.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Creates a storage instance backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default history file: `./data/price_history.json`.
    pub fn default_path() -> PathBuf {
        Path::new("data").join("price_history.json")
    }

    /// Appends an entry to a route's history.
    pub fn append(&self, key: &str, entry: &HistoryEntry) -> Result<()> {
        let mut history = self.load()?;
        history.entry(key.to_string()).or_default().push(entry.clone());
        self.save(&history)
    }

    /// Loads the most recent entry for a route, if any.
    pub fn last_entry(&self, key: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.entries(key)?.pop())
    }

    /// Loads all entries for a route, oldest first.
    pub fn entries(&self, key: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self.load()?.remove(key).unwrap_or_default())
    }

    fn load(&self) -> Result<HistoryFile> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryFile::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, history: &HistoryFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(history)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
