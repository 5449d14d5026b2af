use crate::domain::error::Result;
use crate::infrastructure::storage::{history_file, remove_if_exists, resolve_data_dir, write_atomic};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One finished diagnosis as remembered on this device.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub created_at: i64,
    pub form: Value,
    pub triage: Value,
}

/// Most-recent-first list of finished cases, mirrored to a JSON file when a
/// path is set. Single writer.
pub struct HistoryStore {
    path: Option<PathBuf>,
    items: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// In-memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Vec::new(),
        }
    }

    /// Loads from `path`; a missing or unreadable file starts empty.
    pub fn open(path: Option<PathBuf>) -> Self {
        let items = path.as_deref().map(load_items).unwrap_or_default();
        Self { path, items }
    }

    /// Opens the history file in the per-user data directory.
    pub fn open_default() -> Result<Self> {
        let path = history_file(&resolve_data_dir())?;
        Ok(Self::open(Some(path)))
    }

    pub fn items(&self) -> &[HistoryEntry] {
        &self.items
    }

    pub fn add_entry(&mut self, form: Value, triage: Value) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            form,
            triage,
        };
        self.items.insert(0, entry);
        self.persist();
        &self.items[0]
    }

    pub fn clear(&mut self) {
        self.items.clear();
        if let Some(path) = &self.path {
            if let Err(err) = remove_if_exists(path) {
                warn!(error = %err, path = %path.display(), "Failed to remove history file");
            }
        }
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let written = serde_json::to_vec(&self.items)
            .map_err(std::io::Error::from)
            .and_then(|bytes| write_atomic(path, &bytes));
        if let Err(err) = written {
            warn!(error = %err, path = %path.display(), "Failed to persist history");
        }
    }
}

fn load_items(path: &Path) -> Vec<HistoryEntry> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, path = %path.display(), "No history file yet");
            return Vec::new();
        }
    };
    serde_json::from_slice(&raw).unwrap_or_else(|err| {
        warn!(error = %err, path = %path.display(), "Ignoring corrupt history file");
        Vec::new()
    })
}
