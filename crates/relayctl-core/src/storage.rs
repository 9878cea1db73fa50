//! File-backed roster persistence.
//!
//! The roster snapshot (devices plus the sync flag) lives in one
//! pretty-printed JSON file so operators can inspect and hand-edit it.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::StorageError;
use crate::hooks::RosterStore;
use crate::registry::RosterSnapshot;

/// File name used under the default data directory
pub const ROSTER_FILE: &str = "roster.json";

/// Platform data directory for the roster file.
///
/// Uses the `directories` crate to find the appropriate platform-specific
/// data directory.
pub fn default_roster_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "relayctl", "relayctl")
        .map(|dirs| dirs.data_dir().join(ROSTER_FILE))
}

/// Roster store writing to a single JSON file.
///
/// Takes the full file path in the constructor so each consumer can decide
/// where the roster lives (default data dir, `--roster` override, tempdir
/// in tests).
pub struct FileRosterStore {
    path: PathBuf,
}

impl FileRosterStore {
    /// Creates the store and the file's parent directory.
    pub fn new(path: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RosterStore for FileRosterStore {
    async fn save(&self, snapshot: &RosterSnapshot) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(snapshot).map_err(StorageError::Serialization)?;
        fs::write(&self.path, content).await.map_err(StorageError::Io)?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<RosterSnapshot>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(StorageError::Io)?;
        let snapshot: RosterSnapshot =
            serde_json::from_str(&content).map_err(StorageError::Serialization)?;
        Ok(Some(snapshot))
    }
}
