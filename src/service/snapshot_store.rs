use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serenity::async_trait;
use tokio::fs;

use crate::error::PersistError;
use crate::models::event::Snapshot;

pub const DEFAULT_DATA_FILE: &str = "events.json";

/// Durable home of the last announced snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// A store that has never been written yields an empty snapshot.
    async fn load(&self) -> Result<Snapshot, PersistError>;
    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Snapshot, PersistError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no stored snapshot yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&content).map_err(|source| PersistError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_string_pretty(snapshot).map_err(|source| {
            PersistError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, body)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), events = snapshot.len(), "snapshot saved");
        Ok(())
    }
}
