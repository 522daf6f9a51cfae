//! File-based storage implementation

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::application::errors::StorageError;
use crate::domain::entities::BotState;
use crate::domain::traits::StateStore;

/// Default location of the state file, relative to the working directory
pub const DEFAULT_STATE_PATH: &str = "data/botdata.json";

/// JSON file-based store
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn persistence_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Persistence {
            path: self.path.clone(),
            source,
        }
    }

    /// Sibling temp file so the final rename stays on one filesystem
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> Result<BotState, StorageError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting empty", self.path.display());
                return Ok(BotState::default());
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        serde_json::from_slice(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, state: &BotState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| self.persistence_error(e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.persistence_error(e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.persistence_error(e));
        }

        tracing::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
