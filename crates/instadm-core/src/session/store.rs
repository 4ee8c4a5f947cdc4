//! Session state persistence (single JSON file)

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::platform::SessionState;
use crate::Result;

/// File-backed store for one serialized session
///
/// No cross-process locking: concurrent writers race and the last one wins.
#[derive(Debug, Clone)]
pub struct SessionStateStore {
    path: PathBuf,
}

impl SessionStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state. A missing file is `Ok(None)`.
    pub async fn load(&self) -> Result<Option<SessionState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session state at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let state: SessionState = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    /// Overwrite the persisted state
    pub async fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Session state written to {}", self.path.display());
        Ok(())
    }

    /// Remove the persisted state if present
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = SessionStateStore::new(dir.path().join("session.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_overwrites() {
        let dir = tempdir().unwrap();
        let store = SessionStateStore::new(dir.path().join("nested/session.json"));

        store
            .save(&SessionState::new(serde_json::json!({"sessionid": "old"})))
            .await
            .unwrap();
        store
            .save(&SessionState::new(serde_json::json!({"sessionid": "new"})))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.as_value()["sessionid"], "new");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStateStore::new(&path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStateStore::new(dir.path().join("session.json"));
        store
            .save(&SessionState::new(serde_json::json!({})))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }
}
