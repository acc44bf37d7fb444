//! JSON file backed session store.
//!
//! Each collection lives in a single `<collection>.json` file holding a list
//! of documents. Writes go to a temporary sibling file which is then renamed
//! over the original.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::StoreError;
use super::SessionStore;
use crate::types::{FocusSession, FOCUS_SESSIONS_COLLECTION};

/// A stored focus session together with its generated document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Document id assigned on insert
    pub id: String,
    /// The session record
    #[serde(flatten)]
    pub session: FocusSession,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    #[serde(default)]
    documents: Vec<SessionDocument>,
}

/// Session store writing the `focusSessions` collection to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the focus session collection inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::from_path(data_dir.join(format!("{FOCUS_SESSIONS_COLLECTION}.json")))
    }

    /// Creates a store backed by an explicit file path.
    pub fn from_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every stored document, in insertion order.
    pub async fn documents(&self) -> Result<Vec<SessionDocument>, StoreError> {
        Ok(self.load().await?.documents)
    }

    async fn load(&self) -> Result<Collection, StoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Collection::default());
            }
            Err(e) => return Err(StoreError::Read(format!("{}: {}", self.path.display(), e))),
        };

        if data.trim().is_empty() {
            return Ok(Collection::default());
        }

        serde_json::from_str(&data)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, collection: &Collection) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Write(format!("{}: {}", parent.display(), e)))?;
        }

        let data = serde_json::to_string_pretty(collection)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, data)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {}", tmp_path.display(), e)))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::Write(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    async fn add(&self, session: &FocusSession) -> Result<String, StoreError> {
        if session.user_id.trim().is_empty() {
            return Err(StoreError::InvalidRecord("empty user id".to_string()));
        }

        let mut collection = self.load().await?;
        let id = Uuid::new_v4().to_string();
        collection.documents.push(SessionDocument {
            id: id.clone(),
            session: session.clone(),
        });
        self.save(&collection).await?;

        debug!(id = %id, path = %self.path.display(), "focus session stored");
        Ok(id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<FocusSession>, StoreError> {
        Ok(self
            .load()
            .await?
            .documents
            .into_iter()
            .filter(|doc| doc.session.user_id == user_id)
            .map(|doc| doc.session)
            .collect())
    }
}
