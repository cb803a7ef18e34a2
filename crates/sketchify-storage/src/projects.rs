//! Typed helpers for project records in the key-value store.

use sketchify_core::models::project_key;
use sketchify_core::DesignItem;

use crate::traits::{KvStore, StorageError, StorageResult};

/// Store a finalized record under `project:{id}`.
pub async fn save_project(kv: &dyn KvStore, item: &DesignItem) -> StorageResult<String> {
    let key = item
        .storage_key()
        .ok_or_else(|| StorageError::InvalidKey("project has no id".to_string()))?;
    let value = serde_json::to_value(item)?;
    kv.set(&key, value).await?;
    Ok(key)
}

/// Load the record stored for `project_id`, if any.
pub async fn load_project(kv: &dyn KvStore, project_id: &str) -> StorageResult<Option<DesignItem>> {
    match kv.get(&project_key(project_id)).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
