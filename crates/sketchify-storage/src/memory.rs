//! In-memory hosting and key-value backends.
//!
//! Nothing survives the process; useful for dry runs and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sketchify_core::{HostedAsset, HostingConfig};
use uuid::Uuid;

use crate::fetch::load_image_bytes;
use crate::keys::{hosted_image_key, public_url};
use crate::traits::{is_hosted_url, Hosting, KvStore, StorageError, StorageResult};
use crate::StorageBackend;

/// Hosting that keeps uploaded files in memory.
pub struct MemoryHosting {
    base_url: String,
    http: reqwest::Client,
    config: Mutex<Option<HostingConfig>>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryHosting {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            config: Mutex::new(None),
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get hosted file data (for inspection)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(key).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().map(|f| f.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Hosting for MemoryHosting {
    async fn get_or_create_hosting_config(&self) -> StorageResult<HostingConfig> {
        let mut guard = self
            .config
            .lock()
            .map_err(|_| StorageError::HostingUnavailable("hosting lock poisoned".to_string()))?;
        let config = guard.get_or_insert_with(|| HostingConfig {
            id: Uuid::new_v4().to_string(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            created_at: Utc::now(),
        });
        Ok(config.clone())
    }

    async fn upload_image(
        &self,
        hosting: Option<&HostingConfig>,
        url: &str,
        project_id: &str,
        label: &str,
    ) -> StorageResult<HostedAsset> {
        let Some(hosting) = hosting else {
            return Ok(HostedAsset::empty());
        };

        if is_hosted_url(hosting, url) {
            let key = url
                .trim_start_matches(hosting.base_url.trim_end_matches('/'))
                .trim_start_matches('/')
                .to_string();
            return Ok(HostedAsset::hosted(url, key));
        }

        let (data, content_type) = load_image_bytes(&self.http, url).await?;
        let key = hosted_image_key(project_id, label, &content_type)?;
        let size = data.len();

        self.files
            .lock()
            .map_err(|_| StorageError::UploadFailed("hosting lock poisoned".to_string()))?
            .insert(key.clone(), data);

        tracing::debug!(key = %key, size_bytes = size, "Memory hosting upload successful");
        Ok(HostedAsset::hosted(public_url(&hosting.base_url, &key), key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

/// Key-value store backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, JsonValue>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn set(&self, key: &str, value: JsonValue) -> StorageResult<()> {
        self.entries
            .lock()
            .map_err(|_| StorageError::WriteFailed("key-value lock poisoned".to_string()))?
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<JsonValue>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| StorageError::WriteFailed("key-value lock poisoned".to_string()))?
            .get(key)
            .cloned())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
