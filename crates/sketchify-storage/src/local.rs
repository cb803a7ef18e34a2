use crate::fetch::load_image_bytes;
use crate::keys::{hosted_image_key, kv_file_name, public_url};
use crate::traits::{is_hosted_url, Hosting, KvStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sketchify_core::{HostedAsset, HostingConfig};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const HOSTING_CONFIG_FILE: &str = "hosting.json";

/// Local filesystem hosting implementation
#[derive(Clone)]
pub struct LocalHosting {
    base_path: PathBuf,
    base_url: String,
    http: reqwest::Client,
}

impl LocalHosting {
    /// Create a new LocalHosting instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for hosted files (e.g., "./data/hosting")
    /// * `base_url` - Base URL under which the root is served (e.g., "http://localhost:8080/hosting")
    /// * `http` - Client used to fetch remote images before hosting them
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        http: reqwest::Client,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create hosting directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalHosting {
            base_path,
            base_url,
            http,
        })
    }

    /// Convert storage key to filesystem path, refusing keys that could escape
    /// the hosting root.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }

    async fn read_hosting_config(&self, path: &Path) -> StorageResult<Option<HostingConfig>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }
        let raw = fs::read(path).await?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }
}

#[async_trait]
impl Hosting for LocalHosting {
    async fn get_or_create_hosting_config(&self) -> StorageResult<HostingConfig> {
        let path = self.base_path.join(HOSTING_CONFIG_FILE);

        if let Some(existing) = self.read_hosting_config(&path).await.map_err(|e| {
            StorageError::HostingUnavailable(format!(
                "Failed to read hosting config {}: {}",
                path.display(),
                e
            ))
        })? {
            return Ok(existing);
        }

        let config = HostingConfig {
            id: Uuid::new_v4().to_string(),
            base_url: self.base_url.trim_end_matches('/').to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_vec_pretty(&config)?;
        write_file(&path, &raw)
            .await
            .map_err(|e| StorageError::HostingUnavailable(e.to_string()))?;

        tracing::info!(
            hosting_id = %config.id,
            base_url = %config.base_url,
            "Provisioned local hosting"
        );

        Ok(config)
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
        let path = self.key_to_path(&key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        write_file(&path, &data).await?;

        let url = public_url(&hosting.base_url, &key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local hosting upload successful"
        );

        Ok(HostedAsset::hosted(url, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Local filesystem key-value store: one JSON document per key.
#[derive(Clone)]
pub struct LocalKvStore {
    base_path: PathBuf,
}

impl LocalKvStore {
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create key-value directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalKvStore { base_path })
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        Ok(self.base_path.join(kv_file_name(key)?))
    }
}

#[async_trait]
impl KvStore for LocalKvStore {
    async fn set(&self, key: &str, value: JsonValue) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        let raw = serde_json::to_vec_pretty(&value)?;

        write_file(&path, &raw)
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        tracing::debug!(key = %key, path = %path.display(), "Key-value entry written");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<JsonValue>> {
        let path = self.entry_path(key)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let raw = fs::read(&path).await?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Write a whole file, creating parent directories first.
async fn write_file(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(path).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
    })?;

    file.write_all(data).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
    })?;

    file.sync_all().await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
    })?;

    Ok(())
}
