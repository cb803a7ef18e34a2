#[cfg(feature = "storage-local")]
use crate::{LocalHosting, LocalKvStore};
use crate::{Hosting, KvStore, MemoryHosting, MemoryKvStore, StorageBackend, StorageResult};
#[cfg(not(feature = "storage-local"))]
use crate::StorageError;
use sketchify_core::Config;
use std::sync::Arc;

/// Create the hosting backend selected by configuration
pub async fn create_hosting(
    config: &Config,
    http: reqwest::Client,
) -> StorageResult<Arc<dyn Hosting>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let hosting =
                LocalHosting::new(&config.storage_path, config.storage_base_url.clone(), http)
                    .await?;
            Ok(Arc::new(hosting))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => Ok(Arc::new(MemoryHosting::new(
            config.storage_base_url.clone(),
            http,
        ))),
    }
}

/// Create the key-value backend selected by configuration
pub async fn create_kv_store(config: &Config) -> StorageResult<Arc<dyn KvStore>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => Ok(Arc::new(LocalKvStore::new(&config.kv_path).await?)),

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => Ok(Arc::new(MemoryKvStore::new())),
    }
}
