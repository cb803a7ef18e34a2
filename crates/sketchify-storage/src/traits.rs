//! Storage abstraction traits
//!
//! `Hosting` publishes images at public URLs; `KvStore` keeps project records.
//! Both are external, individually fallible collaborators: callers treat every
//! error as non-fatal and fall back.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sketchify_core::{AppError, HostedAsset, HostingConfig, StorageBackend};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Hosting unavailable: {0}")]
    HostingUnavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Invalid image source: {0}")]
    InvalidSource(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Key-value write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::HostingUnavailable(msg) | StorageError::ConfigError(msg) => {
                AppError::HostingUnavailable(msg)
            }
            StorageError::WriteFailed(msg) => AppError::KvWriteFailed(msg),
            StorageError::Serialization(e) => AppError::KvWriteFailed(e.to_string()),
            other => AppError::UploadFailed(other.to_string()),
        }
    }
}

/// Image hosting collaborator.
#[async_trait]
pub trait Hosting: Send + Sync {
    /// Return the provisioned hosting location, creating it on first use.
    async fn get_or_create_hosting_config(&self) -> StorageResult<HostingConfig>;

    /// Host the image referenced by `url` (inline or remote) for a project.
    ///
    /// A `None` hosting config short-circuits to an empty [`HostedAsset`]
    /// without any I/O. A `url` already served by this backend is returned
    /// unchanged.
    async fn upload_image(
        &self,
        hosting: Option<&HostingConfig>,
        url: &str,
        project_id: &str,
        label: &str,
    ) -> StorageResult<HostedAsset>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Key-value collaborator.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn set(&self, key: &str, value: JsonValue) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Option<JsonValue>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Whether `url` is already served under the hosting base URL.
pub(crate) fn is_hosted_url(hosting: &HostingConfig, url: &str) -> bool {
    let base = hosting.base_url.trim_end_matches('/');
    !base.is_empty()
        && url
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}
