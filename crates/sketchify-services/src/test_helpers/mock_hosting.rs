//! Mock hosting implementation for testing

use async_trait::async_trait;
use chrono::Utc;
use sketchify_core::{HostedAsset, HostingConfig};
use sketchify_storage::{Hosting, StorageBackend, StorageError, StorageResult};
use std::collections::HashSet;
use std::sync::Mutex;

pub const MOCK_BASE_URL: &str = "https://hosting.example.com/h1";

/// One recorded upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub url: String,
    pub project_id: String,
    pub label: String,
}

/// Hosting double that records uploads and fails on request.
#[derive(Default)]
pub struct MockHosting {
    fail_config: bool,
    empty_urls: bool,
    failing_labels: HashSet<String>,
    config_calls: Mutex<usize>,
    uploads: Mutex<Vec<UploadCall>>,
}

impl MockHosting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hosting config acquisition always fails.
    pub fn unavailable() -> Self {
        Self {
            fail_config: true,
            ..Self::default()
        }
    }

    /// Uploads succeed but report an empty URL.
    pub fn empty_urls() -> Self {
        Self {
            empty_urls: true,
            ..Self::default()
        }
    }

    /// Uploads for `label` fail.
    pub fn failing_label(mut self, label: &str) -> Self {
        self.failing_labels.insert(label.to_string());
        self
    }

    pub fn uploads(&self) -> Vec<UploadCall> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn config_calls(&self) -> usize {
        *self.config_calls.lock().unwrap()
    }

    pub fn hosted_url(project_id: &str, label: &str) -> String {
        format!("{}/projects/{}/{}.png", MOCK_BASE_URL, project_id, label)
    }
}

#[async_trait]
impl Hosting for MockHosting {
    async fn get_or_create_hosting_config(&self) -> StorageResult<HostingConfig> {
        *self.config_calls.lock().unwrap() += 1;
        if self.fail_config {
            return Err(StorageError::HostingUnavailable(
                "hosting provider unreachable".to_string(),
            ));
        }
        Ok(HostingConfig {
            id: "h1".to_string(),
            base_url: MOCK_BASE_URL.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn upload_image(
        &self,
        hosting: Option<&HostingConfig>,
        url: &str,
        project_id: &str,
        label: &str,
    ) -> StorageResult<HostedAsset> {
        if hosting.is_none() {
            return Ok(HostedAsset::empty());
        }

        self.uploads.lock().unwrap().push(UploadCall {
            url: url.to_string(),
            project_id: project_id.to_string(),
            label: label.to_string(),
        });

        if self.failing_labels.contains(label) {
            return Err(StorageError::UploadFailed(format!("{} upload rejected", label)));
        }

        if self.empty_urls {
            return Ok(HostedAsset {
                url: Some(String::new()),
                key: None,
            });
        }

        let key = format!("projects/{}/{}.png", project_id, label);
        Ok(HostedAsset::hosted(Self::hosted_url(project_id, label), key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
