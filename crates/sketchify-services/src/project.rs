//! Best-effort project persistence.
//!
//! Hosting, key-value storage and the in-memory record are independent and
//! individually fallible. Hosting and storage failures are logged and absorbed
//! into fallbacks; the only fatal outcome is a record without a source image.

use std::sync::Arc;

use chrono::Utc;
use sketchify_core::constants::{RENDERED_LABEL, SOURCE_LABEL};
use sketchify_core::{log_error, AppError, DesignItem, HostingConfig};
use sketchify_storage::{projects::save_project, Hosting, KvStore};

pub struct ProjectPersister {
    hosting: Arc<dyn Hosting>,
    kv: Arc<dyn KvStore>,
}

impl ProjectPersister {
    pub fn new(hosting: Arc<dyn Hosting>, kv: Arc<dyn KvStore>) -> Self {
        Self { hosting, kv }
    }

    /// Finalize `draft` into a new record. The draft itself is never modified.
    ///
    /// Returns `None` only when no source image can be resolved.
    pub async fn create_project(&self, draft: &DesignItem) -> Option<DesignItem> {
        let project_id = draft.project_id();

        let hosting = match self.hosting.get_or_create_hosting_config().await {
            Ok(config) => Some(config),
            Err(e) => {
                log_error(
                    &AppError::from(e),
                    "Hosting unavailable; continuing without hosting",
                );
                None
            }
        };

        let (hosted_source, hosted_render) = match (hosting.as_ref(), project_id) {
            (Some(hosting), Some(id)) => {
                let source = match draft.source() {
                    Some(url) => self.host(hosting, url, id, SOURCE_LABEL).await,
                    None => None,
                };
                let render = match draft.rendered() {
                    Some(url) => self.host(hosting, url, id, RENDERED_LABEL).await,
                    None => None,
                };
                (source, render)
            }
            (_, None) => {
                tracing::debug!("Draft has no id; skipping hosting uploads");
                (None, None)
            }
            (None, Some(_)) => (None, None),
        };

        let Some(source_image) = hosted_source.or_else(|| draft.source().map(str::to_string))
        else {
            log_error(
                &AppError::MissingSourceImage,
                &format!(
                    "Source image is missing; cannot create project {}",
                    project_id.unwrap_or("<no id>")
                ),
            );
            return None;
        };

        let rendered_image = hosted_render.or_else(|| draft.rendered().map(str::to_string));

        let mut record = draft.without_derived_paths();
        record.source_image = Some(source_image);
        record.rendered_image = rendered_image;
        record.timestamp = Some(
            draft
                .timestamp
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        );

        self.store(&record).await;

        Some(record)
    }

    async fn host(
        &self,
        hosting: &HostingConfig,
        url: &str,
        project_id: &str,
        label: &str,
    ) -> Option<String> {
        match self
            .hosting
            .upload_image(Some(hosting), url, project_id, label)
            .await
        {
            Ok(asset) if asset.is_hosted() => {
                tracing::info!(project_id = %project_id, label = %label, url = ?asset.url, "Image hosted");
                asset.url
            }
            Ok(_) => {
                tracing::warn!(
                    project_id = %project_id,
                    label = %label,
                    "Hosting returned no URL; keeping original reference"
                );
                None
            }
            Err(e) => {
                log_error(
                    &AppError::from(e),
                    &format!(
                        "Image upload failed for {}/{}; keeping original reference",
                        project_id, label
                    ),
                );
                None
            }
        }
    }

    async fn store(&self, record: &DesignItem) {
        let Some(project_id) = record.project_id() else {
            tracing::warn!("Project has no id; skipping key-value write");
            return;
        };

        match save_project(self.kv.as_ref(), record).await {
            Ok(key) => tracing::debug!(project_id = %project_id, key = %key, "Project stored"),
            Err(e) => log_error(
                &AppError::from(e),
                &format!("Failed to save project {}; continuing", project_id),
            ),
        }
    }
}
