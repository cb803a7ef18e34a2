//! Caller-side orchestration after ingestion completes.
//!
//! Render the ingested image, build a draft project and hand it to the
//! persister. Render failures and a failed project creation are the only
//! errors that reach the user.

use anyhow::Context;
use chrono::Utc;
use sketchify_core::{AppError, Config, DesignItem, InlineImage};
use sketchify_storage::{create_hosting, create_kv_store};
use uuid::Uuid;

use crate::project::ProjectPersister;
use crate::render::{RenderError, RenderRequest, RenderRequester};

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Project could not be created: no source image")]
    ProjectCreationFailed,
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Render(e) => e.into(),
            FlowError::ProjectCreationFailed => AppError::MissingSourceImage,
        }
    }
}

pub struct ProjectFlow {
    renderer: RenderRequester,
    persister: ProjectPersister,
}

impl ProjectFlow {
    pub fn new(renderer: RenderRequester, persister: ProjectPersister) -> Self {
        Self {
            renderer,
            persister,
        }
    }

    /// Wire the flow from configuration: one HTTP client shared by rendering
    /// and hosting, backends selected by `storage_backend`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        let hosting = create_hosting(config, http.clone())
            .await
            .context("Failed to initialize hosting backend")?;
        let kv = create_kv_store(config)
            .await
            .context("Failed to initialize key-value store")?;

        tracing::info!(
            backend = %hosting.backend_type(),
            "Project flow initialized"
        );

        Ok(Self::new(
            RenderRequester::new(http),
            ProjectPersister::new(hosting, kv),
        ))
    }

    pub fn persister(&self) -> &ProjectPersister {
        &self.persister
    }

    /// Render `source_image` and create a project from it.
    pub async fn complete_upload(
        &self,
        source_image: &InlineImage,
        name: Option<&str>,
    ) -> Result<DesignItem, FlowError> {
        let project_id = Uuid::new_v4().to_string();

        let request = RenderRequest {
            source_image: source_image.as_str().to_string(),
            project_id: Some(project_id.clone()),
        };
        let render = self.renderer.generate_render(&request).await?;

        let draft = DesignItem {
            id: Some(project_id.clone()),
            name: name.map(str::to_string),
            source_image: Some(source_image.as_str().to_string()),
            rendered_image: Some(render.rendered_image),
            rendered_path: render.rendered_path,
            timestamp: Some(Utc::now().timestamp_millis()),
            ..Default::default()
        };

        match self.persister.create_project(&draft).await {
            Some(record) => {
                tracing::info!(project_id = %project_id, "Project created");
                Ok(record)
            }
            None => {
                tracing::warn!(project_id = %project_id, "Project creation failed");
                Err(FlowError::ProjectCreationFailed)
            }
        }
    }
}
