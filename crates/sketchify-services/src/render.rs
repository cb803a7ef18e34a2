//! Render generation.
//!
//! Inline sources pass through unchanged without any request; remote sources
//! are fetched and re-encoded as inline images. The request is idempotent, so
//! retrying means calling [`RenderRequester::generate_render`] again.

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use sketchify_core::{AppError, Config, InlineImage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub source_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl RenderRequest {
    pub fn new(source_image: impl Into<String>) -> Self {
        Self {
            source_image: source_image.into(),
            project_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub rendered_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to fetch image: {status} {reason}")]
    Fetch { status: u16, reason: String },

    #[error("Failed to request image: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Failed to read fetched image: {0}")]
    Read(#[source] reqwest::Error),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Fetch { status, reason } => AppError::FetchError {
                status,
                message: reason,
            },
            RenderError::Read(e) => AppError::ReadError(e.to_string()),
            e @ RenderError::Network(_) => AppError::InternalWithSource {
                message: e.to_string(),
                source: e.into(),
            },
        }
    }
}

#[derive(Clone)]
pub struct RenderRequester {
    http: reqwest::Client,
}

impl RenderRequester {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .context("Failed to create HTTP client for render requests")?;
        Ok(Self::new(http))
    }

    pub async fn generate_render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let source = request.source_image.as_str();

        if InlineImage::is_inline(source) {
            tracing::debug!(project_id = ?request.project_id, "Inline source, render passthrough");
            return Ok(RenderOutput {
                rendered_image: source.to_string(),
                rendered_path: None,
            });
        }

        let response = self
            .http
            .get(source)
            .send()
            .await
            .map_err(RenderError::Network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                source = %source,
                status = status.as_u16(),
                "Render source fetch failed"
            );
            return Err(RenderError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_default();

        let data = response.bytes().await.map_err(RenderError::Read)?;

        tracing::info!(
            source = %source,
            content_type = %content_type,
            size_bytes = data.len(),
            "Fetched remote render source"
        );

        Ok(RenderOutput {
            rendered_image: InlineImage::from_bytes(&content_type, &data).into_string(),
            rendered_path: None,
        })
    }
}
