//! Encoder: candidate file bytes to an inline image reference.

use sketchify_core::{AppError, InlineImage};

use crate::file::CandidateFile;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::ReadError(err.to_string())
    }
}

/// Read the whole file and encode it as `data:{mime};base64,...`.
pub async fn encode(file: &CandidateFile) -> Result<InlineImage, EncodeError> {
    let data = file.read().await.map_err(|source| EncodeError::Read {
        name: file.name.clone(),
        source,
    })?;

    tracing::debug!(
        file = %file.name,
        content_type = %file.content_type,
        size_bytes = data.len(),
        "Encoded file as inline image"
    );

    Ok(InlineImage::from_bytes(&file.content_type, &data))
}
