use sketchify_core::constants::{ALLOWED_CONTENT_TYPES, MAX_UPLOAD_SIZE_BYTES};
use sketchify_core::{AppError, Config};

use crate::file::CandidateFile;

/// Reasons a candidate image is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {}. Allowed: JPG, PNG.", display_type(.content_type))]
    UnsupportedType { content_type: String },

    #[error("File is too large. Max size is {limit_mib} MB.")]
    TooLarge { limit_mib: u64 },
}

fn display_type(content_type: &str) -> &str {
    if content_type.is_empty() {
        "unknown"
    } else {
        content_type
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedType { content_type } => {
                AppError::UnsupportedType(content_type)
            }
            ValidationError::TooLarge { limit_mib } => AppError::TooLarge { limit_mib },
        }
    }
}

/// Upload validator
///
/// Classifies a candidate file from its declared MIME type and size only; it
/// never reads the content. The type check takes precedence over the size check.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(
            MAX_UPLOAD_SIZE_BYTES,
            ALLOWED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl ImageValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_upload_size_bytes(),
            config.allowed_content_types.clone(),
        )
    }

    /// Limit expressed in whole MiB, as shown to the user.
    pub fn limit_mib(&self) -> u64 {
        self.max_file_size / (1024 * 1024)
    }

    /// Validate content type; the declared type must be listed exactly.
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.allowed_content_types.iter().any(|ct| ct == content_type) {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::TooLarge {
                limit_mib: self.limit_mib(),
            });
        }

        Ok(())
    }

    /// Validate a candidate file: type first, then size.
    pub fn validate(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        self.validate_content_type(&file.content_type)?;
        self.validate_file_size(file.size)?;
        Ok(())
    }
}
