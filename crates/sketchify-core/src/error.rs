//! Error types module
//!
//! `AppError` unifies the failure taxonomy of the pipeline. Crate-local error
//! enums (validation, storage, rendering) convert into it so the outer layer can
//! decide uniformly how to present, log and recover from a failure.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures absorbed by a fallback
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be surfaced to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same action may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: max size is {limit_mib} MB")]
    TooLarge { limit_mib: u64 },

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Fetch failed with status {status}: {message}")]
    FetchError { status: u16, message: String },

    #[error("Hosting unavailable: {0}")]
    HostingUnavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Key-value write failed: {0}")]
    KvWriteFailed(String),

    #[error("Source image is missing")]
    MissingSourceImage,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::ReadError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::UnsupportedType(_) => (
            "UNSUPPORTED_TYPE",
            true,
            Some("Choose a JPG or PNG image"),
            LogLevel::Debug,
        ),
        AppError::TooLarge { .. } => (
            "TOO_LARGE",
            true,
            Some("Choose a smaller image"),
            LogLevel::Debug,
        ),
        AppError::ReadError(_) => (
            "READ_ERROR",
            true,
            Some("Select the file again"),
            LogLevel::Warn,
        ),
        AppError::FetchError { .. } => (
            "FETCH_ERROR",
            true,
            Some("Retry the render"),
            LogLevel::Warn,
        ),
        AppError::HostingUnavailable(_) => (
            "HOSTING_UNAVAILABLE",
            true,
            None,
            LogLevel::Warn,
        ),
        AppError::UploadFailed(_) => ("UPLOAD_FAILED", true, None, LogLevel::Warn),
        AppError::KvWriteFailed(_) => ("KV_WRITE_FAILED", true, None, LogLevel::Warn),
        AppError::MissingSourceImage => (
            "MISSING_SOURCE_IMAGE",
            false,
            Some("Upload an image before creating a project"),
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            "UNAUTHORIZED",
            false,
            Some("Sign in to upload images"),
            LogLevel::Debug,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check SKETCHIFY_* environment variables"),
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Whether the failure is absorbed by a fallback and never reaches the user.
    pub fn is_best_effort(&self) -> bool {
        matches!(
            self,
            AppError::HostingUnavailable(_) | AppError::UploadFailed(_) | AppError::KvWriteFailed(_)
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Log `error` at its own log level, tagged with its code and whether a
/// fallback absorbed it.
pub fn log_error(error: &AppError, context: &str) {
    let error_code = error.error_code();
    let best_effort = error.is_best_effort();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code, best_effort, "{}", context);
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code, best_effort, "{}", context);
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code, best_effort, "{}", context);
        }
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::UnsupportedType(ref content_type) => {
                let shown = if content_type.is_empty() {
                    "unknown"
                } else {
                    content_type.as_str()
                };
                format!("Unsupported file type: {}. Allowed: JPG, PNG.", shown)
            }
            AppError::TooLarge { limit_mib } => {
                format!("File is too large. Max size is {} MB.", limit_mib)
            }
            AppError::ReadError(_) => "Failed to read the file. Please try again.".to_string(),
            AppError::FetchError { status, .. } => {
                format!("Failed to fetch image: {}", status)
            }
            AppError::HostingUnavailable(_) | AppError::UploadFailed(_) => {
                "Image hosting is unavailable".to_string()
            }
            AppError::KvWriteFailed(_) => "Project could not be saved".to_string(),
            AppError::MissingSourceImage => "Project could not be created".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Config(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal error".to_string()
            }
        }
    }
}
