//! Pipeline-wide constants.

/// MIME types accepted by the upload validator.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Maximum upload size in MiB.
pub const MAX_UPLOAD_SIZE_MB: u64 = 50;

/// Maximum upload size in bytes (50 MiB).
pub const MAX_UPLOAD_SIZE_BYTES: u64 = MAX_UPLOAD_SIZE_MB * 1024 * 1024;

/// Tick period of the simulated progress indicator.
pub const PROGRESS_INTERVAL_MS: u64 = 100;

/// Progress increment applied on every tick.
pub const PROGRESS_STEP: u8 = 15;

/// Delay between progress reaching 100 and the completion callback.
pub const COMPLETION_DELAY_MS: u64 = 600;

/// Terminal progress value.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Prefix shared by every inline image reference.
pub const INLINE_IMAGE_PREFIX: &str = "data:";

/// MIME type used when an inline image has no declared type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Key prefix for project records in the key-value store.
pub const PROJECT_KEY_PREFIX: &str = "project:";

/// Hosting labels for the two images of a project.
pub const SOURCE_LABEL: &str = "source";
pub const RENDERED_LABEL: &str = "rendered";
