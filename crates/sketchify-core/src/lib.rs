//! Sketchify Core Library
//!
//! This crate provides the shared domain models, error types, configuration and
//! collaborator contracts used by every Sketchify component.

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{log_error, AppError, ErrorMetadata, LogLevel};
pub use identity::{current_user, IdentityProvider, LocalIdentity};
pub use models::{DesignItem, HostedAsset, HostingConfig, InlineImage, User};
pub use storage_types::StorageBackend;
