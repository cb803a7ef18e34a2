//! Sketchify Storage Library
//!
//! Hosting and key-value collaborators used by the project persister, with a
//! local-filesystem and an in-memory implementation of each.
//!
//! # Key format
//!
//! Hosted images live under `projects/{project_id}/{label}.{ext}` and are served
//! at `{base_url}/{key}`. Project records are stored under `project:{id}`.
//! Key generation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod factory;
mod fetch;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod projects;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_hosting, create_kv_store};
pub use fetch::load_image_bytes;
#[cfg(feature = "storage-local")]
pub use local::{LocalHosting, LocalKvStore};
pub use memory::{MemoryHosting, MemoryKvStore};
pub use projects::{load_project, save_project};
pub use sketchify_core::StorageBackend;
pub use traits::{Hosting, KvStore, StorageError, StorageResult};
