//! Sketchify Services Layer
//!
//! Caller-side orchestration of the pipeline: render generation, best-effort
//! project persistence and the flow that ties an ingested image to a stored
//! project. Also re-exports the processing and storage APIs so the CLI
//! depends on a single service facade.

pub mod flow;
pub mod project;
pub mod render;
pub mod render_session;

#[cfg(test)]
pub mod test_helpers;

pub use flow::{FlowError, ProjectFlow};
pub use project::ProjectPersister;
pub use render::{RenderError, RenderOutput, RenderRequest, RenderRequester};
pub use render_session::RenderSession;

pub use sketchify_processing::{
    AttemptOutcome, CandidateFile, CompletionHandler, ImageValidator, IngestionSession,
    ProgressSettings, UploadError, UploadState, ValidationError,
};
pub use sketchify_storage::{
    create_hosting, create_kv_store, load_project, Hosting, KvStore, StorageBackend,
    StorageError, StorageResult,
};
