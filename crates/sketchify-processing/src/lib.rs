//! Sketchify Processing Library
//!
//! Client-side half of the pipeline: validate a candidate image, encode it
//! into an inline reference, run the simulated progress protocol and hand the
//! result to the caller through [`IngestionSession`].

pub mod encoder;
pub mod file;
pub mod progress;
pub mod session;
pub mod validator;

pub use encoder::{encode, EncodeError};
pub use file::{content_type_for_path, CandidateFile, FileContents, InMemoryContents, PathContents};
pub use progress::{ProgressPhase, ProgressSettings, ProgressSimulator};
pub use session::{AttemptOutcome, CompletionHandler, IngestionSession, UploadError, UploadState};
pub use validator::{ImageValidator, ValidationError};
