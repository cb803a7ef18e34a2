//! Ingestion session: validate, encode, simulate progress, hand off.
//!
//! The session owns the observable upload state for as long as the caller
//! keeps it open. Every input handler checks the sign-in predicate first, so
//! programmatic events are blocked exactly like user events. A newer file
//! supersedes any attempt still in flight; results of superseded attempts
//! are discarded before they touch the state.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use sketchify_core::{AppError, IdentityProvider, InlineImage};
use tokio::sync::watch;

use crate::encoder::encode;
use crate::file::CandidateFile;
use crate::progress::{ProgressSettings, ProgressSimulator};
use crate::validator::{ImageValidator, ValidationError};

/// Invoked once per successful attempt with the encoded image. The session
/// does not wait on anything the handler starts.
pub type CompletionHandler = Arc<dyn Fn(InlineImage) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("Failed to read the file. Please try again.")]
    ReadFailed,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(e) => e.into(),
            UploadError::ReadFailed => AppError::ReadError("file read failed".to_string()),
        }
    }
}

/// Snapshot of the observable session state.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub selected_file: Option<CandidateFile>,
    pub dragging: bool,
    pub progress: u8,
    pub error: Option<UploadError>,
}

/// What happened to one file handed to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Signed out, or the session is closed.
    Ignored,
    Rejected(ValidationError),
    ReadFailed,
    /// A newer file arrived while this one was being encoded.
    Superseded,
    /// Encoded; progress is running and completion will follow.
    Started,
}

#[derive(Debug, Default)]
struct SessionState {
    selected_file: Option<CandidateFile>,
    dragging: bool,
    error: Option<UploadError>,
    attempt: u64,
    closed: bool,
}

struct SessionInner {
    identity: Arc<dyn IdentityProvider>,
    validator: ImageValidator,
    simulator: ProgressSimulator,
    on_complete: CompletionHandler,
    state: Mutex<SessionState>,
}

impl SessionInner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cloneable handle to one upload session.
#[derive(Clone)]
pub struct IngestionSession {
    inner: Arc<SessionInner>,
}

impl IngestionSession {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        validator: ImageValidator,
        settings: ProgressSettings,
        on_complete: CompletionHandler,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                identity,
                validator,
                simulator: ProgressSimulator::new(settings),
                on_complete,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn state(&self) -> UploadState {
        let state = self.inner.state();
        UploadState {
            selected_file: state.selected_file.clone(),
            dragging: state.dragging,
            progress: self.inner.simulator.progress(),
            error: state.error.clone(),
        }
    }

    /// Progress updates for display.
    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.inner.simulator.subscribe()
    }

    pub fn on_drag_enter(&self) {
        self.set_dragging(true);
    }

    pub fn on_drag_over(&self) {
        self.set_dragging(true);
    }

    pub fn on_drag_leave(&self) {
        self.set_dragging(false);
    }

    pub async fn on_pick(&self, file: CandidateFile) -> AttemptOutcome {
        self.ingest(file, "pick").await
    }

    pub async fn on_drop(&self, file: CandidateFile) -> AttemptOutcome {
        self.ingest(file, "drop").await
    }

    /// End the session. Pending completions are cancelled and further input
    /// is ignored.
    pub fn close(&self) {
        {
            let mut state = self.inner.state();
            state.closed = true;
            state.dragging = false;
        }
        self.inner.simulator.cancel();
        tracing::debug!("Ingestion session closed");
    }

    fn is_open_for_input(&self) -> bool {
        self.inner.identity.is_signed_in() && !self.inner.state().closed
    }

    fn set_dragging(&self, dragging: bool) {
        if !self.is_open_for_input() {
            return;
        }
        self.inner.state().dragging = dragging;
    }

    fn begin_attempt(&self) -> u64 {
        let mut state = self.inner.state();
        state.attempt += 1;
        state.attempt
    }

    /// Select `file` for `attempt` unless a newer attempt has started or the
    /// session is closed.
    fn mark_selected(&self, attempt: u64, file: &CandidateFile) -> bool {
        let mut state = self.inner.state();
        if state.attempt != attempt || state.closed {
            return false;
        }
        state.selected_file = Some(file.clone());
        state.dragging = false;
        state.error = None;
        true
    }

    async fn ingest(&self, file: CandidateFile, source: &'static str) -> AttemptOutcome {
        if !self.is_open_for_input() {
            tracing::debug!(source, file = %file.name, "Ignoring file: not signed in or session closed");
            return AttemptOutcome::Ignored;
        }

        let attempt = self.begin_attempt();
        self.inner.simulator.reset();

        if let Err(e) = self.inner.validator.validate(&file) {
            tracing::debug!(
                source,
                file = %file.name,
                content_type = %file.content_type,
                size_bytes = file.size,
                error = %e,
                "File rejected"
            );
            let mut state = self.inner.state();
            if state.attempt == attempt {
                state.selected_file = None;
                state.dragging = false;
                state.error = Some(UploadError::Rejected(e.clone()));
            }
            return AttemptOutcome::Rejected(e);
        }

        if !self.mark_selected(attempt, &file) {
            tracing::debug!(source, file = %file.name, attempt, "Discarding superseded attempt");
            return AttemptOutcome::Superseded;
        }

        let encoded = encode(&file).await;

        let mut state = self.inner.state();
        if state.attempt != attempt || state.closed {
            tracing::debug!(source, file = %file.name, attempt, "Discarding superseded attempt");
            return AttemptOutcome::Superseded;
        }

        match encoded {
            Ok(image) => {
                tracing::info!(
                    source,
                    file = %file.name,
                    size_bytes = file.size,
                    attempt,
                    "File accepted and encoded"
                );
                let on_complete = Arc::clone(&self.inner.on_complete);
                let session = Arc::downgrade(&self.inner);
                self.inner
                    .simulator
                    .start(move || deliver(session, attempt, on_complete, image));
                AttemptOutcome::Started
            }
            Err(e) => {
                tracing::warn!(source, file = %file.name, error = %e, "Failed to read file");
                state.selected_file = None;
                state.dragging = false;
                state.error = Some(UploadError::ReadFailed);
                AttemptOutcome::ReadFailed
            }
        }
    }
}

fn deliver(
    session: Weak<SessionInner>,
    attempt: u64,
    on_complete: CompletionHandler,
    image: InlineImage,
) {
    let Some(inner) = session.upgrade() else {
        return;
    };
    {
        let state = inner.state();
        if state.closed || state.attempt != attempt {
            return;
        }
    }
    on_complete(image);
}
