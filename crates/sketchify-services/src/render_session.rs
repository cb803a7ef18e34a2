//! Render session for one project view.
//!
//! Generation runs at most once automatically; an initial render supplied by
//! the caller is adopted instead. After a failure the current image is kept
//! and the user-facing message is stored until the next attempt.

use sketchify_core::{log_error, AppError, ErrorMetadata};

use crate::render::{RenderRequest, RenderRequester};

pub struct RenderSession {
    requester: RenderRequester,
    source_image: Option<String>,
    initial_render: Option<String>,
    current_image: Option<String>,
    is_processing: bool,
    error: Option<String>,
    started: bool,
}

impl RenderSession {
    pub fn new(
        requester: RenderRequester,
        source_image: Option<String>,
        initial_render: Option<String>,
    ) -> Self {
        Self {
            requester,
            source_image,
            current_image: initial_render.clone(),
            initial_render,
            is_processing: false,
            error: None,
            started: false,
        }
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// First generation. Later calls are no-ops; use [`RenderSession::retry`].
    pub async fn start(&mut self) {
        if self.started || self.source_image.is_none() {
            return;
        }
        self.started = true;

        if let Some(initial) = self.initial_render.clone() {
            tracing::debug!("Adopting initial render");
            self.current_image = Some(initial);
            return;
        }

        self.run_generation().await;
    }

    /// Re-run generation for the same source.
    pub async fn retry(&mut self) {
        self.started = true;
        self.run_generation().await;
    }

    async fn run_generation(&mut self) {
        let Some(source) = self.source_image.clone() else {
            return;
        };

        self.error = None;
        self.is_processing = true;
        let result = self
            .requester
            .generate_render(&RenderRequest::new(source))
            .await;
        self.is_processing = false;

        match result {
            Ok(output) => {
                if !output.rendered_image.is_empty() {
                    self.current_image = Some(output.rendered_image);
                }
            }
            Err(e) => {
                let err = AppError::from(e);
                log_error(&err, "Generation failed");
                self.error = Some(err.client_message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchify_core::InlineImage;

    fn requester() -> RenderRequester {
        RenderRequester::new(reqwest::Client::new())
    }

    #[tokio::test]
    async fn start_runs_once_for_inline_source() {
        let inline = InlineImage::from_bytes("image/png", b"a").into_string();
        let mut session = RenderSession::new(requester(), Some(inline.clone()), None);

        session.start().await;
        assert_eq!(session.current_image(), Some(inline.as_str()));
        assert!(session.error().is_none());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn initial_render_is_adopted_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let mut session = RenderSession::new(
            requester(),
            Some(format!("{}/source.png", server.url())),
            Some("https://cdn.example.com/rendered.png".to_string()),
        );
        session.start().await;
        session.start().await;

        mock.assert_async().await;
        assert_eq!(
            session.current_image(),
            Some("https://cdn.example.com/rendered.png")
        );
    }

    #[tokio::test]
    async fn failure_keeps_image_and_retry_recovers() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("GET", "/plan.png")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let mut session =
            RenderSession::new(requester(), Some(format!("{}/plan.png", server.url())), None);
        session.start().await;

        failing.assert_async().await;
        assert_eq!(session.current_image(), None);
        assert_eq!(session.error(), Some("Failed to fetch image: 503"));

        // A second start does not issue another request.
        session.start().await;
        failing.assert_async().await;

        failing.remove_async().await;
        let _ok = server
            .mock("GET", "/plan.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"png".to_vec())
            .create_async()
            .await;

        session.retry().await;
        assert!(session.error().is_none());
        assert_eq!(
            session.current_image(),
            Some(InlineImage::from_bytes("image/png", b"png").as_str())
        );
    }

    #[tokio::test]
    async fn missing_source_does_nothing() {
        let mut session = RenderSession::new(requester(), None, None);
        session.start().await;
        session.retry().await;
        assert!(session.current_image().is_none());
        assert!(session.error().is_none());
    }
}
