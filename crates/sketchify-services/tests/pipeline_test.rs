//! End-to-end pipeline tests: ingestion, rendering and persistence against
//! the local filesystem backends.
//!
//! Run with: `cargo test -p sketchify-services --test pipeline_test`

mod helpers;

use std::time::Duration;

use helpers::{png_bytes, session_with_channel, TestStorage};
use sketchify_core::{AppError, DesignItem, ErrorMetadata, InlineImage, LocalIdentity};
use sketchify_services::{
    create_kv_store, load_project, AttemptOutcome, CandidateFile, FlowError, ProjectFlow,
    RenderError, RenderRequest, RenderRequester,
};

#[tokio::test(start_paused = true)]
async fn test_drop_png_then_create_project() {
    let storage = TestStorage::new();
    let (session, mut completions) = session_with_channel(LocalIdentity::signed_in("ada"));
    let mut progress = session.subscribe_progress();

    let data = png_bytes(2 * 1024 * 1024);
    let file = CandidateFile::from_bytes("floor-plan.png", "image/png", data.clone());

    session.on_drag_enter();
    assert_eq!(session.on_drop(file).await, AttemptOutcome::Started);

    let image = completions.recv().await.expect("completion delivered");
    assert_eq!(*progress.borrow_and_update(), 100);
    assert_eq!(image, InlineImage::from_bytes("image/png", &data));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(completions.try_recv().is_err(), "exactly one completion");
    session.close();

    tokio::time::resume();

    let config = storage.config();
    let flow = ProjectFlow::from_config(&config).await.unwrap();
    let record = flow
        .complete_upload(&image, Some("Floor plan"))
        .await
        .unwrap();

    let id = record.id.clone().unwrap();
    let source = record.source_image.clone().unwrap();
    assert_eq!(
        source,
        format!("{}/projects/{}/source.png", storage.base_url, id)
    );
    assert!(storage
        .hosting_path()
        .join(format!("projects/{}/source.png", id))
        .exists());
    assert_eq!(
        std::fs::read(storage.hosting_path().join(format!("projects/{}/rendered.png", id)))
            .unwrap(),
        data
    );

    let kv = create_kv_store(&config).await.unwrap();
    let stored = load_project(kv.as_ref(), &id).await.unwrap();
    assert_eq!(stored, Some(record));
}

#[tokio::test]
async fn test_hosting_config_is_reused_across_projects() {
    let storage = TestStorage::new();
    let config = storage.config();
    let flow = ProjectFlow::from_config(&config).await.unwrap();
    let image = InlineImage::from_bytes("image/jpeg", b"jpeg-bytes");

    let first = flow.complete_upload(&image, None).await.unwrap();
    let second = flow.complete_upload(&image, None).await.unwrap();

    assert_ne!(first.id, second.id);
    let hosting_file = std::fs::read_to_string(storage.hosting_path().join("hosting.json")).unwrap();
    assert!(hosting_file.contains(&storage.base_url));
    assert!(first
        .source_image
        .unwrap()
        .ends_with(&format!("{}/source.jpg", first.id.unwrap())));
}

#[tokio::test]
async fn test_remote_render_failure_then_retry() {
    let mut server = mockito::Server::new_async().await;
    let _missing = server
        .mock("GET", "/plans/missing.png")
        .with_status(404)
        .create_async()
        .await;
    let _plan = server
        .mock("GET", "/plans/plan.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes(64))
        .create_async()
        .await;

    let requester = RenderRequester::new(reqwest::Client::new());

    let err = requester
        .generate_render(&RenderRequest::new(format!(
            "{}/plans/missing.png",
            server.url()
        )))
        .await
        .unwrap_err();
    assert!(matches!(err, RenderError::Fetch { status: 404, .. }));

    let flow_err = AppError::from(FlowError::from(err));
    assert_eq!(flow_err.error_code(), "FETCH_ERROR");
    assert_eq!(flow_err.suggested_action(), Some("Retry the render"));

    let output = requester
        .generate_render(&RenderRequest::new(format!("{}/plans/plan.png", server.url())))
        .await
        .unwrap();
    assert_eq!(
        output.rendered_image,
        InlineImage::from_bytes("image/png", &png_bytes(64)).into_string()
    );
}

#[tokio::test]
async fn test_draft_with_remote_source_is_hosted_locally() {
    let mut server = mockito::Server::new_async().await;
    let _plan = server
        .mock("GET", "/plan.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(b"remote-jpeg".to_vec())
        .create_async()
        .await;

    let storage = TestStorage::new();
    let config = storage.config();
    let flow = ProjectFlow::from_config(&config).await.unwrap();

    let draft = DesignItem::draft("remote-1", format!("{}/plan.jpg", server.url()));
    let record = flow.persister().create_project(&draft).await.unwrap();

    assert_eq!(
        record.source_image.as_deref(),
        Some(format!("{}/projects/remote-1/source.jpg", storage.base_url).as_str())
    );
    assert_eq!(
        std::fs::read(storage.hosting_path().join("projects/remote-1/source.jpg")).unwrap(),
        b"remote-jpeg"
    );
}

#[tokio::test]
async fn test_signed_out_session_never_completes() {
    let (session, mut completions) = session_with_channel(LocalIdentity::anonymous());
    let file = CandidateFile::from_bytes("a.png", "image/png", png_bytes(16));

    assert_eq!(session.on_pick(file).await, AttemptOutcome::Ignored);
    drop(session);
    assert!(completions.recv().await.is_none());
}
