/// End-to-end flow over the in-memory store: open a link, edit, autosave,
/// submit, and confirm record identity is preserved throughout.
use std::io::Cursor;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use comic::SubmissionStatus;
use storage::{MemoryStore, SubmissionStore};
use submission::{CropParams, EditorSession, SubmissionError, SubmitPhase, Uploader};

fn sample_png() -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(32, 32);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

async fn open_session(store: &Arc<MemoryStore>) -> EditorSession {
    EditorSession::start(store.clone(), store.clone(), "9876543210")
        .await
        .unwrap()
        .with_uploader(Uploader::new().with_retry(2, Duration::ZERO))
}

#[tokio::test]
async fn test_full_draft_to_submission_flow() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("9876543210", Some("Mina"));
    let mut session = open_session(&store).await;

    // Fresh code: 12-page template, nothing stored yet.
    assert_eq!(session.document().pages.len(), 12);
    assert_eq!(store.submission_count(), 0);

    session
        .set_panel_content(0, "title", "Birthday")
        .await
        .unwrap();
    session
        .attach_panel_image(0, "coverImage", &sample_png(), CropParams::default())
        .await
        .unwrap();

    // Both edits landed in one draft row; the image is listed but its bytes
    // are still local.
    assert_eq!(store.submission_count(), 1);
    let draft = store
        .find_latest_submission("9876543210")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(draft.status, SubmissionStatus::Draft);
    assert_eq!(draft.title, "Birthday");
    assert_eq!(draft.images.len(), 1);
    assert_eq!(store.blob_count(), 0);

    let record_id = session.submit(true).await.unwrap();

    // Same row, now submitted, with the image uploaded and durable.
    assert_eq!(record_id, draft.id);
    assert_eq!(session.phase(), SubmitPhase::Submitted);
    assert_eq!(store.submission_count(), 1);
    assert_eq!(store.blob_count(), 1);
    let submitted = store.get_submission(&record_id).unwrap();
    assert_eq!(submitted.status, SubmissionStatus::Submitted);
    assert!(submitted.images[0].url.contains("/comic-images/9876543210/"));
    assert!(session.document().pending_panels().is_empty());
}

#[tokio::test]
async fn test_failed_submit_is_retryable() {
    let store = Arc::new(MemoryStore::new());
    store.add_customer("9876543210", None);
    let mut session = open_session(&store).await;

    let raw = sample_png();
    session
        .attach_panel_image(0, "coverImage", &raw, CropParams::default())
        .await
        .unwrap();
    session
        .attach_panel_image(2, "image2", &raw, CropParams::default())
        .await
        .unwrap();

    store.fail_uploads_containing("image2");
    let err = session.submit(true).await.unwrap_err();
    assert!(matches!(err, SubmissionError::UploadFailed { .. }));
    assert_eq!(session.phase(), SubmitPhase::Failed);

    // The draft row is untouched and every panel still holds its bytes.
    let record = store
        .find_latest_submission("9876543210")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, SubmissionStatus::Draft);
    assert_eq!(session.document().pending_panels().len(), 2);

    // Retrying after the outage succeeds against the same row.
    store.clear_upload_failures();
    let record_id = session.submit(true).await.unwrap();
    assert_eq!(record_id, record.id);
    assert_eq!(
        store.get_submission(&record_id).unwrap().status,
        SubmissionStatus::Submitted
    );
    assert_eq!(store.insert_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_code_never_touches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let err = EditorSession::start(store.clone(), store.clone(), "0000000000")
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::InvalidCode(_)));
    assert_eq!(store.submission_count(), 0);
    assert_eq!(store.insert_count.load(Ordering::SeqCst), 0);
}
