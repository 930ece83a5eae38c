/// Submission assembly: drain pending panel images to durable storage, then
/// flip the draft row to submitted in a single persistence call.
///
/// Uploads fan out concurrently, one per pending panel. Promotion is
/// all-or-nothing: panel image sources switch from pending bytes to durable
/// URLs only after every upload has succeeded, so a partial failure leaves
/// the document (and its draft row) exactly as it was and the customer can
/// retry the whole submission.
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use comic::Document;
use storage::BlobStorage;

use crate::{DraftPersistence, Result, Uploader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Editing,
    Uploading,
    Finalizing,
    Submitted,
    Failed,
}

pub struct SubmissionAssembler {
    blob: Arc<dyn BlobStorage>,
    uploader: Uploader,
    phase: SubmitPhase,
}

impl SubmissionAssembler {
    pub fn new(blob: Arc<dyn BlobStorage>) -> Self {
        Self {
            blob,
            uploader: Uploader::new(),
            phase: SubmitPhase::Editing,
        }
    }

    /// Swap the retry schedule (tests use a zero backoff).
    pub fn with_uploader(mut self, uploader: Uploader) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Run the full assembly: upload every pending panel image, promote the
    /// panels to their durable URLs, and finalize the record as submitted.
    /// Returns the submitted record's id.
    pub async fn submit(
        &mut self,
        document: &mut Document,
        customer_id: &str,
        engine: &mut DraftPersistence,
    ) -> Result<String> {
        self.phase = SubmitPhase::Uploading;

        let pending: Vec<(String, comic::PendingImage)> = document
            .pending_panels()
            .into_iter()
            .map(|(id, image)| (id.to_string(), image.clone()))
            .collect();
        info!(customer_id, count = pending.len(), "uploading panel images");

        let uploads = pending.iter().map(|(panel_id, image)| {
            let blob = self.blob.as_ref();
            let uploader = &self.uploader;
            async move {
                let url = uploader
                    .upload_pending(blob, customer_id, panel_id, image)
                    .await?;
                Ok::<_, crate::SubmissionError>((panel_id.clone(), url))
            }
        });

        let results = join_all(uploads).await;

        let mut promoted = Vec::with_capacity(pending.len());
        for result in results {
            match result {
                Ok(pair) => promoted.push(pair),
                Err(err) => {
                    warn!(customer_id, %err, "submission aborted; draft unchanged");
                    self.phase = SubmitPhase::Failed;
                    return Err(err);
                }
            }
        }

        for (panel_id, url) in promoted {
            document.promote_panel_image(&panel_id, &url)?;
        }

        self.phase = SubmitPhase::Finalizing;
        let record_id = match engine.finalize(customer_id, document).await {
            Ok(id) => id,
            Err(err) => {
                self.phase = SubmitPhase::Failed;
                return Err(err);
            }
        };

        self.phase = SubmitPhase::Submitted;
        info!(customer_id, record_id, "submission finalized");
        Ok(record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storage::MemoryStore;

    use crate::{render_panel_image, CropParams};

    fn sample_png() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(16, 16);
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn fast_assembler(store: Arc<MemoryStore>) -> SubmissionAssembler {
        SubmissionAssembler::new(store)
            .with_uploader(Uploader::new().with_retry(2, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_submit_promotes_and_finalizes() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = DraftPersistence::new(store.clone());
        let mut assembler = fast_assembler(store.clone());

        let mut doc = Document::from_template();
        doc.set_panel_content(0, "title", "Birthday").unwrap();
        let raw = sample_png();
        let cover = render_panel_image(&raw, "coverImage", CropParams::default()).unwrap();
        doc.set_panel_image(0, "coverImage", cover).unwrap();
        let image1 = render_panel_image(&raw, "image1", CropParams::default()).unwrap();
        doc.set_panel_image(2, "image1", image1).unwrap();

        let record_id = assembler
            .submit(&mut doc, "9876543210", &mut engine)
            .await
            .unwrap();

        assert_eq!(assembler.phase(), SubmitPhase::Submitted);
        assert!(doc.pending_panels().is_empty());
        assert_eq!(store.blob_count(), 2);

        let record = store.get_submission(&record_id).unwrap();
        assert_eq!(record.status, comic::SubmissionStatus::Submitted);
        assert_eq!(record.images.len(), 2);
        assert!(record.images.iter().all(|i| i.url.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_partial_upload_failure_leaves_draft_intact() {
        let store = Arc::new(MemoryStore::new());
        store.fail_uploads_containing("image2");
        let mut engine = DraftPersistence::new(store.clone());
        let mut assembler = fast_assembler(store.clone());

        let mut doc = Document::from_template();
        doc.set_panel_content(0, "title", "Birthday").unwrap();
        let raw = sample_png();
        for (page, panel) in [(2usize, "image1"), (2, "image2")] {
            let pending = render_panel_image(&raw, panel, CropParams::default()).unwrap();
            doc.set_panel_image(page, panel, pending).unwrap();
        }
        engine.persist("9876543210", &doc).await.unwrap();
        let snapshot = doc.clone();

        let err = assembler
            .submit(&mut doc, "9876543210", &mut engine)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::SubmissionError::UploadFailed { .. }
        ));
        assert_eq!(assembler.phase(), SubmitPhase::Failed);
        // No panel was promoted, even the one whose upload succeeded.
        assert_eq!(doc.pending_panels().len(), snapshot.pending_panels().len());

        let record = store.get_submission(engine.record_id().unwrap()).unwrap();
        assert_eq!(record.status, comic::SubmissionStatus::Draft);
    }

    #[tokio::test]
    async fn test_submit_without_images_still_finalizes() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = DraftPersistence::new(store.clone());
        let mut assembler = fast_assembler(store.clone());

        let mut doc = Document::from_template();
        doc.set_panel_content(0, "title", "Text only").unwrap();

        let record_id = assembler
            .submit(&mut doc, "9876543210", &mut engine)
            .await
            .unwrap();

        assert_eq!(store.blob_count(), 0);
        let record = store.get_submission(&record_id).unwrap();
        assert_eq!(record.status, comic::SubmissionStatus::Submitted);
        assert!(record.images.is_empty());
    }
}
