/// One customer's editing session, from link open to confirmed submission.
///
/// The session owns the document exclusively and is the only writer of the
/// customer's remote row. Every edit applies locally first and then
/// autosaves; a save failure is logged and absorbed so editing never blocks
/// on the network.
use std::sync::Arc;

use comic::{Customer, Document};
use storage::{BlobStorage, SubmissionStore};

use crate::{
    render_panel_image, CropParams, DraftPersistence, IdentityResolver, Result, SubmissionAssembler,
    SubmissionError, SubmitPhase, Uploader,
};

pub struct EditorSession {
    customer: Customer,
    document: Document,
    persistence: DraftPersistence,
    assembler: SubmissionAssembler,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("customer", &self.customer)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Open a session for a link code: resolve the customer, rehydrate their
    /// latest stored row onto a fresh template, and bind persistence to that
    /// row so the first autosave updates it instead of inserting a twin.
    pub async fn start(
        store: Arc<dyn SubmissionStore>,
        blob: Arc<dyn BlobStorage>,
        code: &str,
    ) -> Result<Self> {
        let resolved = IdentityResolver::new(store.clone()).resolve(code).await?;

        let mut persistence = DraftPersistence::new(store);
        if let Some(record) = &resolved.record {
            persistence.adopt_record(&record.id);
        }

        Ok(Self {
            customer: resolved.customer,
            document: resolved.document,
            persistence,
            assembler: SubmissionAssembler::new(blob),
        })
    }

    /// Swap the upload retry schedule (tests use a zero backoff).
    pub fn with_uploader(mut self, uploader: Uploader) -> Self {
        self.assembler = self.assembler.with_uploader(uploader);
        self
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn phase(&self) -> SubmitPhase {
        self.assembler.phase()
    }

    pub async fn set_panel_content(
        &mut self,
        page_index: usize,
        panel_id: &str,
        value: &str,
    ) -> Result<()> {
        self.document.set_panel_content(page_index, panel_id, value)?;
        self.autosave().await;
        Ok(())
    }

    pub async fn set_date_part(
        &mut self,
        page_index: usize,
        panel_id: &str,
        day: Option<&str>,
        month: Option<&str>,
    ) -> Result<()> {
        self.document
            .set_date_part(page_index, panel_id, day, month)?;
        self.autosave().await;
        Ok(())
    }

    /// Render a picked file into a panel image and install it. The rendered
    /// blob stays local until submission; only the draft's image listing is
    /// saved now.
    pub async fn attach_panel_image(
        &mut self,
        page_index: usize,
        panel_id: &str,
        raw: &[u8],
        params: CropParams,
    ) -> Result<()> {
        let pending = render_panel_image(raw, panel_id, params)?;
        self.document.set_panel_image(page_index, panel_id, pending)?;
        self.autosave().await;
        Ok(())
    }

    async fn autosave(&mut self) {
        self.persistence
            .autosave(&self.customer.unique_code, &self.document)
            .await;
    }

    /// Finalize the submission. Requires the customer's explicit
    /// confirmation; a failed attempt leaves the draft intact and the session
    /// editable for a retry.
    pub async fn submit(&mut self, confirmed: bool) -> Result<String> {
        if !confirmed {
            return Err(SubmissionError::NotConfirmed);
        }
        self.assembler
            .submit(
                &mut self.document,
                &self.customer.unique_code,
                &mut self.persistence,
            )
            .await
    }
}
