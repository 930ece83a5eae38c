/// Draft persistence engine: one remote row per customer, updated in place.
///
/// The first successful insert captures the store-assigned record id; every
/// later save updates that same row, so repeated autosaves can never create
/// duplicate records. Payloads carry the document's monotonic revision and a
/// payload older than one already issued is dropped before any network call,
/// so an event-loop callback replaying an older snapshot cannot clobber newer
/// content.
use std::sync::Arc;

use tracing::{debug, warn};

use comic::{Document, NewSubmission, SubmissionStatus};
use storage::SubmissionStore;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// First save of the session inserted a fresh row.
    Inserted(String),
    /// The session's existing row was updated in place.
    Updated,
    /// The payload's revision was not newer than one already issued; nothing
    /// was sent.
    Stale,
}

pub struct DraftPersistence {
    store: Arc<dyn SubmissionStore>,
    record_id: Option<String>,
    highest_issued: Option<u64>,
}

impl DraftPersistence {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self {
            store,
            record_id: None,
            highest_issued: None,
        }
    }

    /// Continue an existing row (a prior draft or submission was found at
    /// session start) instead of inserting a new one on first save.
    pub fn adopt_record(&mut self, record_id: &str) {
        self.record_id = Some(record_id.to_string());
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Persist the document as a draft. Projects every field in full; last
    /// write wins at the store.
    pub async fn persist(
        &mut self,
        customer_id: &str,
        document: &Document,
    ) -> Result<PersistOutcome> {
        let revision = document.revision;
        if let Some(highest) = self.highest_issued {
            if revision <= highest {
                debug!(revision, highest, "dropping stale draft payload");
                return Ok(PersistOutcome::Stale);
            }
        }
        self.highest_issued = Some(revision);

        let fields = document.to_record_fields()?;
        match &self.record_id {
            Some(id) => {
                self.store
                    .update_submission(id, fields, SubmissionStatus::Draft)
                    .await?;
                Ok(PersistOutcome::Updated)
            }
            None => {
                let record = self
                    .store
                    .insert_submission(NewSubmission::from_fields(
                        customer_id,
                        fields,
                        SubmissionStatus::Draft,
                    ))
                    .await?;
                self.record_id = Some(record.id.clone());
                Ok(PersistOutcome::Inserted(record.id))
            }
        }
    }

    /// Autosave wrapper: store failures are logged and swallowed. The local
    /// document remains the source of truth and editing is never blocked.
    pub async fn autosave(&mut self, customer_id: &str, document: &Document) {
        if let Err(err) = self.persist(customer_id, document).await {
            warn!(customer_id, %err, "draft autosave failed; keeping local state");
        }
    }

    /// The single persistence call of submission assembly: flip the row to
    /// submitted. Updates by captured id; inserts only when the session never
    /// produced a draft row (so an existing draft is never orphaned by a
    /// second insert).
    pub async fn finalize(&mut self, customer_id: &str, document: &Document) -> Result<String> {
        let fields = document.to_record_fields()?;
        self.highest_issued = Some(document.revision);

        match &self.record_id {
            Some(id) => {
                self.store
                    .update_submission(id, fields, SubmissionStatus::Submitted)
                    .await?;
                Ok(id.clone())
            }
            None => {
                let record = self
                    .store
                    .insert_submission(NewSubmission::from_fields(
                        customer_id,
                        fields,
                        SubmissionStatus::Submitted,
                    ))
                    .await?;
                self.record_id = Some(record.id.clone());
                Ok(record.id)
            }
        }
    }
}
