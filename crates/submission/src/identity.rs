/// Session identity: the shared link's unique code is the customer's only
/// credential. Submission rows are keyed by that same code, so one lookup
/// chain resolves the customer, their latest row, and the rehydrated
/// document in one pass.
use std::sync::Arc;

use tracing::{debug, info};

use comic::{Customer, Document, SubmissionRecord};
use storage::SubmissionStore;

use crate::{Result, SubmissionError};

/// Everything a fresh editing session starts from.
#[derive(Debug)]
pub struct ResolvedSession {
    pub customer: Customer,
    pub document: Document,
    /// The latest stored row for this customer, if any. Its id is adopted by
    /// draft persistence so later saves update in place.
    pub record: Option<SubmissionRecord>,
}

pub struct IdentityResolver {
    store: Arc<dyn SubmissionStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    /// Resolve a link code to a started session. An unknown code is terminal:
    /// there is no account creation path from the editor.
    pub async fn resolve(&self, code: &str) -> Result<ResolvedSession> {
        let customer = self
            .store
            .find_customer_by_code(code)
            .await?
            .ok_or_else(|| SubmissionError::InvalidCode(code.to_string()))?;

        let record = self.store.find_latest_submission(code).await?;

        let mut document = Document::from_template();
        match &record {
            Some(record) => {
                info!(code, record_id = %record.id, "resuming prior submission state");
                document.rehydrate(record);
            }
            None => debug!(code, "no prior submission; starting from template"),
        }

        Ok(ResolvedSession {
            customer,
            document,
            record,
        })
    }
}
