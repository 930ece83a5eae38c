/// Row-level query surface over the `customers` and `submissions` tables.
use async_trait::async_trait;

use comic::{Customer, ImageRef, NewCustomer, NewSubmission, RecordFields, SubmissionRecord,
    SubmissionStatus};

use crate::Result;

/// The table-storage collaborator. Injected into the persistence engine,
/// submission assembler, and identity resolver at startup with process
/// lifetime, so the core stays testable against a fake.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Validate a customer code. `Ok(None)` means the code is unknown.
    async fn find_customer_by_code(&self, unique_code: &str) -> Result<Option<Customer>>;

    /// The most recent draft/submission row for a customer, if any. "Most
    /// recent" resolves which record a session continues when more than one
    /// exists.
    async fn find_latest_submission(&self, customer_id: &str)
        -> Result<Option<SubmissionRecord>>;

    /// Insert a fresh row and return it with its store-assigned id.
    async fn insert_submission(&self, submission: NewSubmission) -> Result<SubmissionRecord>;

    /// Full-row update by id; every field is re-sent, last write wins.
    async fn update_submission(
        &self,
        id: &str,
        fields: RecordFields,
        status: SubmissionStatus,
    ) -> Result<()>;

    /// Raw status flip, used by the admin side to advance processing state.
    async fn update_status(&self, id: &str, status: SubmissionStatus) -> Result<()>;

    /// Replace the image array in place (admin-side image removal).
    async fn update_images(&self, id: &str, images: Vec<ImageRef>) -> Result<()>;

    async fn delete_submission(&self, id: &str) -> Result<()>;

    /// Admin-side customer creation. The customer session never calls this.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer>;
}
