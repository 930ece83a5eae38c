/// In-memory store and blob storage for tests and prototyping.
///
/// Counts inserts, updates, and upload attempts so tests can assert the
/// persistence engine's record-identity behavior, and can be told to fail
/// uploads for paths containing a needle to drive failure-path tests.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use comic::{
    Customer, ImageRef, NewCustomer, NewSubmission, RecordFields, SubmissionRecord,
    SubmissionStatus,
};

use crate::{BlobStorage, Result, StorageError, SubmissionStore};

#[derive(Default)]
pub struct MemoryStore {
    customers: Mutex<Vec<Customer>>,
    submissions: Mutex<Vec<SubmissionRecord>>,
    blobs: Mutex<HashMap<String, Vec<u8>>>,

    pub insert_count: AtomicU64,
    pub update_count: AtomicU64,
    pub upload_attempts: AtomicU64,

    /// Uploads whose path contains this needle fail on every attempt.
    fail_uploads_containing: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer row, returning it as the store would.
    pub fn add_customer(&self, unique_code: &str, name: Option<&str>) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            unique_code: unique_code.to_string(),
            email: None,
            name: name.map(str::to_string),
            created_at: Utc::now().to_rfc3339(),
        };
        self.customers.lock().unwrap().push(customer.clone());
        customer
    }

    pub fn fail_uploads_containing(&self, needle: &str) {
        *self.fail_uploads_containing.lock().unwrap() = Some(needle.to_string());
    }

    pub fn clear_upload_failures(&self) {
        *self.fail_uploads_containing.lock().unwrap() = None;
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn get_submission(&self, id: &str) -> Option<SubmissionRecord> {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    fn apply<F>(&self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut SubmissionRecord),
    {
        let mut rows = self.submissions.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        f(row);
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn find_customer_by_code(&self, unique_code: &str) -> Result<Option<Customer>> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.unique_code == unique_code)
            .cloned())
    }

    async fn find_latest_submission(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubmissionRecord>> {
        let rows = self.submissions.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|s| s.customer_id == customer_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
            .cloned())
    }

    async fn insert_submission(&self, submission: NewSubmission) -> Result<SubmissionRecord> {
        self.insert_count.fetch_add(1, Ordering::SeqCst);
        let record = SubmissionRecord {
            id: Uuid::new_v4().to_string(),
            customer_id: submission.customer_id,
            title: submission.title,
            description: submission.description,
            date: submission.date,
            images: submission.images,
            status: submission.status,
            created_at: Utc::now().to_rfc3339(),
        };
        self.submissions.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_submission(
        &self,
        id: &str,
        fields: RecordFields,
        status: SubmissionStatus,
    ) -> Result<()> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.apply(id, |row| {
            row.title = fields.title;
            row.description = fields.description;
            row.date = fields.date;
            row.images = fields.images;
            row.status = status;
        })
    }

    async fn update_status(&self, id: &str, status: SubmissionStatus) -> Result<()> {
        self.apply(id, |row| row.status = status)
    }

    async fn update_images(&self, id: &str, images: Vec<ImageRef>) -> Result<()> {
        self.apply(id, |row| row.images = images)
    }

    async fn delete_submission(&self, id: &str) -> Result<()> {
        let mut rows = self.submissions.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        if rows.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let record = Customer {
            id: Uuid::new_v4().to_string(),
            unique_code: customer.unique_code,
            email: customer.email,
            name: customer.name,
            created_at: Utc::now().to_rfc3339(),
        };
        self.customers.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl BlobStorage for MemoryStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        let needle = self.fail_uploads_containing.lock().unwrap().clone();
        if let Some(needle) = needle {
            if path.contains(&needle) {
                return Err(StorageError::Rejected {
                    status: 503,
                    body: format!("injected upload failure for {}", path),
                });
            }
        }
        self.blobs.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/comic-images/{}", path)
    }
}
