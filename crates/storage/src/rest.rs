/// HTTP implementation of the store and blob surfaces against a Supabase
/// project (PostgREST for rows, the storage API for image bytes).
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use tracing::debug;

use comic::{
    Customer, ImageRef, NewCustomer, NewSubmission, RecordFields, SubmissionRecord,
    SubmissionStatus,
};

use crate::{BlobStorage, Result, StorageError, StoreConfig, SubmissionStore};

const IMAGE_BUCKET: &str = "comic-images";

pub struct SupabaseStore {
    endpoint: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.access_key)
            .map_err(|_| StorageError::MissingConfig("access key is not a valid header value"))?;
        headers.insert("apikey", key.clone());
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_key))
            .map_err(|_| StorageError::MissingConfig("access key is not a valid header value"))?;
        headers.insert("Authorization", bearer);
        headers.insert("x-client-info", HeaderValue::from_static("kpopcomics-client"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            endpoint: config.endpoint,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn patch_submission(&self, id: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .patch(self.table_url("submissions"))
            .query(&[("id", format!("eq.{}", id))])
            .json(&body)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for SupabaseStore {
    async fn find_customer_by_code(&self, unique_code: &str) -> Result<Option<Customer>> {
        let response = self
            .client
            .get(self.table_url("customers"))
            .query(&[
                ("select", "*"),
                ("unique_code", &format!("eq.{}", unique_code)),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<Customer> = self.check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn find_latest_submission(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubmissionRecord>> {
        let response = self
            .client
            .get(self.table_url("submissions"))
            .query(&[
                ("select", "*"),
                ("customer_id", &format!("eq.{}", customer_id)),
                ("order", "created_at.desc"),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<SubmissionRecord> = self.check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_submission(&self, submission: NewSubmission) -> Result<SubmissionRecord> {
        debug!(customer_id = %submission.customer_id, "inserting submission row");
        let response = self
            .client
            .post(self.table_url("submissions"))
            .header("Prefer", "return=representation")
            .json(&submission)
            .send()
            .await?;
        let mut rows: Vec<SubmissionRecord> = self.check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StorageError::NotFound("inserted submission".to_string()))
    }

    async fn update_submission(
        &self,
        id: &str,
        fields: RecordFields,
        status: SubmissionStatus,
    ) -> Result<()> {
        self.patch_submission(
            id,
            json!({
                "title": fields.title,
                "description": fields.description,
                "date": fields.date,
                "images": fields.images,
                "status": status,
            }),
        )
        .await
    }

    async fn update_status(&self, id: &str, status: SubmissionStatus) -> Result<()> {
        self.patch_submission(id, json!({ "status": status })).await
    }

    async fn update_images(&self, id: &str, images: Vec<ImageRef>) -> Result<()> {
        self.patch_submission(id, json!({ "images": images })).await
    }

    async fn delete_submission(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.table_url("submissions"))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let response = self
            .client
            .post(self.table_url("customers"))
            .header("Prefer", "return=representation")
            .json(&customer)
            .send()
            .await?;
        let mut rows: Vec<Customer> = self.check(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| StorageError::NotFound("inserted customer".to_string()))
    }
}

#[async_trait]
impl BlobStorage for SupabaseStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.endpoint, IMAGE_BUCKET, path
        );
        let response = self
            .client
            .post(url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.endpoint, IMAGE_BUCKET, path
        )
    }
}
