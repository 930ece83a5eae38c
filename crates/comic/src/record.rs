/// Persisted record shapes for the `submissions` and `customers` tables.
use serde::{Deserialize, Serialize};

/// Lifecycle status of a submission row. `draft` and `submitted` are driven
/// by the customer session; `processing` and `completed` are advanced by the
/// admin side out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Processing,
    Completed,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Submitted => write!(f, "submitted"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One entry of the record's ordered image array. `id` is the originating
/// panel id; `order_index` is dense in document traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    pub url: String,
    pub caption: String,
    pub order_index: u32,
    pub file_name: String,
    pub file_size: u64,
}

/// Projection of a document at a persistence point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub title: String,
    pub description: String,
    pub date: String,
    pub images: Vec<ImageRef>,
}

/// A stored draft or submission row. Same schema either way; only `status`
/// distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub customer_id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub images: Vec<ImageRef>,
    pub status: SubmissionStatus,
    pub created_at: String,
}

/// Insert payload: everything but the store-assigned id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub customer_id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub images: Vec<ImageRef>,
    pub status: SubmissionStatus,
}

impl NewSubmission {
    pub fn from_fields(
        customer_id: impl Into<String>,
        fields: RecordFields,
        status: SubmissionStatus,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            title: fields.title,
            description: fields.description,
            date: fields.date,
            images: fields.images,
            status,
        }
    }
}

/// A customer row. Read-only from the core; only the admin side creates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub unique_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub unique_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
