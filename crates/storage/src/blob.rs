/// Blob storage surface: durable image bytes with public URL issuance.
use async_trait::async_trait;

use crate::Result;

/// Object-storage collaborator. Paths are namespaced by customer identity;
/// the core never deletes blobs (replaced images are left orphaned).
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Upload bytes at the given bucket path.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Resolve the stable public URL for an uploaded path.
    fn public_url(&self, path: &str) -> String;
}
