//! Blob store seam

use crate::store::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;

/// Object storage for finished artifacts
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    ///
    /// # Returns
    /// * `Ok(Some(url))` - Public URL of the stored object
    /// * `Ok(None)` - Stored, but no public URL is available
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<Option<String>, StoreError>;
}
