//! Supabase job store and blob store
//!
//! Jobs live in the `slide_jobs` table, reached through PostgREST.
//! Artifacts go to a Supabase Storage bucket and are served from its
//! public URL.

use crate::store::blob::BlobStore;
use crate::store::error::StoreError;
use crate::store::job::{ClaimOutcome, JobRecord, JobStore, JobUpdate};
use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Table holding job rows
pub const JOBS_TABLE: &str = "slide_jobs";

/// Default storage bucket for exported decks
pub const DEFAULT_BUCKET: &str = "ppt-results";

/// Client for the Supabase REST and Storage APIs
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client
    /// * `base_url` - Project URL, e.g. `https://xyz.supabase.co`
    /// * `service_key` - Service role key, sent as `apikey` and bearer token
    /// * `bucket` - Storage bucket for artifacts
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, JOBS_TABLE)
    }

    /// Public URL of an object in the bucket
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!(
                status_code = status.as_u16(),
                error_body = %body,
                "Supabase returned error status"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| StoreError::Decode(format!("{} - Response body: {}", e, body)))
    }
}

#[async_trait]
impl JobStore for SupabaseClient {
    async fn fetch(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        let request = self
            .http
            .get(self.table_url())
            .query(&[("id", format!("eq.{}", job_id)), ("select", "*".to_string())]);

        let rows: Vec<JobRecord> = self.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn update(&self, job_id: &str, update: &JobUpdate) -> Result<bool, StoreError> {
        let request = self
            .http
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", job_id))])
            .header("Prefer", "return=representation")
            .json(update);

        let rows: Vec<JobRecord> = self.send_json(request).await?;
        tracing::info!(
            job_id = %job_id,
            status = update.status.map(|s| s.as_str()).unwrap_or("unchanged"),
            rows = rows.len(),
            "Updated job"
        );
        Ok(!rows.is_empty())
    }

    async fn try_claim(&self, job_id: &str) -> Result<ClaimOutcome, StoreError> {
        // The status filter makes the PATCH a compare-and-swap on the row
        let request = self
            .http
            .patch(self.table_url())
            .query(&[
                ("id", format!("eq.{}", job_id)),
                ("status", "in.(queued,failed)".to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": "processing" }));

        let rows: Vec<JobRecord> = self.send_json(request).await?;
        if let Some(record) = rows.into_iter().next() {
            return Ok(ClaimOutcome::Claimed(record));
        }

        // Nothing matched: either the job is unknown or another status holds it
        Ok(match self.fetch(job_id).await? {
            Some(record) => ClaimOutcome::AlreadyActive(record.status),
            None => ClaimOutcome::NotFound,
        })
    }
}

#[async_trait]
impl BlobStore for SupabaseClient {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<Option<String>, StoreError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, key
        );
        let size = data.len();
        let request = self
            .http
            .post(&url)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data);

        self.send(request).await?;

        let public_url = self.public_url(key);
        tracing::info!(key = %key, size_bytes = size, url = %public_url, "Uploaded artifact");
        Ok(Some(public_url))
    }
}
