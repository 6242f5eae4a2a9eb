//! In-memory stores
//!
//! Used by tests and local runs. State lives behind tokio locks and is
//! lost on restart.

use crate::store::blob::BlobStore;
use crate::store::error::StoreError;
use crate::store::job::{ClaimOutcome, JobRecord, JobStore, JobUpdate};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

/// Job store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, JobRecord>>,
    history: Mutex<Vec<(String, JobUpdate)>>,
}

impl MemoryJobStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub async fn insert(&self, record: JobRecord) {
        self.jobs.write().await.insert(record.id.clone(), record);
    }

    /// Current copy of a record
    pub async fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Every update applied, in order
    pub async fn updates(&self) -> Vec<(String, JobUpdate)> {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn fetch(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.get(job_id).await)
    }

    async fn update(&self, job_id: &str, update: &JobUpdate) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(job_id) else {
            return Ok(false);
        };
        update.apply_to(record);
        self.history
            .lock()
            .await
            .push((job_id.to_string(), update.clone()));
        Ok(true)
    }

    async fn try_claim(&self, job_id: &str) -> Result<ClaimOutcome, StoreError> {
        // The write lock makes check-and-set a single step
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(job_id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        if !record.status.is_claimable() {
            return Ok(ClaimOutcome::AlreadyActive(record.status));
        }

        let update = JobUpdate::processing();
        update.apply_to(record);
        self.history.lock().await.push((job_id.to_string(), update));
        Ok(ClaimOutcome::Claimed(record.clone()))
    }
}

/// An object written to a `MemoryBlobStore`
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    /// Object key
    pub key: String,
    /// Content
    pub data: Bytes,
    /// MIME type
    pub content_type: String,
}

/// Blob store that keeps objects in memory
#[derive(Debug)]
pub struct MemoryBlobStore {
    base_url: Option<String>,
    objects: Mutex<Vec<StoredBlob>>,
}

impl MemoryBlobStore {
    /// Store that reports `{base_url}/{key}` as the public URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            objects: Mutex::new(Vec::new()),
        }
    }

    /// Store that accepts uploads but never yields a public URL
    pub fn without_public_urls() -> Self {
        Self {
            base_url: None,
            objects: Mutex::new(Vec::new()),
        }
    }

    /// Objects uploaded so far
    pub async fn objects(&self) -> Vec<StoredBlob> {
        self.objects.lock().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<Option<String>, StoreError> {
        let mut objects = self.objects.lock().await;
        objects.retain(|blob| blob.key != key);
        objects.push(StoredBlob {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });

        Ok(self
            .base_url
            .as_ref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), key)))
    }
}
