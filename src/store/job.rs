//! Job records and the job store seam

use crate::store::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle of a render job: `queued -> processing -> done | failed`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting to be picked up
    Queued,
    /// A pipeline run owns the job
    Processing,
    /// Artifact published
    Done,
    /// Run failed; `error_message` says why
    Failed,
}

impl JobStatus {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Whether a new run may claim the job
    pub fn is_claimable(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `slide_jobs` table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobRecord {
    /// Job id
    pub id: String,
    /// Current status
    pub status: JobStatus,
    /// Slide plan, as JSON text or a JSON document
    #[serde(default)]
    pub slide_plan: Option<Value>,
    /// Older column name for the slide plan
    #[serde(default)]
    pub ppt_plan: Option<Value>,
    /// Template override for this job
    #[serde(default)]
    pub template_drive_id: Option<String>,
    /// Published artifact URL
    #[serde(default)]
    pub final_ppt_url: Option<String>,
    /// Failure reason
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobRecord {
    /// A queued job with the given plan
    pub fn queued(id: impl Into<String>, slide_plan: Value) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            slide_plan: Some(slide_plan),
            ppt_plan: None,
            template_drive_id: None,
            final_ppt_url: None,
            error_message: None,
        }
    }

    /// The stored plan: `slide_plan`, or `ppt_plan` when that is blank
    pub fn raw_plan(&self) -> Option<&Value> {
        [self.slide_plan.as_ref(), self.ppt_plan.as_ref()]
            .into_iter()
            .flatten()
            .find(|value| !is_blank(value))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Fields to change on a job; `None` fields are left untouched
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    /// Published artifact URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_ppt_url: Option<String>,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl JobUpdate {
    /// Mark processing
    pub fn processing() -> Self {
        Self {
            status: Some(JobStatus::Processing),
            ..Default::default()
        }
    }

    /// Mark done with the artifact URL
    pub fn done(final_ppt_url: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Done),
            final_ppt_url: Some(final_ppt_url.into()),
            ..Default::default()
        }
    }

    /// Mark failed with a reason
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }

    /// Apply to a record in place
    pub fn apply_to(&self, record: &mut JobRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(url) = &self.final_ppt_url {
            record.final_ppt_url = Some(url.clone());
        }
        if let Some(message) = &self.error_message {
            record.error_message = Some(message.clone());
        }
    }
}

/// Result of trying to claim a job for processing
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The job moved to `processing`; the record is as it was claimed
    Claimed(JobRecord),
    /// The job is already `processing` or `done`
    AlreadyActive(JobStatus),
    /// No job with that id
    NotFound,
}

/// Persistent job records
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a job; `Ok(None)` when it does not exist
    async fn fetch(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError>;

    /// Update fields of a job; returns whether a row was changed
    async fn update(&self, job_id: &str, update: &JobUpdate) -> Result<bool, StoreError>;

    /// Atomically move a `queued` or `failed` job to `processing`
    async fn try_claim(&self, job_id: &str) -> Result<ClaimOutcome, StoreError>;
}
