//! Job API handlers
//!
//! The front door: claim a job and hand it to the pipeline in the
//! background, plus health and service description endpoints.

use crate::error::AppError;
use crate::renderer::Pipeline;
use crate::state::AppState;
use crate::store::{ClaimOutcome, JobStatus};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Body of `POST /run-job`
#[derive(Debug, Deserialize)]
pub struct RunJobRequest {
    /// Job to render
    pub job_id: String,
    /// Template overriding the job's own
    #[serde(default)]
    pub template_drive_id: Option<String>,
}

/// Answer of `POST /run-job`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RunJobResponse {
    /// "enqueued", or the status that blocked the run
    pub status: String,
    /// Job id
    pub job_id: String,
    /// Human-readable message
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
}

/// Claim a job and start rendering it in the background
///
/// # Returns
/// * `202` - The job was claimed and scheduled
/// * `409` - The job is already processing or done
///
/// # Errors
/// * `AppError::InvalidRequest` - empty job id
/// * `AppError::JobNotFound` - unknown job
/// * `AppError::Store` - the job store failed
pub async fn run_job(
    State(state): State<AppState>,
    Json(request): Json<RunJobRequest>,
) -> Result<(StatusCode, Json<RunJobResponse>), AppError> {
    let job_id = request.job_id.trim().to_string();
    if job_id.is_empty() {
        return Err(AppError::InvalidRequest("job_id is required".to_string()));
    }

    match state.jobs.try_claim(&job_id).await? {
        ClaimOutcome::Claimed(_) => {
            tracing::info!(job_id = %job_id, "Job claimed, scheduling");
            spawn_job(
                state.pipeline.clone(),
                job_id.clone(),
                request.template_drive_id,
            );
            Ok((
                StatusCode::ACCEPTED,
                Json(RunJobResponse {
                    status: "enqueued".to_string(),
                    job_id,
                    message: "Job processing started".to_string(),
                }),
            ))
        }
        ClaimOutcome::AlreadyActive(status) => {
            tracing::info!(job_id = %job_id, status = %status, "Job not claimable");
            Ok((StatusCode::CONFLICT, Json(already(job_id, status))))
        }
        ClaimOutcome::NotFound => Err(AppError::JobNotFound(job_id)),
    }
}

fn already(job_id: String, status: JobStatus) -> RunJobResponse {
    RunJobResponse {
        status: status.to_string(),
        job_id,
        message: format!("Job is already {}", status),
    }
}

/// Run a job on the runtime without waiting for it
///
/// Failures are already recorded on the job; here they are only logged.
pub fn spawn_job(
    pipeline: Arc<Pipeline>,
    job_id: String,
    template_override: Option<String>,
) -> JoinHandle<()> {
    let span = tracing::info_span!("job", job_id = %job_id);
    tokio::spawn(
        async move {
            match pipeline
                .process_job(&job_id, template_override.as_deref())
                .await
            {
                Ok(url) => tracing::info!(url = %url, "Background job finished"),
                Err(error) => tracing::error!(error = %error, "Background job failed"),
            }
        }
        .instrument(span),
    )
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /`
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Renders slide plans into PPTX decks from Google Slides templates",
        "endpoints": {
            "POST /run-job": "Claim a job and render it in the background",
            "GET /health": "Health check",
        },
    }))
}
