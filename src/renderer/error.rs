//! Renderer error types
//!
//! Errors raised by remote calls, slide-plan decoding, and the pipeline.
//! The `Display` text of a `PipelineError` is what gets persisted as the
//! job's `error_message`.

use crate::renderer::retry::Retryable;
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by the Google Slides/Sheets/Drive capabilities
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request could not be sent or its body could not be read
    #[error("{service} request failed: {source}")]
    Transport {
        /// Remote service name (e.g. "slides")
        service: &'static str,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        /// Remote service name
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The response did not have the expected shape
    #[error("unexpected {service} response: {message}")]
    InvalidResponse {
        /// Remote service name
        service: &'static str,
        /// What was wrong with the response
        message: String,
    },
}

impl Retryable for RemoteError {
    fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { .. } => true,
            RemoteError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            RemoteError::InvalidResponse { .. } => false,
        }
    }
}

/// Errors decoding a job's slide plan
#[derive(Error, Debug)]
pub enum PlanError {
    /// The plan was stored as text that is not valid JSON
    #[error("Invalid slide_plan JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The plan is JSON but not a slide plan document
    #[error("Invalid slide_plan structure: {0}")]
    InvalidStructure(#[source] serde_json::Error),

    /// The plan contains no slides
    #[error("No slides in plan")]
    NoSlides,
}

/// A chart spec that cannot be rendered
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChartSpecError {
    /// The data table has no rows
    #[error("chart data is empty")]
    EmptyData,

    /// A domain or series column lies outside the data table
    #[error("chart column {column} is outside the data width {width}")]
    ColumnOutOfRange {
        /// Offending column index
        column: u32,
        /// Width of the header row
        width: usize,
    },
}

/// Why a single chart or image was left out of a deck
#[derive(Error, Debug)]
pub enum ElementError {
    /// The chart spec cannot be rendered
    #[error("invalid chart spec: {0}")]
    Chart(#[from] ChartSpecError),

    /// The image spec has no URL
    #[error("image has no url")]
    MissingImageUrl,

    /// The element's JSON does not decode into a chart, image or placement
    #[error("malformed element: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A remote call failed
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors that stop a job
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The job id is unknown to the job store
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The slide plan could not be used
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// No template id in the request, the job, or the environment
    #[error("No template specified")]
    MissingTemplate,

    /// The duplicated template has no slide pages
    #[error("Template has no slides")]
    EmptyTemplate,

    /// A remote call failed terminally or exhausted its retries
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The exported deck could not be published
    #[error("Failed to upload PPTX to storage: {0}")]
    UploadFailed(String),

    /// The job store could not be read
    #[error("Job store error: {0}")]
    Store(#[from] StoreError),
}
