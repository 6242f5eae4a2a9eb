//! Deck renderer
//!
//! Everything needed to turn a slide plan into a published PPTX: unit
//! conversion, resilient remote calls, the Google API client, the remote
//! operation set and the job pipeline.

pub mod api_client;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod google_types;
pub mod operations;
pub mod pipeline;
pub mod plan;
pub mod remote;
pub mod retry;
pub mod units;

pub use api_client::{GoogleApiClient, GoogleEndpoints};
pub use error::{PipelineError, RemoteError};
pub use operations::{EditSession, RemoteOps};
pub use pipeline::Pipeline;
pub use plan::SlidePlan;
pub use remote::{ChartService, DataSheet, PresentationService};
pub use retry::{retry_with_backoff, RetryPolicy, Retryable};
