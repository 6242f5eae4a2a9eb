//! Store errors

use thiserror::Error;

/// Errors from the job store or blob store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request could not be sent or its body could not be read
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("store returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The response did not decode into the expected shape
    #[error("failed to decode store response: {0}")]
    Decode(String),
}
