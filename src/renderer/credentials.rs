//! Service account credentials
//!
//! Loads the service-account document from a file or an inline base64
//! value and resolves the bearer token used for Google calls. Tokens are
//! minted elsewhere; this module only reads them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Where the service-account JSON comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Path to a JSON file
    File(PathBuf),
    /// Base64-encoded JSON document
    InlineBase64(String),
}

/// Service-account document (subset)
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ServiceAccountInfo {
    /// Credential type, usually "service_account"
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    /// Service account e-mail
    #[serde(default)]
    pub client_email: Option<String>,
    /// GCP project
    #[serde(default)]
    pub project_id: Option<String>,
    /// Pre-minted OAuth access token, written by an external token broker
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Errors loading credentials
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// The credential file could not be read
    #[error("Failed to read credentials file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// The inline value is not valid base64
    #[error("Invalid base64 credentials: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The document is not valid JSON
    #[error("Invalid credentials JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither an explicit token nor a token in the document
    #[error("No Google access token: a service account key carries none; set GOOGLE_ACCESS_TOKEN or have a token broker write access_token into the credentials JSON")]
    MissingToken,
}

/// Read and parse the service-account document
///
/// # Errors
/// Returns `CredentialsError` when the source cannot be read, decoded or
/// parsed.
pub fn load_service_account(
    source: &CredentialSource,
) -> Result<ServiceAccountInfo, CredentialsError> {
    let raw = match source {
        CredentialSource::File(path) => {
            std::fs::read(path).map_err(|source| CredentialsError::Read {
                path: path.clone(),
                source,
            })?
        }
        CredentialSource::InlineBase64(encoded) => STANDARD.decode(encoded.trim())?,
    };

    let info: ServiceAccountInfo = serde_json::from_slice(&raw)?;
    tracing::info!(
        client_email = info.client_email.as_deref().unwrap_or("unknown"),
        project_id = info.project_id.as_deref().unwrap_or("unknown"),
        "Loaded service account credentials"
    );
    Ok(info)
}

/// Resolve the bearer token: `explicit` first, then the document's token
///
/// # Arguments
/// * `explicit` - Token supplied directly (e.g. `GOOGLE_ACCESS_TOKEN`)
/// * `source` - Optional service-account document source
///
/// # Errors
/// * `CredentialsError::MissingToken` - no token anywhere
/// * Any load error from `source` when it is consulted
pub fn resolve_access_token(
    explicit: Option<&str>,
    source: Option<&CredentialSource>,
) -> Result<String, CredentialsError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    let source = source.ok_or(CredentialsError::MissingToken)?;
    load_service_account(source)?
        .access_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(CredentialsError::MissingToken)
}
