//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::renderer::credentials::CredentialSource;
use crate::renderer::retry::RetryPolicy;
use crate::store::supabase::DEFAULT_BUCKET;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Google API configuration
    pub google: GoogleConfig,
    /// Job store and blob store configuration
    pub supabase: SupabaseConfig,
    /// Retry policy for remote calls
    pub retry: RetryConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Google API configuration
#[derive(Clone)]
pub struct GoogleConfig {
    /// Service-account document source; inline base64 wins over a file path
    pub credentials: Option<CredentialSource>,
    /// Pre-minted bearer token
    pub access_token: Option<String>,
    /// Per-call HTTP timeout (in seconds)
    pub request_timeout_secs: u64,
    /// Template used when neither the request nor the job names one
    pub default_template_id: Option<String>,
}

/// Supabase configuration
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL
    pub url: Option<String>,
    /// Service role key
    pub service_role_key: Option<String>,
    /// Storage bucket for exported decks
    pub bucket: String,
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per remote call
    pub max_attempts: u32,
    /// Delay before the first retry (in milliseconds)
    pub base_delay_ms: u64,
    /// Upper bound for a single delay (in milliseconds)
    pub max_delay_ms: u64,
    /// Stop retrying on errors classified as terminal (e.g. 4xx)
    pub classify_errors: bool,
}

impl RetryConfig {
    /// Build the retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            classify_errors: self.classify_errors,
            ..RetryPolicy::default()
        }
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field(
                "credentials",
                &self.credentials.as_ref().map(|source| match source {
                    CredentialSource::File(path) => path.display().to_string(),
                    CredentialSource::InlineBase64(_) => "<inline>".to_string(),
                }),
            )
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("default_template_id", &self.default_template_id)
            .finish()
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from any variable lookup
    ///
    /// Empty values count as unset. Unparseable numbers fall back to defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str| var(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str| {
            var(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        };
        let retry_defaults = RetryPolicy::default();

        let credentials = var("GCP_SERVICE_ACCOUNT_JSON_BASE64")
            .map(CredentialSource::InlineBase64)
            .or_else(|| var("GCP_SERVICE_ACCOUNT_JSON").map(|p| CredentialSource::File(PathBuf::from(p))));

        Self {
            server: ServerConfig {
                port: var("RENDERER_PORT")
                    .or_else(|| var("PORT"))
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(8080),
                host: var("RENDERER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            google: GoogleConfig {
                credentials,
                access_token: var("GOOGLE_ACCESS_TOKEN"),
                request_timeout_secs: number("GOOGLE_REQUEST_TIMEOUT_SECS").unwrap_or(120),
                default_template_id: var("DEFAULT_TEMPLATE_DRIVE_ID"),
            },
            supabase: SupabaseConfig {
                url: var("SUPABASE_URL"),
                service_role_key: var("SUPABASE_SERVICE_ROLE_KEY"),
                bucket: var("SUPABASE_PPT_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            retry: RetryConfig {
                max_attempts: number("RETRY_MAX_ATTEMPTS")
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(retry_defaults.max_attempts),
                base_delay_ms: number("RETRY_BASE_DELAY_MS")
                    .unwrap_or(retry_defaults.base_delay.as_millis() as u64),
                max_delay_ms: number("RETRY_MAX_DELAY_MS")
                    .unwrap_or(retry_defaults.max_delay.as_millis() as u64),
                classify_errors: flag("RETRY_CLASSIFY_ERRORS"),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
