//! Shared handles for the HTTP layer

use crate::config::Config;
use crate::renderer::credentials::resolve_access_token;
use crate::renderer::{GoogleApiClient, GoogleEndpoints, Pipeline, RemoteOps};
use crate::store::{JobStore, SupabaseClient};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Job pipeline
    pub pipeline: Arc<Pipeline>,
    /// Job store used for claiming jobs
    pub jobs: Arc<dyn JobStore>,
}

impl AppState {
    /// Wrap a pipeline; claims go to the pipeline's own job store
    pub fn new(pipeline: Pipeline) -> Self {
        let jobs = pipeline.jobs().clone();
        Self {
            pipeline: Arc::new(pipeline),
            jobs,
        }
    }

    /// Build production handles from configuration
    ///
    /// # Errors
    /// Fails when Supabase settings are missing, no Google token can be
    /// resolved, or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let supabase_url = config
            .supabase
            .url
            .clone()
            .context("SUPABASE_URL must be set")?;
        let supabase_key = config
            .supabase
            .service_role_key
            .clone()
            .context("SUPABASE_SERVICE_ROLE_KEY must be set")?;

        let access_token = resolve_access_token(
            config.google.access_token.as_deref(),
            config.google.credentials.as_ref(),
        )
        .context("Failed to resolve Google credentials")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.google.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let google = Arc::new(GoogleApiClient::new(
            http.clone(),
            access_token,
            GoogleEndpoints::default(),
        ));
        let supabase = Arc::new(SupabaseClient::new(
            http,
            supabase_url,
            supabase_key,
            config.supabase.bucket.clone(),
        ));

        let ops = RemoteOps::new(google.clone(), google, config.retry.policy());
        let pipeline = Pipeline::new(
            supabase.clone(),
            supabase,
            ops,
            config.google.default_template_id.clone(),
        );

        tracing::info!(
            bucket = %config.supabase.bucket,
            default_template = config.google.default_template_id.as_deref().unwrap_or("none"),
            "Service handles initialized"
        );
        Ok(Self::new(pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn test_from_config_requires_supabase() {
        let err = AppState::from_config(&config(&[("GOOGLE_ACCESS_TOKEN", "t")]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = AppState::from_config(&config(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "k"),
        ]))
        .err()
        .unwrap();
        assert!(err.to_string().contains("Google credentials"));
    }

    #[test]
    fn test_from_config_success() {
        let state = AppState::from_config(&config(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "k"),
            ("GOOGLE_ACCESS_TOKEN", "t"),
        ]));
        assert!(state.is_ok());
    }
}
