//! Render a single job from the command line
//!
//! Usage: `render_job <job_id> [template_drive_id]`
//!
//! Claims the job like the HTTP front door does, then runs the pipeline in
//! the foreground and prints the published URL.

use anyhow::{bail, Context};
use slide_renderer::{
    config::Config,
    state::AppState,
    store::ClaimOutcome,
};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let Some(job_id) = args.next() else {
        bail!("usage: render_job <job_id> [template_drive_id]");
    };
    let template_override = args.next();

    let config = Config::from_env();
    let state = AppState::from_config(&config).context("Failed to initialize services")?;

    match state.jobs.try_claim(&job_id).await? {
        ClaimOutcome::Claimed(_) => {}
        ClaimOutcome::AlreadyActive(status) => bail!("Job {} is already {}", job_id, status),
        ClaimOutcome::NotFound => bail!("Job not found: {}", job_id),
    }

    let url = state
        .pipeline
        .process_job(&job_id, template_override.as_deref())
        .await
        .with_context(|| format!("Job {} failed", job_id))?;

    println!("{}", url);
    Ok(())
}
