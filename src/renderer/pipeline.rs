//! Pipeline orchestrator
//!
//! Turns one queued job into a published deck:
//!
//! 1. fetch the job and mark it `processing`
//! 2. normalize the slide plan and resolve the template
//! 3. duplicate the template and read its pages
//! 4. substitute every placeholder in one batch
//! 5. insert charts and images slide by slide (failures are skipped)
//! 6. export, upload, and mark the job `done`
//!
//! Any error after the job was fetched is recorded as `failed` with the
//! error's message and returned to the caller.

use crate::renderer::constants::{
    ARTIFACT_EXTENSION, CHART_SHEET_TITLE_PREFIX, PPTX_MIME_TYPE, PRESENTATION_TITLE_PREFIX,
};
use crate::renderer::error::{ElementError, PipelineError};
use crate::renderer::operations::{EditSession, RemoteOps};
use crate::renderer::plan::{ChartSpec, ImageSpec, SlideConfig, SlidePlan};
use crate::store::{BlobStore, JobRecord, JobStore, JobUpdate};
use std::sync::Arc;

/// Counts of per-slide element insertions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementTally {
    /// Charts and images that made it into the deck
    pub inserted: usize,
    /// Charts and images skipped after an error
    pub skipped: usize,
}

/// Job-processing pipeline with its collaborators injected
#[derive(Clone)]
pub struct Pipeline {
    jobs: Arc<dyn JobStore>,
    blobs: Arc<dyn BlobStore>,
    ops: RemoteOps,
    default_template_id: Option<String>,
}

impl Pipeline {
    /// Create a pipeline
    ///
    /// # Arguments
    /// * `jobs` - Job store
    /// * `blobs` - Blob store for finished decks
    /// * `ops` - Remote operation set
    /// * `default_template_id` - Template used when neither the request nor the job names one
    pub fn new(
        jobs: Arc<dyn JobStore>,
        blobs: Arc<dyn BlobStore>,
        ops: RemoteOps,
        default_template_id: Option<String>,
    ) -> Self {
        Self {
            jobs,
            blobs,
            ops,
            default_template_id: default_template_id.filter(|id| !id.trim().is_empty()),
        }
    }

    /// Job store the pipeline reads and updates
    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.jobs
    }

    /// Run a job to completion
    ///
    /// # Arguments
    /// * `job_id` - Job to process
    /// * `template_override` - Template id that wins over the job's own
    ///
    /// # Returns
    /// * `Ok(url)` - Public URL of the published deck; the job is `done`
    ///
    /// # Errors
    /// * `PipelineError::JobNotFound` - unknown job; nothing is recorded
    /// * Any other error - the job is recorded as `failed` with its message
    pub async fn process_job(
        &self,
        job_id: &str,
        template_override: Option<&str>,
    ) -> Result<String, PipelineError> {
        tracing::info!(job_id = %job_id, "Processing job");

        let job = self
            .jobs
            .fetch(job_id)
            .await?
            .ok_or_else(|| PipelineError::JobNotFound(job_id.to_string()))?;

        let result = self.render(&job, template_override).await;
        if let Err(error) = &result {
            tracing::error!(job_id = %job_id, error = %error, "Job failed");
            self.record_failure(job_id, error).await;
        }
        result
    }

    async fn render(
        &self,
        job: &JobRecord,
        template_override: Option<&str>,
    ) -> Result<String, PipelineError> {
        let job_id = job.id.as_str();
        self.jobs.update(job_id, &JobUpdate::processing()).await?;

        let plan = SlidePlan::from_raw(job.raw_plan())?;
        let template_id = self
            .resolve_template_id(template_override, job)
            .ok_or(PipelineError::MissingTemplate)?;

        let title = timestamped_title(PRESENTATION_TITLE_PREFIX, job_id);
        let presentation_id = self.ops.duplicate_template(&template_id, &title).await?;
        tracing::info!(
            job_id = %job_id,
            template_id = %template_id,
            presentation_id = %presentation_id,
            slide_count = plan.slides.len(),
            "Duplicated template"
        );

        let page_ids = self.ops.slide_page_ids(&presentation_id).await?;
        if page_ids.is_empty() {
            return Err(PipelineError::EmptyTemplate);
        }
        let session = EditSession::new(presentation_id, page_ids);

        self.ops
            .substitute_text(session.presentation_id(), &plan.merged_placeholders())
            .await?;

        let tally = self.insert_elements(job_id, &session, &plan).await;

        let pptx = self.ops.export(session.presentation_id()).await?;
        let key = format!("{}.{}", job_id, ARTIFACT_EXTENSION);
        let url = self.publish(&key, pptx).await?;

        self.jobs.update(job_id, &JobUpdate::done(url.clone())).await?;
        tracing::info!(
            job_id = %job_id,
            url = %url,
            elements_inserted = tally.inserted,
            elements_skipped = tally.skipped,
            "Job completed"
        );
        Ok(url)
    }

    /// Template for a job: the override, then the job's own, then the default
    pub fn resolve_template_id(
        &self,
        template_override: Option<&str>,
        job: &JobRecord,
    ) -> Option<String> {
        [
            template_override,
            job.template_drive_id.as_deref(),
            self.default_template_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
    }

    async fn insert_elements(
        &self,
        job_id: &str,
        session: &EditSession,
        plan: &SlidePlan,
    ) -> ElementTally {
        let mut tally = ElementTally::default();

        for (index, slide) in plan.slides.iter().enumerate() {
            let Some(page_id) = session.page_for(slide.target_slide_index) else {
                continue;
            };

            if let Some(chart) = slide.chart() {
                match self.insert_chart(job_id, session, page_id, slide, chart).await {
                    Ok(object_id) => {
                        tally.inserted += 1;
                        tracing::info!(job_id = %job_id, slide = index, object_id = %object_id, "Inserted chart");
                    }
                    Err(error) => {
                        tally.skipped += 1;
                        tracing::error!(job_id = %job_id, slide = index, error = %error, "Skipping chart");
                    }
                }
            }

            if let Some(image) = slide.image() {
                match self.insert_image(session, page_id, image).await {
                    Ok(object_id) => {
                        tally.inserted += 1;
                        tracing::info!(job_id = %job_id, slide = index, object_id = %object_id, "Inserted image");
                    }
                    Err(ElementError::MissingImageUrl) => {
                        tally.skipped += 1;
                        tracing::warn!(job_id = %job_id, slide = index, "Skipping image without url");
                    }
                    Err(error) => {
                        tally.skipped += 1;
                        tracing::error!(job_id = %job_id, slide = index, error = %error, "Skipping image");
                    }
                }
            }
        }

        tally
    }

    async fn insert_chart(
        &self,
        job_id: &str,
        session: &EditSession,
        page_id: &str,
        slide: &SlideConfig,
        chart: Result<ChartSpec, serde_json::Error>,
    ) -> Result<String, ElementError> {
        let chart = chart?;
        chart.validate()?;
        let rect = slide.chart_geometry()?.to_emu();

        let title = timestamped_title(CHART_SHEET_TITLE_PREFIX, job_id);
        let sheet = self.ops.create_data_sheet(&title, &chart.data).await?;
        let chart_id = self.ops.add_chart(&sheet, &chart).await?;

        Ok(self
            .ops
            .insert_chart(session, page_id, &sheet.spreadsheet_id, chart_id, rect)
            .await?)
    }

    async fn insert_image(
        &self,
        session: &EditSession,
        page_id: &str,
        image: Result<ImageSpec, serde_json::Error>,
    ) -> Result<String, ElementError> {
        let image = image?;
        let url = image
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ElementError::MissingImageUrl)?;
        let rect = image.geometry().to_emu();

        Ok(self.ops.insert_image(session, page_id, url, rect).await?)
    }

    async fn publish(&self, key: &str, pptx: bytes::Bytes) -> Result<String, PipelineError> {
        match self.blobs.upload(key, pptx, PPTX_MIME_TYPE).await {
            Ok(Some(url)) if !url.trim().is_empty() => Ok(url),
            Ok(_) => Err(PipelineError::UploadFailed(
                "no public URL returned".to_string(),
            )),
            Err(error) => Err(PipelineError::UploadFailed(error.to_string())),
        }
    }

    async fn record_failure(&self, job_id: &str, error: &PipelineError) {
        let update = JobUpdate::failed(error.to_string());
        match self.jobs.update(job_id, &update).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id = %job_id, "Job disappeared before failure was recorded")
            }
            Err(store_error) => tracing::error!(
                job_id = %job_id,
                error = %store_error,
                "Failed to record job failure"
            ),
        }
    }
}

fn timestamped_title(prefix: &str, job_id: &str) -> String {
    format!("{}{}_{}", prefix, job_id, chrono::Utc::now().timestamp())
}
