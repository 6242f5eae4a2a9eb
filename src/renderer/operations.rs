//! Remote operation set
//!
//! The typed operations the pipeline performs against the presentation and
//! chart services. Every operation is a resilient call: it goes through
//! `retry_with_backoff` with the set's policy.

use crate::renderer::constants::{CHART_LEGEND_POSITION, CHART_SERIES_AXIS};
use crate::renderer::error::RemoteError;
use crate::renderer::google_types::{
    AddChartRequest, BasicChartDomain, BasicChartSeries, BasicChartSpec, ChartData,
    CreateImageRequest, CreateSheetsChartRequest, EmbeddedChart, GridRange,
    PageElementProperties, SheetsChartSpec, SlidesRequest,
};
use crate::renderer::plan::{ChartSpec, EmuRect};
use crate::renderer::remote::{ChartService, DataSheet, PresentationService};
use crate::renderer::retry::{retry_with_backoff, RetryPolicy};
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Remote operations bound to injected service handles
#[derive(Clone)]
pub struct RemoteOps {
    presentations: Arc<dyn PresentationService>,
    charts: Arc<dyn ChartService>,
    retry: RetryPolicy,
}

impl RemoteOps {
    /// Create an operation set
    ///
    /// # Arguments
    /// * `presentations` - Presentation capability
    /// * `charts` - Tabular/chart capability
    /// * `retry` - Policy applied to every call
    pub fn new(
        presentations: Arc<dyn PresentationService>,
        charts: Arc<dyn ChartService>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            presentations,
            charts,
            retry,
        }
    }

    /// Retry policy in use
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Copy a template under a new title; returns the new presentation id
    pub async fn duplicate_template(
        &self,
        template_id: &str,
        new_title: &str,
    ) -> Result<String, RemoteError> {
        let presentations = &self.presentations;
        retry_with_backoff(&self.retry, "duplicate_template", move || {
            presentations.copy_template(template_id, new_title)
        })
        .await
    }

    /// Slide page ids of a presentation, in order
    pub async fn slide_page_ids(&self, presentation_id: &str) -> Result<Vec<String>, RemoteError> {
        let presentations = &self.presentations;
        retry_with_backoff(&self.retry, "slide_page_ids", move || {
            presentations.page_ids(presentation_id)
        })
        .await
    }

    /// Replace every token of `mapping` in one batch
    ///
    /// An empty mapping returns immediately without a remote call.
    pub async fn substitute_text(
        &self,
        presentation_id: &str,
        mapping: &BTreeMap<String, String>,
    ) -> Result<(), RemoteError> {
        if mapping.is_empty() {
            return Ok(());
        }

        let requests: Vec<SlidesRequest> = mapping
            .iter()
            .map(|(token, text)| SlidesRequest::replace_all_text(token, text))
            .collect();

        let presentations = &self.presentations;
        let requests = requests.as_slice();
        retry_with_backoff(&self.retry, "substitute_text", move || {
            presentations.batch_update(presentation_id, requests)
        })
        .await?;

        tracing::info!(
            presentation_id = %presentation_id,
            token_count = mapping.len(),
            "Substituted placeholders"
        );
        Ok(())
    }

    /// Create a spreadsheet and write `rows` from A1
    ///
    /// Creation and the write are retried separately, so a failing write
    /// never creates a second spreadsheet. Empty `rows` leave the sheet empty.
    pub async fn create_data_sheet(
        &self,
        title: &str,
        rows: &[Vec<Value>],
    ) -> Result<DataSheet, RemoteError> {
        let charts = &self.charts;
        let sheet = retry_with_backoff(&self.retry, "create_data_sheet", move || {
            charts.create_spreadsheet(title)
        })
        .await?;

        if !rows.is_empty() {
            let spreadsheet_id = sheet.spreadsheet_id.as_str();
            retry_with_backoff(&self.retry, "write_sheet_rows", move || {
                charts.write_rows(spreadsheet_id, rows)
            })
            .await?;
        }

        tracing::debug!(
            spreadsheet_id = %sheet.spreadsheet_id,
            row_count = rows.len(),
            "Created data sheet"
        );
        Ok(sheet)
    }

    /// Add a chart built from `spec` to `sheet`; returns the chart id
    pub async fn add_chart(&self, sheet: &DataSheet, spec: &ChartSpec) -> Result<i64, RemoteError> {
        let request = build_add_chart_request(spec, sheet.sheet_id);
        let charts = &self.charts;
        let spreadsheet_id = sheet.spreadsheet_id.as_str();
        let request = &request;
        retry_with_backoff(&self.retry, "add_chart", move || {
            charts.add_chart(spreadsheet_id, request)
        })
        .await
    }

    /// Embed an existing chart on a slide page
    ///
    /// The element id is drawn once, so every retry reuses it.
    pub async fn insert_chart(
        &self,
        session: &EditSession,
        page_id: &str,
        spreadsheet_id: &str,
        chart_id: i64,
        rect: EmuRect,
    ) -> Result<String, RemoteError> {
        let object_id = session.next_element_id("chart");
        let requests = [SlidesRequest::CreateSheetsChart(CreateSheetsChartRequest {
            object_id: object_id.clone(),
            spreadsheet_id: spreadsheet_id.to_string(),
            chart_id,
            element_properties: PageElementProperties::new(page_id, rect),
        })];

        self.apply(session, "insert_chart", &requests).await?;
        Ok(object_id)
    }

    /// Embed an image by URL on a slide page
    pub async fn insert_image(
        &self,
        session: &EditSession,
        page_id: &str,
        image_url: &str,
        rect: EmuRect,
    ) -> Result<String, RemoteError> {
        let object_id = session.next_element_id("image");
        let requests = [SlidesRequest::CreateImage(CreateImageRequest {
            object_id: object_id.clone(),
            url: image_url.to_string(),
            element_properties: PageElementProperties::new(page_id, rect),
        })];

        self.apply(session, "insert_image", &requests).await?;
        Ok(object_id)
    }

    /// Export a presentation as PPTX bytes
    pub async fn export(&self, presentation_id: &str) -> Result<Bytes, RemoteError> {
        let presentations = &self.presentations;
        retry_with_backoff(&self.retry, "export", move || {
            presentations.export_pptx(presentation_id)
        })
        .await
    }

    async fn apply(
        &self,
        session: &EditSession,
        operation: &str,
        requests: &[SlidesRequest],
    ) -> Result<(), RemoteError> {
        let presentations = &self.presentations;
        let presentation_id = session.presentation_id();
        retry_with_backoff(&self.retry, operation, move || {
            presentations.batch_update(presentation_id, requests)
        })
        .await
    }
}

/// Build the `addChart` request for `spec`
///
/// The domain column defaults to column 0 and every range covers rows
/// `[0, row_count)`. `spec.sheet_id` wins over `default_sheet_id`.
pub fn build_add_chart_request(spec: &ChartSpec, default_sheet_id: i64) -> AddChartRequest {
    let sheet_id = spec.sheet_id.unwrap_or(default_sheet_id);
    let row_count = u32::try_from(spec.row_count()).unwrap_or(u32::MAX);

    let domain = BasicChartDomain {
        domain: ChartData::single(GridRange::column(sheet_id, spec.domain_column(), row_count)),
    };
    let series = spec
        .series
        .iter()
        .map(|s| BasicChartSeries {
            series: ChartData::single(GridRange::column(sheet_id, s.col, row_count)),
            target_axis: CHART_SERIES_AXIS.to_string(),
        })
        .collect();

    AddChartRequest {
        chart: EmbeddedChart {
            spec: SheetsChartSpec {
                title: spec.title.clone().unwrap_or_default(),
                basic_chart: BasicChartSpec {
                    chart_type: spec.chart_type(),
                    legend_position: CHART_LEGEND_POSITION.to_string(),
                    domains: vec![domain],
                    series,
                },
            },
        },
    }
}

/// One job's edits to one duplicated presentation
///
/// Holds the presentation id and its page ids for the lifetime of a single
/// pipeline run, and hands out element ids that are unique within it.
#[derive(Debug)]
pub struct EditSession {
    presentation_id: String,
    page_ids: Vec<String>,
    started_millis: i64,
    counter: AtomicU64,
}

impl EditSession {
    /// Start a session on a presentation with the given pages
    pub fn new(presentation_id: String, page_ids: Vec<String>) -> Self {
        Self {
            presentation_id,
            page_ids,
            started_millis: chrono::Utc::now().timestamp_millis(),
            counter: AtomicU64::new(0),
        }
    }

    /// Presentation being edited
    pub fn presentation_id(&self) -> &str {
        &self.presentation_id
    }

    /// Page ids in presentation order
    pub fn page_ids(&self) -> &[String] {
        &self.page_ids
    }

    /// Page for a slide index, clamped to `[0, page_count - 1]`
    ///
    /// Returns `None` only when the presentation has no pages.
    pub fn page_for(&self, index: i64) -> Option<&str> {
        let last = self.page_ids.len().checked_sub(1)?;
        let clamped = usize::try_from(index.max(0)).unwrap_or(usize::MAX).min(last);
        self.page_ids.get(clamped).map(String::as_str)
    }

    /// Next element id: `<kind>_<session-millis>_<counter>`
    pub fn next_element_id(&self, kind: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}_{}_{:04}", kind, self.started_millis, n)
    }
}
