//! Remote capabilities
//!
//! The presentation and chart services the pipeline drives. They are
//! traits so the pipeline can be handed fakes in tests; production uses
//! `GoogleApiClient`, which implements both.

use crate::renderer::error::RemoteError;
use crate::renderer::google_types::{AddChartRequest, SlidesRequest};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// A freshly created spreadsheet and the sheet its data lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSheet {
    /// Spreadsheet id
    pub spreadsheet_id: String,
    /// Sheet id of the first sheet
    pub sheet_id: i64,
}

/// Presentation capability: duplicate, inspect, edit, export
#[async_trait]
pub trait PresentationService: Send + Sync {
    /// Copy the template file under a new title; returns the new file id
    async fn copy_template(&self, template_id: &str, title: &str) -> Result<String, RemoteError>;

    /// Slide page object ids in presentation order
    async fn page_ids(&self, presentation_id: &str) -> Result<Vec<String>, RemoteError>;

    /// Apply edits in one batch
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[SlidesRequest],
    ) -> Result<(), RemoteError>;

    /// Export the presentation as PPTX bytes
    async fn export_pptx(&self, presentation_id: &str) -> Result<Bytes, RemoteError>;
}

/// Tabular/chart capability: sheets holding chart data
#[async_trait]
pub trait ChartService: Send + Sync {
    /// Create an empty spreadsheet
    async fn create_spreadsheet(&self, title: &str) -> Result<DataSheet, RemoteError>;

    /// Write rows starting at cell A1
    async fn write_rows(&self, spreadsheet_id: &str, rows: &[Vec<Value>])
        -> Result<(), RemoteError>;

    /// Add a chart; returns its chart id
    async fn add_chart(
        &self,
        spreadsheet_id: &str,
        request: &AddChartRequest,
    ) -> Result<i64, RemoteError>;
}
