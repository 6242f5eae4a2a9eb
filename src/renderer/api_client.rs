//! Google API client
//!
//! Direct HTTP client for the Drive, Slides and Sheets REST APIs.
//! One shared `reqwest::Client` (connection pooling) and one bearer token
//! are created at startup and reused read-only for every job.

use crate::renderer::constants::{
    DRIVE_API_BASE_URL, PPTX_MIME_TYPE, SHEETS_API_BASE_URL, SLIDES_API_BASE_URL,
};
use crate::renderer::error::RemoteError;
use crate::renderer::google_types::{
    AddChartRequest, CopyFileRequest, CreateSpreadsheetRequest, DriveFile, Presentation,
    SheetsBatchUpdate, SheetsBatchUpdateResponse, SheetsRequest, SlidesBatchUpdate, SlidesRequest,
    Spreadsheet, SpreadsheetProperties, ValueRange,
};
use crate::renderer::remote::{ChartService, DataSheet, PresentationService};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

const DRIVE: &str = "drive";
const SLIDES: &str = "slides";
const SHEETS: &str = "sheets";

/// Base URLs of the three Google APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    /// Drive v3
    pub drive: String,
    /// Slides v1
    pub slides: String,
    /// Sheets v4
    pub sheets: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            drive: DRIVE_API_BASE_URL.to_string(),
            slides: SLIDES_API_BASE_URL.to_string(),
            sheets: SHEETS_API_BASE_URL.to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Point all three APIs at one base URL (mock servers)
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            drive: base.clone(),
            slides: base.clone(),
            sheets: base,
        }
    }
}

/// HTTP client for Drive, Slides and Sheets
#[derive(Debug, Clone)]
pub struct GoogleApiClient {
    http: reqwest::Client,
    access_token: String,
    endpoints: GoogleEndpoints,
}

impl GoogleApiClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (carries the per-call timeout)
    /// * `access_token` - OAuth bearer token with Drive/Slides/Sheets scopes
    /// * `endpoints` - API base URLs
    pub fn new(http: reqwest::Client, access_token: String, endpoints: GoogleEndpoints) -> Self {
        Self {
            http,
            access_token,
            endpoints,
        }
    }

    /// Send a request, turning non-2xx answers into `RemoteError::Status`
    async fn send(
        &self,
        service: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|source| RemoteError::Transport { service, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                service = service,
                status_code = status.as_u16(),
                error_body = %body,
                "Google API returned error status"
            );

            return Err(RemoteError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Send a request and decode its JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(service, request).await?;
        let body = response
            .text()
            .await
            .map_err(|source| RemoteError::Transport { service, source })?;

        serde_json::from_str(&body).map_err(|e| RemoteError::InvalidResponse {
            service,
            message: format!("{} - Response body: {}", e, body),
        })
    }
}

#[async_trait]
impl PresentationService for GoogleApiClient {
    async fn copy_template(&self, template_id: &str, title: &str) -> Result<String, RemoteError> {
        let url = format!("{}/files/{}/copy", self.endpoints.drive, template_id);
        let request = self
            .http
            .post(&url)
            .query(&[("supportsAllDrives", "true")])
            .json(&CopyFileRequest { name: title });

        let file: DriveFile = self.send_json(DRIVE, request).await?;
        tracing::info!(template_id = %template_id, presentation_id = %file.id, "Copied template");
        Ok(file.id)
    }

    async fn page_ids(&self, presentation_id: &str) -> Result<Vec<String>, RemoteError> {
        let url = format!("{}/presentations/{}", self.endpoints.slides, presentation_id);
        let request = self.http.get(&url).query(&[("fields", "slides.objectId")]);

        let presentation: Presentation = self.send_json(SLIDES, request).await?;
        Ok(presentation
            .slides
            .into_iter()
            .map(|page| page.object_id)
            .collect())
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[SlidesRequest],
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/presentations/{}:batchUpdate",
            self.endpoints.slides, presentation_id
        );
        let request = self.http.post(&url).json(&SlidesBatchUpdate { requests });

        let _: Value = self.send_json(SLIDES, request).await?;
        tracing::debug!(
            presentation_id = %presentation_id,
            request_count = requests.len(),
            "Applied Slides batch update"
        );
        Ok(())
    }

    async fn export_pptx(&self, presentation_id: &str) -> Result<Bytes, RemoteError> {
        let url = format!("{}/files/{}/export", self.endpoints.drive, presentation_id);
        let request = self.http.get(&url).query(&[("mimeType", PPTX_MIME_TYPE)]);
        let response = self.send(DRIVE, request).await?;

        // Drain the whole chunked download before handing the bytes on
        let mut stream = response.bytes_stream();
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| RemoteError::Transport {
                service: DRIVE,
                source,
            })?;
            buffer.extend_from_slice(&chunk);
        }

        tracing::info!(
            presentation_id = %presentation_id,
            size_bytes = buffer.len(),
            "Exported presentation as PPTX"
        );
        Ok(buffer.freeze())
    }
}

#[async_trait]
impl ChartService for GoogleApiClient {
    async fn create_spreadsheet(&self, title: &str) -> Result<DataSheet, RemoteError> {
        let url = format!("{}/spreadsheets", self.endpoints.sheets);
        let request = self.http.post(&url).json(&CreateSpreadsheetRequest {
            properties: SpreadsheetProperties { title },
        });

        let spreadsheet: Spreadsheet = self.send_json(SHEETS, request).await?;
        let sheet_id = spreadsheet
            .sheets
            .first()
            .map(|sheet| sheet.properties.sheet_id)
            .unwrap_or(0);

        Ok(DataSheet {
            spreadsheet_id: spreadsheet.spreadsheet_id,
            sheet_id,
        })
    }

    async fn write_rows(
        &self,
        spreadsheet_id: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/spreadsheets/{}/values/A1",
            self.endpoints.sheets, spreadsheet_id
        );
        let request = self
            .http
            .put(&url)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange { values: rows });

        let _: Value = self.send_json(SHEETS, request).await?;
        Ok(())
    }

    async fn add_chart(
        &self,
        spreadsheet_id: &str,
        request: &AddChartRequest,
    ) -> Result<i64, RemoteError> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.endpoints.sheets, spreadsheet_id
        );
        let requests = [SheetsRequest::AddChart(request.clone())];
        let http_request = self.http.post(&url).json(&SheetsBatchUpdate {
            requests: &requests,
        });

        let response: SheetsBatchUpdateResponse = self.send_json(SHEETS, http_request).await?;
        response
            .replies
            .into_iter()
            .next()
            .and_then(|reply| reply.add_chart)
            .map(|reply| reply.chart.chart_id)
            .ok_or_else(|| RemoteError::InvalidResponse {
                service: SHEETS,
                message: "addChart reply contains no chart id".to_string(),
            })
    }
}
