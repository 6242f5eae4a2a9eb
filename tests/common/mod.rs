//! Shared fixtures: a recording fake of the Google services and a
//! pipeline wired to in-memory stores.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use slide_renderer::renderer::google_types::{AddChartRequest, SlidesRequest};
use slide_renderer::renderer::{
    ChartService, DataSheet, Pipeline, PresentationService, RemoteError, RemoteOps, RetryPolicy,
};
use slide_renderer::store::{MemoryBlobStore, MemoryJobStore};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub const EXPORTED: &[u8] = b"PK\x03\x04 fake pptx";

/// One call made against the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Copy { template_id: String, title: String },
    PageIds,
    BatchUpdate(Vec<SlidesRequest>),
    Export,
    CreateSpreadsheet { title: String },
    WriteRows { rows: usize },
    AddChart,
}

/// Fake Slides/Sheets/Drive backend
#[derive(Default)]
pub struct FakeGoogle {
    pub pages: Vec<String>,
    /// Every copy fails with this status
    pub copy_status: Option<u16>,
    /// Image insertions fail with HTTP 400
    pub reject_images: bool,
    pub calls: Mutex<Vec<Call>>,
    pub charts: AtomicU32,
}

impl FakeGoogle {
    pub fn with_pages(count: usize) -> Self {
        Self {
            pages: (0..count).map(|i| format!("page_{}", i)).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    /// All Slides requests sent, flattened in order
    pub fn slides_requests(&self) -> Vec<SlidesRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BatchUpdate(requests) => Some(requests),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PresentationService for FakeGoogle {
    async fn copy_template(&self, template_id: &str, title: &str) -> Result<String, RemoteError> {
        self.record(Call::Copy {
            template_id: template_id.to_string(),
            title: title.to_string(),
        });
        if let Some(status) = self.copy_status {
            return Err(RemoteError::Status {
                service: "drive",
                status,
                body: "copy rejected".to_string(),
            });
        }
        Ok("presentation_1".to_string())
    }

    async fn page_ids(&self, _presentation_id: &str) -> Result<Vec<String>, RemoteError> {
        self.record(Call::PageIds);
        Ok(self.pages.clone())
    }

    async fn batch_update(
        &self,
        _presentation_id: &str,
        requests: &[SlidesRequest],
    ) -> Result<(), RemoteError> {
        self.record(Call::BatchUpdate(requests.to_vec()));
        let has_image = requests
            .iter()
            .any(|r| matches!(r, SlidesRequest::CreateImage(_)));
        if has_image && self.reject_images {
            return Err(RemoteError::Status {
                service: "slides",
                status: 400,
                body: "image not accessible".to_string(),
            });
        }
        Ok(())
    }

    async fn export_pptx(&self, _presentation_id: &str) -> Result<Bytes, RemoteError> {
        self.record(Call::Export);
        Ok(Bytes::from_static(EXPORTED))
    }
}

#[async_trait]
impl ChartService for FakeGoogle {
    async fn create_spreadsheet(&self, title: &str) -> Result<DataSheet, RemoteError> {
        self.record(Call::CreateSpreadsheet {
            title: title.to_string(),
        });
        Ok(DataSheet {
            spreadsheet_id: "sheet_1".to_string(),
            sheet_id: 0,
        })
    }

    async fn write_rows(&self, _spreadsheet_id: &str, rows: &[Vec<Value>]) -> Result<(), RemoteError> {
        self.record(Call::WriteRows { rows: rows.len() });
        Ok(())
    }

    async fn add_chart(
        &self,
        _spreadsheet_id: &str,
        _request: &AddChartRequest,
    ) -> Result<i64, RemoteError> {
        self.record(Call::AddChart);
        Ok(100 + i64::from(self.charts.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Everything a pipeline test needs to inspect
pub struct Harness {
    pub pipeline: Arc<Pipeline>,
    pub jobs: Arc<MemoryJobStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub google: Arc<FakeGoogle>,
}

pub const MAX_ATTEMPTS: u32 = 3;

pub fn harness(google: FakeGoogle, default_template: Option<&str>) -> Harness {
    harness_with_blobs(google, MemoryBlobStore::new("https://blobs.test"), default_template)
}

pub fn harness_with_blobs(
    google: FakeGoogle,
    blobs: MemoryBlobStore,
    default_template: Option<&str>,
) -> Harness {
    harness_with(google, blobs, RetryPolicy::immediate(MAX_ATTEMPTS), default_template)
}

pub fn harness_with(
    google: FakeGoogle,
    blobs: MemoryBlobStore,
    policy: RetryPolicy,
    default_template: Option<&str>,
) -> Harness {
    let google = Arc::new(google);
    let jobs = Arc::new(MemoryJobStore::new());
    let blobs = Arc::new(blobs);
    let ops = RemoteOps::new(google.clone(), google.clone(), policy);
    let pipeline = Pipeline::new(
        jobs.clone(),
        blobs.clone(),
        ops,
        default_template.map(str::to_string),
    );

    Harness {
        pipeline: Arc::new(pipeline),
        jobs,
        blobs,
        google,
    }
}
