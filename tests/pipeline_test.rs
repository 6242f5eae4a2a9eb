//! End-to-end pipeline tests against in-memory stores and a fake Google
//! backend.

mod common;

use common::{harness, harness_with, harness_with_blobs, Call, FakeGoogle, EXPORTED, MAX_ATTEMPTS};
use serde_json::json;
use slide_renderer::renderer::constants::PPTX_MIME_TYPE;
use slide_renderer::renderer::google_types::SlidesRequest;
use slide_renderer::renderer::{PipelineError, RetryPolicy};
use slide_renderer::store::{JobRecord, JobStatus, MemoryBlobStore};

fn chart_page(request: &SlidesRequest) -> Option<&str> {
    match request {
        SlidesRequest::CreateSheetsChart(chart) => {
            Some(chart.element_properties.page_object_id.as_str())
        }
        _ => None,
    }
}

fn image_page(request: &SlidesRequest) -> Option<&str> {
    match request {
        SlidesRequest::CreateImage(image) => Some(image.element_properties.page_object_id.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn test_successful_job_publishes_deck() {
    let h = harness(FakeGoogle::with_pages(2), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [
                {"placeholders": {"{{TITLE}}": "Q3 Review"}},
                {"target_slide_index": 1, "chart_spec": {
                    "data": [["month", "sales"], ["jan", 10], ["feb", 12]],
                    "series": [{"col": 1}],
                    "title": "Sales"
                }}
            ]}),
        ))
        .await;

    let url = h.pipeline.process_job("j1", None).await.unwrap();

    assert_eq!(url, "https://blobs.test/j1.pptx");
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Done);
    assert_eq!(record.final_ppt_url.as_deref(), Some(url.as_str()));

    let objects = h.blobs.objects().await;
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].key, "j1.pptx");
    assert_eq!(objects[0].content_type, PPTX_MIME_TYPE);
    assert_eq!(objects[0].data.as_ref(), EXPORTED);

    let calls = h.google.calls();
    match &calls[0] {
        Call::Copy { template_id, title } => {
            assert_eq!(template_id, "template_1");
            assert!(title.starts_with("ppt_job_j1_"));
        }
        other => panic!("first call should copy the template, got {:?}", other),
    }
    assert!(calls.contains(&Call::WriteRows { rows: 3 }));
    assert_eq!(calls.last(), Some(&Call::Export));

    let statuses: Vec<_> = h
        .jobs
        .updates()
        .await
        .into_iter()
        .filter_map(|(_, update)| update.status)
        .collect();
    assert_eq!(statuses, vec![JobStatus::Processing, JobStatus::Done]);
}

#[tokio::test]
async fn test_zero_slides_fails_without_remote_calls() {
    let h = harness(FakeGoogle::with_pages(1), Some("template_1"));
    h.jobs.insert(JobRecord::queued("j1", json!({"slides": []}))).await;

    let err = h.pipeline.process_job("j1", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::Plan(_)));
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("No slides in plan"));
    assert!(h.google.calls().is_empty());
}

#[tokio::test]
async fn test_plan_from_ppt_plan_text() {
    let h = harness(FakeGoogle::with_pages(1), Some("template_1"));
    let mut record = JobRecord::queued("j1", serde_json::Value::Null);
    record.ppt_plan = Some(json!(r#"{"slides": [{"placeholders": {"{{A}}": "a"}}]}"#));
    h.jobs.insert(record).await;

    h.pipeline.process_job("j1", None).await.unwrap();
    assert_eq!(
        h.google.slides_requests(),
        vec![SlidesRequest::replace_all_text("{{A}}", "a")]
    );
}

#[tokio::test]
async fn test_invalid_chart_does_not_abort_job() {
    let h = harness(FakeGoogle::with_pages(2), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [
                {"chart_spec": {"data": [["x", "y"], [1, 2]], "series": [{"col": 1}]}},
                {"target_slide_index": 1, "chart_spec": {"data": []}}
            ]}),
        ))
        .await;

    let url = h.pipeline.process_job("j1", None).await.unwrap();

    assert_eq!(url, "https://blobs.test/j1.pptx");
    assert_eq!(h.jobs.get("j1").await.unwrap().status, JobStatus::Done);
    // Only the valid chart reaches the remote services
    assert_eq!(h.google.count(|c| matches!(c, Call::CreateSpreadsheet { .. })), 1);
    let charts: Vec<_> = h
        .google
        .slides_requests()
        .iter()
        .filter_map(|r| chart_page(r).map(str::to_string))
        .collect();
    assert_eq!(charts, vec!["page_0".to_string()]);
}

#[tokio::test]
async fn test_malformed_elements_do_not_abort_job() {
    let h = harness(FakeGoogle::with_pages(3), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [
                {"chart_spec": {"data": [["x", "y"], [1, 2]], "series": [{"col": 1}]}},
                {"target_slide_index": 1, "chart_spec": {"data": [["x", "y"]], "series": [{"col": -1}]}},
                {"target_slide_index": 1, "image": {"url": 5}},
                {"target_slide_index": 2, "chart_spec": {"data": [["x", "y"]]}, "x": "left"},
                {"target_slide_index": 2, "image": {"url": "https://img.test/a.png"}}
            ]}),
        ))
        .await;

    let url = h.pipeline.process_job("j1", None).await.unwrap();

    assert_eq!(url, "https://blobs.test/j1.pptx");
    assert_eq!(h.jobs.get("j1").await.unwrap().status, JobStatus::Done);
    // Malformed elements never reach the remote services
    assert_eq!(h.google.count(|c| matches!(c, Call::CreateSpreadsheet { .. })), 1);
    let requests = h.google.slides_requests();
    let charts: Vec<_> = requests.iter().filter_map(chart_page).collect();
    let images: Vec<_> = requests.iter().filter_map(image_page).collect();
    assert_eq!(charts, vec!["page_0"]);
    assert_eq!(images, vec!["page_2"]);
}

#[tokio::test]
async fn test_rejected_image_does_not_abort_job() {
    let google = FakeGoogle {
        reject_images: true,
        ..FakeGoogle::with_pages(1)
    };
    let h = harness(google, Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [{"image": {"url": "https://img.test/a.png"}}]}),
        ))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap();

    assert_eq!(h.jobs.get("j1").await.unwrap().status, JobStatus::Done);
    // Every error is retried under the default policy
    assert_eq!(
        h.google
            .slides_requests()
            .iter()
            .filter(|r| image_page(r).is_some())
            .count(),
        MAX_ATTEMPTS as usize
    );
}

#[tokio::test]
async fn test_target_slide_index_is_clamped() {
    let h = harness(FakeGoogle::with_pages(3), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [
                {"target_slide_index": 99, "chart_spec": {"data": [["x", "y"]], "series": [{"col": 1}]}},
                {"target_slide_index": -2, "image": {"url": "https://img.test/a.png", "position": "left"}}
            ]}),
        ))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap();

    let requests = h.google.slides_requests();
    let chart_pages: Vec<_> = requests.iter().filter_map(chart_page).collect();
    let image_pages: Vec<_> = requests.iter().filter_map(image_page).collect();
    assert_eq!(chart_pages, vec!["page_2"]);
    assert_eq!(image_pages, vec!["page_0"]);

    match requests.iter().find(|r| image_page(r).is_some()) {
        Some(SlidesRequest::CreateImage(image)) => {
            assert_eq!(image.element_properties.transform.translate_x, 457_200);
            assert_eq!(image.element_properties.size.width.magnitude, 3_200_400);
        }
        other => panic!("expected an image request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_later_placeholders_overwrite_earlier_ones() {
    let h = harness(FakeGoogle::with_pages(2), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [
                {"placeholders": {"{{X}}": "1", "{{Y}}": "y"}},
                {"target_slide_index": 1, "placeholders": {"{{X}}": "2"}}
            ]}),
        ))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap();

    let replace_batches: Vec<_> = h
        .google
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::BatchUpdate(requests) => Some(requests),
            _ => None,
        })
        .collect();
    assert_eq!(replace_batches.len(), 1);
    assert_eq!(
        replace_batches[0],
        vec![
            SlidesRequest::replace_all_text("{{X}}", "2"),
            SlidesRequest::replace_all_text("{{Y}}", "y"),
        ]
    );
}

#[tokio::test]
async fn test_substitution_precedes_insertion() {
    let h = harness(FakeGoogle::with_pages(1), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued(
            "j1",
            json!({"slides": [{
                "placeholders": {"{{A}}": "a"},
                "image": {"url": "https://img.test/a.png"}
            }]}),
        ))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap();

    let requests = h.google.slides_requests();
    assert!(matches!(requests[0], SlidesRequest::ReplaceAllText(_)));
    assert!(matches!(requests[1], SlidesRequest::CreateImage(_)));
}

#[tokio::test]
async fn test_missing_template_fails_without_remote_calls() {
    let h = harness(FakeGoogle::with_pages(1), None);
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    let err = h.pipeline.process_job("j1", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::MissingTemplate));
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("No template specified"));
    assert!(h.google.calls().is_empty());
}

#[tokio::test]
async fn test_template_override_wins() {
    let h = harness(FakeGoogle::with_pages(1), Some("default_template"));
    let mut record = JobRecord::queued("j1", json!({"slides": [{}]}));
    record.template_drive_id = Some("job_template".to_string());
    h.jobs.insert(record).await;

    h.pipeline
        .process_job("j1", Some("request_template"))
        .await
        .unwrap();

    match &h.google.calls()[0] {
        Call::Copy { template_id, .. } => assert_eq!(template_id, "request_template"),
        other => panic!("unexpected first call {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_template_fails() {
    let h = harness(FakeGoogle::with_pages(0), Some("template_1"));
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    let err = h.pipeline.process_job("j1", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::EmptyTemplate));
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("Template has no slides"));
    assert_eq!(h.google.count(|c| *c == Call::Export), 0);
}

#[tokio::test]
async fn test_exhausted_retries_fail_job() {
    let google = FakeGoogle {
        copy_status: Some(503),
        ..FakeGoogle::with_pages(1)
    };
    let h = harness(google, Some("template_1"));
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    let err = h.pipeline.process_job("j1", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::Remote(_)));
    assert_eq!(
        h.google.count(|c| matches!(c, Call::Copy { .. })),
        MAX_ATTEMPTS as usize
    );
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error_message.unwrap().contains("503"));
}

#[tokio::test]
async fn test_client_error_is_retried_by_default() {
    let google = FakeGoogle {
        copy_status: Some(404),
        ..FakeGoogle::with_pages(1)
    };
    let h = harness(google, Some("template_1"));
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap_err();

    assert_eq!(
        h.google.count(|c| matches!(c, Call::Copy { .. })),
        MAX_ATTEMPTS as usize
    );
    assert_eq!(h.jobs.get("j1").await.unwrap().status, JobStatus::Failed);
}

#[tokio::test]
async fn test_classified_policy_stops_on_terminal_error() {
    let google = FakeGoogle {
        copy_status: Some(404),
        ..FakeGoogle::with_pages(1)
    };
    let policy = RetryPolicy {
        classify_errors: true,
        ..RetryPolicy::immediate(MAX_ATTEMPTS)
    };
    let h = harness_with(
        google,
        MemoryBlobStore::new("https://blobs.test"),
        policy,
        Some("template_1"),
    );
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    h.pipeline.process_job("j1", None).await.unwrap_err();

    assert_eq!(h.google.count(|c| matches!(c, Call::Copy { .. })), 1);
    assert_eq!(h.jobs.get("j1").await.unwrap().status, JobStatus::Failed);
}

#[tokio::test]
async fn test_upload_without_url_fails_job() {
    let h = harness_with_blobs(
        FakeGoogle::with_pages(1),
        MemoryBlobStore::without_public_urls(),
        Some("template_1"),
    );
    h.jobs
        .insert(JobRecord::queued("j1", json!({"slides": [{}]})))
        .await;

    let err = h.pipeline.process_job("j1", None).await.unwrap_err();

    assert!(matches!(err, PipelineError::UploadFailed(_)));
    let record = h.jobs.get("j1").await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert!(record
        .error_message
        .unwrap()
        .starts_with("Failed to upload PPTX to storage"));
    assert!(record.final_ppt_url.is_none());
}
