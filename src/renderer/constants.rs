//! Renderer constants
//!
//! Centralized constants used throughout the renderer module.

/// MIME type of exported and uploaded decks
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Drive v3 base URL
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Slides v1 base URL
pub const SLIDES_API_BASE_URL: &str = "https://slides.googleapis.com/v1";

/// Sheets v4 base URL
pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Legend placement for every chart
pub const CHART_LEGEND_POSITION: &str = "BOTTOM_LEGEND";

/// Axis every chart series is plotted against
pub const CHART_SERIES_AXIS: &str = "LEFT_AXIS";

/// Prefix of duplicated presentation titles
/// Format: "{PRESENTATION_TITLE_PREFIX}{job_id}_{unix_seconds}"
pub const PRESENTATION_TITLE_PREFIX: &str = "ppt_job_";

/// Prefix of chart data spreadsheet titles
/// Format: "{CHART_SHEET_TITLE_PREFIX}{job_id}_{unix_seconds}"
pub const CHART_SHEET_TITLE_PREFIX: &str = "chart_job_";

/// Blob key extension for exported decks
pub const ARTIFACT_EXTENSION: &str = "pptx";
