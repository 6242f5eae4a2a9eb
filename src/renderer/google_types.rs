//! Google API wire types
//!
//! Structs that mirror the Drive v3, Slides v1 and Sheets v4 JSON payloads
//! used by the renderer. Only the fields the renderer reads or writes are
//! modelled.

use crate::renderer::plan::EmuRect;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit used for every size and transform sent to Slides
pub const EMU_UNIT: &str = "EMU";

// ---------------------------------------------------------------- Drive

/// Body of `files.copy`
#[derive(Serialize, Debug)]
pub struct CopyFileRequest<'a> {
    /// Name of the new file
    pub name: &'a str,
}

/// Drive file resource (subset)
#[derive(Deserialize, Debug)]
pub struct DriveFile {
    /// File id
    pub id: String,
}

// ---------------------------------------------------------------- Slides

/// Presentation resource (subset)
#[derive(Deserialize, Debug)]
pub struct Presentation {
    /// Slide pages in order
    #[serde(default)]
    pub slides: Vec<PageRef>,
}

/// A page of a presentation
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// Page object id
    pub object_id: String,
}

/// Body of `presentations.batchUpdate`
#[derive(Serialize, Debug)]
pub struct SlidesBatchUpdate<'a> {
    /// Requests applied in order
    pub requests: &'a [SlidesRequest],
}

/// A single Slides edit
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SlidesRequest {
    /// Replace every occurrence of a token
    ReplaceAllText(ReplaceAllTextRequest),
    /// Embed a chart from Sheets
    CreateSheetsChart(CreateSheetsChartRequest),
    /// Embed an image by URL
    CreateImage(CreateImageRequest),
}

impl SlidesRequest {
    /// Case-sensitive replacement of `token` with `text`
    pub fn replace_all_text(token: &str, text: &str) -> Self {
        SlidesRequest::ReplaceAllText(ReplaceAllTextRequest {
            contains_text: SubstringMatchCriteria {
                text: token.to_string(),
                match_case: true,
            },
            replace_text: text.to_string(),
        })
    }
}

/// `replaceAllText` request
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllTextRequest {
    /// Text to find
    pub contains_text: SubstringMatchCriteria,
    /// Replacement
    pub replace_text: String,
}

/// Match criteria for text replacement
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    /// Literal token
    pub text: String,
    /// Whether matching is case-sensitive
    pub match_case: bool,
}

/// `createSheetsChart` request
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSheetsChartRequest {
    /// Element id to assign
    pub object_id: String,
    /// Spreadsheet holding the chart
    pub spreadsheet_id: String,
    /// Chart id within the spreadsheet
    pub chart_id: i64,
    /// Placement
    pub element_properties: PageElementProperties,
}

/// `createImage` request
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageRequest {
    /// Element id to assign
    pub object_id: String,
    /// Image URL
    pub url: String,
    /// Placement
    pub element_properties: PageElementProperties,
}

/// Page, size and transform of a new element
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageElementProperties {
    /// Page the element goes on
    pub page_object_id: String,
    /// Element size
    pub size: Size,
    /// Element position
    pub transform: AffineTransform,
}

impl PageElementProperties {
    /// Place an element on `page_id` at `rect`
    pub fn new(page_id: &str, rect: EmuRect) -> Self {
        Self {
            page_object_id: page_id.to_string(),
            size: Size {
                width: Dimension::emu(rect.width),
                height: Dimension::emu(rect.height),
            },
            transform: AffineTransform {
                scale_x: 1.0,
                scale_y: 1.0,
                translate_x: rect.x,
                translate_y: rect.y,
                unit: EMU_UNIT.to_string(),
            },
        }
    }
}

/// Width and height
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Size {
    /// Width
    pub width: Dimension,
    /// Height
    pub height: Dimension,
}

/// A length with its unit
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Dimension {
    /// Length
    pub magnitude: i64,
    /// Unit name
    pub unit: String,
}

impl Dimension {
    fn emu(magnitude: i64) -> Self {
        Self {
            magnitude,
            unit: EMU_UNIT.to_string(),
        }
    }
}

/// Element transform (scale + translation only)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AffineTransform {
    /// Horizontal scale
    pub scale_x: f64,
    /// Vertical scale
    pub scale_y: f64,
    /// Horizontal offset
    pub translate_x: i64,
    /// Vertical offset
    pub translate_y: i64,
    /// Unit of the offsets
    pub unit: String,
}

// ---------------------------------------------------------------- Sheets

/// Body of `spreadsheets.create`
#[derive(Serialize, Debug)]
pub struct CreateSpreadsheetRequest<'a> {
    /// Spreadsheet properties
    pub properties: SpreadsheetProperties<'a>,
}

/// Spreadsheet properties
#[derive(Serialize, Debug)]
pub struct SpreadsheetProperties<'a> {
    /// Title
    pub title: &'a str,
}

/// Spreadsheet resource (subset)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    /// Spreadsheet id
    pub spreadsheet_id: String,
    /// Sheets in order
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

/// A sheet within a spreadsheet
#[derive(Deserialize, Debug)]
pub struct Sheet {
    /// Sheet properties
    pub properties: SheetProperties,
}

/// Sheet properties (subset)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Numeric sheet id
    #[serde(default)]
    pub sheet_id: i64,
}

/// Body of `values.update`
#[derive(Serialize, Debug)]
pub struct ValueRange<'a> {
    /// Row-major values
    pub values: &'a [Vec<Value>],
}

/// Body of `spreadsheets.batchUpdate`
#[derive(Serialize, Debug)]
pub struct SheetsBatchUpdate<'a> {
    /// Requests applied in order
    pub requests: &'a [SheetsRequest],
}

/// A single Sheets edit
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SheetsRequest {
    /// Add a chart
    AddChart(AddChartRequest),
}

/// `addChart` request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AddChartRequest {
    /// Chart to add
    pub chart: EmbeddedChart,
}

/// Chart embedded in a sheet
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbeddedChart {
    /// Chart definition
    pub spec: SheetsChartSpec,
}

/// Chart definition
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetsChartSpec {
    /// Title
    pub title: String,
    /// Basic chart definition
    pub basic_chart: BasicChartSpec,
}

/// Basic chart definition
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartSpec {
    /// e.g. LINE, COLUMN
    pub chart_type: String,
    /// Legend placement
    pub legend_position: String,
    /// Domain (x axis) data
    pub domains: Vec<BasicChartDomain>,
    /// Series data
    pub series: Vec<BasicChartSeries>,
}

/// Domain of a basic chart
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BasicChartDomain {
    /// Domain data
    pub domain: ChartData,
}

/// Series of a basic chart
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BasicChartSeries {
    /// Series data
    pub series: ChartData,
    /// Axis the series is plotted against
    pub target_axis: String,
}

/// Data reference
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Source ranges
    pub source_range: ChartSourceRange,
}

/// Source ranges of chart data
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartSourceRange {
    /// Ranges
    pub sources: Vec<GridRange>,
}

/// Half-open cell range on one sheet
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    /// Sheet id
    pub sheet_id: i64,
    /// First row (inclusive)
    pub start_row_index: u32,
    /// Last row (exclusive)
    pub end_row_index: u32,
    /// First column (inclusive)
    pub start_column_index: u32,
    /// Last column (exclusive)
    pub end_column_index: u32,
}

impl GridRange {
    /// Rows `[0, row_count)` of a single column
    pub fn column(sheet_id: i64, column: u32, row_count: u32) -> Self {
        Self {
            sheet_id,
            start_row_index: 0,
            end_row_index: row_count,
            start_column_index: column,
            end_column_index: column + 1,
        }
    }
}

impl ChartData {
    /// Chart data backed by a single range
    pub fn single(range: GridRange) -> Self {
        Self {
            source_range: ChartSourceRange {
                sources: vec![range],
            },
        }
    }
}

/// Response of `spreadsheets.batchUpdate`
#[derive(Deserialize, Debug)]
pub struct SheetsBatchUpdateResponse {
    /// One reply per request
    #[serde(default)]
    pub replies: Vec<SheetsReply>,
}

/// Reply to one Sheets request
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SheetsReply {
    /// Present for `addChart`
    #[serde(default)]
    pub add_chart: Option<AddChartReply>,
}

/// Reply to `addChart`
#[derive(Deserialize, Debug)]
pub struct AddChartReply {
    /// The created chart
    pub chart: CreatedChart,
}

/// Created chart (subset)
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatedChart {
    /// Chart id
    pub chart_id: i64,
}
