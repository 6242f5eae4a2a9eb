//! Slide plan model
//!
//! A slide plan is the structured description of a deck: which template
//! slide each entry targets, the placeholder substitutions, and optional
//! chart and image elements. Plans arrive either as JSON text or as an
//! already decoded JSON value; `SlidePlan::from_raw` normalizes both.

use crate::renderer::error::{ChartSpecError, PlanError};
use crate::renderer::units::inches_to_emu;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Ordered list of slide configurations
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SlidePlan {
    /// Slide configurations in processing order
    #[serde(default)]
    pub slides: Vec<SlideConfig>,
}

impl SlidePlan {
    /// Normalize a stored plan into a `SlidePlan`
    ///
    /// Accepts JSON text, a `{"slides": [...]}` object, or a bare array of
    /// slide configurations. A missing plan is treated as empty.
    ///
    /// # Errors
    /// * `PlanError::InvalidJson` - text that does not parse as JSON
    /// * `PlanError::InvalidStructure` - JSON that is not a slide plan
    /// * `PlanError::NoSlides` - a plan without any slides
    pub fn from_raw(raw: Option<&Value>) -> Result<Self, PlanError> {
        let plan = match raw {
            None => SlidePlan::default(),
            Some(Value::String(text)) => {
                let value: Value = serde_json::from_str(text).map_err(PlanError::InvalidJson)?;
                Self::from_value(value)?
            }
            Some(value) => Self::from_value(value.clone())?,
        };

        if plan.slides.is_empty() {
            return Err(PlanError::NoSlides);
        }
        Ok(plan)
    }

    fn from_value(value: Value) -> Result<Self, PlanError> {
        match value {
            Value::Null => Ok(SlidePlan::default()),
            Value::Array(_) => Ok(SlidePlan {
                slides: serde_json::from_value(value).map_err(PlanError::InvalidStructure)?,
            }),
            other => serde_json::from_value(other).map_err(PlanError::InvalidStructure),
        }
    }

    /// Merge every slide's placeholders into one substitution map
    ///
    /// Later slides overwrite earlier ones when a token repeats.
    pub fn merged_placeholders(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        for slide in &self.slides {
            for (token, value) in &slide.placeholders {
                merged.insert(token.clone(), placeholder_text(value));
            }
        }
        merged
    }
}

fn placeholder_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Keys of a slide config that override the chart rectangle
const CHART_GEOMETRY_KEYS: [&str; 4] = ["x", "y", "width", "height"];

/// One entry of a slide plan
///
/// Chart, image and chart placement stay as raw JSON here and are decoded
/// per element, so a malformed element only costs that element.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SlideConfig {
    /// Template slide to place elements on; clamped to the available pages
    #[serde(default)]
    pub target_slide_index: i64,
    /// Token -> replacement text
    #[serde(default)]
    pub placeholders: BTreeMap<String, Value>,
    /// Chart to build and embed
    #[serde(default)]
    pub chart_spec: Option<Value>,
    /// Image to embed
    #[serde(default)]
    pub image: Option<Value>,
    /// Remaining fields, including the chart placement overrides (inches)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlideConfig {
    /// Decoded chart spec, if the slide has one
    pub fn chart(&self) -> Option<Result<ChartSpec, serde_json::Error>> {
        self.chart_spec
            .as_ref()
            .map(|value| ChartSpec::deserialize(value))
    }

    /// Decoded image spec, if the slide has one
    pub fn image(&self) -> Option<Result<ImageSpec, serde_json::Error>> {
        self.image.as_ref().map(|value| ImageSpec::deserialize(value))
    }

    /// Chart rectangle: the default chart box with any overrides applied
    ///
    /// # Errors
    /// An override that is not a number.
    pub fn chart_geometry(&self) -> Result<Geometry, serde_json::Error> {
        let overrides: Map<String, Value> = CHART_GEOMETRY_KEYS
            .iter()
            .filter_map(|key| self.extra.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();
        let overrides = GeometryOverride::deserialize(Value::Object(overrides))?;
        Ok(overrides.resolve(Geometry::CHART_DEFAULT))
    }
}

/// Chart data and presentation options
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChartSpec {
    /// Row-major table; the first row usually holds headers
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
    /// Chart type, e.g. "LINE", "COLUMN", "BAR"
    #[serde(default, rename = "type")]
    pub chart_type: Option<String>,
    /// Chart title
    #[serde(default)]
    pub title: Option<String>,
    /// Series columns
    #[serde(default)]
    pub series: Vec<SeriesSpec>,
    /// Domain (x axis) column
    #[serde(default)]
    pub x_col: Option<u32>,
    /// Sheet holding the data, when it is not the spreadsheet's first sheet
    #[serde(default, rename = "sheetId")]
    pub sheet_id: Option<i64>,
}

/// A chart series backed by one data column
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    /// Column index in the data table
    pub col: u32,
}

impl ChartSpec {
    /// Default chart type
    pub const DEFAULT_TYPE: &'static str = "LINE";

    /// Number of data rows, headers included
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Domain column, defaulting to the first column
    pub fn domain_column(&self) -> u32 {
        self.x_col.unwrap_or(0)
    }

    /// Upper-cased chart type, defaulting to `LINE`
    pub fn chart_type(&self) -> String {
        self.chart_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(Self::DEFAULT_TYPE)
            .trim()
            .to_uppercase()
    }

    /// Check that the chart can be built from its data
    pub fn validate(&self) -> Result<(), ChartSpecError> {
        let header = self.data.first().ok_or(ChartSpecError::EmptyData)?;
        let width = header.len();
        let columns = std::iter::once(self.domain_column()).chain(self.series.iter().map(|s| s.col));
        for column in columns {
            if column as usize >= width {
                return Err(ChartSpecError::ColumnOutOfRange { column, width });
            }
        }
        Ok(())
    }
}

/// Image to place on a slide
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ImageSpec {
    /// Publicly fetchable image URL
    #[serde(default)]
    pub url: Option<String>,
    /// "left", "right" or "center"
    #[serde(default)]
    pub position: Option<String>,
    /// Explicit placement, overriding the position's rectangle
    #[serde(flatten)]
    pub geometry: GeometryOverride,
}

impl ImageSpec {
    /// Named position, defaulting to right
    pub fn position(&self) -> ImagePosition {
        self.position
            .as_deref()
            .map(ImagePosition::parse)
            .unwrap_or_default()
    }

    /// Final image rectangle in inches
    pub fn geometry(&self) -> Geometry {
        self.geometry.resolve(self.position().default_geometry())
    }
}

/// Named image placements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePosition {
    /// Left half of the slide
    Left,
    /// Right half of the slide
    #[default]
    Right,
    /// Centered, wider box
    Center,
}

impl ImagePosition {
    /// Parse a position name; anything unrecognised maps to `Right`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => ImagePosition::Left,
            "center" | "centre" => ImagePosition::Center,
            _ => ImagePosition::Right,
        }
    }

    /// Fixed rectangle for this position
    pub fn default_geometry(self) -> Geometry {
        match self {
            ImagePosition::Left => Geometry::new(0.5, 2.0, 3.5, 3.0),
            ImagePosition::Right => Geometry::new(5.0, 2.0, 3.5, 3.0),
            ImagePosition::Center => Geometry::new(2.0, 2.0, 6.0, 3.5),
        }
    }
}

/// Rectangle in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Left offset
    pub x: f64,
    /// Top offset
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Geometry {
    /// Default chart rectangle
    pub const CHART_DEFAULT: Geometry = Geometry::new(1.0, 2.0, 8.0, 4.0);

    /// Create a rectangle
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to EMU
    pub fn to_emu(self) -> EmuRect {
        EmuRect {
            x: inches_to_emu(self.x),
            y: inches_to_emu(self.y),
            width: inches_to_emu(self.width),
            height: inches_to_emu(self.height),
        }
    }
}

/// Rectangle in EMU, ready for the Slides API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmuRect {
    /// Left offset
    pub x: i64,
    /// Top offset
    pub y: i64,
    /// Width
    pub width: i64,
    /// Height
    pub height: i64,
}

/// Optional per-field placement overrides (inches)
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryOverride {
    /// Left offset
    #[serde(default)]
    pub x: Option<f64>,
    /// Top offset
    #[serde(default)]
    pub y: Option<f64>,
    /// Width
    #[serde(default)]
    pub width: Option<f64>,
    /// Height
    #[serde(default)]
    pub height: Option<f64>,
}

impl GeometryOverride {
    /// Fill missing fields from `defaults`
    pub fn resolve(&self, defaults: Geometry) -> Geometry {
        Geometry {
            x: self.x.unwrap_or(defaults.x),
            y: self.y.unwrap_or(defaults.y),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
        }
    }
}
