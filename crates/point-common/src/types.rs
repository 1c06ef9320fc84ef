//! Data model shared by the locator, the interpolator and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::PointDataError;

/// A 2D point.
///
/// Either geographic (`x` = latitude, `y` = longitude) or projected
/// (`x` = easting, `y` = northing) depending on the call; one call never
/// mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A weather station and the parameters it reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "supportedParameters")]
    pub supported_parameters: BTreeSet<String>,
}

impl Station {
    pub fn new<I, S>(id: impl Into<String>, lat: f64, lon: f64, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: None,
            lon,
            lat,
            supported_parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True when the station reports every parameter in `required`.
    pub fn supports_all(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.supported_parameters)
    }
}

/// Which DMI station catalogue a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationApi {
    Climate,
    MetObs,
}

impl StationApi {
    /// Collection name used in the DMI URL path.
    pub fn collection_name(&self) -> &'static str {
        match self {
            StationApi::Climate => "climateData",
            StationApi::MetObs => "metObs",
        }
    }
}

impl FromStr for StationApi {
    type Err = PointDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "climate" => Ok(StationApi::Climate),
            "metobs" => Ok(StationApi::MetObs),
            _ => Err(PointDataError::validation("Invalid API specified")),
        }
    }
}

/// Dates and values, positionally aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, rejecting unaligned input.
    pub fn new(dates: Vec<String>, values: Vec<f64>) -> Result<Self, PointDataError> {
        if dates.len() != values.len() {
            return Err(PointDataError::malformed_payload(
                "Series",
                format!("{} dates but {} values", dates.len(), values.len()),
            ));
        }
        Ok(Self { dates, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Upstream grid tile identifier; HIP reports it as text or as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileId {
    Number(i64),
    Text(String),
}

/// A series fetched for one exact grid corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerSeries {
    pub series: TimeSeries,
    /// Point the upstream actually answered for (after its own snapping).
    pub actual_point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_id: Option<TileId>,
    /// Terrain elevation of the tile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl CornerSeries {
    pub fn new(series: TimeSeries, actual_point: Point) -> Self {
        Self {
            series,
            actual_point,
            tile_id: None,
            elevation: None,
        }
    }
}

/// How a point series is derived from the upstream grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    /// Pass through whatever the upstream snaps the point to.
    #[default]
    None,
    /// Blend the four enclosing grid corners.
    Bilinear,
}

impl InterpolationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMode::None => "none",
            InterpolationMode::Bilinear => "bilinear",
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = PointDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(InterpolationMode::None),
            "bilinear" => Ok(InterpolationMode::Bilinear),
            other => Err(PointDataError::validation(format!(
                "Parameter 'interpolation' must be 'none' or 'bilinear', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point series produced by the grid interpolator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationResult {
    pub requested_point: Point,
    pub resolved_point: Point,
    pub dates: Vec<String>,
    pub values: Vec<f64>,
    pub interpolation_mode: InterpolationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_id: Option<TileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// Corners queried in bilinear mode, in (x0,y0), (x0,y1), (x1,y0), (x1,y1) order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corners: Vec<Point>,
}
