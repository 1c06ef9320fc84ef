//! HIP shallow-groundwater client (hydro model v1, 100 m tiles).
//!
//! The v1 model covers 1990-01-01 through 2019-12-31 and only accepts dates.
//! It answers with the tile enclosing the requested point, reporting the
//! tile centre as a WKT `POINT(x y)`.

use async_trait::async_trait;
use point_common::{
    CornerSeries, Point, PointDataError, PointDataResult, TileId, TimeRange, TimeSeries,
};
use point_processor::CornerSeriesSource;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::HipConfig;
use crate::http::{endpoint, get_json};

const SERVICE: &str = "HIP";

const GROUNDWATER_PATH: &str = "rest/hydro_model/v1.0/terraennaert-grundvand/100m";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundwaterResponse {
    #[serde(default)]
    pub tile_id: Option<TileId>,
    /// Terrain elevation of the tile
    #[serde(default)]
    pub kote: Option<f64>,
    pub geometry: String,
    pub resultater: GroundwaterResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundwaterResults {
    #[serde(default)]
    pub dag: Vec<GroundwaterDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundwaterDay {
    pub dato: String,
    /// Depth to groundwater; missing days come back as null
    pub dybde: Option<f64>,
}

impl GroundwaterResponse {
    /// Convert into the corner series the interpolator consumes.
    pub fn into_corner_series(self) -> PointDataResult<CornerSeries> {
        let actual_point = parse_wkt_point(&self.geometry).ok_or_else(|| {
            PointDataError::malformed_payload(
                SERVICE,
                format!("unreadable geometry '{}'", self.geometry),
            )
        })?;

        let (dates, values): (Vec<String>, Vec<f64>) = self
            .resultater
            .dag
            .into_iter()
            .map(|day| (day.dato, day.dybde.unwrap_or(f64::NAN)))
            .unzip();

        Ok(CornerSeries {
            series: TimeSeries::new(dates, values)?,
            actual_point,
            tile_id: self.tile_id,
            elevation: self.kote,
        })
    }
}

/// Parse a WKT `POINT(x y)`.
pub fn parse_wkt_point(wkt: &str) -> Option<Point> {
    let inner = wkt
        .trim()
        .strip_prefix("POINT")?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;

    let mut parts = inner.split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Point::new(x, y))
}

#[derive(Clone)]
pub struct HipClient {
    client: Client,
    config: HipConfig,
}

impl HipClient {
    pub fn new(client: Client, config: HipConfig) -> Self {
        Self { client, config }
    }

    /// Groundwater URL for `point`; the range is truncated to whole dates.
    pub fn groundwater_url(&self, point: Point, range: &TimeRange) -> PointDataResult<Url> {
        let mut url = endpoint(&self.config.base_url, GROUNDWATER_PATH)?;
        url.query_pairs_mut()
            .append_pair("token", &self.config.api_key)
            .append_pair("punkt", &format!("POINT({} {})", point.x, point.y))
            .append_pair("fra", &range.from_date())
            .append_pair("til", &range.to_date());
        Ok(url)
    }

    #[instrument(skip(self, range), fields(x = point.x, y = point.y))]
    pub async fn groundwater(&self, point: Point, range: &TimeRange) -> PointDataResult<CornerSeries> {
        let response: GroundwaterResponse =
            get_json(&self.client, SERVICE, self.groundwater_url(point, range)?).await?;
        let corner = response.into_corner_series()?;
        debug!(
            "Tile at {} returned {} days",
            corner.actual_point,
            corner.series.len()
        );
        Ok(corner)
    }
}

#[async_trait]
impl CornerSeriesSource for HipClient {
    async fn query_corner(&self, point: Point, range: &TimeRange) -> PointDataResult<CornerSeries> {
        self.groundwater(point, range).await
    }
}
