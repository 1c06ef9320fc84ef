//! Capabilities the core needs from upstream services.

use async_trait::async_trait;
use point_common::{CornerSeries, Point, PointDataResult, Station, StationApi, TimeRange};

/// Fetches the time series for one exact grid corner.
///
/// Implementations report the point the upstream actually answered for in
/// [`CornerSeries::actual_point`]; it may differ from the requested point.
#[async_trait]
pub trait CornerSeriesSource: Send + Sync {
    async fn query_corner(&self, point: Point, range: &TimeRange) -> PointDataResult<CornerSeries>;
}

/// Supplies the candidate stations of a station catalogue.
///
/// No filtering happens here; that is the locator's job.
#[async_trait]
pub trait StationSource: Send + Sync {
    async fn find_stations(&self, api: StationApi) -> PointDataResult<Vec<Station>>;
}
