//! Integration tests for the grid interpolator against stub corner sources.
//!
//! The stubs answer from synthetic series, so every expected value can be
//! derived in closed form without any network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use point_common::{
    CornerSeries, InterpolationMode, Point, PointDataError, PointDataResult, TimeRange,
};
use point_processor::{CornerSeriesSource, GridInterpolator};
use test_utils::{
    assert_approx_eq, assert_series_approx_eq, constant_series, plane_depth, plane_series,
};

const DAYS: usize = 5;

fn range() -> TimeRange {
    TimeRange::parse(test_utils::time::FROM, test_utils::time::TO).unwrap()
}

/// Answers every corner from the affine test surface and records the queries.
#[derive(Default)]
struct PlaneSource {
    queried: Mutex<Vec<Point>>,
}

#[async_trait]
impl CornerSeriesSource for PlaneSource {
    async fn query_corner(&self, point: Point, _range: &TimeRange) -> PointDataResult<CornerSeries> {
        self.queried.lock().unwrap().push(point);
        Ok(plane_series(point, DAYS))
    }
}

/// Snaps every request to a fixed tile centre, like the upstream does.
struct SnappingSource {
    snapped: Point,
}

#[async_trait]
impl CornerSeriesSource for SnappingSource {
    async fn query_corner(&self, _point: Point, _range: &TimeRange) -> PointDataResult<CornerSeries> {
        let mut corner = constant_series(self.snapped, DAYS, 1.25);
        corner.tile_id = Some(point_common::TileId::Number(4711));
        corner.elevation = Some(23.4);
        Ok(corner)
    }
}

/// Serves pre-built series keyed by corner, failing for unknown corners.
struct TableSource {
    table: HashMap<(i64, i64), PointDataResult<CornerSeries>>,
}

impl TableSource {
    fn new(entries: Vec<(Point, PointDataResult<CornerSeries>)>) -> Self {
        let table = entries
            .into_iter()
            .map(|(p, r)| (grid_key(&p), r))
            .collect();
        Self { table }
    }
}

#[async_trait]
impl CornerSeriesSource for TableSource {
    async fn query_corner(&self, point: Point, _range: &TimeRange) -> PointDataResult<CornerSeries> {
        self.table
            .get(&grid_key(&point))
            .cloned()
            .unwrap_or_else(|| Err(PointDataError::upstream(404, format!("no tile at {}", point))))
    }
}

fn grid_key(p: &Point) -> (i64, i64) {
    (p.x as i64, p.y as i64)
}

fn corners_of(x0: f64, y0: f64) -> [Point; 4] {
    [
        Point::new(x0, y0),
        Point::new(x0, y0 + 100.0),
        Point::new(x0 + 100.0, y0),
        Point::new(x0 + 100.0, y0 + 100.0),
    ]
}

// =============================================================================
// Bilinear mode
// =============================================================================

#[tokio::test]
async fn test_bilinear_queries_the_four_enclosing_corners() {
    let source = Arc::new(PlaneSource::default());
    let interpolator = GridInterpolator::new(source.clone());
    let point = Point::new(723456.3, 6175234.9);

    let result = interpolator
        .interpolate(point, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    // Corners are fetched concurrently; order of arrival is irrelevant
    let mut queried = source.queried.lock().unwrap().clone();
    queried.sort_by_key(grid_key);
    let mut expected = corners_of(723450.0, 6175150.0).to_vec();
    expected.sort_by_key(grid_key);

    assert_eq!(queried, expected);
    assert_eq!(result.corners, corners_of(723450.0, 6175150.0).to_vec());
}

#[tokio::test]
async fn test_bilinear_reproduces_affine_surface() {
    let interpolator = GridInterpolator::new(Arc::new(PlaneSource::default()));
    let point = Point::new(723456.3, 6175234.9);

    let result = interpolator
        .interpolate(point, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    let expected: Vec<f64> = (0..DAYS).map(|day| plane_depth(point, day)).collect();
    assert_series_approx_eq!(&result.values, &expected, 1e-6);
    assert_eq!(result.dates, test_utils::daily_dates(DAYS));
    assert_eq!(result.interpolation_mode, InterpolationMode::Bilinear);
}

#[tokio::test]
async fn test_bilinear_resolved_point_is_requested_point() {
    let interpolator = GridInterpolator::new(Arc::new(PlaneSource::default()));
    let point = Point::new(500012.5, 6200077.25);

    let result = interpolator
        .interpolate(point, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    assert_eq!(result.requested_point, point);
    assert_eq!(result.resolved_point, point);
    assert!(result.tile_id.is_none());
}

#[tokio::test]
async fn test_bilinear_on_corner_returns_corner_values() {
    let [p00, p01, p10, p11] = corners_of(723450.0, 6175150.0);
    let source = TableSource::new(vec![
        (p00, Ok(constant_series(p00, DAYS, 1.0))),
        (p01, Ok(constant_series(p01, DAYS, 2.0))),
        (p10, Ok(constant_series(p10, DAYS, 3.0))),
        (p11, Ok(constant_series(p11, DAYS, 4.0))),
    ]);
    let interpolator = GridInterpolator::new(Arc::new(source));

    let result = interpolator
        .interpolate(p00, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    assert_eq!(result.values, vec![1.0; DAYS]);
}

#[tokio::test]
async fn test_bilinear_midpoint_is_mean_of_corners() {
    let [p00, p01, p10, p11] = corners_of(723450.0, 6175150.0);
    let source = TableSource::new(vec![
        (p00, Ok(constant_series(p00, DAYS, 1.0))),
        (p01, Ok(constant_series(p01, DAYS, 2.0))),
        (p10, Ok(constant_series(p10, DAYS, 3.0))),
        (p11, Ok(constant_series(p11, DAYS, 6.0))),
    ]);
    let interpolator = GridInterpolator::new(Arc::new(source));

    let result = interpolator
        .interpolate(Point::new(723500.0, 6175200.0), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    for value in result.values {
        assert_approx_eq!(value, 3.0, 1e-12);
    }
}

#[tokio::test]
async fn test_length_mismatch_is_rejected() {
    let [p00, p01, p10, p11] = corners_of(723450.0, 6175150.0);
    let source = TableSource::new(vec![
        (p00, Ok(constant_series(p00, 5, 1.0))),
        (p01, Ok(constant_series(p01, 5, 1.0))),
        (p10, Ok(constant_series(p10, 4, 1.0))),
        (p11, Ok(constant_series(p11, 5, 1.0))),
    ]);
    let interpolator = GridInterpolator::new(Arc::new(source));

    let err = interpolator
        .interpolate(Point::new(723460.0, 6175160.0), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PointDataError::InconsistentSeriesLength {
            lengths: [5, 5, 4, 5]
        }
    );
}

#[tokio::test]
async fn test_misaligned_dates_are_rejected() {
    let [p00, p01, p10, p11] = corners_of(723450.0, 6175150.0);
    let mut shifted = constant_series(p10, DAYS, 1.0);
    shifted.series.dates[2] = "2019-02-01".to_string();

    let source = TableSource::new(vec![
        (p00, Ok(constant_series(p00, DAYS, 1.0))),
        (p01, Ok(constant_series(p01, DAYS, 1.0))),
        (p10, Ok(shifted)),
        (p11, Ok(constant_series(p11, DAYS, 1.0))),
    ]);
    let interpolator = GridInterpolator::new(Arc::new(source));

    let err = interpolator
        .interpolate(Point::new(723460.0, 6175160.0), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap_err();

    assert_eq!(err, PointDataError::MisalignedSeriesDates { index: 2 });
}

#[tokio::test]
async fn test_corner_failure_aborts_interpolation() {
    let [p00, p01, p10, p11] = corners_of(723450.0, 6175150.0);
    let source = TableSource::new(vec![
        (p00, Ok(constant_series(p00, DAYS, 1.0))),
        (p01, Ok(constant_series(p01, DAYS, 1.0))),
        (p10, Err(PointDataError::upstream(503, "Service Unavailable"))),
        (p11, Ok(constant_series(p11, DAYS, 1.0))),
    ]);
    let interpolator = GridInterpolator::new(Arc::new(source));

    let err = interpolator
        .interpolate(Point::new(723460.0, 6175160.0), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap_err();

    assert_eq!(err, PointDataError::upstream(503, "Service Unavailable"));
}

// =============================================================================
// Pass-through mode
// =============================================================================

#[tokio::test]
async fn test_none_mode_passes_through_snapped_point() {
    let snapped = Point::new(723450.0, 6175250.0);
    let interpolator = GridInterpolator::new(Arc::new(SnappingSource { snapped }));
    let point = Point::new(723456.3, 6175234.9);

    let result = interpolator
        .interpolate(point, &range(), InterpolationMode::None)
        .await
        .unwrap();

    assert_eq!(result.requested_point, point);
    assert_eq!(result.resolved_point, snapped);
    assert_eq!(result.values, vec![1.25; DAYS]);
    assert_eq!(result.elevation, Some(23.4));
    assert!(result.corners.is_empty());
}

#[tokio::test]
async fn test_none_mode_queries_requested_point_once() {
    let source = Arc::new(PlaneSource::default());
    let interpolator = GridInterpolator::new(source.clone());
    let point = Point::new(723456.3, 6175234.9);

    interpolator
        .interpolate(point, &range(), InterpolationMode::None)
        .await
        .unwrap();

    assert_eq!(*source.queried.lock().unwrap(), vec![point]);
}

#[tokio::test]
async fn test_none_mode_propagates_failure() {
    let interpolator = GridInterpolator::new(Arc::new(TableSource::new(vec![])));

    let err = interpolator
        .interpolate(Point::new(1.0, 2.0), &range(), InterpolationMode::None)
        .await
        .unwrap_err();

    assert_eq!(err.http_status_code(), 404);
}

// =============================================================================
// Determinism and input checks
// =============================================================================

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let interpolator = GridInterpolator::new(Arc::new(PlaneSource::default()));
    let point = Point::new(612345.6, 6123456.7);

    let first = interpolator
        .interpolate(point, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();
    let second = interpolator
        .interpolate(point, &range(), InterpolationMode::Bilinear)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_non_finite_point_is_rejected() {
    let interpolator = GridInterpolator::new(Arc::new(PlaneSource::default()));

    let err = interpolator
        .interpolate(Point::new(f64::NAN, 1.0), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap_err();

    assert!(matches!(err, PointDataError::Validation(_)));
}

#[tokio::test]
async fn test_coordinate_beyond_grid_range_is_rejected() {
    let interpolator = GridInterpolator::new(Arc::new(PlaneSource::default()));

    let err = interpolator
        .interpolate(Point::new(1e300, 6175234.9), &range(), InterpolationMode::Bilinear)
        .await
        .unwrap_err();

    assert!(matches!(err, PointDataError::Validation(_)));
}
