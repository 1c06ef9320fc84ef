//! Bilinear interpolation of corner series on the upstream 100 m grid.

use std::sync::Arc;

use point_common::{
    CornerSeries, InterpolationMode, InterpolationResult, Point, PointDataError,
    PointDataResult, TimeRange,
};
use tracing::{debug, instrument};

use crate::source::CornerSeriesSource;

/// Grid spacing of the upstream groundwater model, in projected units.
pub const CELL_SIZE: i64 = 100;

/// Cell edges sit at `-50, 50, 150, ...`.
const CELL_OFFSET: i64 = 50;

/// Largest coordinate magnitude the cell arithmetic handles exactly.
pub const MAX_COORDINATE: f64 = 1e15;

/// The grid cell enclosing a projected point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub x0: i64,
    pub y0: i64,
}

impl GridCell {
    /// Locate the cell containing `point`.
    ///
    /// Coordinates must be finite and below [`MAX_COORDINATE`] in magnitude.
    pub fn containing(point: Point) -> Self {
        Self {
            x0: lower_edge(point.x),
            y0: lower_edge(point.y),
        }
    }

    pub fn x1(&self) -> i64 {
        self.x0 + CELL_SIZE
    }

    pub fn y1(&self) -> i64 {
        self.y0 + CELL_SIZE
    }

    /// Corners in (x0,y0), (x0,y1), (x1,y0), (x1,y1) order.
    pub fn corners(&self) -> [Point; 4] {
        let (x0, y0) = (self.x0 as f64, self.y0 as f64);
        let (x1, y1) = (self.x1() as f64, self.y1() as f64);
        [
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y0),
            Point::new(x1, y1),
        ]
    }

    /// Normalized offsets of `point` inside the cell, each in `[0, 1)`.
    pub fn offsets(&self, point: Point) -> (f64, f64) {
        let size = CELL_SIZE as f64;
        (
            (point.x - self.x0 as f64) / size,
            (point.y - self.y0 as f64) / size,
        )
    }
}

fn lower_edge(v: f64) -> i64 {
    let floored = v.floor() as i64;
    floored - (floored + CELL_OFFSET).rem_euclid(CELL_SIZE)
}

/// Blend four corner values at normalized offsets `xt`, `yt`.
pub fn bilinear_blend(v00: f64, v01: f64, v10: f64, v11: f64, xt: f64, yt: f64) -> f64 {
    let p0 = (1.0 - yt) * v00 + yt * v01;
    let p1 = (1.0 - yt) * v10 + yt * v11;
    (1.0 - xt) * p0 + xt * p1
}

/// Produces point series from an upstream that only answers for grid corners.
#[derive(Clone)]
pub struct GridInterpolator {
    source: Arc<dyn CornerSeriesSource>,
}

impl GridInterpolator {
    pub fn new(source: Arc<dyn CornerSeriesSource>) -> Self {
        Self { source }
    }

    /// Compute the series at `point` for `range`.
    ///
    /// Any corner failure or inconsistency aborts the whole call; there are
    /// no partial results.
    #[instrument(skip_all, fields(x = point.x, y = point.y, mode = %mode))]
    pub async fn interpolate(
        &self,
        point: Point,
        range: &TimeRange,
        mode: InterpolationMode,
    ) -> PointDataResult<InterpolationResult> {
        let in_range = |v: f64| v.is_finite() && v.abs() < MAX_COORDINATE;
        if !in_range(point.x) || !in_range(point.y) {
            return Err(PointDataError::validation(format!(
                "Point {} must have finite coordinates below {:e} in magnitude",
                point, MAX_COORDINATE
            )));
        }

        match mode {
            InterpolationMode::None => self.passthrough(point, range).await,
            InterpolationMode::Bilinear => self.bilinear(point, range).await,
        }
    }

    async fn passthrough(&self, point: Point, range: &TimeRange) -> PointDataResult<InterpolationResult> {
        let corner = self.source.query_corner(point, range).await?;
        debug!(
            "Upstream resolved {} to {} ({} values)",
            point,
            corner.actual_point,
            corner.series.len()
        );

        Ok(InterpolationResult {
            requested_point: point,
            resolved_point: corner.actual_point,
            dates: corner.series.dates,
            values: corner.series.values,
            interpolation_mode: InterpolationMode::None,
            tile_id: corner.tile_id,
            elevation: corner.elevation,
            corners: Vec::new(),
        })
    }

    async fn bilinear(&self, point: Point, range: &TimeRange) -> PointDataResult<InterpolationResult> {
        let cell = GridCell::containing(point);
        let [p00, p01, p10, p11] = cell.corners();
        debug!(
            "Interpolating {} in cell x=[{}, {}] y=[{}, {}]",
            point,
            cell.x0,
            cell.x1(),
            cell.y0,
            cell.y1()
        );

        let (c00, c01, c10, c11) = futures::try_join!(
            self.source.query_corner(p00, range),
            self.source.query_corner(p01, range),
            self.source.query_corner(p10, range),
            self.source.query_corner(p11, range),
        )?;

        let (xt, yt) = cell.offsets(point);
        let values = blend_series([&c00, &c01, &c10, &c11], xt, yt)?;

        Ok(InterpolationResult {
            requested_point: point,
            resolved_point: point,
            dates: c00.series.dates,
            values,
            interpolation_mode: InterpolationMode::Bilinear,
            tile_id: None,
            elevation: None,
            corners: vec![p00, p01, p10, p11],
        })
    }
}

/// Blend four aligned corner series index by index.
///
/// Corners are in (x0,y0), (x0,y1), (x1,y0), (x1,y1) order.
fn blend_series(corners: [&CornerSeries; 4], xt: f64, yt: f64) -> PointDataResult<Vec<f64>> {
    let lengths = corners.map(|c| c.series.len());
    if lengths.iter().any(|&len| len != lengths[0]) {
        return Err(PointDataError::InconsistentSeriesLength { lengths });
    }

    let [c00, c01, c10, c11] = corners.map(|c| &c.series);

    for index in 0..lengths[0] {
        let date = c00.dates.get(index);
        if [c01, c10, c11].iter().any(|s| s.dates.get(index) != date) {
            return Err(PointDataError::MisalignedSeriesDates { index });
        }
    }

    Ok((0..lengths[0])
        .map(|i| {
            bilinear_blend(
                c00.values[i],
                c01.values[i],
                c10.values[i],
                c11.values[i],
                xt,
                yt,
            )
        })
        .collect())
}
